use crate::config::CameraConfig;
use crate::engine::Ray;
use glam::{Mat4, Vec2, Vec3};

const FOV_Y: f32 = 0.8;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;
const MIN_RADIUS: f32 = 0.5;
const BETA_EPSILON: f32 = 0.01;
const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_STEP: f32 = 0.1;

/// Orbit camera around a target: `alpha` is the longitudinal angle,
/// `beta` the latitudinal angle measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcRotateCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
}

impl ArcRotateCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            alpha: config.alpha,
            beta: config.beta,
            radius: config.radius,
            target: Vec3::ZERO,
        };
        camera.clamp();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_beta, cos_beta) = self.beta.sin_cos();
        let offset = Vec3::new(
            self.alpha.cos() * sin_beta,
            cos_beta,
            self.alpha.sin() * sin_beta,
        );
        self.target + offset * self.radius
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y, aspect.max(1e-3), NEAR, FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Self::projection(aspect) * self.view()
    }

    /// Drag in logical pixels.
    pub fn orbit(&mut self, drag: Vec2) {
        self.alpha -= drag.x * ORBIT_SENSITIVITY;
        self.beta -= drag.y * ORBIT_SENSITIVITY;
        self.clamp();
    }

    /// Positive steps move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        self.radius *= (1.0 - ZOOM_STEP).powf(steps);
        self.clamp();
    }

    /// `ndc` in [-1, 1] with +Y up.
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inverse = self.view_proj(aspect).inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    fn clamp(&mut self) {
        if !self.alpha.is_finite() {
            self.alpha = 0.0;
        }
        self.alpha = self.alpha.rem_euclid(std::f32::consts::TAU);
        self.beta = self
            .beta
            .clamp(BETA_EPSILON, std::f32::consts::PI - BETA_EPSILON);
        if !self.radius.is_finite() {
            self.radius = MIN_RADIUS;
        }
        self.radius = self.radius.clamp(MIN_RADIUS, FAR * 0.5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_placement_is_finite_and_on_sphere() {
        let camera = ArcRotateCamera::new(&CameraConfig::default());
        let eye = camera.eye();
        assert!(eye.is_finite());
        assert!((eye.length() - 10.0).abs() < 1e-4);
        assert!(approx(
            eye,
            Vec3::new(0.0, 1.0f32.cos() * 10.0, -(1.0f32.sin()) * 10.0)
        ));
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = ArcRotateCamera::new(&CameraConfig::default());
        let ray = camera.ray_from_ndc(Vec2::ZERO, 16.0 / 9.0);
        let to_target = (camera.target - camera.eye()).normalize();
        assert!(approx(ray.direction, to_target));
    }

    #[test]
    fn orbit_keeps_beta_inside_poles() {
        let mut camera = ArcRotateCamera::new(&CameraConfig::default());
        camera.orbit(Vec2::new(350.0, 10_000.0));
        assert!(camera.beta > 0.0);
        assert!(camera.eye().is_finite());
        camera.orbit(Vec2::new(-90.0, -20_000.0));
        assert!(camera.beta < std::f32::consts::PI);
        assert!(camera.alpha.is_finite());
    }

    #[test]
    fn zoom_changes_radius_and_stays_bounded() {
        let mut camera = ArcRotateCamera::new(&CameraConfig::default());
        camera.zoom(1.0);
        assert!(camera.radius < 10.0);
        camera.zoom(500.0);
        assert_eq!(camera.radius, MIN_RADIUS);
        camera.zoom(-2.0);
        assert!(camera.radius > MIN_RADIUS);
    }
}

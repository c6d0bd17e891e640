//! Ray hit-testing against mesh nodes.

use super::{NodeId, Scene};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub mesh: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Move,
    Wheel,
}

/// A raw pointer event together with the hit-test result at its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    pub kind: PointerKind,
    pub hit: Option<PickHit>,
}

impl PointerInfo {
    pub fn picked_mesh(&self) -> Option<NodeId> {
        self.hit.map(|hit| hit.mesh)
    }
}

/// Möller–Trumbore, double sided. Returns the distance along the ray.
pub fn intersect_triangle(ray: &Ray, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

impl Scene {
    /// Nearest mesh hit along the ray, in world space.
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for id in self.mesh_ids() {
            let Some(geometry) = self.node(id).and_then(|node| node.geometry()) else {
                continue;
            };
            let world = self.world_matrix(id);
            for triangle in geometry.triangles() {
                let world_triangle = triangle.map(|vertex| world.transform_point3(vertex));
                let Some(distance) = intersect_triangle(ray, world_triangle) else {
                    continue;
                };
                if best.map_or(true, |hit| distance < hit.distance) {
                    best = Some(PickHit {
                        mesh: id,
                        distance,
                        point: ray.origin + ray.direction * distance,
                    });
                }
            }
        }
        best
    }
}

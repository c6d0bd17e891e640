//! Scene drawing into the egui viewport.
//!
//! Meshes are flattened into world-space triangles, shaded with a single
//! hemispheric light, projected and sorted back to front, then handed to
//! the egui painter as one vertex-colored mesh.

use crate::engine::{Material, Scene};
use glam::{Mat4, Vec2, Vec3};

const SKY: Vec3 = Vec3::ONE;
const GROUND: Vec3 = Vec3::ZERO;
const UNSHADED: [f32; 3] = [0.8, 0.8, 0.8];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    /// Normalized device coordinates, +Y up.
    pub ndc: [Vec2; 3],
    pub depth: f32,
    pub color: [f32; 3],
}

/// Hemispheric lighting with the sky along +Y.
pub fn shade(material: Option<&Material>, normal: Vec3, intensity: f32) -> [f32; 3] {
    let (diffuse, emissive) = match material {
        Some(material) => (Vec3::from(material.diffuse), Vec3::from(material.emissive)),
        None => (Vec3::from(UNSHADED), Vec3::ZERO),
    };
    let t = 0.5 * (normal.normalize_or_zero().y + 1.0);
    let light = GROUND.lerp(SKY, t) * intensity;
    let color = (diffuse * light + emissive).clamp(Vec3::ZERO, Vec3::ONE);
    color.to_array()
}

/// Triangles of every mesh in the scene, sorted back to front. Triangles
/// touching the near plane are dropped.
pub fn collect_triangles(
    scene: &Scene,
    view_proj: Mat4,
    eye: Vec3,
    light_intensity: f32,
) -> Vec<ScreenTriangle> {
    let mut triangles = Vec::new();
    for id in scene.mesh_ids() {
        let Some(node) = scene.node(id) else {
            continue;
        };
        let Some(geometry) = node.geometry() else {
            continue;
        };
        let material = node.material().and_then(|material| scene.material(material));
        let world = scene.world_matrix(id);

        for local in geometry.triangles() {
            let corners = local.map(|point| world.transform_point3(point));
            let mut normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
            let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
            if normal.dot(eye - centroid) < 0.0 {
                normal = -normal;
            }

            let clip = corners.map(|point| view_proj * point.extend(1.0));
            if clip.iter().any(|point| point.w <= 1e-4) {
                continue;
            }
            let ndc = clip.map(|point| Vec2::new(point.x / point.w, point.y / point.w));
            let depth = clip.iter().map(|point| point.z / point.w).sum::<f32>() / 3.0;
            triangles.push(ScreenTriangle {
                ndc,
                depth,
                color: shade(material, normal, light_intensity),
            });
        }
    }
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    triangles
}

pub fn ndc_to_screen(ndc: Vec2, rect: egui::Rect) -> egui::Pos2 {
    egui::pos2(
        rect.left() + (ndc.x + 1.0) * 0.5 * rect.width(),
        rect.top() + (1.0 - ndc.y) * 0.5 * rect.height(),
    )
}

pub fn screen_to_ndc(pos: egui::Pos2, rect: egui::Rect) -> Vec2 {
    Vec2::new(
        (pos.x - rect.left()) / rect.width().max(1.0) * 2.0 - 1.0,
        1.0 - (pos.y - rect.top()) / rect.height().max(1.0) * 2.0,
    )
}

fn to_color32(color: [f32; 3]) -> egui::Color32 {
    let [r, g, b] = color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
    egui::Color32::from_rgb(r, g, b)
}

pub fn paint(painter: &egui::Painter, rect: egui::Rect, clear: [f32; 3], triangles: &[ScreenTriangle]) {
    painter.rect_filled(rect, 0.0, to_color32(clear));
    let mut mesh = egui::Mesh::default();
    for triangle in triangles {
        let color = to_color32(triangle.color);
        let base = mesh.vertices.len() as u32;
        for ndc in triangle.ndc {
            mesh.colored_vertex(ndc_to_screen(ndc, rect), color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    if !mesh.is_empty() {
        painter
            .with_clip_rect(rect)
            .add(egui::Shape::mesh(mesh));
    }
}

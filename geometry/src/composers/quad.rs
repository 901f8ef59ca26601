//! Flat primitives: quads, rectangles and triangles

use glam::{Vec2, Vec3};

use super::face_normal;
use crate::texture::{Identity, TextureProjector};
use crate::vertex::Vertex;

/// UV corners of the two quad triangles: {0,1,2} and {1,2,3}
const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// Quad from four corners with face-local UVs
pub fn quad(corners: [Vec3; 4]) -> Vec<Vertex> {
    quad_textured(corners, &mut Identity)
}

/// Quad from four corners
///
/// # Arguments
/// * `corners` - top-left, top-right, bottom-left, bottom-right
/// * `projector` - maps the quad's 0..1 UVs into the atlas
///
/// # Returns
/// 6 vertices: triangles {0,1,2} and {1,2,3}. The first triangle's normal
/// comes from corners 0,1,2; the second's is the negated normal of
/// corners 1,2,3, so both face the same side for a planar quad.
pub fn quad_textured(corners: [Vec3; 4], projector: &mut dyn TextureProjector) -> Vec<Vertex> {
    let normal1 = face_normal(corners[0], corners[1], corners[2]);
    let normal2 = -face_normal(corners[1], corners[2], corners[3]);

    [
        (0, normal1),
        (1, normal1),
        (2, normal1),
        (1, normal2),
        (2, normal2),
        (3, normal2),
    ]
    .into_iter()
    .map(|(corner, normal)| {
        Vertex::new(corners[corner], normal, projector.transform(QUAD_UVS[corner]))
    })
    .collect()
}

/// Rectangle lying flat on the XZ plane, centred on the origin, facing +Y
pub fn rectangle(width: f32, height: f32) -> Vec<Vertex> {
    rectangle_textured(width, height, &mut Identity)
}

pub fn rectangle_textured(
    width: f32,
    height: f32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let half_width = width / 2.0;
    let half_height = height / 2.0;
    quad_textured(
        [
            Vec3::new(-half_width, 0.0, -half_height),
            Vec3::new(half_width, 0.0, -half_height),
            Vec3::new(-half_width, 0.0, half_height),
            Vec3::new(half_width, 0.0, half_height),
        ],
        projector,
    )
}

/// Single triangle with UVs from its XZ bounding box
pub fn triangle(points: [Vec3; 3]) -> Vec<Vertex> {
    triangle_textured(points, &mut Identity)
}

/// Single triangle
///
/// UVs are each point's (x, z) normalized against the triangle's XZ
/// bounding box. An axis with zero extent maps to 0.
pub fn triangle_textured(points: [Vec3; 3], projector: &mut dyn TextureProjector) -> Vec<Vertex> {
    let normal = face_normal(points[0], points[1], points[2]);

    let xz = points.map(|p| Vec2::new(p.x, p.z));
    let min = xz[0].min(xz[1]).min(xz[2]);
    let max = xz[0].max(xz[1]).max(xz[2]);
    let size = max - min;

    let normalize = |value: f32, extent: f32| if extent == 0.0 { 0.0 } else { value / extent };

    points
        .iter()
        .zip(xz)
        .map(|(&position, p)| {
            let local = p - min;
            let uv = Vec2::new(normalize(local.x, size.x), normalize(local.y, size.y));
            Vertex::new(position, normal, projector.transform(uv))
        })
        .collect()
}

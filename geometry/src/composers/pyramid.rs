//! Pyramids and frustum stacks along the X axis

use glam::Vec3;

use super::radial::edge_pairs;
use super::{assert_edge_count, edge_points, quad_textured};
use crate::texture::{Identity, TextureProjector};
use crate::vertex::Vertex;

/// Pyramid with face-local UVs
pub fn pyramid(radius: f32, height: f32, edges: u32, levels: u32) -> Vec<Vertex> {
    assert_edge_count(edges);
    assert!(levels >= 1, "pyramid needs at least one level");

    let mut projectors = vec![Identity; levels as usize];
    pyramid_levels(radius, height, edges, levels, &mut projectors)
}

/// Pyramid with one projector for every level
///
/// The projector is advanced after every quad and is never rewound, so
/// the cursor keeps counting across levels (`edges * levels` calls).
pub fn pyramid_textured(
    radius: f32,
    height: f32,
    edges: u32,
    levels: u32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    assert_edge_count(edges);
    assert!(levels >= 1, "pyramid needs at least one level");

    (0..levels)
        .flat_map(|level| level_quads(radius, height, edges, levels, level, &mut *projector))
        .collect()
}

/// Pyramid as a stack of `levels` frustum bands
///
/// # Arguments
/// * `radius` - radius of the base ring
/// * `height` - total height, split into `levels` equal bands along X
/// * `projectors` - one per level; level `L` uses `projectors[L]`
///
/// # Returns
/// `edges * levels * 6` vertices. At level `L` the lower ring has radius
/// `radius - radius / levels * L` and the upper ring
/// `radius - radius / levels * (L + 1)`, so the last ring collapses to a point.
pub fn pyramid_levels<P: TextureProjector>(
    radius: f32,
    height: f32,
    edges: u32,
    levels: u32,
    projectors: &mut [P],
) -> Vec<Vertex> {
    assert_edge_count(edges);
    assert!(levels >= 1, "pyramid needs at least one level");
    assert!(
        projectors.len() >= levels as usize,
        "pyramid needs one projector per level: {} levels, {} projectors",
        levels,
        projectors.len()
    );

    projectors
        .iter_mut()
        .take(levels as usize)
        .zip(0..levels)
        .flat_map(|(projector, level)| level_quads(radius, height, edges, levels, level, projector))
        .collect()
}

/// One band: a quad per edge between the level's lower and upper ring
fn level_quads(
    radius: f32,
    height: f32,
    edges: u32,
    levels: u32,
    level: u32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let level_height = height / levels as f32;
    let half_height = level_height / 2.0;
    let base = level_height * level as f32;

    let ring_step = radius / levels as f32;
    let lower = edge_points(radius - ring_step * level as f32, edges);
    let upper = edge_points(radius - ring_step * (level + 1) as f32, edges);

    let mut vertices = Vec::with_capacity(edges as usize * 6);
    for ((point, next), (point_up, next_up)) in edge_pairs(&lower).zip(edge_pairs(&upper)) {
        vertices.extend(quad_textured(
            [
                Vec3::new(base - half_height, point.x, point.y),
                Vec3::new(base + half_height, point_up.x, point_up.y),
                Vec3::new(base - half_height, next.x, next.y),
                Vec3::new(base + half_height, next_up.x, next_up.y),
            ],
            projector,
        ));
        projector.next_element();
    }
    vertices
}

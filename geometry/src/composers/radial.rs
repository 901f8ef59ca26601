//! Radial primitives: circle fans and open tubes

use std::f64::consts::TAU;

use glam::{Vec2, Vec3};

use super::{assert_edge_count, quad_textured};
use crate::texture::{Identity, TextureProjector};
use crate::vertex::Vertex;

/// `edges` points on a circle, evenly spaced by angle starting at angle 0
///
/// Point `i` is `(cos(a) * radius, sin(a) * radius)` with `a = i * 2π / edges`.
pub fn edge_points(radius: f32, edges: u32) -> Vec<Vec2> {
    let step = TAU / f64::from(edges);
    let radius = f64::from(radius);
    let mut angle = 0.0f64;

    (0..edges)
        .map(|_| {
            let point = Vec2::new((angle.cos() * radius) as f32, (angle.sin() * radius) as f32);
            angle += step;
            point
        })
        .collect()
}

/// Consecutive edge point pairs, wrapping the last point back to the first
pub(crate) fn edge_pairs(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    points
        .iter()
        .enumerate()
        .map(|(i, &point)| (point, points[(i + 1) % points.len()]))
}

/// Flat disc on the XZ plane facing +Y
pub fn circle(radius: f32, edges: u32) -> Vec<Vertex> {
    circle_textured(radius, edges, &mut Identity)
}

/// Triangle fan: one (edge i, edge i+1, centre) triangle per edge
///
/// UV is `(point + radius) / (2 * radius)`, so the disc fills the unit
/// square. The whole disc uses one projector element (`next_element` is
/// never called).
pub fn circle_textured(
    radius: f32,
    edges: u32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    assert_edge_count(edges);

    let points = edge_points(radius, edges);
    let diameter = radius * 2.0;
    let mut vertices = Vec::with_capacity(edges as usize * 3);

    for (point, next) in edge_pairs(&points) {
        for p in [point, next, Vec2::ZERO] {
            let uv = (p + Vec2::splat(radius)) / diameter;
            vertices.push(Vertex::new(
                Vec3::new(p.x, 0.0, p.y),
                Vec3::Y,
                projector.transform(uv),
            ));
        }
    }

    vertices
}

/// Open tube along the X axis, centred on the origin
pub fn tube(radius: f32, height: f32, edges: u32) -> Vec<Vertex> {
    tube_textured(radius, height, edges, &mut Identity)
}

/// Open tube along the X axis: one quad per edge segment
///
/// The quad for segment `i` spans `-height/2..height/2` between edge
/// points `i` and `i + 1`. The projector advances once per segment, so a
/// [`crate::TubeTexture`] with `edges` elements gives every segment its
/// own band.
pub fn tube_textured(
    radius: f32,
    height: f32,
    edges: u32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    assert_edge_count(edges);

    let points = edge_points(radius, edges);
    let half_height = height / 2.0;
    let mut vertices = Vec::with_capacity(edges as usize * 6);

    for (point, next) in edge_pairs(&points) {
        vertices.extend(quad_textured(
            [
                Vec3::new(-half_height, point.x, point.y),
                Vec3::new(half_height, point.x, point.y),
                Vec3::new(-half_height, next.x, next.y),
                Vec3::new(half_height, next.x, next.y),
            ],
            projector,
        ));
        projector.next_element();
    }

    vertices
}

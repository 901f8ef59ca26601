//! Closed cylinder: tube wall plus two circle caps

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::{circle_textured, tube_textured};
use crate::texture::{Identity, TextureProjector};
use crate::vertex::Vertex;
use crate::vertex_ops;

/// Closed cylinder along the X axis with face-local UVs
pub fn cylinder(radius: f32, height: f32, edges: u32) -> Vec<Vertex> {
    cylinder_textured_ends(radius, height, edges, &mut Identity, &mut Identity, &mut Identity)
}

/// Closed cylinder with one projector shared by both caps
pub fn cylinder_textured(
    radius: f32,
    height: f32,
    edges: u32,
    side: &mut dyn TextureProjector,
    ends: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let mut vertices = tube_textured(radius, height, edges, side);
    vertices.extend(cap(radius, height, edges, ends, CapEnd::Positive));
    vertices.extend(cap(radius, height, edges, ends, CapEnd::Negative));
    vertices
}

/// Closed cylinder along the X axis
///
/// # Arguments
/// * `side` - projector for the tube wall, advanced once per edge segment
/// * `end_positive` - projector for the cap at `+height/2`
/// * `end_negative` - projector for the cap at `-height/2`
///
/// # Returns
/// `edges * 6` wall vertices, then `edges * 3` for each cap. Cap rings
/// coincide with the tube rim and both caps face away from the tube.
pub fn cylinder_textured_ends(
    radius: f32,
    height: f32,
    edges: u32,
    side: &mut dyn TextureProjector,
    end_positive: &mut dyn TextureProjector,
    end_negative: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let mut vertices = tube_textured(radius, height, edges, side);
    vertices.extend(cap(radius, height, edges, end_positive, CapEnd::Positive));
    vertices.extend(cap(radius, height, edges, end_negative, CapEnd::Negative));
    vertices
}

#[derive(Clone, Copy)]
enum CapEnd {
    Positive,
    Negative,
}

/// Circle turned a quarter about Z onto the tube rim and moved to one end
///
/// The +Z quarter turn maps the ring point `(x, 0, z)` to `(0, x, z)`,
/// the same place the tube puts its rim, for any edge count. That leaves
/// the cap normal at -X, so the positive cap is flipped afterwards.
fn cap(
    radius: f32,
    height: f32,
    edges: u32,
    projector: &mut dyn TextureProjector,
    end: CapEnd,
) -> Vec<Vertex> {
    let mut vertices = circle_textured(radius, edges, projector);
    vertex_ops::rotate(&mut vertices, Vec3::new(0.0, 0.0, FRAC_PI_2));
    match end {
        CapEnd::Positive => {
            vertex_ops::offset(&mut vertices, Vec3::new(height / 2.0, 0.0, 0.0));
            vertex_ops::generate_opposites(&vertices)
        }
        CapEnd::Negative => {
            vertex_ops::offset(&mut vertices, Vec3::new(-height / 2.0, 0.0, 0.0));
            vertices
        }
    }
}

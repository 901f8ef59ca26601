//! In-place transforms over vertex arrays
//!
//! Composers use these to place caps and faces; the scene crate uses
//! [`transform_to_world`] to bake an object's world matrix into merged
//! geometry.

use glam::{Mat3, Mat4, Vec3};

use crate::vertex::{PositionVertex, Vertex};

/// Translate every position by `delta`
pub fn offset(vertices: &mut [Vertex], delta: Vec3) {
    for vertex in vertices.iter_mut() {
        vertex.position += delta;
    }
}

/// Rotation applying X first, then Y, then Z
pub fn euler_rotation(euler: Vec3) -> Mat3 {
    Mat3::from_rotation_z(euler.z) * Mat3::from_rotation_y(euler.y) * Mat3::from_rotation_x(euler.x)
}

/// Rotate positions and normals by euler angles (radians)
///
/// Normals go through the same matrix and are not renormalized afterwards.
pub fn rotate(vertices: &mut [Vertex], euler: Vec3) {
    let rotation = euler_rotation(euler);
    for vertex in vertices.iter_mut() {
        vertex.position = rotation * vertex.position;
        vertex.normal = rotation * vertex.normal;
    }
}

/// Per-axis scale of positions
///
/// Normals are left untouched, so a non-uniform scale leaves them
/// pointing the pre-scale direction.
pub fn scale(vertices: &mut [Vertex], factors: Vec3) {
    for vertex in vertices.iter_mut() {
        vertex.position *= factors;
    }
}

/// Apply `matrix` to the position of every vertex (no perspective divide)
pub fn transform_to_world<V: PositionVertex>(vertices: &mut [V], matrix: Mat4) {
    for vertex in vertices.iter_mut() {
        vertex.set_position(matrix.transform_point3(vertex.position()));
    }
}

/// Back-facing copy of a vertex array
///
/// Same length, every normal negated, element order reversed so each
/// triangle's winding flips.
pub fn generate_opposites(vertices: &[Vertex]) -> Vec<Vertex> {
    vertices
        .iter()
        .rev()
        .map(|v| Vertex {
            normal: -v.normal,
            ..*v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn sample() -> Vec<Vertex> {
        vec![
            Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::X, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::Y, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(0.0, -2.0, 4.0), Vec3::Z, Vec2::new(0.0, 1.0)),
        ]
    }

    #[test]
    fn test_identity_rotate_and_offset() {
        let original = sample();
        let mut vertices = original.clone();
        rotate(&mut vertices, Vec3::ZERO);
        offset(&mut vertices, Vec3::ZERO);
        assert_eq!(vertices, original);
    }

    #[test]
    fn test_offset() {
        let mut vertices = sample();
        offset(&mut vertices, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(vertices[0].position, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(vertices[0].normal, Vec3::X);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let mut vertices = vec![Vertex::new(Vec3::X, Vec3::Y, Vec2::ZERO)];
        rotate(&mut vertices, Vec3::new(0.0, 0.0, FRAC_PI_2));
        assert!((vertices[0].position - Vec3::Y).length() < EPSILON);
        assert!((vertices[0].normal - -Vec3::X).length() < EPSILON);
    }

    #[test]
    fn test_rotation_order_x_then_z() {
        // X first maps +Y to +Z; Z then leaves +Z alone.
        let mut vertices = vec![Vertex::new(Vec3::Y, Vec3::Y, Vec2::ZERO)];
        rotate(&mut vertices, Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        assert!((vertices[0].position - Vec3::Z).length() < EPSILON);
    }

    #[test]
    fn test_rotate_keeps_unnormalized_normals() {
        let mut vertices = vec![Vertex::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec2::ZERO)];
        rotate(&mut vertices, Vec3::new(0.0, 0.0, FRAC_PI_2));
        assert!((vertices[0].normal.length() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_scale_positions_only() {
        let mut vertices = sample();
        scale(&mut vertices, Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(vertices[0].position, Vec3::new(2.0, 2.0, 1.5));
        assert_eq!(vertices[0].normal, Vec3::X);
    }

    #[test]
    fn test_transform_to_world_translation() {
        let mut vertices = sample();
        transform_to_world(&mut vertices, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(vertices[1].position, Vec3::new(9.0, 0.5, 0.0));
        assert_eq!(vertices[1].normal, Vec3::Y);
    }

    #[test]
    fn test_generate_opposites() {
        let original = sample();
        let opposites = generate_opposites(&original);
        assert_eq!(opposites.len(), original.len());
        assert_eq!(opposites[0].position, original[2].position);
        assert_eq!(opposites[0].normal, -original[2].normal);
        assert_eq!(opposites[2].uv, original[0].uv);
    }

    #[test]
    fn test_generate_opposites_twice() {
        let original = sample();
        let once = generate_opposites(&original);
        let twice = generate_opposites(&once);
        // Normals flip back; the second reversal undoes the first.
        for (a, b) in twice.iter().zip(original.iter()) {
            assert_eq!(a.normal, b.normal);
        }
        assert_eq!(twice, original);
        assert_ne!(once, original);
    }
}

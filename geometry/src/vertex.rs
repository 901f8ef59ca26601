//! Vertex record shared by composers, geometry buffers and the scene crate

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex with position, normal and texture coordinate
///
/// `#[repr(C)]` with no padding (32 bytes), so a `&[Vertex]` can be handed
/// to a GPU buffer as raw bytes via `bytemuck::cast_slice`.
///
/// Equality is component-wise float equality: `0.0 == -0.0`, and a vertex
/// holding a NaN never equals anything. Geometry welding relies on exactly
/// this rule.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    /// Size of one vertex in bytes
    pub const SIZE: usize = 32;

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// The eight float components in file order
    /// (position xyz, normal xyz, uv)
    pub fn components(&self) -> [f32; 8] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.uv.x,
            self.uv.y,
        ]
    }

    /// Inverse of [`Vertex::components`]
    pub fn from_components(c: [f32; 8]) -> Self {
        Self {
            position: Vec3::new(c[0], c[1], c[2]),
            normal: Vec3::new(c[3], c[4], c[5]),
            uv: Vec2::new(c[6], c[7]),
        }
    }

    /// True if any component is NaN
    pub fn has_nan(&self) -> bool {
        self.position.is_nan() || self.normal.is_nan() || self.uv.is_nan()
    }
}

/// Vertex types with a world-space position
///
/// World transforms only touch the position component, so this is all
/// [`crate::vertex_ops::transform_to_world`] needs from a vertex record.
pub trait PositionVertex: Copy {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
}

impl PositionVertex for Vertex {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), Vertex::SIZE);
        let vertices = [Vertex::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 3 * Vertex::SIZE);
    }

    #[test]
    fn test_signed_zero_is_equal() {
        let a = Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, Vec2::ZERO);
        let b = Vertex::new(Vec3::new(-0.0, 1.0, 0.0), Vec3::Y, Vec2::ZERO);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_never_equal() {
        let a = Vertex::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y, Vec2::ZERO);
        assert_ne!(a, a);
        assert!(a.has_nan());
    }

    #[test]
    fn test_components_order() {
        let v = Vertex::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec2::new(7.0, 8.0),
        );
        assert_eq!(v.components(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(Vertex::from_components(v.components()), v);
    }
}

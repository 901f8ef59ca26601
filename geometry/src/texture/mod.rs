//! Texture projectors
//!
//! A projector maps a normalized face-local coordinate (0..1 on each
//! axis) to a texture atlas coordinate. Composers call
//! [`TextureProjector::next_element`] between faces or bands, so a
//! stateful projector can hand each face a different atlas region.
//!
//! - [`Identity`] - pass-through
//! - [`TextureRectangle`] - a sub-rectangle of the atlas
//! - [`TextureMultiplier`] - UV scaling (tiling)
//! - [`CuboidTexture`] - one projector per cuboid side
//! - [`TubeTexture`] - N bands stacked vertically in one atlas region

mod cuboid;
mod rectangle;
mod tube;

pub use cuboid::{CuboidSide, CuboidTexture};
pub use rectangle::{PixelRect, TextureMultiplier, TextureRectangle};
pub use tube::TubeTexture;

use glam::Vec2;

/// Maps normalized face coordinates to atlas coordinates
pub trait TextureProjector {
    /// Project a normalized coordinate into the atlas
    fn transform(&self, uv: Vec2) -> Vec2;

    /// Advance to the next face/band
    fn next_element(&mut self) {}
}

/// Pass-through projector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl TextureProjector for Identity {
    fn transform(&self, uv: Vec2) -> Vec2 {
        uv
    }
}

impl<P: TextureProjector + ?Sized> TextureProjector for &mut P {
    fn transform(&self, uv: Vec2) -> Vec2 {
        (**self).transform(uv)
    }

    fn next_element(&mut self) {
        (**self).next_element();
    }
}

impl<P: TextureProjector + ?Sized> TextureProjector for Box<P> {
    fn transform(&self, uv: Vec2) -> Vec2 {
        (**self).transform(uv)
    }

    fn next_element(&mut self) {
        (**self).next_element();
    }
}

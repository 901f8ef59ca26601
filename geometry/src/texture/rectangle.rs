//! Stateless projectors: atlas sub-rectangle and UV multiplier

use glam::Vec2;

use super::TextureProjector;

/// Integer pixel rectangle inside a texture atlas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole-atlas bounds of the given size
    pub const fn bounds(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Normalized (start, extent) of this rectangle inside `atlas`
    pub(crate) fn normalized_in(&self, atlas: PixelRect) -> (Vec2, Vec2) {
        let atlas_size = Vec2::new(atlas.width as f32, atlas.height as f32);
        let start = Vec2::new(self.x as f32, self.y as f32) / atlas_size;
        let extent = Vec2::new(self.width as f32, self.height as f32) / atlas_size;
        (start, extent)
    }
}

/// Projects into a sub-rectangle of the atlas: `start + uv * extent`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRectangle {
    start: Vec2,
    extent: Vec2,
}

impl TextureRectangle {
    /// From already-normalized atlas coordinates
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            start: Vec2::new(x, y),
            extent: Vec2::new(width, height),
        }
    }

    /// From a pixel rectangle and the atlas pixel bounds
    pub fn from_pixels(rect: PixelRect, atlas: PixelRect) -> Self {
        let (start, extent) = rect.normalized_in(atlas);
        Self { start, extent }
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }
}

impl TextureProjector for TextureRectangle {
    fn transform(&self, uv: Vec2) -> Vec2 {
        self.start + uv * self.extent
    }
}

/// Scales UVs, e.g. to tile a texture across a large face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureMultiplier {
    multiplier: Vec2,
}

impl TextureMultiplier {
    pub fn new(multiplier: Vec2) -> Self {
        Self { multiplier }
    }

    pub fn uniform(multiplier: f32) -> Self {
        Self::new(Vec2::splat(multiplier))
    }
}

impl TextureProjector for TextureMultiplier {
    fn transform(&self, uv: Vec2) -> Vec2 {
        uv * self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_pixels() {
        let atlas = PixelRect::bounds(256, 128);
        let projector = TextureRectangle::from_pixels(PixelRect::new(64, 32, 32, 64), atlas);
        assert_eq!(projector.start(), Vec2::new(0.25, 0.25));
        assert_eq!(projector.extent(), Vec2::new(0.125, 0.5));
        assert_eq!(projector.transform(Vec2::ZERO), Vec2::new(0.25, 0.25));
        assert_eq!(projector.transform(Vec2::ONE), Vec2::new(0.375, 0.75));
    }

    #[test]
    fn test_rectangle_normalized() {
        let mut projector = TextureRectangle::new(0.5, 0.0, 0.5, 0.5);
        projector.next_element();
        assert_eq!(projector.transform(Vec2::new(1.0, 1.0)), Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_multiplier() {
        let uniform = TextureMultiplier::uniform(4.0);
        assert_eq!(uniform.transform(Vec2::new(0.5, 0.25)), Vec2::new(2.0, 1.0));

        let per_axis = TextureMultiplier::new(Vec2::new(2.0, 3.0));
        assert_eq!(per_axis.transform(Vec2::ONE), Vec2::new(2.0, 3.0));
    }
}

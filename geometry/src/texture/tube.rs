//! Banded projector for tubes, cylinders and pyramid levels

use glam::Vec2;

use super::{PixelRect, TextureProjector};

/// Stacks `elements` bands vertically inside one atlas rectangle
///
/// Each band gets `1 / elements` of the rectangle's height. The band
/// index starts at 0 and moves down one band per `next_element`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeTexture {
    start: Vec2,
    band_extent: Vec2,
    elements: u32,
    element: u32,
}

impl TubeTexture {
    pub fn from_pixels(rect: PixelRect, atlas: PixelRect, elements: u32) -> Self {
        assert!(elements >= 1, "TubeTexture needs at least one element");
        let (start, extent) = rect.normalized_in(atlas);
        Self {
            start,
            band_extent: Vec2::new(extent.x, extent.y / elements as f32),
            elements,
            element: 0,
        }
    }

    /// Current band index
    pub fn element(&self) -> u32 {
        self.element
    }

    pub fn elements(&self) -> u32 {
        self.elements
    }
}

impl TextureProjector for TubeTexture {
    fn transform(&self, uv: Vec2) -> Vec2 {
        self.start
            + uv * self.band_extent
            + Vec2::new(0.0, self.band_extent.y * self.element as f32)
    }

    fn next_element(&mut self) {
        self.element += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_stack_vertically() {
        let atlas = PixelRect::bounds(100, 100);
        let mut texture = TubeTexture::from_pixels(PixelRect::new(0, 0, 50, 100), atlas, 4);
        assert_eq!(texture.elements(), 4);

        assert_eq!(texture.transform(Vec2::ZERO), Vec2::new(0.0, 0.0));
        assert_eq!(texture.transform(Vec2::ONE), Vec2::new(0.5, 0.25));

        texture.next_element();
        assert_eq!(texture.element(), 1);
        assert_eq!(texture.transform(Vec2::ZERO), Vec2::new(0.0, 0.25));
        assert_eq!(texture.transform(Vec2::ONE), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_offset_rectangle() {
        let atlas = PixelRect::bounds(64, 64);
        let texture = TubeTexture::from_pixels(PixelRect::new(32, 16, 32, 32), atlas, 2);
        assert_eq!(texture.transform(Vec2::ZERO), Vec2::new(0.5, 0.25));
        assert_eq!(texture.transform(Vec2::ONE), Vec2::new(1.0, 0.5));
    }

    #[test]
    #[should_panic(expected = "at least one element")]
    fn test_zero_elements_panics() {
        TubeTexture::from_pixels(PixelRect::new(0, 0, 8, 8), PixelRect::bounds(8, 8), 0);
    }
}

//! Per-side projector for cuboids

use glam::Vec2;
use hashbrown::HashMap;

use super::{PixelRect, TextureProjector, TextureRectangle};

/// Cuboid sides, numbered in the order the cuboid composer creates them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CuboidSide {
    Front = 1,
    Back = 2,
    Left = 3,
    Right = 4,
    Top = 5,
    Bottom = 6,
}

impl CuboidSide {
    pub const ALL: [CuboidSide; 6] = [
        CuboidSide::Front,
        CuboidSide::Back,
        CuboidSide::Left,
        CuboidSide::Right,
        CuboidSide::Top,
        CuboidSide::Bottom,
    ];

    /// Side for a 1-based cursor value, `None` past the sixth side
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(CuboidSide::Front),
            2 => Some(CuboidSide::Back),
            3 => Some(CuboidSide::Left),
            4 => Some(CuboidSide::Right),
            5 => Some(CuboidSide::Top),
            6 => Some(CuboidSide::Bottom),
            _ => None,
        }
    }
}

/// Looks up a projector for the current cuboid side
///
/// The cursor starts at 1 ([`CuboidSide::Front`]) and moves one side per
/// `next_element`. Sides without a projector pass UVs through unchanged.
pub struct CuboidTexture {
    sides: HashMap<CuboidSide, Box<dyn TextureProjector + Send + Sync>>,
    current: u32,
}

impl Default for CuboidTexture {
    fn default() -> Self {
        Self::new()
    }
}

impl CuboidTexture {
    pub fn new() -> Self {
        Self {
            sides: HashMap::new(),
            current: 1,
        }
    }

    /// One atlas rectangle per listed side
    pub fn from_rects(rects: &[(CuboidSide, PixelRect)], atlas: PixelRect) -> Self {
        let mut texture = Self::new();
        for &(side, rect) in rects {
            texture.add_side(side, TextureRectangle::from_pixels(rect, atlas));
        }
        texture
    }

    /// Set the projector for one side, replacing any previous one
    pub fn add_side<P>(&mut self, side: CuboidSide, projector: P)
    where
        P: TextureProjector + Send + Sync + 'static,
    {
        self.sides.insert(side, Box::new(projector));
    }

    /// Share a copy of one projector across several sides
    pub fn add_sides<P>(&mut self, sides: &[CuboidSide], projector: P)
    where
        P: TextureProjector + Clone + Send + Sync + 'static,
    {
        for &side in sides {
            self.add_side(side, projector.clone());
        }
    }

    /// Rewind the cursor to the first side
    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Raw 1-based cursor value
    pub fn cursor(&self) -> u32 {
        self.current
    }

    pub fn current_side(&self) -> Option<CuboidSide> {
        CuboidSide::from_index(self.current)
    }
}

impl TextureProjector for CuboidTexture {
    fn transform(&self, uv: Vec2) -> Vec2 {
        match self
            .current_side()
            .and_then(|side| self.sides.get(&side))
        {
            Some(projector) => projector.transform(uv),
            None => uv,
        }
    }

    fn next_element(&mut self) {
        self.current += 1;
    }
}

impl std::fmt::Debug for CuboidTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuboidTexture")
            .field("sides", &self.sides.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

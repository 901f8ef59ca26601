//! Blend modes, texture identity and the material grouping key

use std::fmt;
use std::sync::Arc;

use crate::object::ObjectState;

/// Blend state of a render object
///
/// `None` on an object means the backend default. The four named modes
/// are the mergeable ones; [`BlendMode::Custom`] never merges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Additive,
    AlphaBlend,
    NonPremultiplied,
    Opaque,
    Custom(Arc<str>),
}

impl BlendMode {
    /// Parse a manifest-style name (`additive`, `alpha-blend`, `custom:<name>`, ...)
    pub fn parse(name: &str) -> Option<Option<BlendMode>> {
        match name {
            "none" | "default" => Some(None),
            "additive" => Some(Some(BlendMode::Additive)),
            "alpha-blend" | "alpha_blend" => Some(Some(BlendMode::AlphaBlend)),
            "non-premultiplied" | "non_premultiplied" => Some(Some(BlendMode::NonPremultiplied)),
            "opaque" => Some(Some(BlendMode::Opaque)),
            _ => name
                .strip_prefix("custom:")
                .filter(|custom| !custom.is_empty())
                .map(|custom| Some(BlendMode::Custom(Arc::from(custom)))),
        }
    }
}

/// Mergeable blend classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendClass {
    Default = 0,
    Additive = 1,
    AlphaBlend = 2,
    NonPremultiplied = 3,
    Opaque = 4,
}

impl BlendClass {
    /// Class of an object's blend state; `None` for custom states
    pub fn of(blend: Option<&BlendMode>) -> Option<Self> {
        match blend {
            None => Some(BlendClass::Default),
            Some(BlendMode::Additive) => Some(BlendClass::Additive),
            Some(BlendMode::AlphaBlend) => Some(BlendClass::AlphaBlend),
            Some(BlendMode::NonPremultiplied) => Some(BlendClass::NonPremultiplied),
            Some(BlendMode::Opaque) => Some(BlendClass::Opaque),
            Some(BlendMode::Custom(_)) => None,
        }
    }
}

/// Opaque texture identity, compared by name
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TextureId(Arc<str>);

impl TextureId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({:?})", &*self.0)
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TextureId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Objects with equal keys can be merged into one draw
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    visible: bool,
    blend: BlendClass,
    visual: bool,
    alpha_bits: u32,
    opaque: bool,
    texture: Option<TextureId>,
}

impl MaterialKey {
    /// Key for an object's state; `None` if its blend state is custom
    pub fn for_state(state: &ObjectState) -> Option<Self> {
        let blend = BlendClass::of(state.blend.as_ref())?;
        Some(Self {
            visible: state.visible,
            blend,
            visual: state.visual,
            // 0.0 and -0.0 are the same alpha
            alpha_bits: if state.alpha == 0.0 { 0 } else { state.alpha.to_bits() },
            opaque: state.opaque,
            texture: state.texture.clone(),
        })
    }

    pub fn blend(&self) -> BlendClass {
        self.blend
    }

    pub fn texture(&self) -> Option<&TextureId> {
        self.texture.as_ref()
    }
}

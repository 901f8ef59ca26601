//! Render objects
//!
//! Two kinds of drawable share one interface, [`Object3D`]:
//! - [`BasicObject`] - owns a [`kiln_geometry::GeometryBuffer`] and uploads it
//! - [`MorphedObject`] - many loaded objects merged into one world-space mesh

mod basic;
mod morphed;

pub use basic::BasicObject;
pub use morphed::MorphedObject;

use std::sync::Arc;

use glam::Mat4;
use parking_lot::RwLock;

use crate::backend::{DrawCall, RenderBackend};
use crate::buffers::GpuBuffers;
use crate::error::SceneError;
use crate::material::{BlendMode, TextureId};

/// Display and batching attributes common to every render object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    pub world: Mat4,
    /// `None` is the backend default blend state
    pub blend: Option<BlendMode>,
    pub visible: bool,
    /// Takes part in drawing (false for logic-only objects)
    pub visual: bool,
    pub alpha: f32,
    pub texture: Option<TextureId>,
    /// Drawn in the opaque pass; only opaque objects are merged
    pub opaque: bool,
    /// May be merged by [`crate::RenderBatchCollection::optimize`]
    pub optimizable: bool,
    /// Set once `load_content` has succeeded
    pub loaded: bool,
    pub tag: Option<String>,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            blend: None,
            visible: true,
            visual: true,
            alpha: 1.0,
            texture: None,
            opaque: true,
            optimizable: true,
            loaded: false,
            tag: None,
        }
    }
}

/// Which concrete object a [`SharedObject`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Basic,
    Morphed,
}

/// A drawable mesh instance
pub trait Object3D: Send + Sync {
    fn kind(&self) -> ObjectKind;

    fn state(&self) -> &ObjectState;

    fn state_mut(&mut self) -> &mut ObjectState;

    /// Build geometry and upload GPU buffers
    fn load_content(&mut self, backend: &Arc<dyn RenderBackend>) -> Result<(), SceneError>;

    /// Per-frame hook
    fn update(&mut self) {}

    /// Uploaded buffers, `None` until loaded (and for non-visual objects)
    fn buffers(&self) -> Option<&GpuBuffers>;

    /// Release GPU buffers; safe to call more than once
    fn dispose(&mut self);

    fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    /// Issue this object's draw, if it is visible, visual and uploaded
    ///
    /// Returns whether a draw was issued.
    fn draw(&self, backend: &dyn RenderBackend) -> Result<bool, SceneError> {
        let state = self.state();
        if !state.visible || !state.visual {
            return Ok(false);
        }
        let Some(buffers) = self.buffers() else {
            return Ok(false);
        };
        let Some(handle) = buffers.handle() else {
            return Ok(false);
        };
        let call = DrawCall::from_state(state, buffers.index_count() as u32);
        backend.draw_indexed(handle, &call)?;
        Ok(true)
    }
}

/// Reference-counted, lockable object as stored in collections
///
/// Identity is the allocation: compare with [`Arc::ptr_eq`].
pub type SharedObject = Arc<RwLock<dyn Object3D>>;

/// Wrap an object for use in a collection
pub fn share<O: Object3D + 'static>(object: O) -> SharedObject {
    Arc::new(RwLock::new(object))
}

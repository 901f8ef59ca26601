//! Render objects and draw-call batching
//!
//! Objects upload their [`kiln_geometry::GeometryBuffer`] through a
//! [`RenderBackend`] and live in a [`RenderBatchCollection`]. Optimizing the
//! collection merges opaque objects that share a [`MaterialKey`] into one
//! [`MorphedObject`] each, cutting draw calls; restoring puts the original
//! objects back.

pub mod backend;
pub mod buffers;
pub mod collection;
pub mod error;
pub mod material;
pub mod object;

pub use backend::{
    BackendStats, BufferHandle, DrawCall, HeadlessBackend, RecordedDraw, RenderBackend,
};
#[cfg(feature = "wgpu")]
pub use backend::WgpuBackend;
pub use buffers::GpuBuffers;
pub use collection::{CollectionStats, OptimizeReport, RenderBatchCollection};
pub use error::{BackendError, SceneError};
pub use material::{BlendClass, BlendMode, MaterialKey, TextureId};
pub use object::{
    BasicObject, MorphedObject, Object3D, ObjectKind, ObjectState, SharedObject, share,
};

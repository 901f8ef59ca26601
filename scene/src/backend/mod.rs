//! Render backend seam
//!
//! Render objects never talk to a graphics API directly. They allocate,
//! fill and draw index/vertex buffer pairs through [`RenderBackend`]:
//!
//! - [`HeadlessBackend`] - in-memory, records everything (tests, tools)
//! - `WgpuBackend` - GPU buffers on a `wgpu::Device` (feature `wgpu`)

mod headless;

#[cfg(feature = "wgpu")]
mod gpu;

pub use headless::{BackendStats, HeadlessBackend, RecordedDraw};

#[cfg(feature = "wgpu")]
pub use gpu::WgpuBackend;

use glam::Mat4;
use kiln_geometry::Vertex;

use crate::error::BackendError;
use crate::material::{BlendMode, TextureId};
use crate::object::ObjectState;

/// Handle to a vertex/index buffer pair owned by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Per-draw state handed to [`RenderBackend::draw_indexed`]
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub world: Mat4,
    pub alpha: f32,
    pub blend: Option<BlendMode>,
    pub texture: Option<TextureId>,
    /// Number of indices to draw (a triangle list)
    pub index_count: u32,
}

impl DrawCall {
    pub fn from_state(state: &ObjectState, index_count: u32) -> Self {
        Self {
            world: state.world,
            alpha: state.alpha,
            blend: state.blend.clone(),
            texture: state.texture.clone(),
            index_count,
        }
    }
}

/// Buffer allocation, upload and indexed drawing
///
/// Methods take `&self`; implementations synchronize internally so one
/// backend can be shared by every object and collection.
pub trait RenderBackend: Send + Sync {
    /// Allocate a buffer pair sized for exactly these counts
    fn allocate(
        &self,
        vertex_count: usize,
        index_count: usize,
        dynamic: bool,
    ) -> Result<BufferHandle, BackendError>;

    /// Overwrite a buffer pair's contents; lengths must match the allocation
    fn write(
        &self,
        handle: BufferHandle,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), BackendError>;

    /// Free a buffer pair; unknown handles are ignored
    fn release(&self, handle: BufferHandle);

    /// Issue one indexed triangle-list draw
    fn draw_indexed(&self, handle: BufferHandle, call: &DrawCall) -> Result<(), BackendError>;
}

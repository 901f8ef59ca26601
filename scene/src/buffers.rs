//! Per-object vertex/index buffers

use std::fmt;
use std::sync::Arc;

use kiln_geometry::Vertex;

use crate::backend::{BufferHandle, RenderBackend};
use crate::error::BackendError;

/// An object's buffer pair plus a CPU copy of what was last uploaded
///
/// Reallocates only when the vertex or index count changes; otherwise
/// uploads overwrite the existing buffers. Released on drop.
pub struct GpuBuffers {
    backend: Arc<dyn RenderBackend>,
    handle: Option<BufferHandle>,
    dynamic: bool,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GpuBuffers {
    pub fn new(backend: Arc<dyn RenderBackend>, dynamic: bool) -> Self {
        Self {
            backend,
            handle: None,
            dynamic,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Upload a vertex/index pair, reallocating if the counts changed
    pub fn upload(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), BackendError> {
        let handle = match self.handle {
            Some(handle)
                if self.vertices.len() == vertices.len() && self.indices.len() == indices.len() =>
            {
                handle
            }
            current => {
                if let Some(old) = current {
                    tracing::debug!(
                        "Reallocating buffers {:?}: {}/{} -> {}/{} vertices/indices",
                        old,
                        self.vertices.len(),
                        self.indices.len(),
                        vertices.len(),
                        indices.len()
                    );
                    self.backend.release(old);
                    self.handle = None;
                }
                let handle = self
                    .backend
                    .allocate(vertices.len(), indices.len(), self.dynamic)?;
                self.handle = Some(handle);
                handle
            }
        };

        self.backend.write(handle, vertices, indices)?;
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        Ok(())
    }

    /// Backend handle, `None` before the first upload or after release
    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Last uploaded vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Last uploaded indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Free the backend buffers; safe to call more than once
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.backend.release(handle);
            self.vertices = Vec::new();
            self.indices = Vec::new();
        }
    }
}

impl Drop for GpuBuffers {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for GpuBuffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuBuffers")
            .field("handle", &self.handle)
            .field("dynamic", &self.dynamic)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .finish()
    }
}

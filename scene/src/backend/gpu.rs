//! wgpu render backend
//!
//! Buffer pairs live on the device. Draws are recorded and replayed into
//! a caller-owned render pass; pipeline and bind group setup stays with
//! the caller.

use std::sync::Arc;

use hashbrown::HashMap;
use kiln_geometry::Vertex;
use parking_lot::Mutex;

use super::{BufferHandle, DrawCall, RenderBackend};
use crate::error::BackendError;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: usize,
    index_count: usize,
}

#[derive(Default)]
struct GpuState {
    next_handle: u32,
    meshes: HashMap<BufferHandle, GpuMesh>,
    pending: Vec<(BufferHandle, DrawCall)>,
}

/// Render backend creating vertex/index buffers on a wgpu device
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    state: Mutex<GpuState>,
}

impl WgpuBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            state: Mutex::new(GpuState::default()),
        }
    }

    /// Number of draws waiting for [`replay`](Self::replay)
    pub fn pending_draws(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Replay recorded draws into `render_pass`, then forget them
    ///
    /// `bind` runs before each draw to set per-draw pipeline state
    /// (world matrix, alpha, texture, blend) from the [`DrawCall`].
    pub fn replay(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        mut bind: impl FnMut(&mut wgpu::RenderPass<'_>, &DrawCall),
    ) {
        let mut state = self.state.lock();
        let pending = std::mem::take(&mut state.pending);

        for (handle, call) in &pending {
            // Released between record and replay
            let Some(mesh) = state.meshes.get(handle) else {
                tracing::warn!("Skipping draw of released buffers {:?}", handle);
                continue;
            };
            if mesh.index_count == 0 {
                continue;
            }

            bind(render_pass, call);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..call.index_count, 0, 0..1);
        }
    }

    fn create_buffer(&self, label: &str, size: usize, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

impl RenderBackend for WgpuBackend {
    fn allocate(
        &self,
        vertex_count: usize,
        index_count: usize,
        dynamic: bool,
    ) -> Result<BufferHandle, BackendError> {
        let label = if dynamic { "Dynamic" } else { "Static" };
        let vertex_buffer = self.create_buffer(
            &format!("{label} Vertex Buffer"),
            vertex_count * Vertex::SIZE,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = self.create_buffer(
            &format!("{label} Index Buffer"),
            index_count * std::mem::size_of::<u32>(),
            wgpu::BufferUsages::INDEX,
        );

        let mut state = self.state.lock();
        let handle = BufferHandle(state.next_handle);
        state.next_handle = state
            .next_handle
            .checked_add(1)
            .ok_or_else(|| BackendError::Device("buffer handles exhausted".into()))?;
        state.meshes.insert(
            handle,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                vertex_count,
                index_count,
            },
        );
        Ok(handle)
    }

    fn write(
        &self,
        handle: BufferHandle,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), BackendError> {
        let state = self.state.lock();
        let mesh = state
            .meshes
            .get(&handle)
            .ok_or(BackendError::UnknownBuffers(handle))?;
        if vertices.len() != mesh.vertex_count || indices.len() != mesh.index_count {
            return Err(BackendError::Device(format!(
                "write of {} vertices / {} indices into buffers sized {} / {}",
                vertices.len(),
                indices.len(),
                mesh.vertex_count,
                mesh.index_count
            )));
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&mesh.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
        if !indices.is_empty() {
            self.queue
                .write_buffer(&mesh.index_buffer, 0, bytemuck::cast_slice(indices));
        }
        Ok(())
    }

    fn release(&self, handle: BufferHandle) {
        if let Some(mesh) = self.state.lock().meshes.remove(&handle) {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
    }

    fn draw_indexed(&self, handle: BufferHandle, call: &DrawCall) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if !state.meshes.contains_key(&handle) {
            return Err(BackendError::UnknownBuffers(handle));
        }
        state.pending.push((handle, call.clone()));
        Ok(())
    }
}

//! In-memory render backend
//!
//! Keeps buffer contents on the CPU and records every call, so buffer
//! lifecycle rules can be checked without a GPU.

use hashbrown::HashMap;
use kiln_geometry::Vertex;
use parking_lot::Mutex;

use super::{BufferHandle, DrawCall, RenderBackend};
use crate::error::BackendError;

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub allocations: usize,
    pub writes: usize,
    pub releases: usize,
    pub draws: usize,
}

/// A draw as seen by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub handle: BufferHandle,
    pub call: DrawCall,
}

#[derive(Debug)]
struct HeadlessBuffer {
    vertex_count: usize,
    index_count: usize,
    dynamic: bool,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: u32,
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    draws: Vec<RecordedDraw>,
    stats: BackendStats,
}

/// Backend that stores buffers in memory and records draws
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Mutex<HeadlessState>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> BackendStats {
        self.state.lock().stats
    }

    /// Number of allocated, unreleased buffer pairs
    pub fn live_buffers(&self) -> usize {
        self.state.lock().buffers.len()
    }

    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.state.lock().buffers.contains_key(&handle)
    }

    /// Last written contents of a buffer pair
    pub fn contents(&self, handle: BufferHandle) -> Option<(Vec<Vertex>, Vec<u32>)> {
        self.state
            .lock()
            .buffers
            .get(&handle)
            .map(|buffer| (buffer.vertices.clone(), buffer.indices.clone()))
    }

    /// Whether a buffer pair was allocated as dynamic
    pub fn is_dynamic(&self, handle: BufferHandle) -> Option<bool> {
        self.state.lock().buffers.get(&handle).map(|buffer| buffer.dynamic)
    }

    /// Draws recorded since the last [`take_draws`](Self::take_draws)
    pub fn draws(&self) -> Vec<RecordedDraw> {
        self.state.lock().draws.clone()
    }

    /// Drain recorded draws (e.g. at the end of a frame)
    pub fn take_draws(&self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.state.lock().draws)
    }
}

impl RenderBackend for HeadlessBackend {
    fn allocate(
        &self,
        vertex_count: usize,
        index_count: usize,
        dynamic: bool,
    ) -> Result<BufferHandle, BackendError> {
        let mut state = self.state.lock();
        let handle = BufferHandle(state.next_handle);
        state.next_handle = state
            .next_handle
            .checked_add(1)
            .ok_or_else(|| BackendError::Device("buffer handles exhausted".into()))?;
        state.buffers.insert(
            handle,
            HeadlessBuffer {
                vertex_count,
                index_count,
                dynamic,
                vertices: vec![Vertex::default(); vertex_count],
                indices: vec![0; index_count],
            },
        );
        state.stats.allocations += 1;
        Ok(handle)
    }

    fn write(
        &self,
        handle: BufferHandle,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        let buffer = state
            .buffers
            .get_mut(&handle)
            .ok_or(BackendError::UnknownBuffers(handle))?;
        if vertices.len() != buffer.vertex_count || indices.len() != buffer.index_count {
            return Err(BackendError::Device(format!(
                "write of {} vertices / {} indices into buffers sized {} / {}",
                vertices.len(),
                indices.len(),
                buffer.vertex_count,
                buffer.index_count
            )));
        }
        buffer.vertices.copy_from_slice(vertices);
        buffer.indices.copy_from_slice(indices);
        state.stats.writes += 1;
        Ok(())
    }

    fn release(&self, handle: BufferHandle) {
        let mut state = self.state.lock();
        if state.buffers.remove(&handle).is_some() {
            state.stats.releases += 1;
        }
    }

    fn draw_indexed(&self, handle: BufferHandle, call: &DrawCall) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if !state.buffers.contains_key(&handle) {
            return Err(BackendError::UnknownBuffers(handle));
        }
        state.draws.push(RecordedDraw {
            handle,
            call: call.clone(),
        });
        state.stats.draws += 1;
        Ok(())
    }
}

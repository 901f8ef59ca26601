//! Merged render object

use std::fmt;
use std::sync::Arc;

use glam::Mat4;
use kiln_geometry::{GeometryBuffer, vertex_ops};
use tracing::debug;

use super::{Object3D, ObjectKind, ObjectState, SharedObject};
use crate::backend::RenderBackend;
use crate::buffers::GpuBuffers;
use crate::error::SceneError;

/// Several loaded objects merged into one world-space mesh
///
/// Display attributes are taken from the first source; callers group
/// sources by [`crate::MaterialKey`] so they agree anyway. The merged
/// object is a finished batch: it is never optimizable itself.
pub struct MorphedObject {
    state: ObjectState,
    sources: Vec<SharedObject>,
    geometry: GeometryBuffer,
    buffers: Option<GpuBuffers>,
}

impl MorphedObject {
    pub fn new(sources: Vec<SharedObject>) -> Result<Self, SceneError> {
        let first = sources.first().ok_or(SceneError::EmptyMerge)?;
        let state = {
            let first = first.read();
            let source = first.state();
            ObjectState {
                blend: source.blend.clone(),
                visible: source.visible,
                visual: source.visual,
                alpha: source.alpha,
                texture: source.texture.clone(),
                opaque: source.opaque,
                optimizable: false,
                ..ObjectState::default()
            }
        };

        Ok(Self {
            state,
            sources,
            geometry: GeometryBuffer::new(),
            buffers: None,
        })
    }

    /// The merged objects, in merge order
    pub fn sources(&self) -> &[SharedObject] {
        &self.sources
    }

    /// Merged world-space geometry (empty until loaded)
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    /// Read every source's uploaded buffers back into one welded buffer
    fn merge_sources(&self) -> Result<GeometryBuffer, SceneError> {
        let mut merged = GeometryBuffer::new();

        for (position, source) in self.sources.iter().enumerate() {
            let source = source.read();
            if !source.is_loaded() {
                return Err(SceneError::SourceNotLoaded { position });
            }
            let buffers = source
                .buffers()
                .ok_or(SceneError::SourceHasNoBuffers { position })?;

            let mut vertices = buffers.vertices().to_vec();
            let world = source.state().world;
            if world != Mat4::IDENTITY {
                vertex_ops::transform_to_world(&mut vertices, world);
            }

            let readback = GeometryBuffer::from_parts(vertices, buffers.indices().to_vec())
                .map_err(|err| SceneError::InvalidSourceGeometry {
                    position,
                    source: err,
                })?;
            merged.add_vertices(&readback.expand());
        }

        Ok(merged)
    }
}

impl fmt::Debug for MorphedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphedObject")
            .field("state", &self.state)
            .field("sources", &self.sources.len())
            .field("geometry", &self.geometry)
            .field("buffers", &self.buffers)
            .finish()
    }
}

impl Object3D for MorphedObject {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Morphed
    }

    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }

    fn load_content(&mut self, backend: &Arc<dyn RenderBackend>) -> Result<(), SceneError> {
        let merged = self.merge_sources()?;
        debug!(
            sources = self.sources.len(),
            vertices = merged.vertex_count(),
            indices = merged.index_count(),
            "merged objects"
        );

        let buffers = self
            .buffers
            .get_or_insert_with(|| GpuBuffers::new(Arc::clone(backend), false));
        buffers.upload(merged.vertices(), merged.indices())?;
        self.geometry = merged;
        self.state.loaded = true;
        Ok(())
    }

    fn buffers(&self) -> Option<&GpuBuffers> {
        self.buffers.as_ref()
    }

    fn dispose(&mut self) {
        if let Some(mut buffers) = self.buffers.take() {
            buffers.release();
        }
        self.geometry.clear();
        self.state.loaded = false;
    }
}

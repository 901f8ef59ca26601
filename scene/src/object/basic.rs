//! Geometry-owning render object

use std::sync::Arc;

use glam::Mat4;
use kiln_geometry::{GeometryBuffer, Vertex};

use super::{Object3D, ObjectKind, ObjectState};
use crate::backend::RenderBackend;
use crate::buffers::GpuBuffers;
use crate::error::SceneError;
use crate::material::{BlendMode, TextureId};

/// Render object backed by its own [`GeometryBuffer`]
///
/// Construct with the geometry, configure with the builder methods,
/// then call [`Object3D::load_content`] to upload.
#[derive(Debug)]
pub struct BasicObject {
    state: ObjectState,
    geometry: GeometryBuffer,
    buffers: Option<GpuBuffers>,
    dynamic_buffers: bool,
}

impl BasicObject {
    pub fn new(geometry: GeometryBuffer) -> Self {
        Self {
            state: ObjectState::default(),
            geometry,
            buffers: None,
            dynamic_buffers: false,
        }
    }

    /// Weld a composer's triangle list into a new object
    pub fn from_triangle_list(vertices: &[Vertex]) -> Self {
        Self::new(GeometryBuffer::from_triangle_list(vertices))
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.state.world = world;
        self
    }

    pub fn with_blend(mut self, blend: Option<BlendMode>) -> Self {
        self.state.blend = blend;
        self
    }

    pub fn with_texture(mut self, texture: impl Into<TextureId>) -> Self {
        self.state.texture = Some(texture.into());
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.state.alpha = alpha;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.state.tag = Some(tag.into());
        self
    }

    pub fn opaque(mut self, opaque: bool) -> Self {
        self.state.opaque = opaque;
        self
    }

    pub fn optimizable(mut self, optimizable: bool) -> Self {
        self.state.optimizable = optimizable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.state.visible = visible;
        self
    }

    pub fn visual(mut self, visual: bool) -> Self {
        self.state.visual = visual;
        self
    }

    /// Allocate dynamic (frequently rewritten) buffers
    pub fn dynamic_buffers(mut self, dynamic: bool) -> Self {
        self.dynamic_buffers = dynamic;
        self
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    /// Mutable geometry; call `load_content` again to re-upload
    pub fn geometry_mut(&mut self) -> &mut GeometryBuffer {
        &mut self.geometry
    }
}

impl Object3D for BasicObject {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Basic
    }

    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }

    fn load_content(&mut self, backend: &Arc<dyn RenderBackend>) -> Result<(), SceneError> {
        if self.state.visual {
            let dynamic = self.dynamic_buffers;
            let buffers = self
                .buffers
                .get_or_insert_with(|| GpuBuffers::new(Arc::clone(backend), dynamic));
            buffers.upload(self.geometry.vertices(), self.geometry.indices())?;
        }
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
        self.state.loaded = false;
    }
}

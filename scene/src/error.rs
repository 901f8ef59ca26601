//! Scene and backend errors

use kiln_geometry::GeometryInvariantError;
use thiserror::Error;

use crate::backend::BufferHandle;

/// Failure reported by a [`crate::RenderBackend`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("unknown buffers {0:?}")]
    UnknownBuffers(BufferHandle),

    #[error("device error: {0}")]
    Device(String),
}

/// Failure while loading, merging or optimizing render objects
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("merge source {position} has not been loaded")]
    SourceNotLoaded { position: usize },

    #[error("merge source {position} has no GPU buffers (not a visual object?)")]
    SourceHasNoBuffers { position: usize },

    #[error("merge source {position} has invalid geometry: {source}")]
    InvalidSourceGeometry {
        position: usize,
        #[source]
        source: GeometryInvariantError,
    },

    #[error("cannot merge an empty group of objects")]
    EmptyMerge,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

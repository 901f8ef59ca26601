//! Procedural geometry for Kiln scenes
//!
//! This crate builds the CPU-side mesh data that `kiln-scene` uploads and batches:
//!
//! - [`vertex`] - The `Vertex` record (position, normal, uv) shared by every mesh
//! - [`vertex_ops`] - In-place transforms over vertex arrays (offset, rotate, scale, world)
//! - [`texture`] - Texture projectors mapping face-local UVs into atlas regions
//! - [`composers`] - Triangle-list generators for rectangles, circles, tubes, cuboids, ...
//! - [`geometry`] - `GeometryBuffer`, a vertex-welding vertex/index container
//! - [`formats`] - The `.kgeo` binary geometry file format

pub mod composers;
pub mod formats;
pub mod geometry;
pub mod texture;
pub mod vertex;
pub mod vertex_ops;

pub use geometry::{GeometryBuffer, GeometryInvariantError};
pub use vertex::{PositionVertex, Vertex};

// Re-export commonly used format items
pub use formats::{
    GeometryFileError, GeometryFileHeader, KGEO_EXT, decode_geometry, encode_geometry,
    load_geometry, read_geometry, save_geometry, write_geometry,
};

// Re-export projector types
pub use texture::{
    CuboidSide, CuboidTexture, Identity, PixelRect, TextureMultiplier, TextureProjector,
    TextureRectangle, TubeTexture,
};

//! On-disk formats

mod geometry_file;

pub use geometry_file::{
    GeometryFileError, GeometryFileHeader, KGEO_EXT, decode_geometry, encode_geometry,
    load_geometry, read_geometry, save_geometry, write_geometry,
};

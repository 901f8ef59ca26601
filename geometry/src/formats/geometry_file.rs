//! Geometry binary format (.kgeo)
//!
//! Indexed triangle list, all values little-endian. POD format - no magic
//! bytes, no version.
//!
//! # Layout
//! ```text
//! 0x00: index_count i32
//! 0x04: vertex_count i32
//! 0x08: indices (index_count * i32)
//! var:  vertices (vertex_count * 8 * f32)
//!       position xyz, normal xyz, uv
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::geometry::GeometryBuffer;
use crate::vertex::Vertex;

/// File extension for geometry files
pub const KGEO_EXT: &str = "kgeo";

const INDEX_SIZE: usize = 4;
const VERTEX_RECORD_SIZE: usize = 8 * 4;

#[derive(Debug, thiserror::Error)]
pub enum GeometryFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("geometry data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("negative {field} in header: {value}")]
    NegativeCount { field: &'static str, value: i32 },

    #[error("{field} {value} does not fit in the header")]
    CountOverflow { field: &'static str, value: usize },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: i32, vertex_count: usize },
}

/// Geometry file header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryFileHeader {
    pub index_count: i32,
    pub vertex_count: i32,
}

impl GeometryFileHeader {
    pub const SIZE: usize = 8;

    pub fn new(index_count: i32, vertex_count: i32) -> Self {
        Self {
            index_count,
            vertex_count,
        }
    }

    /// Header describing `buffer`
    pub fn for_buffer(buffer: &GeometryBuffer) -> Result<Self, GeometryFileError> {
        let count = |field: &'static str, value: usize| {
            i32::try_from(value).map_err(|_| GeometryFileError::CountOverflow { field, value })
        };
        Ok(Self::new(
            count("index_count", buffer.index_count())?,
            count("vertex_count", buffer.vertex_count())?,
        ))
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            index_count: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            vertex_count: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Total file size implied by the counts
    pub fn file_len(&self) -> Result<usize, GeometryFileError> {
        let index_count = non_negative("index_count", self.index_count)?;
        let vertex_count = non_negative("vertex_count", self.vertex_count)?;
        Ok(Self::SIZE + index_count * INDEX_SIZE + vertex_count * VERTEX_RECORD_SIZE)
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<usize, GeometryFileError> {
    usize::try_from(value).map_err(|_| GeometryFileError::NegativeCount { field, value })
}

/// Serialize a buffer to bytes
pub fn encode_geometry(buffer: &GeometryBuffer) -> Result<Vec<u8>, GeometryFileError> {
    let header = GeometryFileHeader::for_buffer(buffer)?;
    let mut bytes = Vec::with_capacity(header.file_len()?);

    bytes.extend_from_slice(&header.to_bytes());
    for &index in buffer.indices() {
        let index = i32::try_from(index).map_err(|_| GeometryFileError::CountOverflow {
            field: "index",
            value: index as usize,
        })?;
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    for vertex in buffer.vertices() {
        for component in vertex.components() {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    Ok(bytes)
}

/// Parse a buffer from bytes
///
/// Bytes past the end of the last vertex are ignored.
pub fn decode_geometry(bytes: &[u8]) -> Result<GeometryBuffer, GeometryFileError> {
    let header = GeometryFileHeader::from_bytes(bytes).ok_or(GeometryFileError::Truncated {
        expected: GeometryFileHeader::SIZE,
        actual: bytes.len(),
    })?;
    let expected = header.file_len()?;
    if bytes.len() < expected {
        return Err(GeometryFileError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let index_count = header.index_count as usize;
    let vertex_count = header.vertex_count as usize;
    let index_end = GeometryFileHeader::SIZE + index_count * INDEX_SIZE;

    let indices = bytes[GeometryFileHeader::SIZE..index_end]
        .chunks_exact(INDEX_SIZE)
        .map(|chunk| {
            let index = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            match usize::try_from(index) {
                Ok(i) if i < vertex_count => Ok(i as u32),
                _ => Err(GeometryFileError::IndexOutOfRange {
                    index,
                    vertex_count,
                }),
            }
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let vertices = bytes[index_end..expected]
        .chunks_exact(VERTEX_RECORD_SIZE)
        .map(|record| {
            let mut components = [0.0f32; 8];
            for (component, raw) in components.iter_mut().zip(record.chunks_exact(4)) {
                *component = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            Vertex::from_components(components)
        });

    let mut buffer = GeometryBuffer::new();
    buffer.add_indexed_vertices(vertices);
    buffer.add_indices(indices);
    Ok(buffer)
}

/// Write a buffer to any writer
pub fn write_geometry<W: Write>(
    writer: &mut W,
    buffer: &GeometryBuffer,
) -> Result<(), GeometryFileError> {
    writer.write_all(&encode_geometry(buffer)?)?;
    Ok(())
}

/// Read a buffer from any reader (reads to the end)
pub fn read_geometry<R: Read>(reader: &mut R) -> Result<GeometryBuffer, GeometryFileError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_geometry(&bytes)
}

/// Save a buffer to a file, replacing it if it exists
pub fn save_geometry(buffer: &GeometryBuffer, path: &Path) -> Result<(), GeometryFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_geometry(&mut writer, buffer)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        vertices = buffer.vertex_count(),
        indices = buffer.index_count(),
        "saved geometry"
    );
    Ok(())
}

/// Load a buffer from a file
pub fn load_geometry(path: &Path) -> Result<GeometryBuffer, GeometryFileError> {
    let mut reader = BufReader::new(File::open(path)?);
    let buffer = read_geometry(&mut reader)?;
    debug!(
        path = %path.display(),
        vertices = buffer.vertex_count(),
        indices = buffer.index_count(),
        "loaded geometry"
    );
    Ok(buffer)
}

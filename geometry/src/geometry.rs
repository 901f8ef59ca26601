//! Indexed triangle-list container with vertex welding

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tracing::trace;

use crate::vertex::Vertex;

/// Bit pattern used as the weld key
///
/// `-0.0` is folded onto `0.0` so the key agrees with `Vertex`'s float
/// equality. Vertices containing NaN never get a key.
type WeldKey = [u32; 8];

fn weld_key(vertex: &Vertex) -> Option<WeldKey> {
    if vertex.has_nan() {
        return None;
    }
    Some(vertex.components().map(|c| if c == 0.0 { 0 } else { c.to_bits() }))
}

/// Invariant violation found by [`GeometryBuffer::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryInvariantError {
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Unique vertices plus a triangle list of indices into them
///
/// [`add_vertices`](Self::add_vertices) welds: a vertex equal to one
/// already stored reuses the first stored copy's index. The other
/// `add_*` methods append verbatim and leave consistency to the caller.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    lookup: HashMap<WeldKey, u32>,
}

impl PartialEq for GeometryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.indices == other.indices
    }
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weld a flat triangle list into a new buffer
    pub fn from_triangle_list(vertices: &[Vertex]) -> Self {
        let mut buffer = Self::new();
        buffer.add_vertices(vertices);
        buffer
    }

    /// Build from pre-indexed data, checking every index
    pub fn from_parts(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Result<Self, GeometryInvariantError> {
        let mut buffer = Self::new();
        buffer.add_indexed_vertices(vertices);
        buffer.add_indices(indices);
        buffer.validate()?;
        Ok(buffer)
    }

    /// Append vertices with welding
    ///
    /// For every incoming vertex an index is appended: the index of the
    /// first stored vertex equal to it, or a fresh index if none is.
    pub fn add_vertices(&mut self, vertices: &[Vertex]) {
        let before = self.vertices.len();
        self.indices.reserve(vertices.len());

        for vertex in vertices {
            let index = match weld_key(vertex) {
                Some(key) => match self.lookup.entry(key) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        let index = self.vertices.len() as u32;
                        self.vertices.push(*vertex);
                        *entry.insert(index)
                    }
                },
                None => {
                    self.vertices.push(*vertex);
                    (self.vertices.len() - 1) as u32
                }
            };
            self.indices.push(index);
        }

        trace!(
            incoming = vertices.len(),
            added = self.vertices.len() - before,
            total = self.vertices.len(),
            "welded vertices"
        );
    }

    /// Append vertices verbatim (no welding, no indices)
    pub fn add_indexed_vertices(&mut self, vertices: impl IntoIterator<Item = Vertex>) {
        for vertex in vertices {
            let index = self.vertices.len() as u32;
            if let Some(key) = weld_key(&vertex) {
                // Later welds resolve to the first equal vertex
                self.lookup.entry(key).or_insert(index);
            }
            self.vertices.push(vertex);
        }
    }

    /// Append raw indices verbatim
    pub fn add_indices(&mut self, indices: impl IntoIterator<Item = u32>) {
        self.indices.extend(indices);
    }

    /// Replace `target`'s contents with a copy of this buffer
    pub fn copy_to(&self, target: &mut GeometryBuffer) {
        target.vertices.clone_from(&self.vertices);
        target.indices.clone_from(&self.indices);
        target.lookup.clone_from(&self.lookup);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.lookup.clear();
    }

    pub fn into_parts(self) -> (Vec<Vertex>, Vec<u32>) {
        (self.vertices, self.indices)
    }

    /// The flat triangle list: `indices.map(|i| vertices[i])`
    ///
    /// Out-of-range indices are skipped; call [`validate`](Self::validate)
    /// first if that matters.
    pub fn expand(&self) -> Vec<Vertex> {
        self.indices
            .iter()
            .filter_map(|&i| self.vertices.get(i as usize).copied())
            .collect()
    }

    /// Check that indices form whole triangles and all point at a vertex
    pub fn validate(&self) -> Result<(), GeometryInvariantError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryInvariantError::PartialTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= vertex_count)
        {
            Some((position, &index)) => Err(GeometryInvariantError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

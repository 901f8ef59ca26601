//! Render object collection with batch optimization
//!
//! Objects live in two buckets, opaque then transparent, each in insertion
//! order. [`RenderBatchCollection::optimize`] merges opaque, optimizable
//! objects that share a [`MaterialKey`] into single [`MorphedObject`]s;
//! [`RenderBatchCollection::restore`] puts the original objects back.
//!
//! Lock order: collection, then object. Object locks are never held while
//! waiting on the collection lock.

use std::cmp::Ordering;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::backend::RenderBackend;
use crate::error::SceneError;
use crate::material::MaterialKey;
use crate::object::{MorphedObject, Object3D, SharedObject, share};

/// Outcome of one [`RenderBatchCollection::optimize`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub objects_before: usize,
    pub objects_after: usize,
    /// Number of merged objects created
    pub merged_groups: usize,
    /// Number of original objects folded into merged objects
    pub merged_objects: usize,
}

/// Bucket sizes at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub opaque: usize,
    pub transparent: usize,
    /// Size of the pre-optimization snapshot while optimized
    pub original: Option<usize>,
}

#[derive(Default)]
struct Buckets {
    opaque: Vec<SharedObject>,
    transparent: Vec<SharedObject>,
    /// Pre-optimization object list; `Some` exactly while optimized
    original: Option<Vec<SharedObject>>,
}

impl Buckets {
    fn push(&mut self, object: SharedObject) {
        let opaque = object.read().state().opaque;
        if opaque {
            self.opaque.push(object);
        } else {
            self.transparent.push(object);
        }
    }

    fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    fn all(&self) -> Vec<SharedObject> {
        self.opaque
            .iter()
            .chain(self.transparent.iter())
            .cloned()
            .collect()
    }

    /// Which bucket a flat index falls in, and the position inside it
    fn split(&self, index: usize) -> Option<(bool, usize)> {
        if index < self.opaque.len() {
            Some((true, index))
        } else if index - self.opaque.len() < self.transparent.len() {
            Some((false, index - self.opaque.len()))
        } else {
            None
        }
    }

    fn slot(&self, index: usize) -> Option<&SharedObject> {
        let (opaque, position) = self.split(index)?;
        let bucket = if opaque { &self.opaque } else { &self.transparent };
        bucket.get(position)
    }

    fn locate(&mut self, index: usize) -> Option<(&mut Vec<SharedObject>, usize)> {
        let (opaque, position) = self.split(index)?;
        let bucket = if opaque {
            &mut self.opaque
        } else {
            &mut self.transparent
        };
        Some((bucket, position))
    }
}

/// Thread-safe, ordered collection of render objects
#[derive(Default)]
pub struct RenderBatchCollection {
    buckets: RwLock<Buckets>,
}

impl RenderBatchCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = SharedObject>) -> Self {
        let collection = Self::new();
        collection.add_range(objects);
        collection
    }

    /// Append to the object's bucket
    ///
    /// While optimized the object is also appended to the snapshot, so
    /// it survives [`restore`](Self::restore).
    pub fn add(&self, object: SharedObject) {
        let mut buckets = self.buckets.write();
        if let Some(original) = buckets.original.as_mut() {
            original.push(object.clone());
        }
        buckets.push(object);
    }

    pub fn add_range(&self, objects: impl IntoIterator<Item = SharedObject>) {
        for object in objects {
            self.add(object);
        }
    }

    /// Object at a flat index (opaque bucket first)
    pub fn get(&self, index: usize) -> Option<SharedObject> {
        self.buckets.read().slot(index).cloned()
    }

    /// Replace the object at a flat index, returning the previous one
    ///
    /// The replacement stays in the bucket of the slot it lands in.
    /// Returns `None` (and changes nothing) if the index is out of range.
    pub fn set(&self, index: usize, object: SharedObject) -> Option<SharedObject> {
        let mut buckets = self.buckets.write();
        let (bucket, position) = buckets.locate(index)?;
        Some(std::mem::replace(&mut bucket[position], object))
    }

    /// Remove an object by identity from the live buckets
    ///
    /// The snapshot is left alone while optimized, so a removed original
    /// object comes back on [`restore`](Self::restore).
    pub fn remove(&self, object: &SharedObject) -> bool {
        let mut guard = self.buckets.write();
        let buckets = &mut *guard;
        for bucket in [&mut buckets.opaque, &mut buckets.transparent] {
            if let Some(position) = bucket.iter().position(|o| Arc::ptr_eq(o, object)) {
                bucket.remove(position);
                return true;
            }
        }
        false
    }

    pub fn remove_at(&self, index: usize) -> Option<SharedObject> {
        let mut buckets = self.buckets.write();
        let (bucket, position) = buckets.locate(index)?;
        Some(bucket.remove(position))
    }

    /// Empty the live buckets (the snapshot, if any, is kept)
    pub fn clear(&self) {
        let mut buckets = self.buckets.write();
        buckets.opaque.clear();
        buckets.transparent.clear();
    }

    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_optimized(&self) -> bool {
        self.buckets.read().original.is_some()
    }

    /// Snapshot of all live objects, opaque bucket first
    pub fn objects(&self) -> Vec<SharedObject> {
        self.buckets.read().all()
    }

    pub fn opaque_objects(&self) -> Vec<SharedObject> {
        self.buckets.read().opaque.clone()
    }

    pub fn transparent_objects(&self) -> Vec<SharedObject> {
        self.buckets.read().transparent.clone()
    }

    /// Pre-optimization objects while optimized, live objects otherwise
    pub fn original_objects(&self) -> Vec<SharedObject> {
        let buckets = self.buckets.read();
        match &buckets.original {
            Some(original) => original.clone(),
            None => buckets.all(),
        }
    }

    /// Run `f` over a snapshot of the live objects
    ///
    /// The collection lock is released before `f` runs, so `f` may call
    /// back into the collection.
    pub fn for_each(&self, mut f: impl FnMut(&SharedObject)) {
        for object in self.objects() {
            f(&object);
        }
    }

    /// Stable sort of the transparent bucket (e.g. back to front)
    pub fn sort_transparent_by(
        &self,
        mut compare: impl FnMut(&SharedObject, &SharedObject) -> Ordering,
    ) {
        self.buckets.write().transparent.sort_by(|a, b| compare(a, b));
    }

    /// Call `update` on every live object
    pub fn update_all(&self) {
        self.for_each(|object| object.write().update());
    }

    /// Draw every live object, opaque bucket first
    ///
    /// Invisible, non-visual and unloaded objects are skipped. Returns the
    /// number of draws issued.
    pub fn draw(&self, backend: &dyn RenderBackend) -> Result<usize, SceneError> {
        let buckets = self.buckets.read();
        let mut draws = 0;
        for object in buckets.opaque.iter().chain(buckets.transparent.iter()) {
            if object.read().draw(backend)? {
                draws += 1;
            }
        }
        Ok(draws)
    }

    pub fn stats(&self) -> CollectionStats {
        let buckets = self.buckets.read();
        CollectionStats {
            opaque: buckets.opaque.len(),
            transparent: buckets.transparent.len(),
            original: buckets.original.as_ref().map(Vec::len),
        }
    }

    /// Merge opaque, optimizable objects that share a material
    ///
    /// The current object list is kept as the restore point before the
    /// buckets are rebuilt. Ineligible objects (transparent, not
    /// optimizable, non-visual, custom blend state) go back first, in
    /// order; then
    /// each material group in first-seen order, as a single object if the
    /// group has one member or as a loaded [`MorphedObject`] otherwise.
    ///
    /// On error the restore point is still in place, so
    /// [`restore`](Self::restore) recovers the original list.
    ///
    /// Calling this while already optimized does nothing.
    pub fn optimize(&self, backend: &Arc<dyn RenderBackend>) -> Result<OptimizeReport, SceneError> {
        let mut buckets = self.buckets.write();

        if buckets.original.is_some() {
            debug!("Collection already optimized, skipping");
            let len = buckets.len();
            return Ok(OptimizeReport {
                objects_before: len,
                objects_after: len,
                ..OptimizeReport::default()
            });
        }

        let snapshot = buckets.all();
        buckets.original = Some(snapshot.clone());
        buckets.opaque.clear();
        buckets.transparent.clear();

        let mut groups: Vec<Vec<SharedObject>> = Vec::new();
        let mut group_index: HashMap<MaterialKey, usize> = HashMap::new();

        for object in &snapshot {
            let key = {
                let guard = object.read();
                let state = guard.state();
                // Non-visual objects have no uploaded buffers to merge from
                if !state.opaque || !state.optimizable || !state.visual {
                    None
                } else {
                    let key = MaterialKey::for_state(state);
                    if key.is_none() {
                        debug!(tag = ?state.tag, "Custom blend state, not merging");
                    }
                    key
                }
            };

            match key {
                None => buckets.push(object.clone()),
                Some(key) => {
                    let index = *group_index.entry(key).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[index].push(object.clone());
                }
            }
        }

        let mut report = OptimizeReport {
            objects_before: snapshot.len(),
            ..OptimizeReport::default()
        };

        for group in groups {
            let members = group.len();
            if members == 1 {
                for object in group {
                    buckets.push(object);
                }
                continue;
            }

            let mut morphed = MorphedObject::new(group)?;
            morphed.load_content(backend)?;
            buckets.push(share(morphed));

            report.merged_groups += 1;
            report.merged_objects += members;
        }

        report.objects_after = buckets.len();
        info!(
            before = report.objects_before,
            after = report.objects_after,
            merged_groups = report.merged_groups,
            merged_objects = report.merged_objects,
            "Optimized render collection"
        );
        Ok(report)
    }

    /// Put back the pre-optimization object list
    ///
    /// Merged objects are dropped (and release their buffers). Returns
    /// `false` if the collection was not optimized.
    pub fn restore(&self) -> bool {
        let mut buckets = self.buckets.write();
        let Some(original) = buckets.original.take() else {
            debug!("Collection not optimized, nothing to restore");
            return false;
        };

        buckets.opaque.clear();
        buckets.transparent.clear();
        let count = original.len();
        for object in original {
            buckets.push(object);
        }
        info!(objects = count, "Restored render collection");
        true
    }
}

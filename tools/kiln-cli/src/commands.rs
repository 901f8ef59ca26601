//! Subcommand implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use kiln_geometry::{GeometryBuffer, KGEO_EXT, load_geometry, save_geometry, vertex_ops};
use kiln_scene::{
    BasicObject, HeadlessBackend, Object3D, ObjectKind, RenderBackend, RenderBatchCollection,
    SharedObject, share,
};

use crate::manifest::{Manifest, ObjectDef, load_manifest};
use crate::shape::build_geometry;

/// Files written by [`compose`]
#[derive(Debug)]
pub struct ComposeReport {
    pub written: Vec<PathBuf>,
}

/// Write one `<name>.kgeo` per manifest shape
pub fn compose(manifest_path: &Path, output: Option<&Path>) -> Result<ComposeReport> {
    let manifest = load_manifest(manifest_path)?;
    let output_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => manifest.output_dir(manifest_base(manifest_path)),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let atlas = manifest.atlas_bounds();
    let mut written = Vec::with_capacity(manifest.shapes.len());
    for shape in &manifest.shapes {
        let geometry = build_geometry(shape, atlas)?;
        let path = output_dir.join(format!("{}.{KGEO_EXT}", shape.name));
        save_geometry(&geometry, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(
            "{} -> {} ({} vertices, {} indices)",
            shape.name,
            path.display(),
            geometry.vertex_count(),
            geometry.index_count()
        );
        written.push(path);
    }

    Ok(ComposeReport { written })
}

fn manifest_base(manifest_path: &Path) -> &Path {
    manifest_path.parent().unwrap_or(Path::new("."))
}

/// Summary of a geometry file
#[derive(Debug, Clone, PartialEq)]
pub struct InspectReport {
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
    /// Position bounds, `None` for an empty buffer
    pub bounds: Option<(Vec3, Vec3)>,
    pub valid: bool,
}

impl InspectReport {
    pub fn print(&self, path: &Path) {
        println!("{}", path.display());
        println!("  vertices:  {}", self.vertices);
        println!("  indices:   {}", self.indices);
        println!("  triangles: {}", self.triangles);
        match self.bounds {
            Some((min, max)) => println!("  bounds:    {min} .. {max}"),
            None => println!("  bounds:    (empty)"),
        }
        println!("  valid:     {}", if self.valid { "yes" } else { "no" });
    }
}

pub fn inspect(path: &Path) -> Result<InspectReport> {
    let geometry =
        load_geometry(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(inspect_geometry(&geometry))
}

fn inspect_geometry(geometry: &GeometryBuffer) -> InspectReport {
    let bounds = geometry.vertices().iter().fold(None, |bounds, vertex| {
        let p = vertex.position;
        Some(match bounds {
            None => (p, p),
            Some((min, max)) => (Vec3::min(min, p), Vec3::max(max, p)),
        })
    });

    InspectReport {
        vertices: geometry.vertex_count(),
        indices: geometry.index_count(),
        triangles: geometry.triangle_count(),
        bounds,
        valid: geometry.validate().is_ok(),
    }
}

/// Outcome of [`batch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub objects: usize,
    pub draws_before: usize,
    pub draws_after: usize,
    pub merged_groups: usize,
    pub written: Vec<PathBuf>,
}

fn world_matrix(object: &ObjectDef) -> Mat4 {
    let rotation = vertex_ops::euler_rotation(Vec3::from_array(object.rotation));
    Mat4::from_translation(Vec3::from_array(object.position)) * Mat4::from_mat3(rotation)
}

fn build_object(
    object: &ObjectDef,
    geometry: &GeometryBuffer,
    backend: &Arc<dyn RenderBackend>,
) -> Result<SharedObject> {
    let mut instance = BasicObject::new(geometry.clone())
        .with_world(world_matrix(object))
        .with_blend(object.blend_mode()?)
        .with_alpha(object.alpha)
        .opaque(object.opaque)
        .optimizable(object.optimizable)
        .visible(object.visible);
    if let Some(texture) = &object.texture {
        instance = instance.with_texture(texture.as_str());
    }
    if let Some(tag) = &object.tag {
        instance = instance.with_tag(tag.clone());
    }
    instance
        .load_content(backend)
        .with_context(|| format!("Failed to upload object of shape {:?}", object.shape))?;
    Ok(share(instance))
}

fn build_scene(manifest: &Manifest, backend: &Arc<dyn RenderBackend>) -> Result<Vec<SharedObject>> {
    let atlas = manifest.atlas_bounds();
    let mut shapes: HashMap<&str, GeometryBuffer> = HashMap::new();
    for object in &manifest.objects {
        if shapes.contains_key(object.shape.as_str()) {
            continue;
        }
        let shape = manifest
            .find_shape(&object.shape)
            .with_context(|| format!("Unknown shape {:?}", object.shape))?;
        shapes.insert(shape.name.as_str(), build_geometry(shape, atlas)?);
    }

    manifest
        .objects
        .iter()
        .map(|object| {
            let geometry = shapes
                .get(object.shape.as_str())
                .with_context(|| format!("Unknown shape {:?}", object.shape))?;
            build_object(object, geometry, backend)
        })
        .collect()
}

/// Optimize the manifest's objects on the headless backend
///
/// Draw counts are taken before and after optimizing. With
/// `write_merged`, each merged batch is saved as `batch_<n>.kgeo`.
/// The collection is restored at the end and must hold exactly the
/// original objects again.
pub fn batch(manifest_path: &Path, output: Option<&Path>, write_merged: bool) -> Result<BatchReport> {
    let manifest = load_manifest(manifest_path)?;
    let headless = Arc::new(HeadlessBackend::new());
    let backend: Arc<dyn RenderBackend> = headless.clone();

    let objects = build_scene(&manifest, &backend)?;
    let collection = RenderBatchCollection::from_objects(objects.iter().cloned());
    let before = collection.objects();

    let draws_before = collection.draw(backend.as_ref())?;
    let report = collection
        .optimize(&backend)
        .context("Failed to optimize scene")?;
    let draws_after = collection.draw(backend.as_ref())?;
    tracing::info!(
        "{} objects: {} draws -> {} draws ({} merged groups)",
        objects.len(),
        draws_before,
        draws_after,
        report.merged_groups
    );

    let mut written = Vec::new();
    if write_merged {
        let output_dir = match output {
            Some(dir) => dir.to_path_buf(),
            None => manifest.output_dir(manifest_base(manifest_path)),
        };
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let merged = collection
            .objects()
            .into_iter()
            .filter(|object| object.read().kind() == ObjectKind::Morphed);
        for (n, object) in merged.enumerate() {
            let object = object.read();
            let Some(buffers) = object.buffers() else {
                continue;
            };
            let geometry =
                GeometryBuffer::from_parts(buffers.vertices().to_vec(), buffers.indices().to_vec())?;
            let path = output_dir.join(format!("batch_{n}.{KGEO_EXT}"));
            save_geometry(&geometry, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("batch {} -> {}", n, path.display());
            written.push(path);
        }
    }

    collection.restore();
    let restored = collection.objects();
    ensure!(
        restored.len() == before.len()
            && restored.iter().zip(&before).all(|(a, b)| Arc::ptr_eq(a, b)),
        "Restored collection does not match the original objects"
    );
    tracing::debug!("Restore verified, {} live buffers", headless.live_buffers());

    Ok(BatchReport {
        objects: objects.len(),
        draws_before,
        draws_after,
        merged_groups: report.merged_groups,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCENE: &str = r#"
        [output]
        dir = "out"

        [atlas]
        width = 64
        height = 64

        [[shape]]
        name = "crate"
        kind = "cuboid"
        size = [1.0, 1.0, 1.0]
        texture = { cuboid = { front = [0, 0, 32, 32], back = [32, 0, 32, 32] } }

        [[shape]]
        name = "floor"
        kind = "rectangle"
        size = [10.0, 10.0]

        [[object]]
        shape = "crate"
        position = [0.0, 0.0, 0.0]
        texture = "atlas.png"

        [[object]]
        shape = "crate"
        position = [2.0, 0.0, 0.0]
        texture = "atlas.png"

        [[object]]
        shape = "crate"
        position = [4.0, 0.0, 0.0]
        rotation = [0.0, 1.5707964, 0.0]
        texture = "atlas.png"

        [[object]]
        shape = "floor"
        opaque = false
        alpha = 0.5
    "#;

    fn write_scene(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("kiln.toml");
        std::fs::write(&path, SCENE).unwrap();
        path
    }

    #[test]
    fn test_compose_writes_every_shape() {
        let dir = TempDir::new().unwrap();
        let manifest = write_scene(&dir);

        let report = compose(&manifest, None).unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.written[0], dir.path().join("out").join("crate.kgeo"));

        let crate_report = inspect(&report.written[0]).unwrap();
        assert_eq!(crate_report.indices, 36);
        assert_eq!(crate_report.vertices, 24);
        assert_eq!(crate_report.triangles, 12);
        assert!(crate_report.valid);
        assert_eq!(
            crate_report.bounds,
            Some((Vec3::splat(-0.5), Vec3::splat(0.5)))
        );
    }

    #[test]
    fn test_compose_output_override() {
        let dir = TempDir::new().unwrap();
        let manifest = write_scene(&dir);
        let target = dir.path().join("elsewhere");

        let report = compose(&manifest, Some(&target)).unwrap();
        assert!(report.written.iter().all(|p| p.starts_with(&target)));
        assert!(target.join("floor.kgeo").exists());
    }

    #[test]
    fn test_inspect_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(inspect(&dir.path().join("missing.kgeo")).is_err());
    }

    #[test]
    fn test_inspect_empty_geometry() {
        let report = inspect_geometry(&GeometryBuffer::new());
        assert_eq!(report.bounds, None);
        assert!(report.valid);
    }

    #[test]
    fn test_batch_merges_crates() {
        let dir = TempDir::new().unwrap();
        let manifest = write_scene(&dir);

        let report = batch(&manifest, None, true).unwrap();
        assert_eq!(report.objects, 4);
        assert_eq!(report.draws_before, 4);
        assert_eq!(report.draws_after, 2);
        assert_eq!(report.merged_groups, 1);
        assert_eq!(report.written.len(), 1);

        let merged = inspect(&report.written[0]).unwrap();
        assert_eq!(merged.indices, 3 * 36);
        assert!(merged.valid);
        let (min, max) = merged.bounds.unwrap();
        assert!((min.x + 0.5).abs() < 1e-5);
        assert!((max.x - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_batch_without_writing() {
        let dir = TempDir::new().unwrap();
        let manifest = write_scene(&dir);

        let report = batch(&manifest, None, false).unwrap();
        assert!(report.written.is_empty());
        assert!(!dir.path().join("out").exists());
    }
}

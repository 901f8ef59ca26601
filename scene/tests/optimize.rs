//! Integration tests for batch optimization
//!
//! Builds collections of uploaded objects against the headless backend and
//! checks grouping, restore identity and buffer lifetimes end to end.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use kiln_geometry::composers;
use kiln_scene::{
    BasicObject, BlendMode, HeadlessBackend, Object3D, ObjectKind, RenderBackend,
    RenderBatchCollection, SceneError, SharedObject, share,
};

fn backend() -> (Arc<HeadlessBackend>, Arc<dyn RenderBackend>) {
    let headless = Arc::new(HeadlessBackend::new());
    let shared: Arc<dyn RenderBackend> = headless.clone();
    (headless, shared)
}

fn cube_at(x: f32) -> BasicObject {
    BasicObject::from_triangle_list(&composers::cube(1.0))
        .with_world(Mat4::from_translation(Vec3::new(x, 0.0, 0.0)))
}

fn loaded(object: BasicObject, backend: &Arc<dyn RenderBackend>) -> SharedObject {
    let mut object = object;
    object.load_content(backend).unwrap();
    share(object)
}

fn same_objects(a: &[SharedObject], b: &[SharedObject]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_shared_material_merges_into_one_object() {
    let (_, backend) = backend();
    let merged: Vec<_> = (0..3)
        .map(|i| loaded(cube_at(i as f32 * 4.0).with_texture("crate.png"), &backend))
        .collect();
    let transparent = loaded(cube_at(20.0).opaque(false), &backend);
    let pinned = loaded(cube_at(24.0).optimizable(false), &backend);
    let custom = loaded(
        cube_at(28.0).with_blend(Some(BlendMode::Custom("multiply".into()))),
        &backend,
    );

    let collection = RenderBatchCollection::from_objects([
        merged[0].clone(),
        transparent.clone(),
        merged[1].clone(),
        pinned.clone(),
        merged[2].clone(),
        custom.clone(),
    ]);

    let report = collection.optimize(&backend).unwrap();
    assert_eq!(report.objects_before, 6);
    assert_eq!(report.objects_after, 4);
    assert_eq!(report.merged_groups, 1);
    assert_eq!(report.merged_objects, 3);
    assert!(collection.is_optimized());

    // Ineligible objects come first, then the merged group
    let objects = collection.objects();
    assert!(Arc::ptr_eq(&objects[0], &pinned));
    assert!(Arc::ptr_eq(&objects[1], &custom));
    assert!(Arc::ptr_eq(&objects[3], &transparent));

    let batch = objects[2].read();
    assert_eq!(batch.kind(), ObjectKind::Morphed);
    assert!(!batch.state().optimizable);
    assert_eq!(batch.state().texture.as_ref().map(|t| t.name()), Some("crate.png"));
    assert_eq!(batch.buffers().unwrap().index_count(), 3 * 36);
}

#[test]
fn test_different_materials_stay_apart() {
    let (_, backend) = backend();
    let objects: Vec<_> = ["a.png", "b.png", "a.png", "b.png", "c.png"]
        .iter()
        .enumerate()
        .map(|(i, texture)| loaded(cube_at(i as f32 * 4.0).with_texture(*texture), &backend))
        .collect();
    let collection = RenderBatchCollection::from_objects(objects.iter().cloned());

    let report = collection.optimize(&backend).unwrap();
    assert_eq!(report.objects_after, 3);
    assert_eq!(report.merged_groups, 2);
    assert_eq!(report.merged_objects, 4);

    // Groups keep first-seen order; the single "c" object is kept as is
    let after = collection.objects();
    let textures: Vec<_> = after
        .iter()
        .map(|o| o.read().state().texture.as_ref().map(|t| t.name().to_owned()))
        .collect();
    assert_eq!(
        textures,
        vec![
            Some("a.png".to_owned()),
            Some("b.png".to_owned()),
            Some("c.png".to_owned())
        ]
    );
    assert!(Arc::ptr_eq(&after[2], &objects[4]));
}

#[test]
fn test_alpha_and_blend_split_groups() {
    let (_, backend) = backend();
    let collection = RenderBatchCollection::from_objects([
        loaded(cube_at(0.0), &backend),
        loaded(cube_at(4.0).with_alpha(0.5), &backend),
        loaded(cube_at(8.0).with_blend(Some(BlendMode::Additive)), &backend),
        loaded(cube_at(12.0), &backend),
    ]);

    let report = collection.optimize(&backend).unwrap();
    assert_eq!(report.objects_after, 3);
    assert_eq!(report.merged_objects, 2);
}

#[test]
fn test_custom_blend_is_never_merged() {
    let (_, backend) = backend();
    let custom = || {
        loaded(
            cube_at(0.0).with_blend(Some(BlendMode::Custom("screen".into()))),
            &backend,
        )
    };
    let collection = RenderBatchCollection::from_objects([custom(), custom()]);

    let report = collection.optimize(&backend).unwrap();
    assert_eq!(report.objects_after, 2);
    assert_eq!(report.merged_groups, 0);
}

#[test]
fn test_logic_only_objects_are_kept_unmerged() {
    let (_, backend) = backend();
    let logic_a = loaded(cube_at(0.0).visual(false), &backend);
    let logic_b = loaded(cube_at(2.0).visual(false), &backend);
    let visible_a = loaded(cube_at(4.0), &backend);
    let visible_b = loaded(cube_at(6.0), &backend);
    let collection = RenderBatchCollection::from_objects([
        logic_a.clone(),
        visible_a.clone(),
        logic_b.clone(),
        visible_b.clone(),
    ]);
    let before = collection.objects();

    let report = collection.optimize(&backend).unwrap();
    assert_eq!(report.objects_after, 3);
    assert_eq!(report.merged_groups, 1);
    assert_eq!(report.merged_objects, 2);

    let objects = collection.objects();
    assert!(Arc::ptr_eq(&objects[0], &logic_a));
    assert!(Arc::ptr_eq(&objects[1], &logic_b));
    assert_eq!(objects[2].read().kind(), ObjectKind::Morphed);

    assert!(collection.restore());
    assert!(same_objects(&collection.objects(), &before));
}

#[test]
fn test_optimize_twice_is_noop() {
    let (headless, backend) = backend();
    let collection = RenderBatchCollection::from_objects([
        loaded(cube_at(0.0), &backend),
        loaded(cube_at(4.0), &backend),
    ]);

    collection.optimize(&backend).unwrap();
    let allocations = headless.stats().allocations;
    let report = collection.optimize(&backend).unwrap();

    assert_eq!(report.objects_before, 1);
    assert_eq!(report.objects_after, 1);
    assert_eq!(report.merged_groups, 0);
    assert_eq!(headless.stats().allocations, allocations);
}

// ============================================================================
// Restore
// ============================================================================

#[test]
fn test_restore_returns_identical_objects_in_order() {
    let (_, backend) = backend();
    let collection = RenderBatchCollection::from_objects([
        loaded(cube_at(0.0), &backend),
        loaded(cube_at(4.0).opaque(false), &backend),
        loaded(cube_at(8.0), &backend),
        loaded(cube_at(12.0).optimizable(false), &backend),
    ]);
    let before = collection.objects();

    collection.optimize(&backend).unwrap();
    assert!(same_objects(&collection.original_objects(), &before));
    assert!(collection.restore());

    assert!(!collection.is_optimized());
    assert!(same_objects(&collection.objects(), &before));
    assert!(!collection.restore());
}

#[test]
fn test_restore_releases_merged_buffers() {
    let (headless, backend) = backend();
    let collection = RenderBatchCollection::from_objects([
        loaded(cube_at(0.0), &backend),
        loaded(cube_at(4.0), &backend),
    ]);
    assert_eq!(headless.live_buffers(), 2);

    collection.optimize(&backend).unwrap();
    assert_eq!(headless.live_buffers(), 3);

    collection.restore();
    assert_eq!(headless.live_buffers(), 2);
}

#[test]
fn test_add_while_optimized_survives_restore() {
    let (_, backend) = backend();
    let collection = RenderBatchCollection::from_objects([
        loaded(cube_at(0.0), &backend),
        loaded(cube_at(4.0), &backend),
    ]);
    collection.optimize(&backend).unwrap();

    let late = loaded(cube_at(8.0), &backend);
    collection.add(late.clone());
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.original_objects().len(), 3);

    collection.restore();
    let objects = collection.objects();
    assert_eq!(objects.len(), 3);
    assert!(Arc::ptr_eq(&objects[2], &late));
}

#[test]
fn test_remove_while_optimized_comes_back_on_restore() {
    let (_, backend) = backend();
    let pinned = loaded(cube_at(0.0).optimizable(false), &backend);
    let collection = RenderBatchCollection::from_objects([
        pinned.clone(),
        loaded(cube_at(4.0), &backend),
    ]);
    collection.optimize(&backend).unwrap();

    assert!(collection.remove(&pinned));
    assert_eq!(collection.len(), 1);

    collection.restore();
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_failed_optimize_can_be_restored() {
    let (_, backend) = backend();
    let unloaded_a = share(cube_at(0.0));
    let unloaded_b = share(cube_at(4.0));
    let collection =
        RenderBatchCollection::from_objects([unloaded_a.clone(), unloaded_b.clone()]);

    let err = collection.optimize(&backend).unwrap_err();
    assert!(matches!(err, SceneError::SourceNotLoaded { position: 0 }));
    assert!(collection.is_optimized());

    assert!(collection.restore());
    let objects = collection.objects();
    assert!(Arc::ptr_eq(&objects[0], &unloaded_a));
    assert!(Arc::ptr_eq(&objects[1], &unloaded_b));
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_optimize_reduces_draw_calls() {
    let (headless, backend) = backend();
    let collection = RenderBatchCollection::from_objects(
        (0..5).map(|i| loaded(cube_at(i as f32 * 4.0).with_texture("crate.png"), &backend)),
    );
    collection.add(loaded(cube_at(40.0).opaque(false), &backend));
    collection.add(loaded(cube_at(44.0).visible(false), &backend));

    assert_eq!(collection.draw(backend.as_ref()).unwrap(), 6);

    collection.optimize(&backend).unwrap();
    headless.take_draws();
    assert_eq!(collection.draw(backend.as_ref()).unwrap(), 2);

    let draws = headless.take_draws();
    assert_eq!(draws[0].call.index_count, 5 * 36);
    assert_eq!(draws[0].call.world, Mat4::IDENTITY);

    collection.restore();
    assert_eq!(collection.draw(backend.as_ref()).unwrap(), 6);
}

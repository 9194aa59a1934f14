//! Item registry tests
//!
//! Filesystem behavior of ingestion and reset: preview derivation, queue
//! ordering, and all-or-nothing clearing.

use beansort_common::types::{Classification, ClassificationFailed, RoastClass, SortStatus};
use beansort_machine::registry::ItemRegistry;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

fn make_registry(dir: &TempDir) -> ItemRegistry {
    ItemRegistry::new(dir.path().join("previews")).unwrap()
}

fn make_image(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"not really a jpeg").unwrap();
    path
}

#[test]
fn test_ingest_creates_queued_item_with_preview() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);
    let image = make_image(&dir, "beans.jpg");

    let id = registry.ingest(&image).unwrap();
    let snapshot = registry.snapshot_item(id).unwrap();

    assert_eq!(snapshot.status, SortStatus::Queued);
    assert_eq!(snapshot.file_name, "beans.jpg");
    assert!(snapshot.label.is_none());
    assert!(!snapshot.is_error);

    // Preview is a real file named after the item id, keeping the extension
    assert!(snapshot.preview_path.exists());
    assert_eq!(
        snapshot.preview_path.file_name().unwrap().to_str().unwrap(),
        format!("{}.jpg", id)
    );
}

#[test]
fn test_ingest_rejects_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);

    let err = registry.ingest(&dir.path().join("nope.jpg")).unwrap_err();
    assert!(matches!(err, beansort_common::Error::InvalidInput(_)));
    assert!(registry.is_empty());
}

#[test]
fn test_ingest_rejects_directory() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);

    let err = registry.ingest(dir.path()).unwrap_err();
    assert!(matches!(err, beansort_common::Error::InvalidInput(_)));
}

#[test]
fn test_queued_ids_preserve_ingestion_order() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);

    let ids: Vec<Uuid> = (0..4)
        .map(|i| {
            let image = make_image(&dir, &format!("bean-{}.png", i));
            registry.ingest(&image).unwrap()
        })
        .collect();

    assert_eq!(registry.queued_ids(), ids);

    // A non-queued item drops out of the queue view but not the registry
    registry.set_status(ids[1], SortStatus::Scanning);
    let queued = registry.queued_ids();
    assert_eq!(queued, vec![ids[0], ids[2], ids[3]]);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_attach_outcome_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);
    let a = registry.ingest(&make_image(&dir, "a.jpg")).unwrap();
    let b = registry.ingest(&make_image(&dir, "b.jpg")).unwrap();

    assert!(registry.attach_outcome(
        a,
        &Ok(Classification {
            label: RoastClass::Green,
            confidence: 0.88,
        })
    ));
    assert!(registry.attach_outcome(b, &Err(ClassificationFailed)));

    let snap_a = registry.snapshot_item(a).unwrap();
    assert_eq!(snap_a.label, Some(RoastClass::Green));
    assert_eq!(snap_a.confidence, Some(0.88));
    assert!(!snap_a.is_error);

    let snap_b = registry.snapshot_item(b).unwrap();
    assert!(snap_b.label.is_none());
    assert!(snap_b.confidence.is_none());
    assert!(snap_b.is_error);
}

#[test]
fn test_mutation_on_unknown_id_is_noop() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);

    let ghost = Uuid::new_v4();
    assert!(!registry.set_status(ghost, SortStatus::Scanning));
    assert!(!registry.attach_outcome(ghost, &Err(ClassificationFailed)));
    assert!(registry.snapshot_item(ghost).is_none());
}

#[test]
fn test_clear_and_release_removes_previews() {
    let dir = TempDir::new().unwrap();
    let mut registry = make_registry(&dir);

    let previews: Vec<PathBuf> = (0..3)
        .map(|i| {
            let image = make_image(&dir, &format!("bean-{}.jpg", i));
            let id = registry.ingest(&image).unwrap();
            registry.snapshot_item(id).unwrap().preview_path
        })
        .collect();

    for preview in &previews {
        assert!(preview.exists());
    }

    registry.clear_and_release();

    assert!(registry.is_empty());
    for preview in &previews {
        assert!(!preview.exists(), "preview not released: {}", preview.display());
    }

    // Sources are untouched by a reset
    assert!(dir.path().join("bean-0.jpg").exists());
}

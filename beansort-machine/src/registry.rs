//! Item registry - identity and lifecycle storage
//!
//! The registry is the only shared mutable collection in the machine. It
//! owns every item from ingestion to reset: items are created only by
//! ingestion, mutated only through the status/outcome helpers the sorting
//! engine calls, and destroyed only all-at-once by [`ItemRegistry::
//! clear_and_release`]. There is no per-item removal.

use beansort_common::types::{ClassifyOutcome, ItemSnapshot, RoastClass, SortStatus};
use beansort_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Exclusive handle to an item's renderable preview
///
/// Created at ingestion by copying the source into the preview directory.
/// The underlying file is removed only by an explicit [`release`]; there is
/// deliberately no Drop-based cleanup, so a dropped handle without a release
/// leaks the file rather than invalidating a path a renderer may still hold.
///
/// [`release`]: PreviewHandle::release
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    path: PathBuf,
}

impl PreviewHandle {
    fn create(source: &Path, preview_dir: &Path, id: Uuid) -> Result<Self> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("img");
        let path = preview_dir.join(format!("{}.{}", id, ext));
        std::fs::copy(source, &path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the preview file
    ///
    /// Failures are logged and swallowed so a single stubborn file cannot
    /// abort a registry reset.
    fn release(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("failed to release preview {}: {}", self.path.display(), e);
        }
    }
}

/// One unit of work flowing through the machine
#[derive(Debug, Clone)]
pub struct Item {
    pub id: Uuid,
    /// Original uploaded image, never reassigned
    pub source_path: PathBuf,
    pub preview: PreviewHandle,
    pub status: SortStatus,
    /// Set only on successful classification
    pub label: Option<RoastClass>,
    /// Set iff `label` is set
    pub confidence: Option<f64>,
    /// True iff classification failed; mutually exclusive with `label`
    pub is_error: bool,
}

impl Item {
    fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            file_name: self
                .source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            preview_path: self.preview.path().to_path_buf(),
            status: self.status,
            label: self.label,
            confidence: self.confidence,
            is_error: self.is_error,
        }
    }
}

/// The mutable collection of items, in ingestion order
#[derive(Debug)]
pub struct ItemRegistry {
    preview_dir: PathBuf,
    items: Vec<Item>,
}

impl ItemRegistry {
    /// Create a registry writing previews under `preview_dir`
    pub fn new(preview_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&preview_dir)?;
        Ok(Self {
            preview_dir,
            items: Vec::new(),
        })
    }

    /// Ingest one image file as a new `Queued` item
    ///
    /// Validates the source exists and is a file, derives the preview, and
    /// assigns a fresh id. Returns the new item's id.
    pub fn ingest(&mut self, source: &Path) -> Result<Uuid> {
        if !source.exists() {
            return Err(Error::InvalidInput(format!(
                "File does not exist: {}",
                source.display()
            )));
        }

        if !source.is_file() {
            return Err(Error::InvalidInput(format!(
                "Path is not a file: {}",
                source.display()
            )));
        }

        let id = Uuid::new_v4();
        let preview = PreviewHandle::create(source, &self.preview_dir, id)?;

        debug!("ingested {} as item {}", source.display(), id);

        self.items.push(Item {
            id,
            source_path: source.to_path_buf(),
            preview,
            status: SortStatus::Queued,
            label: None,
            confidence: None,
            is_error: false,
        });

        Ok(id)
    }

    /// Ids of all `Queued` items, in ingestion order
    pub fn queued_ids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|i| i.status == SortStatus::Queued)
            .map(|i| i.id)
            .collect()
    }

    /// Snapshot of every item for the read surface
    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.items.iter().map(Item::snapshot).collect()
    }

    /// Snapshot of one item, if it still exists
    pub fn snapshot_item(&self, id: Uuid) -> Option<ItemSnapshot> {
        self.items.iter().find(|i| i.id == id).map(Item::snapshot)
    }

    /// Move an item to a new status
    ///
    /// Returns false when the item no longer exists (a reset cleared the
    /// registry under a run in flight).
    pub fn set_status(&mut self, id: Uuid, status: SortStatus) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Attach a classification outcome without changing status
    pub fn attach_outcome(&mut self, id: Uuid, outcome: &ClassifyOutcome) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                match outcome {
                    Ok(c) => {
                        item.label = Some(c.label);
                        item.confidence = Some(c.confidence);
                        item.is_error = false;
                    }
                    Err(_) => {
                        item.label = None;
                        item.confidence = None;
                        item.is_error = true;
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Release every preview and drop all items
    pub fn clear_and_release(&mut self) {
        for item in &self.items {
            item.preview.release();
        }
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

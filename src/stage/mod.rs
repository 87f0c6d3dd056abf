//! Resumable pipeline stages.
//!
//! A stage is complete for an item once its output artifact exists. Re-running
//! a stage skips completed items, so an interrupted run resumes where it
//! stopped and never pays twice for the same external call.

mod images;
mod plan;
mod transcribe;

pub use images::{ImageStage, ImageStageReport};
pub use plan::PlanStage;
pub use transcribe::TranscribeStage;

use std::path::{Path, PathBuf};

use crate::config::page_image_name;
use crate::plan::BookPlan;
use crate::store::ArtifactStore;

/// Reference to a persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Store-relative path
    pub path: PathBuf,
}

/// Completion state of one stage item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageMarker {
    /// Output not produced yet
    Pending,
    /// Output exists at the referenced path
    Completed(ArtifactRef),
}

impl StageMarker {
    /// Inspect `path` in `store`.
    pub fn probe(store: &dyn ArtifactStore, path: &Path) -> Self {
        if store.exists(path) {
            StageMarker::Completed(ArtifactRef {
                path: path.to_path_buf(),
            })
        } else {
            StageMarker::Pending
        }
    }

    /// Whether the item is done.
    pub fn is_completed(&self) -> bool {
        matches!(self, StageMarker::Completed(_))
    }
}

/// Completion state of every page image of `plan` under `pages_dir`.
pub fn image_markers(
    store: &dyn ArtifactStore,
    pages_dir: &Path,
    plan: &BookPlan,
) -> Vec<(u32, StageMarker)> {
    plan.pages
        .iter()
        .map(|page| {
            let path = pages_dir.join(page_image_name(page.number));
            (page.number, StageMarker::probe(store, &path))
        })
        .collect()
}

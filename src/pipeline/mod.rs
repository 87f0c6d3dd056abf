//! End-to-end book production.
//!
//! The pipeline runs its stages strictly in order and stops at the first
//! failure, reporting which stage failed. Nothing is rolled back: artifacts
//! from completed stages stay in place, and the next run reuses them through
//! each stage's completion markers.
//!
//! ```text
//! Planning -> Imaging -> Composing -> Publishing -> CatalogBuilding -> [VersionPublishing]
//! ```

mod git;

pub use git::{GitPublisher, VersionPublisher};

use std::fmt;
use std::path::PathBuf;

use chrono::Local;

use crate::catalog;
use crate::compose::DocumentAssembler;
use crate::config::ProjectLayout;
use crate::error::{Error, Result};
use crate::plan::BookPlan;
use crate::publish::{PublishedBook, Publisher};
use crate::services::{ImageGenerator, PlanGenerator, PlanPrompt};
use crate::stage::{ImageStage, ImageStageReport, PlanStage};
use crate::store::ArtifactStore;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Transcript to book plan
    Planning,
    /// Plan to page images
    Imaging,
    /// Plan and images to PDF
    Composing,
    /// Copy into the publish root
    Publishing,
    /// Rebuild the shelf page
    CatalogBuilding,
    /// Commit and push the site
    VersionPublishing,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Planning,
        Stage::Imaging,
        Stage::Composing,
        Stage::Publishing,
        Stage::CatalogBuilding,
        Stage::VersionPublishing,
    ];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Planning => "planning",
            Stage::Imaging => "imaging",
            Stage::Composing => "composing",
            Stage::Publishing => "publishing",
            Stage::CatalogBuilding => "catalog",
            Stage::VersionPublishing => "version control",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a pipeline run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Executing a stage
    Running(Stage),
    /// Every stage completed
    Success,
    /// Stopped at a stage
    Failed(Stage),
}

impl PipelineState {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Success | PipelineState::Failed(_))
    }
}

/// Pipeline behavior switches.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Prompt parameters for plan generation
    pub prompt: PlanPrompt,
    /// Requested image size
    pub image_size: Option<String>,
    /// Keep an existing plan instead of generating a new one
    pub reuse_plan: bool,
    /// Commit message; defaults to `Add new book <timestamp>`
    pub commit_message: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            prompt: PlanPrompt::default(),
            image_size: None,
            reuse_plan: false,
            commit_message: None,
        }
    }
}

impl PipelineOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plan prompt parameters.
    pub fn with_prompt(mut self, prompt: PlanPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Set the image size.
    pub fn with_image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = Some(size.into());
        self
    }

    /// Reuse a valid existing plan.
    pub fn with_reuse_plan(mut self, reuse: bool) -> Self {
        self.reuse_plan = reuse;
        self
    }

    /// Set the commit message. Blank messages fall back to the default.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.commit_message = (!message.trim().is_empty()).then(|| message.trim().to_string());
        self
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The plan the book was built from
    pub plan: BookPlan,
    /// Image stage outcome
    pub images: ImageStageReport,
    /// Size of the PDF in pages
    pub document_pages: usize,
    /// The published book
    pub book: PublishedBook,
    /// Number of books on the shelf after the run
    pub shelf_size: usize,
    /// Whether the site was committed
    pub versioned: bool,
}

type StageObserver<'a> = Box<dyn FnMut(Stage) + 'a>;

/// Runs every stage from planning to the published shelf.
pub struct Pipeline<'a> {
    store: &'a dyn ArtifactStore,
    layout: ProjectLayout,
    planner: &'a dyn PlanGenerator,
    illustrator: &'a dyn ImageGenerator,
    assembler: DocumentAssembler,
    version_publisher: Option<&'a dyn VersionPublisher>,
    options: PipelineOptions,
    observer: Option<StageObserver<'a>>,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over `store` with the default layout.
    pub fn new(
        store: &'a dyn ArtifactStore,
        planner: &'a dyn PlanGenerator,
        illustrator: &'a dyn ImageGenerator,
    ) -> Self {
        Self {
            store,
            layout: ProjectLayout::default(),
            planner,
            illustrator,
            assembler: DocumentAssembler::new(),
            version_publisher: None,
            options: PipelineOptions::default(),
            observer: None,
            state: PipelineState::Idle,
        }
    }

    /// Set the project layout.
    pub fn with_layout(mut self, layout: ProjectLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the document assembler.
    pub fn with_assembler(mut self, assembler: DocumentAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Commit the site after cataloging.
    pub fn with_version_publisher(mut self, publisher: &'a dyn VersionPublisher) -> Self {
        self.version_publisher = Some(publisher);
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Call `observer` as each stage starts.
    pub fn on_stage(mut self, observer: impl FnMut(Stage) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StageFailed`] naming the first stage that failed.
    pub fn run(&mut self) -> Result<PipelineReport> {
        let plan = self.stage(Stage::Planning, |p| p.plan())?;
        let images = self.stage(Stage::Imaging, |p| {
            let mut stage = ImageStage::new(p.illustrator, p.store, &p.layout.pages_dir);
            if let Some(size) = &p.options.image_size {
                stage = stage.with_size(size.clone());
            }
            stage.run(&plan)
        })?;
        let document_pages = self.stage(Stage::Composing, |p| {
            p.assembler.write_document(&plan, p.store, &p.layout)
        })?;
        let book = self.stage(Stage::Publishing, |p| {
            Publisher::new(p.store, &p.layout).publish()
        })?;
        let shelf = self.stage(Stage::CatalogBuilding, |p| catalog::build(p.store, &p.layout))?;

        let versioned = match self.version_publisher {
            Some(publisher) => {
                self.stage(Stage::VersionPublishing, |p| {
                    let paths: Vec<PathBuf> =
                        vec![p.layout.index.clone(), p.layout.books_dir.clone()];
                    publisher.publish(&paths, &p.commit_message())
                })?;
                true
            }
            None => false,
        };

        self.state = PipelineState::Success;
        log::info!("Pipeline complete: {} ({})", plan.display_title(), book.id);
        Ok(PipelineReport {
            plan,
            images,
            document_pages,
            book,
            shelf_size: shelf.len(),
            versioned,
        })
    }

    fn plan(&self) -> Result<BookPlan> {
        let stage =
            PlanStage::new(self.planner, self.store, &self.layout).with_prompt(self.options.prompt.clone());
        if self.options.reuse_plan && stage.marker().is_completed() {
            log::info!("Reusing plan {}", self.layout.plan.display());
            return stage.load();
        }
        stage.run()
    }

    fn commit_message(&self) -> String {
        self.options.commit_message.clone().unwrap_or_else(|| {
            format!("Add new book {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
        })
    }

    fn stage<T>(&mut self, stage: Stage, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.state = PipelineState::Running(stage);
        if let Some(observer) = self.observer.as_mut() {
            observer(stage);
        }
        log::info!("Stage {} started", stage);

        f(self).map_err(|e| {
            self.state = PipelineState::Failed(stage);
            log::error!("Stage {} failed: {}", stage, e);
            Error::StageFailed {
                stage,
                source: Box::new(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Imaging.to_string(), "imaging");
        assert_eq!(Stage::ALL.len(), 6);
        assert_eq!(Stage::ALL[0], Stage::Planning);
    }

    #[test]
    fn test_commit_message_option() {
        assert_eq!(
            PipelineOptions::new().with_commit_message("  ").commit_message,
            None
        );
        assert_eq!(
            PipelineOptions::new()
                .with_commit_message(" Add 海 ")
                .commit_message
                .as_deref(),
            Some("Add 海")
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PipelineState::Idle.is_terminal());
        assert!(!PipelineState::Running(Stage::Composing).is_terminal());
        assert!(PipelineState::Success.is_terminal());
        assert!(PipelineState::Failed(Stage::Planning).is_terminal());
    }
}

//! # storyshelf
//!
//! Turn a recorded conversation into an illustrated picture book and publish
//! it to a static bookshelf site.
//!
//! The pipeline plans a book from a transcript, generates one illustration
//! per page, lays every page out into a two-column PDF, and publishes the
//! result next to a web reader. Every stage reads and writes plain files, so
//! an interrupted run resumes where it stopped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use storyshelf::StoryShelf;
//!
//! fn main() -> storyshelf::Result<()> {
//!     let shelf = StoryShelf::open(".");
//!
//!     // Compose work/book_plan.json and output/pages/*.png into output/book.pdf
//!     shelf.make_pdf()?;
//!
//!     // Copy the book into docs/books/<id>/ and rebuild docs/index.html
//!     let book = shelf.publish()?;
//!     shelf.build_shelf()?;
//!     println!("published {}", book.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Validated plans**: page sequence and counts are checked before any stage runs
//! - **Deterministic layout**: character-level wrapping for Japanese text, vertical centering
//! - **Resumable stages**: existing page images are never regenerated
//! - **Static publishing**: reader, details page, and shelf index with no server
//! - **OpenAI collaborators** (feature `openai`): transcription, planning, image generation

pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod plan;
pub mod publish;
pub mod services;
pub mod stage;
pub mod store;

// Re-export commonly used types
pub use catalog::CatalogEntry;
pub use compose::{DocumentAssembler, PageGeometry};
pub use config::ProjectLayout;
pub use error::{Error, Result, ValidationError};
pub use layout::{wrap_text, CidFontMetrics, FontMetrics, LayoutBlock, TextBox};
pub use pipeline::{
    GitPublisher, Pipeline, PipelineOptions, PipelineReport, PipelineState, Stage,
    VersionPublisher,
};
pub use plan::{BookPlan, Character, Page};
pub use publish::{BookId, PublishedBook, Publisher};
pub use services::{ImageGenerator, ImageRequest, PlanGenerator, PlanPrompt, Transcriber};
pub use stage::{ImageStage, ImageStageReport, PlanStage, StageMarker, TranscribeStage};
pub use store::{ArtifactStore, FsStore, MemoryStore};

#[cfg(feature = "openai")]
pub use services::{OpenAiClient, OpenAiConfig};

use std::path::Path;

/// Load and validate a book plan file.
///
/// # Example
///
/// ```no_run
/// use storyshelf::load_plan;
///
/// let plan = load_plan("work/book_plan.json").unwrap();
/// println!("{} pages", plan.page_count());
/// ```
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<BookPlan> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingArtifact(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    BookPlan::from_json(&raw)
}

/// Compose the book PDF of the project at `root`.
///
/// Returns the number of pages written.
pub fn make_pdf<P: AsRef<Path>>(root: P) -> Result<usize> {
    StoryShelf::open(root).make_pdf()
}

/// Rebuild the shelf page of the project at `root`.
pub fn build_shelf<P: AsRef<Path>>(root: P) -> Result<Vec<CatalogEntry>> {
    StoryShelf::open(root).build_shelf()
}

/// A book project rooted at a directory.
///
/// # Example
///
/// ```no_run
/// use storyshelf::{PageGeometry, StoryShelf};
///
/// let shelf = StoryShelf::open("my-project")
///     .with_geometry(PageGeometry::default().with_font(30.0, 42.0));
/// let plan = shelf.load_plan()?;
/// for (page, marker) in shelf.image_markers(&plan) {
///     println!("{}: {}", page, if marker.is_completed() { "done" } else { "pending" });
/// }
/// # Ok::<(), storyshelf::Error>(())
/// ```
pub struct StoryShelf {
    store: FsStore,
    layout: ProjectLayout,
    geometry: PageGeometry,
}

impl StoryShelf {
    /// Open the project at `root` with the default layout.
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        Self {
            store: FsStore::new(root.as_ref()),
            layout: ProjectLayout::default(),
            geometry: PageGeometry::default(),
        }
    }

    /// Set the project layout.
    pub fn with_layout(mut self, layout: ProjectLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the page geometry used for the PDF.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// The artifact store.
    pub fn store(&self) -> &FsStore {
        &self.store
    }

    /// The project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Load and validate the current plan.
    pub fn load_plan(&self) -> Result<BookPlan> {
        BookPlan::from_json(&self.store.read_to_string(&self.layout.plan)?)
    }

    /// Completion state of each page image.
    pub fn image_markers(&self, plan: &BookPlan) -> Vec<(u32, StageMarker)> {
        stage::image_markers(&self.store, &self.layout.pages_dir, plan)
    }

    /// Transcribe the audio input.
    pub fn transcribe(&self, transcriber: &dyn Transcriber) -> Result<String> {
        TranscribeStage::new(transcriber, &self.store, &self.layout).run()
    }

    /// Generate and save a new plan.
    pub fn plan(&self, generator: &dyn PlanGenerator, prompt: PlanPrompt) -> Result<BookPlan> {
        PlanStage::new(generator, &self.store, &self.layout)
            .with_prompt(prompt)
            .run()
    }

    /// Generate missing page images.
    pub fn images(
        &self,
        generator: &dyn ImageGenerator,
        size: Option<&str>,
    ) -> Result<ImageStageReport> {
        let plan = self.load_plan()?;
        let mut stage = ImageStage::new(generator, &self.store, &self.layout.pages_dir);
        if let Some(size) = size {
            stage = stage.with_size(size);
        }
        stage.run(&plan)
    }

    /// Compose the PDF. Returns the number of pages.
    pub fn make_pdf(&self) -> Result<usize> {
        let plan = self.load_plan()?;
        self.assembler()
            .write_document(&plan, &self.store, &self.layout)
    }

    /// Publish the current book.
    pub fn publish(&self) -> Result<PublishedBook> {
        Publisher::new(&self.store, &self.layout).publish()
    }

    /// Rebuild the shelf page.
    pub fn build_shelf(&self) -> Result<Vec<CatalogEntry>> {
        catalog::build(&self.store, &self.layout)
    }

    /// A pipeline over this project.
    pub fn pipeline<'a>(
        &'a self,
        planner: &'a dyn PlanGenerator,
        illustrator: &'a dyn ImageGenerator,
    ) -> Pipeline<'a> {
        Pipeline::new(&self.store, planner, illustrator)
            .with_layout(self.layout.clone())
            .with_assembler(self.assembler())
    }

    fn assembler(&self) -> DocumentAssembler {
        DocumentAssembler::new().with_geometry(self.geometry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_plan_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plan(dir.path().join("book_plan.json")).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(_)));
    }

    #[test]
    fn test_load_plan_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book_plan.json");
        std::fs::write(&path, r#"{"title":"x","pages":[{"page":2}]}"#).unwrap();
        assert!(matches!(
            load_plan(&path),
            Err(Error::Validation(ValidationError::PageSequence {
                expected: 1,
                found: 2
            }))
        ));
    }

    #[test]
    fn test_open_uses_default_layout() {
        let shelf = StoryShelf::open("/tmp/project");
        assert_eq!(shelf.layout(), &ProjectLayout::default());
        assert_eq!(shelf.store().root(), Path::new("/tmp/project"));
    }

    #[test]
    fn test_empty_project_shelf() {
        let dir = tempfile::tempdir().unwrap();
        let entries = build_shelf(dir.path()).unwrap();
        assert!(entries.is_empty());
        assert!(dir.path().join("docs/index.html").exists());
    }
}

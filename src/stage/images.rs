//! Page illustration generation.

use std::path::{Path, PathBuf};

use crate::config::page_image_name;
use crate::error::{Result, ValidationError};
use crate::plan::{BookPlan, Page};
use crate::services::{ImageGenerator, ImageRequest};
use crate::store::ArtifactStore;

use super::StageMarker;

/// Outcome of an image stage run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStageReport {
    /// Pages whose image was generated in this run
    pub generated: Vec<u32>,
    /// Pages whose image already existed
    pub skipped: Vec<u32>,
}

impl ImageStageReport {
    /// Total number of pages visited.
    pub fn total(&self) -> usize {
        self.generated.len() + self.skipped.len()
    }
}

/// Generates one illustration per plan page, skipping pages already done.
pub struct ImageStage<'a> {
    generator: &'a dyn ImageGenerator,
    store: &'a dyn ArtifactStore,
    pages_dir: PathBuf,
    size: Option<String>,
}

impl<'a> ImageStage<'a> {
    /// Create a stage writing `NN.png` files into `pages_dir`.
    pub fn new(
        generator: &'a dyn ImageGenerator,
        store: &'a dyn ArtifactStore,
        pages_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            generator,
            store,
            pages_dir: pages_dir.as_ref().to_path_buf(),
            size: None,
        }
    }

    /// Request a specific image size.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Completion state of a page.
    pub fn marker(&self, page: u32) -> StageMarker {
        StageMarker::probe(self.store, &self.pages_dir.join(page_image_name(page)))
    }

    /// Completion state of every page in the plan.
    pub fn markers(&self, plan: &BookPlan) -> Vec<(u32, StageMarker)> {
        super::image_markers(self.store, &self.pages_dir, plan)
    }

    /// Build the generator request for a page.
    ///
    /// The prompt is the plan's style guide, a blank line, then the page's
    /// primary prompt, trimmed.
    pub fn request_for(&self, plan: &BookPlan, page: &Page) -> Result<ImageRequest> {
        let primary = page.image_prompt_primary.trim();
        if primary.is_empty() {
            return Err(ValidationError::MissingImagePrompt(page.number).into());
        }

        let prompt = format!("{}\n\n{}", plan.style_guide, primary);
        let mut request = ImageRequest::new(page.number, prompt.trim())
            .with_negative_prompt(&page.negative_prompt);
        if let Some(size) = &self.size {
            request = request.with_size(size.clone());
        }
        Ok(request)
    }

    /// Generate every missing page image, in page order.
    ///
    /// Stops at the first failure; images already written stay in place.
    pub fn run(&self, plan: &BookPlan) -> Result<ImageStageReport> {
        let mut report = ImageStageReport::default();

        for page in &plan.pages {
            if let StageMarker::Completed(artifact) = self.marker(page.number) {
                log::debug!("Skip page {} (exists: {})", page.number, artifact.path.display());
                report.skipped.push(page.number);
                continue;
            }

            let request = self.request_for(plan, page)?;
            let bytes = self.generator.generate_image(&request)?;

            let path = self.pages_dir.join(page.image_name());
            self.store.write(&path, &bytes)?;
            log::info!("Saved page {} image: {}", page.number, path.display());
            report.generated.push(page.number);
        }

        Ok(report)
    }
}

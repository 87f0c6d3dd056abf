//! Book plan generation.

use serde_json::Value;

use crate::config::ProjectLayout;
use crate::error::{Result, ValidationError};
use crate::plan::{validate_transcript, BookPlan};
use crate::services::{PlanGenerator, PlanPrompt, DEFAULT_PLAN_TEMPLATE};
use crate::store::ArtifactStore;

use super::StageMarker;

/// Turns the transcript into a validated `book_plan.json`.
pub struct PlanStage<'a> {
    generator: &'a dyn PlanGenerator,
    store: &'a dyn ArtifactStore,
    layout: &'a ProjectLayout,
    prompt: PlanPrompt,
}

impl<'a> PlanStage<'a> {
    /// Create the stage with default prompt parameters.
    pub fn new(
        generator: &'a dyn PlanGenerator,
        store: &'a dyn ArtifactStore,
        layout: &'a ProjectLayout,
    ) -> Self {
        Self {
            generator,
            store,
            layout,
            prompt: PlanPrompt::default(),
        }
    }

    /// Set the prompt parameters.
    pub fn with_prompt(mut self, prompt: PlanPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Whether a plan snapshot already exists.
    pub fn marker(&self) -> StageMarker {
        StageMarker::probe(self.store, &self.layout.plan)
    }

    /// Load and validate the existing plan snapshot.
    pub fn load(&self) -> Result<BookPlan> {
        BookPlan::from_json(&self.store.read_to_string(&self.layout.plan)?)
    }

    /// Render the plan prompt for the current transcript.
    ///
    /// Uses the project's `prompt.txt` when present, otherwise the built-in
    /// template. Fails if the transcript is too short.
    pub fn render_prompt(&self) -> Result<String> {
        let transcript = self.store.read_to_string(&self.layout.transcript)?;
        let transcript = validate_transcript(&transcript)?;

        let template = if self.store.exists(&self.layout.prompt) {
            log::debug!("Using prompt template {}", self.layout.prompt.display());
            self.store.read_to_string(&self.layout.prompt)?
        } else {
            DEFAULT_PLAN_TEMPLATE.to_string()
        };

        self.prompt.render(&template, transcript)
    }

    /// Generate a plan, validate it, and write the snapshot.
    ///
    /// The snapshot keeps every field the generator returned, pretty-printed.
    /// Nothing is written if validation fails.
    pub fn run(&self) -> Result<BookPlan> {
        let prompt = self.render_prompt()?;
        let raw = self.generator.generate_plan(&prompt)?;

        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        let plan = BookPlan::from_value(value.clone())?;

        let snapshot = serde_json::to_string_pretty(&value)?;
        self.store.write(&self.layout.plan, snapshot.as_bytes())?;
        log::info!(
            "Plan saved: {} ({} pages, \"{}\")",
            self.layout.plan.display(),
            plan.page_count(),
            plan.display_title()
        );
        Ok(plan)
    }
}

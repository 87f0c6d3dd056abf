//! Book plan model and validation.
//!
//! A plan arrives as JSON from the plan generator. [`BookPlan::from_json`]
//! checks its shape and page sequence; no stage runs on a plan that has not
//! passed validation. Content is trusted as-is and never normalized.

mod model;

pub use model::{BookPlan, Character, Page};

use crate::error::{Result, ValidationError};
use serde_json::Value;

/// Minimum transcript length, in characters, worth planning a book from.
pub const MIN_TRANSCRIPT_CHARS: usize = 50;

impl BookPlan {
    /// Parse and validate a plan document.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::MissingPages`] if `pages` is absent or empty
    /// * [`ValidationError::Malformed`] if the document does not match the plan shape
    /// * [`ValidationError::PageCountMismatch`] if `page_count` disagrees with `pages`
    /// * [`ValidationError::PageSequence`] if pages are not numbered `1..=n` in order
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let has_pages = value
            .get("pages")
            .and_then(Value::as_array)
            .is_some_and(|pages| !pages.is_empty());
        if !has_pages {
            return Err(ValidationError::MissingPages.into());
        }

        let plan: BookPlan = serde_json::from_value(value)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check the plan invariants.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.pages.is_empty() {
            return Err(ValidationError::MissingPages);
        }

        if let Some(declared) = self.page_count {
            if declared as usize != self.pages.len() {
                return Err(ValidationError::PageCountMismatch {
                    declared,
                    actual: self.pages.len(),
                });
            }
        }

        for (expected, page) in (1u32..).zip(&self.pages) {
            if page.number != expected {
                return Err(ValidationError::PageSequence {
                    expected,
                    found: page.number,
                });
            }
        }

        Ok(())
    }

    /// Serialize the plan as a pretty-printed snapshot.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Check that a transcript is long enough to plan from.
///
/// Returns the trimmed transcript.
pub fn validate_transcript(text: &str) -> std::result::Result<&str, ValidationError> {
    let trimmed = text.trim();
    let length = trimmed.chars().count();
    if length < MIN_TRANSCRIPT_CHARS {
        return Err(ValidationError::TranscriptTooShort {
            length,
            minimum: MIN_TRANSCRIPT_CHARS,
        });
    }
    Ok(trimmed)
}

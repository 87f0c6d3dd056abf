//! External collaborators.
//!
//! Speech-to-text, plan generation, and image generation are single blocking
//! calls behind capability traits. The pipeline only depends on the traits,
//! so tests drive it with deterministic fakes.
//!
//! With the `openai` feature (default), [`OpenAiClient`] implements all three.

#[cfg(feature = "openai")]
mod openai;
mod prompt;

#[cfg(feature = "openai")]
pub use openai::{OpenAiClient, OpenAiConfig};
pub use prompt::{PlanPrompt, DEFAULT_PLAN_TEMPLATE, DEFAULT_STYLE_BIBLE};

use crate::error::Result;

/// Converts recorded audio to text.
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio`. `file_name` hints the container format.
    fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String>;
}

/// Produces a book plan document from a prompt.
pub trait PlanGenerator: Send + Sync {
    /// Generate the raw plan JSON for `prompt`.
    fn generate_plan(&self, prompt: &str) -> Result<String>;
}

/// Produces one page illustration.
pub trait ImageGenerator: Send + Sync {
    /// Generate an image and return its encoded bytes (PNG).
    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>>;
}

/// A single illustration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Page the image is for
    pub page: u32,
    /// Full prompt (style guide followed by the page prompt)
    pub prompt: String,
    /// Things to avoid, for generators that support it
    pub negative_prompt: Option<String>,
    /// Requested size (e.g. `1024x1024`); the generator default when `None`
    pub size: Option<String>,
}

impl ImageRequest {
    /// Create a request for `page` with `prompt`.
    pub fn new(page: u32, prompt: impl Into<String>) -> Self {
        Self {
            page,
            prompt: prompt.into(),
            negative_prompt: None,
            size: None,
        }
    }

    /// Set the negative prompt; empty strings are ignored.
    pub fn with_negative_prompt(mut self, negative: &str) -> Self {
        let negative = negative.trim();
        self.negative_prompt = (!negative.is_empty()).then(|| negative.to_string());
        self
    }

    /// Set the requested size.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_negative_prompt() {
        let request = ImageRequest::new(1, "a cat").with_negative_prompt("  ");
        assert_eq!(request.negative_prompt, None);

        let request = ImageRequest::new(1, "a cat").with_negative_prompt(" text ");
        assert_eq!(request.negative_prompt.as_deref(), Some("text"));
    }
}

//! Error types for storyshelf.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

/// Result type alias for storyshelf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing or publishing a book.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The book plan or transcript failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A required upstream artifact is absent.
    #[error("Missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// A speech-to-text, plan, or image generation call failed.
    #[error("{service} failed: {message}")]
    ExternalService {
        /// Which collaborator failed (e.g. "image generation")
        service: &'static str,
        /// Failure detail as reported by the collaborator
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing the PDF document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A page image could not be decoded.
    #[error("Image decoding error: {0}")]
    Image(String),

    /// The plan prompt template is malformed.
    #[error("Template error: {0}")]
    Template(String),

    /// An external command exited unsuccessfully.
    #[error("Command failed (exit={}): {command}", .status.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Exit status, `None` when terminated by a signal
        status: Option<i32>,
    },

    /// A pipeline stage failed; the run stopped there.
    #[error("Stage {stage} failed: {source}")]
    StageFailed {
        /// The stage that failed
        stage: Stage,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an external service error.
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Error::ExternalService {
            service,
            message: message.into(),
        }
    }

    /// The pipeline stage this error was raised in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Validation failures for plans and transcripts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `pages` is absent or empty.
    #[error("book plan has no pages")]
    MissingPages,

    /// The document does not match the plan shape.
    #[error("malformed book plan: {0}")]
    Malformed(String),

    /// `page_count` disagrees with the number of pages.
    #[error("page_count is {declared} but the plan has {actual} pages")]
    PageCountMismatch {
        /// Declared page count
        declared: u32,
        /// Number of page entries
        actual: usize,
    },

    /// Page numbers are not consecutive from 1.
    #[error("expected page {expected} at position {expected}, found page {found}")]
    PageSequence {
        /// The page number that should appear
        expected: u32,
        /// The page number that was found
        found: u32,
    },

    /// A page has no primary image prompt.
    #[error("page {0} has no image prompt")]
    MissingImagePrompt(u32),

    /// The transcript is too short to plan a book from.
    #[error("transcript is too short ({length} characters, need at least {minimum})")]
    TranscriptTooShort {
        /// Character count after trimming
        length: usize,
        /// Required minimum
        minimum: usize,
    },
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}

#[cfg(feature = "openai")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::external("HTTP request", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation(ValidationError::MissingPages);
        assert_eq!(err.to_string(), "Invalid input: book plan has no pages");

        let err = Error::MissingArtifact(PathBuf::from("output/book.pdf"));
        assert_eq!(err.to_string(), "Missing artifact: output/book.pdf");
    }

    #[test]
    fn test_command_failed_display() {
        let err = Error::CommandFailed {
            command: "git push".to_string(),
            status: Some(128),
        };
        assert_eq!(err.to_string(), "Command failed (exit=128): git push");

        let err = Error::CommandFailed {
            command: "git push".to_string(),
            status: None,
        };
        assert_eq!(err.to_string(), "Command failed (exit=signal): git push");
    }

    #[test]
    fn test_stage_failed_carries_stage() {
        let err = Error::StageFailed {
            stage: Stage::Imaging,
            source: Box::new(Error::external("image generation", "rate limited")),
        };
        assert_eq!(err.stage(), Some(Stage::Imaging));
        assert_eq!(
            err.to_string(),
            "Stage imaging failed: image generation failed: rate limited"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

//! Project layout: where each stage reads and writes its artifacts.
//!
//! All paths are relative to the root of an [`ArtifactStore`](crate::store::ArtifactStore).

use std::path::{Component, Path, PathBuf};

/// Root-relative locations of every artifact the pipeline touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Recorded conversation audio
    pub audio: PathBuf,

    /// Transcript produced by speech-to-text
    pub transcript: PathBuf,

    /// Optional plan prompt template
    pub prompt: PathBuf,

    /// Validated book plan
    pub plan: PathBuf,

    /// Directory holding `NN.png` page images
    pub pages_dir: PathBuf,

    /// Composed PDF document
    pub document: PathBuf,

    /// Static site root
    pub docs_dir: PathBuf,

    /// Publish root; each book gets one subdirectory
    pub books_dir: PathBuf,

    /// Aggregated shelf page
    pub index: PathBuf,
}

impl ProjectLayout {
    /// Create the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audio input path.
    pub fn with_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio = path.into();
        self
    }

    /// Set the working directory for transcript, prompt, and plan.
    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.transcript = dir.join("transcript.txt");
        self.prompt = dir.join("prompt.txt");
        self.plan = dir.join("book_plan.json");
        self
    }

    /// Set the output directory for page images and the PDF.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.pages_dir = dir.join("pages");
        self.document = dir.join("book.pdf");
        self
    }

    /// Set the static site directory.
    pub fn with_docs_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.docs_dir = dir.to_path_buf();
        self.books_dir = dir.join("books");
        self.index = dir.join("index.html");
        self
    }

    /// Path of the image for a page number.
    pub fn page_image(&self, number: u32) -> PathBuf {
        self.pages_dir.join(page_image_name(number))
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            audio: PathBuf::from("input/test01.mp3"),
            transcript: PathBuf::from("work/transcript.txt"),
            prompt: PathBuf::from("work/prompt.txt"),
            plan: PathBuf::from("work/book_plan.json"),
            pages_dir: PathBuf::from("output/pages"),
            document: PathBuf::from("output/book.pdf"),
            docs_dir: PathBuf::from("docs"),
            books_dir: PathBuf::from("docs/books"),
            index: PathBuf::from("docs/index.html"),
        }
    }
}

/// File name of a page image (`pages/{number:02}.png`).
pub fn page_image_name(number: u32) -> String {
    format!("{:02}.png", number)
}

/// Relative URL from directory `from` to `to`, both root-relative.
///
/// `.` and root components are ignored. Returns `.` when both name the same
/// directory.
pub fn relative_href(from: &Path, to: &Path) -> String {
    let from = url_segments(from);
    let to = url_segments(to);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(to[common..].iter().cloned());
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn url_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = ProjectLayout::default();
        assert_eq!(layout.plan, PathBuf::from("work/book_plan.json"));
        assert_eq!(layout.books_dir, PathBuf::from("docs/books"));
        assert_eq!(layout.page_image(3), PathBuf::from("output/pages/03.png"));
    }

    #[test]
    fn test_page_image_name_padding() {
        assert_eq!(page_image_name(1), "01.png");
        assert_eq!(page_image_name(12), "12.png");
        assert_eq!(page_image_name(100), "100.png");
    }

    #[test]
    fn test_layout_builder() {
        let layout = ProjectLayout::new()
            .with_work_dir("scratch")
            .with_output_dir("build")
            .with_docs_dir("site");

        assert_eq!(layout.transcript, PathBuf::from("scratch/transcript.txt"));
        assert_eq!(layout.document, PathBuf::from("build/book.pdf"));
        assert_eq!(layout.index, PathBuf::from("site/index.html"));
        assert_eq!(layout.books_dir, PathBuf::from("site/books"));
    }

    #[test]
    fn test_relative_href() {
        let book = Path::new("docs/books/20240101_000000");
        assert_eq!(relative_href(book, Path::new("docs/index.html")), "../../index.html");
        assert_eq!(relative_href(Path::new("docs"), Path::new("docs/books")), "books");
        assert_eq!(
            relative_href(Path::new("public/books/x"), Path::new("docs/index.html")),
            "../../../docs/index.html"
        );
        assert_eq!(relative_href(Path::new("./docs"), Path::new("docs")), ".");
        assert_eq!(relative_href(Path::new(""), Path::new("books")), "books");
    }
}

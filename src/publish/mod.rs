//! Publishing a finished book to the static site.
//!
//! A publish copies the plan snapshot, PDF, and page images into a new
//! `books/<id>/` directory together with a reader page and a details page.
//! Published directories are never modified afterwards.

mod book_id;
pub mod views;

pub use book_id::BookId;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::{relative_href, ProjectLayout};
use crate::error::{Error, Result};
use crate::plan::BookPlan;
use crate::store::ArtifactStore;

use self::views::{DetailsView, ViewerView};

/// Files written into every book directory.
pub mod files {
    /// Plan snapshot
    pub const PLAN: &str = "book_plan.json";
    /// Book PDF
    pub const DOCUMENT: &str = "book.pdf";
    /// Page image directory
    pub const PAGES: &str = "pages";
    /// Cover image, relative to the book directory
    pub const COVER: &str = "pages/01.png";
    /// Reader page
    pub const VIEWER: &str = "viewer.html";
    /// Details page
    pub const DETAILS: &str = "details.html";
    /// Prompt template copy
    pub const PROMPT: &str = "prompt.txt";
    /// Transcript copy
    pub const TRANSCRIPT: &str = "transcript.txt";
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedBook {
    /// Allocated id
    pub id: BookId,
    /// Store-relative book directory
    pub dir: PathBuf,
    /// Number of page images copied
    pub pages: usize,
    /// Whether `prompt.txt` was included
    pub has_prompt: bool,
    /// Whether `transcript.txt` was included
    pub has_transcript: bool,
}

/// Copies the current working artifacts into a new published book.
pub struct Publisher<'a> {
    store: &'a dyn ArtifactStore,
    layout: &'a ProjectLayout,
}

impl<'a> Publisher<'a> {
    /// Create a publisher.
    pub fn new(store: &'a dyn ArtifactStore, layout: &'a ProjectLayout) -> Self {
        Self { store, layout }
    }

    /// Publish with an id derived from the local time.
    pub fn publish(&self) -> Result<PublishedBook> {
        self.publish_at(Local::now().naive_local())
    }

    /// Publish with an id derived from `now`.
    ///
    /// The plan snapshot, the PDF, and one image per plan page must exist;
    /// otherwise nothing is written. The reader page is written last, so an
    /// interrupted publish never appears on the shelf.
    pub fn publish_at(&self, now: NaiveDateTime) -> Result<PublishedBook> {
        let layout = self.layout;

        let raw_plan = self.store.read_to_string(&layout.plan)?;
        let plan = BookPlan::from_json(&raw_plan)?;
        self.require(&layout.document)?;
        for page in &plan.pages {
            self.require(&layout.page_image(page.number))?;
        }

        let id = BookId::allocate(self.store, &layout.books_dir, now);
        let dir = layout.books_dir.join(id.as_str());

        self.store.write(&dir.join(files::PLAN), raw_plan.as_bytes())?;
        self.store
            .copy(&layout.document, &dir.join(files::DOCUMENT))?;
        for page in &plan.pages {
            self.store.copy(
                &layout.page_image(page.number),
                &dir.join(files::PAGES).join(page.image_name()),
            )?;
        }

        let prompt = self.copy_optional(&layout.prompt, &dir.join(files::PROMPT))?;
        let transcript = self.copy_optional(&layout.transcript, &dir.join(files::TRANSCRIPT))?;

        let shelf_href = relative_href(&dir, &layout.index);
        let details = DetailsView {
            title: plan.display_title(),
            target_age: &plan.target_age,
            page_count: plan.page_count(),
            prompt: prompt.as_deref(),
            transcript: transcript.as_deref(),
            shelf_href: &shelf_href,
        };
        self.store
            .write(&dir.join(files::DETAILS), details.render().as_bytes())?;

        let viewer = ViewerView {
            title: plan.display_title(),
            shelf_href: &shelf_href,
        };
        self.store
            .write(&dir.join(files::VIEWER), viewer.render().as_bytes())?;

        log::info!("Published book {} to {}", id, dir.display());
        Ok(PublishedBook {
            id,
            dir,
            pages: plan.page_count(),
            has_prompt: prompt.is_some(),
            has_transcript: transcript.is_some(),
        })
    }

    fn require(&self, path: &Path) -> Result<()> {
        if self.store.exists(path) {
            Ok(())
        } else {
            Err(Error::MissingArtifact(path.to_path_buf()))
        }
    }

    /// Copy `from` if present and return its text for the details page.
    fn copy_optional(&self, from: &Path, to: &Path) -> Result<Option<String>> {
        if !self.store.exists(from) {
            return Ok(None);
        }
        let bytes = self.store.read(from)?;
        self.store.write(to, &bytes)?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

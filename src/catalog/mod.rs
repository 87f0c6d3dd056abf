//! Shelf page generation.
//!
//! The catalog is rebuilt from scratch on every run by scanning the publish
//! root one level deep. A directory counts as a book only once both its plan
//! snapshot and its reader page exist; everything else is optional and
//! reflected as presence flags.

use std::cmp::Ordering;
use std::path::Path;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::config::{relative_href, ProjectLayout};
use crate::error::Result;
use crate::publish::files;
use crate::publish::views::ShelfView;
use crate::publish::BookId;
use crate::store::ArtifactStore;

/// One book on the shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Directory name under the publish root
    pub id: String,
    /// Plan title, or the id when the plan has none
    pub title: String,
    /// Plan target age, when present
    pub target_age: Option<String>,
    /// Publish time parsed from the id
    pub published_at: Option<NaiveDateTime>,
    /// `details.html` exists
    pub has_details: bool,
    /// `pages/01.png` exists
    pub has_cover: bool,
    /// `book.pdf` exists
    pub has_document: bool,
}

impl CatalogEntry {
    /// Human-readable publish time, falling back to the raw id.
    pub fn label(&self) -> String {
        match self.published_at {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.id.clone(),
        }
    }

    /// Newest first; entries without a parseable time go last.
    fn shelf_order(a: &Self, b: &Self) -> Ordering {
        match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        }
    }
}

/// A trimmed, non-empty string field of a plan document.
///
/// Fields of any other type count as absent.
fn text_field(plan: &Value, key: &str) -> Option<String> {
    plan.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Collect every complete book under `books_dir`, newest first.
pub fn scan(store: &dyn ArtifactStore, books_dir: &Path) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();

    for name in store.list(books_dir)? {
        let dir = books_dir.join(&name);
        let plan_path = dir.join(files::PLAN);
        if !store.exists(&plan_path) || !store.exists(&dir.join(files::VIEWER)) {
            log::debug!("Skipping incomplete book directory {}", dir.display());
            continue;
        }

        let plan: Value = serde_json::from_slice(&store.read(&plan_path)?)?;
        let title = text_field(&plan, "title").unwrap_or_else(|| name.clone());
        let target_age = text_field(&plan, "target_age");

        entries.push(CatalogEntry {
            published_at: BookId::new(name.as_str()).timestamp(),
            title,
            target_age,
            has_details: store.exists(&dir.join(files::DETAILS)),
            has_cover: store.exists(&dir.join(files::COVER)),
            has_document: store.exists(&dir.join(files::DOCUMENT)),
            id: name,
        });
    }

    entries.sort_by(CatalogEntry::shelf_order);
    Ok(entries)
}

/// Render the shelf page for `entries`.
pub fn render_shelf(entries: &[CatalogEntry], books_href: &str) -> String {
    ShelfView {
        entries,
        books_href,
    }
    .render()
}

/// Relative link from the shelf page to the publish root.
fn books_href(layout: &ProjectLayout) -> String {
    let index_dir = layout.index.parent().unwrap_or_else(|| Path::new(""));
    relative_href(index_dir, &layout.books_dir)
}

/// Scan the publish root and rewrite the shelf page.
pub fn build(store: &dyn ArtifactStore, layout: &ProjectLayout) -> Result<Vec<CatalogEntry>> {
    let entries = scan(store, &layout.books_dir)?;
    let html = render_shelf(&entries, &books_href(layout));
    store.write(&layout.index, html.as_bytes())?;
    log::info!(
        "Shelf generated: {} ({} books)",
        layout.index.display(),
        entries.len()
    );
    Ok(entries)
}

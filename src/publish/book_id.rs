//! Timestamp identifiers for published books.

use std::fmt;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};

use crate::store::ArtifactStore;

/// Identifier of a published book: its publish time as `YYYYMMDD_HHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(String);

impl BookId {
    /// `chrono` format of an id.
    pub const FORMAT: &'static str = "%Y%m%d_%H%M%S";

    /// Id for a publish time.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        BookId(at.format(Self::FORMAT).to_string())
    }

    /// Wrap an existing directory name.
    pub fn new(id: impl Into<String>) -> Self {
        BookId(id.into())
    }

    /// Allocate an id for `now` that is not yet used under `books_dir`.
    ///
    /// Two publishes within the same second would collide, so the clock is
    /// advanced one second at a time until a free id is found.
    pub fn allocate(store: &dyn ArtifactStore, books_dir: &Path, now: NaiveDateTime) -> Self {
        let mut at = now;
        loop {
            let id = Self::from_datetime(at);
            if !store.exists(&books_dir.join(id.as_str())) {
                if at != now {
                    log::debug!("Book id advanced to {} to avoid a collision", id);
                }
                return id;
            }
            at += Duration::seconds(1);
        }
    }

    /// The publish time, if the id is in the timestamp format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, Self::FORMAT).ok()
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 16)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn test_format_and_parse() {
        let id = BookId::from_datetime(at(14, 22, 33));
        assert_eq!(id.as_str(), "20260216_142233");
        assert_eq!(id.timestamp(), Some(at(14, 22, 33)));
    }

    #[test]
    fn test_unparseable_ids() {
        assert_eq!(BookId::new("my-book").timestamp(), None);
        assert_eq!(BookId::new("20260216_142233_x").timestamp(), None);
        assert_eq!(BookId::new("20261316_142233").timestamp(), None);
    }

    #[test]
    fn test_allocate_skips_taken_ids() {
        let store = MemoryStore::new();
        let books = Path::new("docs/books");
        store
            .write(&books.join("20260216_142233/viewer.html"), b"")
            .unwrap();
        store
            .write(&books.join("20260216_142234/viewer.html"), b"")
            .unwrap();

        let id = BookId::allocate(&store, books, at(14, 22, 33));
        assert_eq!(id.as_str(), "20260216_142235");
        assert!(id.timestamp().is_some());
    }
}

//! Page composition and PDF assembly.
//!
//! Each plan page becomes one landscape PDF page split into two equal
//! columns: the illustration fit into the left column, and a rounded text
//! panel on the right holding the vertically centered page text and a
//! `n/total` footer.
//!
//! # Example
//!
//! ```no_run
//! use storyshelf::compose::DocumentAssembler;
//! use storyshelf::store::FsStore;
//! use storyshelf::{BookPlan, ProjectLayout};
//!
//! fn main() -> storyshelf::Result<()> {
//!     let store = FsStore::new(".");
//!     let layout = ProjectLayout::default();
//!     let plan = BookPlan::from_json(&std::fs::read_to_string("work/book_plan.json")?)?;
//!
//!     DocumentAssembler::new().write_document(&plan, &store, &layout)?;
//!     Ok(())
//! }
//! ```

mod document;
mod geometry;
mod page;
mod raster;

pub use document::DocumentAssembler;
pub use geometry::{PageGeometry, Rect};
pub use page::{encode_text, ComposedPage, PageComposer, FONT_RESOURCE, IMAGE_RESOURCE};
pub use raster::ImageXObject;

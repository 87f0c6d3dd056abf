//! Book plan types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::page_image_name;

/// The structured description of one book.
///
/// Produced once by the plan generator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPlan {
    /// Book title
    #[serde(default)]
    pub title: String,

    /// Intended reader age (e.g. "12-15")
    #[serde(default)]
    pub target_age: String,

    /// Declared number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Visual style shared by every illustration
    #[serde(default, rename = "style_bible", alias = "style_guide")]
    pub style_guide: String,

    /// Recurring characters
    #[serde(default)]
    pub characters: Vec<Character>,

    /// Pages in reading order
    pub pages: Vec<Page>,
}

impl BookPlan {
    /// Number of pages in the plan.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Title to display, falling back to a generic name when empty.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "StoryBook"
        } else {
            title
        }
    }
}

/// A recurring character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character name
    #[serde(default)]
    pub name: String,

    /// Appearance and personality notes
    #[serde(default)]
    pub description: String,
}

/// One page of the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number, starting at 1
    #[serde(rename = "page")]
    pub number: u32,

    /// Text printed on the page (may be empty)
    #[serde(default)]
    pub text: String,

    /// Short description of the scene
    #[serde(default)]
    pub scene_summary: String,

    /// Elements the illustration must contain
    #[serde(default)]
    pub must_have: BTreeSet<String>,

    /// Framing and camera notes
    #[serde(default, rename = "camera", alias = "camera_directive")]
    pub camera_directive: String,

    /// Prompt sent to the image generator
    #[serde(default, rename = "image_prompt_api", alias = "image_prompt_primary")]
    pub image_prompt_primary: String,

    /// Alternative prompt kept for manual regeneration
    #[serde(default, rename = "image_prompt_fallback")]
    pub image_prompt_fallback: String,

    /// Things the illustration must avoid
    #[serde(default)]
    pub negative_prompt: String,
}

impl Page {
    /// Create a page with text and a primary image prompt.
    pub fn new(number: u32, text: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            scene_summary: String::new(),
            must_have: BTreeSet::new(),
            camera_directive: String::new(),
            image_prompt_primary: prompt.into(),
            image_prompt_fallback: String::new(),
            negative_prompt: String::new(),
        }
    }

    /// File name of this page's image (`NN.png`).
    pub fn image_name(&self) -> String {
        page_image_name(self.number)
    }

    /// The page text as printed (surrounding whitespace removed).
    pub fn printed_text(&self) -> &str {
        self.text.trim()
    }
}

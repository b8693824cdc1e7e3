//! Core data models for Daily Verse CLI
//!
//! This module contains the verse types returned by the Bible API and cached
//! locally, plus the static tables of translations and mood categories.

pub mod bible_api;
pub mod categories;

pub use bible_api::{BibleApiClient, FetchError, VerseFetcher};
pub use categories::{all_categories, get_category_by_id, VerseCategory};

use serde::{Deserialize, Serialize};

/// Translation used when nothing else has been selected
pub const DEFAULT_TRANSLATION: &str = "web";

/// A passage returned by the Bible API
///
/// `text` and `verses` describe the same content. `text` is what gets
/// displayed; `verses` is used whenever verse numbers are needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseResponse {
    /// Human-readable passage identifier, e.g. "John 3:16"
    pub reference: String,
    /// Individual verses in canonical order
    pub verses: Vec<VerseLine>,
    /// Concatenated text of all verses, may contain newlines
    pub text: String,
    /// Short translation id, e.g. "web"
    pub translation_id: String,
    /// Full translation name, e.g. "World English Bible"
    pub translation_name: String,
    /// Licensing or provenance note for the translation
    #[serde(default)]
    pub translation_note: String,
}

impl VerseResponse {
    /// Returns the passage text trimmed and collapsed for display
    pub fn display_text(&self) -> String {
        trim_verse(&self.text)
    }

    /// Returns one display line per verse, prefixed with its verse number
    pub fn numbered_lines(&self) -> Vec<String> {
        self.verses
            .iter()
            .map(|line| format!("[{}] {}", line.verse, trim_verse(&line.text)))
            .collect()
    }
}

/// A single verse within a passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseLine {
    /// Book code, e.g. "JHN"
    pub book_id: String,
    /// Book display name, e.g. "John"
    pub book_name: String,
    /// Chapter number
    pub chapter: u32,
    /// Verse number within the chapter
    pub verse: u32,
    /// Text of this verse
    pub text: String,
}

impl VerseLine {
    /// Stable identifier of the form `BOOK.chapter.verse`
    pub fn id(&self) -> String {
        format!("{}.{}.{}", self.book_id, self.chapter, self.verse)
    }
}

/// A translation offered by the Bible API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// Id passed as the `translation` query parameter
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

/// Translations the CLI lets users select
pub static TRANSLATIONS: [Translation; 4] = [
    Translation {
        id: "web",
        name: "World English Bible",
    },
    Translation {
        id: "kjv",
        name: "King James Version",
    },
    Translation {
        id: "bbe",
        name: "Bible in Basic English",
    },
    Translation {
        id: "oeb-us",
        name: "Open English Bible, US Ed.",
    },
];

/// Looks up a translation by id (case-sensitive, ids are lower-case)
pub fn get_translation_by_id(id: &str) -> Option<&'static Translation> {
    TRANSLATIONS.iter().find(|t| t.id == id)
}

/// Trims surrounding whitespace and collapses every whitespace run to one space
pub fn trim_verse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

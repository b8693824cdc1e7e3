//! Plain-text rendering of verses and lists
//!
//! Every function returns a `String` so the command layer can be tested
//! without capturing stdout.

use chrono::{DateTime, Local, Utc};

use crate::cache::DailySlotState;
use crate::data::{VerseCategory, VerseResponse, TRANSLATIONS};
use crate::favorites::FavoriteVerse;

/// Renders a passage with its reference and translation
///
/// # Arguments
/// * `verse` - The passage to render
/// * `numbered` - One line per verse prefixed with `[n]` instead of flowing text
pub fn render_verse(verse: &VerseResponse, numbered: bool) -> String {
    let body = if numbered && !verse.verses.is_empty() {
        verse.numbered_lines().join("\n")
    } else {
        verse.display_text()
    };
    format!(
        "{}\n\n{}\n\n  - {} ({})",
        verse.reference,
        body,
        verse.reference,
        verse.translation_id.to_uppercase()
    )
}

/// Renders the category table
pub fn render_categories(categories: &[VerseCategory]) -> String {
    let width = categories.iter().map(|c| c.id.len()).max().unwrap_or(0);
    categories
        .iter()
        .map(|c| {
            format!(
                "{:<width$}  {} - {} ({} verses)",
                c.id,
                c.name,
                c.description,
                c.references.len(),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the translation list, marking `current`
pub fn render_translations(current: &str) -> String {
    TRANSLATIONS
        .iter()
        .map(|t| {
            let marker = if t.id == current { "*" } else { " " };
            format!("{} {:<7} {}", marker, t.id, t.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders recent searches, most recent first
pub fn render_history(searches: &[String]) -> String {
    if searches.is_empty() {
        return "No recent searches".to_string();
    }
    searches
        .iter()
        .enumerate()
        .map(|(i, query)| format!("{:>2}. {}", i + 1, query))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders saved favorites with the local date they were saved
pub fn render_favorites(favorites: &[FavoriteVerse]) -> String {
    if favorites.is_empty() {
        return "No favorites yet. Add one with: dailyverse favorites add John 3:16".to_string();
    }
    favorites
        .iter()
        .map(|f| {
            format!(
                "{} ({}, saved {})\n  {}",
                f.reference,
                f.translation_name,
                local_date(f.saved_at),
                f.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// What `cache stats` reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSummary {
    /// Persisted entries, expired ones included
    pub entries: usize,
    /// Entries still fresh now
    pub fresh: usize,
    /// State of the verse-of-the-day slot
    pub daily: DailySlotState,
    /// Where the cache lives
    pub location: String,
}

/// Renders a cache summary
pub fn render_cache_summary(summary: &CacheSummary) -> String {
    let daily = match &summary.daily {
        DailySlotState::Empty => "none".to_string(),
        DailySlotState::Fresh { date } => format!("{} (today)", date),
        DailySlotState::Stale { date } => format!("{} (stale)", date),
    };
    format!(
        "Location:      {}\nEntries:       {}\nFresh:         {}\nExpired:       {}\nDaily verse:   {}",
        summary.location,
        summary.entries,
        summary.fresh,
        summary.entries.saturating_sub(summary.fresh),
        daily
    )
}

fn local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

//! Command-line interface parsing for Daily Verse CLI
//!
//! This module handles parsing of CLI arguments using clap and the small
//! validation steps that must happen before the cache is touched.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::{get_category_by_id, VerseCategory};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified category id is not recognized
    #[error("Invalid category: '{0}'. Valid categories: comfort, peace, hope, courage, love, strength, anxiety, gratitude, wisdom, forgiveness")]
    InvalidCategory(String),

    /// A search was requested with nothing to search for
    #[error("Enter a reference to search for, e.g. John 3:16")]
    EmptyReference,
}

/// Daily Verse CLI - A verse of the day, search and mood categories
#[derive(Parser, Debug)]
#[command(name = "dailyverse")]
#[command(about = "Daily Bible verses, search and mood categories")]
#[command(version)]
pub struct Cli {
    /// Translation to use for this run (web, kjv, bbe, oeb-us)
    #[arg(short, long, global = true, value_name = "ID")]
    pub translation: Option<String>,

    /// Directory for the cache and preferences
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print each verse on its own line with its number
    #[arg(short, long, global = true)]
    pub numbers: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; running without one shows today's verse
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the verse of the day
    Today,
    /// Look up a passage by reference
    ///
    /// Examples:
    ///   dailyverse search John 3:16
    ///   dailyverse search "Romans 8:28-30"
    Search {
        /// Reference, e.g. "John 3:16"
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Show a fresh random verse (never cached)
    Random,
    /// List the mood categories
    Categories,
    /// Show a verse from a mood category
    Category {
        /// Category id, e.g. "peace"
        id: String,
        /// Which verse to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        index: usize,
        /// Show every verse in the category
        #[arg(long, conflicts_with = "index")]
        all: bool,
    },
    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Manage favorite verses
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Show or change the selected translation
    #[command(subcommand)]
    Translation(TranslationCommand),
    /// Inspect or maintain the local verse cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Favorites subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FavoritesCommand {
    /// List saved favorites, newest first
    List,
    /// Save a passage as a favorite
    Add {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Remove a favorite by its reference as shown in the list
    Remove {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
}

/// Translation subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TranslationCommand {
    /// Show the selected translation and the available ones
    Show,
    /// Persist a translation as the default
    Set {
        /// Translation id
        id: String,
    },
    /// Go back to the default translation (web)
    Reset,
}

/// Cache subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Show what is cached
    Stats,
    /// Remove expired entries
    Purge,
    /// Remove everything cached
    Clear,
}

/// Joins reference words and rejects blank input
///
/// `search John 3:16` arrives as two words; they are joined with single
/// spaces so it means the same as `search "John 3:16"`.
pub fn parse_reference_arg(words: &[String]) -> Result<String, CliError> {
    let reference = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if reference.is_empty() {
        Err(CliError::EmptyReference)
    } else {
        Ok(reference)
    }
}

/// Parses a category id argument, case-insensitively
pub fn parse_category_arg(s: &str) -> Result<&'static VerseCategory, CliError> {
    get_category_by_id(&s.trim().to_lowercase())
        .ok_or_else(|| CliError::InvalidCategory(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &[&str]) -> Vec<String> {
        s.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_reference_arg_joins_words() {
        assert_eq!(
            parse_reference_arg(&words(&["John", "3:16"])).unwrap(),
            "John 3:16"
        );
        assert_eq!(
            parse_reference_arg(&words(&["  Romans 8:28-30 "])).unwrap(),
            "Romans 8:28-30"
        );
    }

    #[test]
    fn test_parse_reference_arg_rejects_blank() {
        assert!(matches!(
            parse_reference_arg(&words(&["   "])),
            Err(CliError::EmptyReference)
        ));
        assert!(matches!(
            parse_reference_arg(&[]),
            Err(CliError::EmptyReference)
        ));
    }

    #[test]
    fn test_parse_category_arg() {
        assert_eq!(parse_category_arg("peace").unwrap().id, "peace");
        assert_eq!(parse_category_arg("Hope").unwrap().id, "hope");

        let err = parse_category_arg("joy").unwrap_err();
        assert!(err.to_string().contains("Invalid category"));
        assert!(err.to_string().contains("joy"));
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["dailyverse"]);
        assert!(cli.command.is_none());
        assert!(cli.translation.is_none());
        assert!(!cli.numbers);
    }

    #[test]
    fn test_cli_parse_search_words() {
        let cli = Cli::parse_from(["dailyverse", "search", "John", "3:16"]);
        assert_eq!(
            cli.command,
            Some(Command::Search {
                reference: words(&["John", "3:16"])
            })
        );
    }

    #[test]
    fn test_cli_parse_global_translation_after_subcommand() {
        let cli = Cli::parse_from(["dailyverse", "today", "--translation", "kjv"]);
        assert_eq!(cli.command, Some(Command::Today));
        assert_eq!(cli.translation.as_deref(), Some("kjv"));
    }

    #[test]
    fn test_cli_parse_category_with_index() {
        let cli = Cli::parse_from(["dailyverse", "category", "love", "--index", "2"]);
        assert_eq!(
            cli.command,
            Some(Command::Category {
                id: "love".to_string(),
                index: 2,
                all: false
            })
        );
    }

    #[test]
    fn test_cli_parse_nested_subcommands() {
        let cli = Cli::parse_from(["dailyverse", "cache", "purge"]);
        assert_eq!(cli.command, Some(Command::Cache(CacheCommand::Purge)));

        let cli = Cli::parse_from(["dailyverse", "translation", "set", "bbe"]);
        assert_eq!(
            cli.command,
            Some(Command::Translation(TranslationCommand::Set {
                id: "bbe".to_string()
            }))
        );
    }

    #[test]
    fn test_cli_search_requires_reference() {
        assert!(Cli::try_parse_from(["dailyverse", "search"]).is_err());
    }
}

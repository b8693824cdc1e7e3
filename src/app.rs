//! Application layer for Daily Verse CLI
//!
//! `App` owns the verse cache, the remote fetcher and the small persisted
//! lists, and turns one parsed `Command` into the text to print. It is built
//! once per process and never talks to stdout itself.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::VerseCache;
use crate::cli::{
    parse_category_arg, parse_reference_arg, CacheCommand, CliError, Command, FavoritesCommand,
    TranslationCommand,
};
use crate::clock::Clock;
use crate::config::{ConfigError, Preferences, Settings};
use crate::data::{all_categories, get_translation_by_id, FetchError, VerseFetcher};
use crate::favorites::Favorites;
use crate::history::RecentSearches;
use crate::output::{
    render_cache_summary, render_categories, render_favorites, render_history,
    render_translations, render_verse, CacheSummary,
};
use crate::storage::{Storage, StorageError};

/// Everything that can stop a command
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad command-line input
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A remote fetch failed and nothing cached could stand in
    #[error("{}", .0.user_message())]
    Fetch(#[from] FetchError),

    /// Persisting user data failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Main application struct wiring the cache to its collaborators
pub struct App<F> {
    /// Remote verse source, consulted by the cache on a miss
    fetcher: F,
    /// Verse cache over the shared storage
    cache: VerseCache,
    clock: Arc<dyn Clock>,
    preferences: Preferences,
    history: RecentSearches,
    favorites: Favorites,
    /// Translation for this run
    translation: String,
    /// Print verse numbers
    numbered: bool,
    /// Shown by `cache stats`
    location: String,
}

impl<F: VerseFetcher> App<F> {
    /// Creates an App over `storage`
    ///
    /// # Arguments
    /// * `fetcher` - Remote verse source
    /// * `storage` - Backend shared by the cache, preferences, history and favorites
    /// * `clock` - Time source for every freshness decision
    /// * `settings` - Resolved settings for this run
    /// * `numbered` - Whether verses are printed with their numbers
    pub fn new(
        fetcher: F,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
        numbered: bool,
    ) -> Self {
        Self {
            fetcher,
            cache: VerseCache::new(storage.clone(), clock.clone()),
            preferences: Preferences::new(storage.clone()),
            history: RecentSearches::new(storage.clone()),
            favorites: Favorites::new(storage, clock.clone()),
            clock,
            translation: settings.translation.clone(),
            numbered,
            location: settings.data_dir.display().to_string(),
        }
    }

    /// The verse cache used by this App
    pub fn cache(&self) -> &VerseCache {
        &self.cache
    }

    /// Runs one command and returns what should be printed
    pub async fn run(&self, command: Command) -> Result<String, AppError> {
        let output = match command {
            Command::Today => self.today().await?,
            Command::Search { reference } => self.search(&reference).await?,
            Command::Random => self.random().await?,
            Command::Categories => render_categories(all_categories()),
            Command::Category { id, index, all } => self.category(&id, index, all).await?,
            Command::History { clear } => self.history(clear),
            Command::Favorites(command) => self.favorites(command).await?,
            Command::Translation(command) => self.translation(command)?,
            Command::Cache(command) => self.maintain_cache(command),
        };
        debug!(stats = ?self.cache.stats(), "Command finished");
        Ok(output)
    }

    /// Today's verse, or the last known one with a notice if the refresh fails
    async fn today(&self) -> Result<String, AppError> {
        match self.cache.todays_verse(&self.fetcher, &self.translation).await {
            Ok(verse) => Ok(render_verse(&verse, self.numbered)),
            Err(e) => match self.cache.daily().last_known() {
                Some(verse) => {
                    warn!("Showing last known daily verse after fetch failure: {}", e);
                    Ok(format!(
                        "Could not load today's verse ({}). Showing the most recent one.\n\n{}",
                        e.user_message(),
                        render_verse(&verse, self.numbered)
                    ))
                }
                None => Err(e.into()),
            },
        }
    }

    async fn search(&self, words: &[String]) -> Result<String, AppError> {
        let reference = parse_reference_arg(words)?;
        let verse = self
            .cache
            .get_or_fetch(&self.fetcher, &reference, &self.translation)
            .await?;
        self.history.add(&reference);

        let mut output = render_verse(&verse, self.numbered);
        if self.favorites.contains(&verse.reference) {
            output.push_str("\n  (in favorites)");
        }
        Ok(output)
    }

    /// A random verse straight from the API; never cached
    async fn random(&self) -> Result<String, AppError> {
        let verse = self.fetcher.fetch_random(&self.translation).await?;
        Ok(render_verse(&verse, self.numbered))
    }

    /// One verse of a category by 1-based position, or all of them
    async fn category(&self, id: &str, index: usize, all: bool) -> Result<String, AppError> {
        let category = parse_category_arg(id)?;

        if all {
            let lookups = category.references.iter().map(|reference| {
                self.cache
                    .get_or_fetch(&self.fetcher, reference, &self.translation)
            });
            let results = join_all(lookups).await;

            let sections = category
                .references
                .iter()
                .zip(results)
                .map(|(reference, result)| match result {
                    Ok(verse) => render_verse(&verse, self.numbered),
                    Err(e) => format!("{}\n\n  {}", reference, e.user_message()),
                })
                .collect::<Vec<_>>();
            return Ok(format!(
                "{} - {}\n\n{}",
                category.name,
                category.description,
                sections.join("\n\n")
            ));
        }

        let position = index.saturating_sub(1);
        let Some(reference) = category.reference_at(position) else {
            return Ok(format!("{} has no verses", category.name));
        };
        let verse = self
            .cache
            .get_or_fetch(&self.fetcher, reference, &self.translation)
            .await?;
        Ok(format!(
            "{} ({})\n\n{}",
            category.name,
            category.progress(position),
            render_verse(&verse, self.numbered)
        ))
    }

    fn history(&self, clear: bool) -> String {
        if clear {
            self.history.clear();
            return "Recent searches cleared".to_string();
        }
        render_history(&self.history.list())
    }

    async fn favorites(&self, command: FavoritesCommand) -> Result<String, AppError> {
        match command {
            FavoritesCommand::List => Ok(render_favorites(&self.favorites.list())),
            FavoritesCommand::Add { reference } => {
                let reference = parse_reference_arg(&reference)?;
                let verse = self
                    .cache
                    .get_or_fetch(&self.fetcher, &reference, &self.translation)
                    .await?;
                if self.favorites.add(&verse)? {
                    Ok(format!("Saved {} to favorites", verse.reference))
                } else {
                    Ok(format!("{} is already in favorites", verse.reference))
                }
            }
            FavoritesCommand::Remove { reference } => {
                let reference = parse_reference_arg(&reference)?;
                if self.favorites.remove(&reference)? {
                    Ok(format!("Removed {} from favorites", reference))
                } else {
                    Ok(format!("{} is not in favorites", reference))
                }
            }
        }
    }

    fn translation(&self, command: TranslationCommand) -> Result<String, AppError> {
        match command {
            TranslationCommand::Show => Ok(render_translations(&self.translation)),
            TranslationCommand::Set { id } => {
                let id = self.preferences.set_translation(&id)?;
                let name = get_translation_by_id(&id).map(|t| t.name).unwrap_or_default();
                Ok(format!("Translation set to {} ({})", id, name))
            }
            TranslationCommand::Reset => {
                self.preferences.reset()?;
                Ok(format!(
                    "Translation reset to {}",
                    self.preferences.selected_translation()
                ))
            }
        }
    }

    fn maintain_cache(&self, command: CacheCommand) -> String {
        match command {
            CacheCommand::Stats => {
                let now = self.clock.now().with_timezone(&Utc);
                let map = self.cache.store().load();
                let summary = CacheSummary {
                    entries: map.len(),
                    fresh: map.values().filter(|entry| entry.is_fresh_at(now)).count(),
                    daily: self.cache.daily().state(),
                    location: self.location.clone(),
                };
                render_cache_summary(&summary)
            }
            CacheCommand::Purge => {
                let removed = self.cache.purge_expired();
                format!("Removed {} expired entries", removed)
            }
            CacheCommand::Clear => {
                self.cache.clear();
                "Cache cleared".to_string()
            }
        }
    }
}

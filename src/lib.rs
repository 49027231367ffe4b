//! Tagquery - a tag query language and metadata resolution layer
//!
//! This library parses free-form tag search strings into structured queries
//! and resolves tag metadata (categories, aliases, related tags) through a
//! TTL cache backed by an authoritative record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cache;
pub mod config;
pub mod query;
pub mod store;
pub mod tag;

#[cfg(test)]
pub mod testing;

pub use cache::TagCache;
pub use config::TagQueryConfig;
pub use query::{QueryParser, StructuredQuery};
pub use store::StoreError;

/// Error enum, contains all failure states of the library
#[derive(Debug, Error)]
pub enum TagQueryError {
    /// Record store or collaborator error
    #[error("Store error: {0}")]
    StoreError(#[from] store::StoreError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A tag record as held by the authoritative store
///
/// The name is always normalized (lowercase, underscored, stripped of
/// leading `-`/`~` and `*`). `related_tags` is a flat alternating sequence
/// of name and strength values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TagRecord {
    pub name: String,
    pub category: u8,
    pub post_count: u64,
    pub related_tags: Vec<String>,
    pub related_tags_updated_at: Option<DateTime<Utc>>,
}

impl TagRecord {
    /// Create a new record with default category and no posts
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: 0,
            post_count: 0,
            related_tags: Vec::new(),
            related_tags_updated_at: None,
        }
    }

    /// Set the category code
    #[must_use]
    pub fn with_category(mut self, category: u8) -> Self {
        self.category = category;
        self
    }

    /// Set the post count
    #[must_use]
    pub fn with_post_count(mut self, post_count: u64) -> Self {
        self.post_count = post_count;
        self
    }
}

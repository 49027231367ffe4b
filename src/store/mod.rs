//! External collaborator contracts
//!
//! The library core never owns persistence. Everything authoritative lives
//! behind these traits: the tag record store, user/pool name resolution,
//! the alias chain, and the related-tag sampler. Hosts plug in their own
//! backends; [`MemoryStore`] provides a complete in-memory implementation
//! used by the test suite and as a reference fixture.

use chrono::{DateTime, Utc};

use crate::TagRecord;

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

/// Authoritative tag record store
pub trait TagStore: Send + Sync {
    /// Look up a tag record by its normalized name
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be queried.
    fn find_tag_by_name(&self, name: &str) -> Result<Option<TagRecord>, StoreError>;

    /// Fetch only the persisted category code for a name, if the tag exists
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be queried.
    fn select_category(&self, name: &str) -> Result<Option<u8>, StoreError>;

    /// Find tag names matching a SQL-LIKE pattern, ordered by descending
    /// post count, returning at most `limit` names
    ///
    /// The pattern uses `%`/`_` wildcards with backslash escaping.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be queried.
    fn search_by_like_pattern(&self, pattern: &str, limit: usize)
    -> Result<Vec<String>, StoreError>;

    /// Find names of tags that have posts and match a SQL-LIKE pattern,
    /// skipping `exclude_name`, ordered by descending post count,
    /// returning at most `limit` names
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be queried.
    fn search_suggestions(
        &self,
        pattern: &str,
        exclude_name: &str,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Persist a recomputed related-tags list and its timestamp
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    fn save_related_tags(
        &self,
        name: &str,
        related: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Resolves user and pool names to their ids
pub trait NameResolver: Send + Sync {
    /// Resolve a user name, `None` if no such user
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup cannot be performed.
    fn user_name_to_id(&self, name: &str) -> Result<Option<i64>, StoreError>;

    /// Resolve a pool name, `None` if no such pool
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup cannot be performed.
    fn pool_name_to_id(&self, name: &str) -> Result<Option<i64>, StoreError>;
}

/// Owns the alias chain between deprecated and canonical tag names
pub trait AliasStore: Send + Sync {
    /// Map each name to its canonical aliased form
    ///
    /// Names without an alias pass through unchanged. Output order matches
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the chain cannot be read.
    fn resolve_aliases(&self, names: &[String]) -> Result<Vec<String>, StoreError>;
}

/// Computes a tag's related-tag list from a content sample
pub trait RelatedTagSampler: Send + Sync {
    /// Recompute related tags as (name, strength) pairs
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if sampling fails.
    fn compute_related(&self, name: &str) -> Result<Vec<(String, f64)>, StoreError>;
}

//! In-memory collaborator implementation
//!
//! Implements every collaborator trait over plain hash maps behind a
//! `RwLock`. Used throughout the test suite; also useful to downstream
//! crates as a fixture when wiring the parser without a real backend.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use regex::RegexBuilder;

use super::error::StoreError;
use super::{AliasStore, NameResolver, RelatedTagSampler, TagStore};
use crate::TagRecord;

#[derive(Default)]
struct Tables {
    tags: HashMap<String, TagRecord>,
    users: HashMap<String, i64>,
    pools: HashMap<String, i64>,
    aliases: HashMap<String, String>,
    samples: HashMap<String, Vec<(String, f64)>>,
}

/// In-memory store implementing all collaborator traits
///
/// Tracks how many times the category column was selected so tests can
/// verify that cached reads never hit the store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    category_selects: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag record
    pub fn insert_tag(&self, record: TagRecord) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        tables.tags.insert(record.name.clone(), record);
    }

    /// Register a user name/id pairing
    pub fn insert_user(&self, name: &str, id: i64) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        tables.users.insert(name.to_string(), id);
    }

    /// Register a pool name/id pairing
    pub fn insert_pool(&self, name: &str, id: i64) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        tables.pools.insert(name.to_string(), id);
    }

    /// Register an alias from a deprecated name to its target
    pub fn insert_alias(&self, from: &str, to: &str) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        tables.aliases.insert(from.to_string(), to.to_string());
    }

    /// Seed the related-tag sample for a name
    pub fn insert_sample(&self, name: &str, related: Vec<(String, f64)>) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        tables.samples.insert(name.to_string(), related);
    }

    /// Number of `select_category` calls that reached the store
    #[must_use]
    pub fn category_select_count(&self) -> usize {
        self.category_selects.load(Ordering::SeqCst)
    }
}

/// Translate a SQL-LIKE pattern (with backslash escaping) into an anchored
/// case-insensitive regex
fn like_to_regex(pattern: &str) -> Result<regex::Regex, StoreError> {
    let mut translated = String::with_capacity(pattern.len() + 2);
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // Escaped literal: take the next character verbatim
                if let Some(escaped) = chars.next() {
                    translated.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            _ => translated.push_str(&regex::escape(&c.to_string())),
        }
    }

    RegexBuilder::new(&format!("^{translated}$"))
        .case_insensitive(true)
        .build()
        .map_err(|e| StoreError::InvalidInput(format!("Bad LIKE pattern '{pattern}': {e}")))
}

impl TagStore for MemoryStore {
    fn find_tag_by_name(&self, name: &str) -> Result<Option<TagRecord>, StoreError> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables.tags.get(name).cloned())
    }

    fn select_category(&self, name: &str) -> Result<Option<u8>, StoreError> {
        self.category_selects.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables.tags.get(name).map(|t| t.category))
    }

    fn search_by_like_pattern(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let matcher = like_to_regex(pattern)?;
        let tables = self.tables.read().expect("store lock poisoned");

        let mut matches: Vec<&TagRecord> = tables
            .tags
            .values()
            .filter(|t| matcher.is_match(&t.name))
            .collect();
        matches.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|t| t.name.clone())
            .collect())
    }

    fn search_suggestions(
        &self,
        pattern: &str,
        exclude_name: &str,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let matcher = like_to_regex(pattern)?;
        let tables = self.tables.read().expect("store lock poisoned");

        let mut matches: Vec<&TagRecord> = tables
            .tags
            .values()
            .filter(|t| t.post_count > 0 && t.name != exclude_name && matcher.is_match(&t.name))
            .collect();
        matches.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|t| t.name.clone())
            .collect())
    }

    fn save_related_tags(
        &self,
        name: &str,
        related: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        let record = tables
            .tags
            .entry(name.to_string())
            .or_insert_with(|| TagRecord::new(name));
        record.related_tags = related.to_vec();
        record.related_tags_updated_at = Some(updated_at);
        Ok(())
    }
}

impl NameResolver for MemoryStore {
    fn user_name_to_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables.users.get(name).copied())
    }

    fn pool_name_to_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables.pools.get(name).copied())
    }
}

impl AliasStore for MemoryStore {
    fn resolve_aliases(&self, names: &[String]) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().expect("store lock poisoned");

        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            // Follow the chain to its canonical target, guarding against cycles
            let mut current = name.clone();
            let mut seen = HashSet::new();
            while let Some(target) = tables.aliases.get(&current) {
                if !seen.insert(current.clone()) {
                    break;
                }
                current = target.clone();
            }
            resolved.push(current);
        }

        Ok(resolved)
    }
}

impl RelatedTagSampler for MemoryStore {
    fn compute_related(&self, name: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables.samples.get(name).cloned().unwrap_or_default())
    }
}

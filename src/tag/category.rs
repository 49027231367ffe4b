//! Tag category resolution
//!
//! Categories are small integer codes (0 = general) attached to every tag.
//! The name/code table comes from configuration and is immutable after
//! construction; lookups against the authoritative store go through the
//! shared cache under a `tc:` key scheme with a bounded TTL, so a category
//! change becomes visible to readers within that TTL at the latest.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::{Regex, RegexBuilder};
use serde_json::json;

use crate::TagQueryConfig;
use crate::cache::TagCache;
use crate::store::{StoreError, TagStore};

/// Fixed bidirectional map between category names and codes
///
/// Built once from configuration at process start. The compiled
/// name alternation is ordered longest-first so no category name can be
/// shadowed by a shorter prefix of another.
pub struct CategoryMapping {
    by_name: HashMap<String, u8>,
    by_code: HashMap<u8, String>,
    alternation: OnceLock<Regex>,
    prefix: OnceLock<Regex>,
}

impl CategoryMapping {
    /// Build the mapping from a configured name/code table
    #[must_use]
    pub fn new(categories: &HashMap<String, u8>) -> Self {
        let by_name: HashMap<String, u8> = categories
            .iter()
            .map(|(name, code)| (name.to_lowercase(), *code))
            .collect();
        let by_code = by_name.iter().map(|(n, c)| (*c, n.clone())).collect();

        Self {
            by_name,
            by_code,
            alternation: OnceLock::new(),
            prefix: OnceLock::new(),
        }
    }

    /// Look up a code by name, `None` if unrecognized
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<u8> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Look up a code by name, defaulting unknown names to 0 (general)
    #[must_use]
    pub fn value_for(&self, name: &str) -> u8 {
        self.code_for(name).unwrap_or(0)
    }

    /// Look up the canonical name for a code
    #[must_use]
    pub fn name_for(&self, code: u8) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    fn sorted_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        // Longest first, then lexicographic for a stable pattern
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names
    }

    /// Compiled alternation matching any recognized category name
    ///
    /// Built on first use and cached for the life of the mapping.
    pub fn regexp(&self) -> &Regex {
        self.alternation.get_or_init(|| {
            let pattern = self
                .sorted_names()
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .expect("escaped alternation is always a valid pattern")
        })
    }

    fn prefix_regexp(&self) -> &Regex {
        self.prefix.get_or_init(|| {
            let pattern = self
                .sorted_names()
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            RegexBuilder::new(&format!("^({pattern}):(.+)$"))
                .case_insensitive(true)
                .build()
                .expect("escaped alternation is always a valid pattern")
        })
    }

    /// Split a `category:tag` prefixed name into its code and bare name
    ///
    /// Returns `None` when the name carries no recognized category prefix.
    #[must_use]
    pub fn split_prefix<'a>(&self, name: &'a str) -> Option<(u8, &'a str)> {
        let captures = self.prefix_regexp().captures(name)?;
        let code = self.value_for(captures.get(1)?.as_str());
        let bare = captures.get(2)?.as_str();
        Some((code, bare))
    }
}

/// Cache-backed category lookups against the authoritative store
pub struct CategoryResolver {
    mapping: CategoryMapping,
    cache: Arc<TagCache>,
    store: Arc<dyn TagStore>,
    ttl: Duration,
}

impl CategoryResolver {
    #[must_use]
    pub fn new(config: &TagQueryConfig, cache: Arc<TagCache>, store: Arc<dyn TagStore>) -> Self {
        Self {
            mapping: CategoryMapping::new(&config.categories),
            cache,
            store,
            ttl: Duration::from_secs(config.category_cache_ttl_secs),
        }
    }

    /// The fixed name/code mapping
    #[must_use]
    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }

    fn cache_key(name: &str) -> String {
        format!("tc:{}", TagCache::sanitize(name))
    }

    /// Category code for a tag name, cached for the configured TTL
    ///
    /// On miss falls through to the store; tags that do not exist resolve
    /// to 0 (general).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a cache miss cannot be filled from the store.
    pub fn category_for(&self, name: &str) -> Result<u8, StoreError> {
        let value = self.cache.fetch(&Self::cache_key(name), self.ttl, || {
            self.store
                .select_category(name)
                .map(|code| json!(code.unwrap_or(0)))
        })?;

        Ok(value.as_u64().unwrap_or(0) as u8)
    }

    /// Batched category lookup, computing only the names that missed
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a cache miss cannot be filled from the store.
    pub fn categories_for(&self, names: &[String]) -> Result<HashMap<String, u8>, StoreError> {
        let values = self.cache.get_multi(names, "tc", self.ttl, |name| {
            self.store
                .select_category(name)
                .map(|code| json!(code.unwrap_or(0)))
        })?;

        Ok(values
            .into_iter()
            .map(|(name, value)| (name, value.as_u64().unwrap_or(0) as u8))
            .collect())
    }

    /// Write a tag's category through the cache
    ///
    /// Must be called on every category save, under the same key scheme
    /// and TTL as reads, so readers never see staleness beyond the TTL.
    pub fn update_category_cache(&self, name: &str, category: u8) {
        self.cache
            .put(&Self::cache_key(name), json!(category), self.ttl);
    }
}

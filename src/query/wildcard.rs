//! Wildcard tag pattern expansion
//!
//! Turns a `*`-bearing token into a bounded list of concrete tag names by
//! querying the store with a SQL-LIKE pattern. Literal `%`, `_`, and `\`
//! already present in the token are escaped before `*` is substituted, so
//! user content never wildcards by accident.

use std::sync::Arc;

use super::types::UNMATCHED_TAG;
use crate::TagQueryConfig;
use crate::store::{StoreError, TagStore};

/// Suggestion results cap
const SUGGESTION_LIMIT: usize = 6;

/// Expands wildcard patterns against the tag index
pub struct WildcardExpander {
    store: Arc<dyn TagStore>,
    limit: usize,
}

impl WildcardExpander {
    #[must_use]
    pub fn new(config: &TagQueryConfig, store: Arc<dyn TagStore>) -> Self {
        Self {
            store,
            limit: config.wildcard_limit,
        }
    }

    /// Escape LIKE metacharacters so they match literally
    #[must_use]
    pub fn escape_like(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    /// Translate a `*` pattern into its LIKE equivalent
    #[must_use]
    pub fn to_like_pattern(pattern: &str) -> String {
        Self::escape_like(pattern).replace('*', "%")
    }

    /// Expand a `*`-containing pattern into matching tag names
    ///
    /// Results come back ordered by descending post popularity and capped
    /// at the configured limit. Zero matches yields the single
    /// [`UNMATCHED_TAG`] sentinel so the include set never ends up empty
    /// from a wildcard miss.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be queried.
    pub fn expand(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let like = Self::to_like_pattern(pattern);
        let matches = self.store.search_by_like_pattern(&like, self.limit)?;

        if matches.is_empty() {
            Ok(vec![UNMATCHED_TAG.to_string()])
        } else {
            Ok(matches)
        }
    }

    /// Suggest existing tag names close to a query name
    ///
    /// A two-token underscored name searches for its reversed form, so
    /// `blue_sky` suggests `sky_blue`; any other shape searches for names
    /// containing the query. Only tags with posts qualify, the query name
    /// itself is excluded, and the most popular matches come back sorted
    /// alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be queried.
    pub fn suggestions_for(&self, query: &str) -> Result<Vec<String>, StoreError> {
        let tokens: Vec<&str> = query.split('_').collect();
        let pattern = if tokens.len() == 2 {
            Self::escape_like(&format!("{}_{}", tokens[1], tokens[0]))
        } else {
            format!("%{}%", Self::escape_like(query))
        };

        let mut names = self
            .store
            .search_suggestions(&pattern, query, SUGGESTION_LIMIT)?;
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagRecord;
    use crate::store::MemoryStore;

    fn expander(store: Arc<MemoryStore>) -> WildcardExpander {
        WildcardExpander::new(&TagQueryConfig::default(), store)
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(WildcardExpander::escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(WildcardExpander::escape_like("a\\b"), "a\\\\b");
        assert_eq!(WildcardExpander::escape_like("plain"), "plain");
    }

    #[test]
    fn test_to_like_pattern() {
        assert_eq!(WildcardExpander::to_like_pattern("fo*"), "fo%");
        assert_eq!(WildcardExpander::to_like_pattern("*_*"), "%\\_%");
    }

    #[test]
    fn test_expand_orders_by_popularity() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tag(TagRecord::new("food").with_post_count(50));
        store.insert_tag(TagRecord::new("foo").with_post_count(100));
        store.insert_tag(TagRecord::new("bar").with_post_count(999));

        let names = expander(store).expand("fo*").unwrap();
        assert_eq!(names, vec!["foo".to_string(), "food".to_string()]);
    }

    #[test]
    fn test_expand_no_matches_yields_sentinel() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tag(TagRecord::new("foo"));

        let names = expander(store).expand("zzz*").unwrap();
        assert_eq!(names, vec![UNMATCHED_TAG.to_string()]);
    }

    #[test]
    fn test_expand_respects_limit() {
        let config = TagQueryConfig {
            wildcard_limit: 2,
            ..TagQueryConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        for i in 0..5 {
            store.insert_tag(TagRecord::new(format!("tag{i}")).with_post_count(i));
        }

        let expander = WildcardExpander::new(&config, store);
        let names = expander.expand("tag*").unwrap();
        assert_eq!(names, vec!["tag4".to_string(), "tag3".to_string()]);
    }

    #[test]
    fn test_suggestions_reverse_two_token_names() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tag(TagRecord::new("sky_blue").with_post_count(10));
        store.insert_tag(TagRecord::new("blue_sky").with_post_count(5));

        let names = expander(store).suggestions_for("blue_sky").unwrap();
        assert_eq!(names, vec!["sky_blue".to_string()]);
    }

    #[test]
    fn test_suggestions_contains_match_for_single_token() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tag(TagRecord::new("foo").with_post_count(100));
        store.insert_tag(TagRecord::new("seafood").with_post_count(80));
        store.insert_tag(TagRecord::new("food").with_post_count(50));
        store.insert_tag(TagRecord::new("foot").with_post_count(0));

        // The query itself and postless tags are not suggestions;
        // output is alphabetical
        let names = expander(store).suggestions_for("foo").unwrap();
        assert_eq!(names, vec!["food".to_string(), "seafood".to_string()]);
    }

    #[test]
    fn test_suggestions_keep_most_popular_then_sort() {
        let store = Arc::new(MemoryStore::new());
        for (name, count) in [
            ("cat_a", 70),
            ("cat_b", 60),
            ("cat_c", 50),
            ("cat_d", 40),
            ("cat_e", 30),
            ("cat_f", 20),
            ("cat_g", 10),
        ] {
            store.insert_tag(TagRecord::new(name).with_post_count(count));
        }

        let names = expander(store).suggestions_for("cat").unwrap();
        assert_eq!(
            names,
            vec![
                "cat_a".to_string(),
                "cat_b".to_string(),
                "cat_c".to_string(),
                "cat_d".to_string(),
                "cat_e".to_string(),
                "cat_f".to_string()
            ]
        );
    }

    #[test]
    fn test_literal_underscore_does_not_wildcard() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tag(TagRecord::new("a_b").with_post_count(1));
        store.insert_tag(TagRecord::new("axb").with_post_count(2));

        let names = expander(store).expand("a_*").unwrap();
        assert_eq!(names, vec!["a_b".to_string()]);
    }
}

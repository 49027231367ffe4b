//! The query parser
//!
//! Turns a free-form search string into a [`StructuredQuery`]. Parsing is
//! a single forward pass: each token either matches a recognized
//! `field:value` prefix and feeds a typed metadata filter, or falls
//! through to tag-clause parsing. The parser never rejects input; typos
//! and unknown prefixes become plain tag clauses, and every malformed
//! value degrades to an unsatisfiable clause instead of an error.

use std::collections::HashSet;
use std::sync::Arc;

use super::range::parse_cast;
use super::types::{CastType, NO_SUCH_ENTITY, QueryValue, RangeExpr, StructuredQuery, TagSets};
use super::wildcard::WildcardExpander;
use crate::TagQueryConfig;
use crate::store::{AliasStore, NameResolver, StoreError, TagStore};
use crate::tag::AliasResolver;

/// Parses search strings against an index and its metadata resolvers
///
/// Stateless between calls; safe to share across threads behind an `Arc`.
pub struct QueryParser {
    aliases: AliasResolver,
    wildcards: WildcardExpander,
    names: Arc<dyn NameResolver>,
}

impl QueryParser {
    #[must_use]
    pub fn new(
        config: &TagQueryConfig,
        store: Arc<dyn TagStore>,
        alias_store: Arc<dyn AliasStore>,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            aliases: AliasResolver::new(alias_store),
            wildcards: WildcardExpander::new(config, store),
            names,
        }
    }

    /// Tokenize a query: lowercase, split on whitespace, de-duplicate
    /// preserving first-seen order
    #[must_use]
    pub fn scan_query(text: &str) -> Vec<String> {
        let normalized = text.trim().to_lowercase();

        let mut seen = HashSet::new();
        normalized
            .split_whitespace()
            .filter(|t| seen.insert(t.to_string()))
            .map(ToString::to_string)
            .collect()
    }

    /// Parse a query string into its structured form
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only for collaborator infrastructure failures;
    /// no user input can make this fail.
    pub fn parse_query(&self, text: &str) -> Result<StructuredQuery, StoreError> {
        let mut query = StructuredQuery::default();

        for token in Self::scan_query(text) {
            if let Some((field, value)) = token.split_once(':')
                && !value.is_empty()
                && self.parse_field(&mut query, field, value)?
            {
                continue;
            }
            self.parse_tag(&mut query.tags, &token)?;
        }

        query.tags.exclude = self.aliases.to_aliased(&query.tags.exclude)?;
        query.tags.include = self.aliases.to_aliased(&query.tags.include)?;
        query.tags.related = self.aliases.to_aliased(&query.tags.related)?;

        Ok(query)
    }

    /// Dispatch a recognized `field:value` token; returns false when the
    /// field keyword is unknown and the token should be read as a tag
    fn parse_field(
        &self,
        q: &mut StructuredQuery,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        match field {
            "-uploader" => q.uploader_id_neg.push(self.user_id(value)?),
            "uploader" => q.uploader_id = Some(self.user_id(value)?),
            "-approver" => q.approver_id_neg.push(self.user_id(value)?),
            "approver" => q.approver_id = Some(self.user_id(value)?),
            "-pool" => {
                let id = self.pool_ref(value)?;
                q.tags.exclude.push(format!("pool:{id}"));
            }
            "pool" => {
                let id = self.pool_ref(value)?;
                q.tags.related.push(format!("pool:{id}"));
            }
            "-fav" => {
                let id = self.user_ref(value)?;
                q.tags.exclude.push(format!("fav:{id}"));
            }
            "fav" => {
                let id = self.user_ref(value)?;
                q.tags.related.push(format!("fav:{id}"));
            }
            "sub" => q.subscriptions.push(value.to_string()),
            "md5" => q.md5 = value.split(',').map(ToString::to_string).collect(),
            "-rating" => q.rating_negated = Some(value.to_string()),
            "rating" => q.rating = Some(value.to_string()),
            "id" => q.post_id = Some(RangeExpr::parse(value, CastType::Integer)),
            "width" => q.width = Some(RangeExpr::parse(value, CastType::Integer)),
            "height" => q.height = Some(RangeExpr::parse(value, CastType::Integer)),
            "mpixels" => q.mpixels = Some(RangeExpr::parse(value, CastType::Float)),
            "score" => q.score = Some(RangeExpr::parse(value, CastType::Integer)),
            "filesize" => q.filesize = Some(RangeExpr::parse(value, CastType::Filesize)),
            "source" => {
                q.source = Some(format!("{}%", WildcardExpander::escape_like(value)));
            }
            "date" => q.date = Some(RangeExpr::parse(value, CastType::Date)),
            "tagcount" => q.tag_count = Some(RangeExpr::parse(value, CastType::Integer)),
            "gentags" => {
                q.general_tag_count = Some(RangeExpr::parse(value, CastType::Integer));
            }
            "arttags" => {
                q.artist_tag_count = Some(RangeExpr::parse(value, CastType::Integer));
            }
            "chartags" => {
                q.character_tag_count = Some(RangeExpr::parse(value, CastType::Integer));
            }
            "copytags" => {
                q.copyright_tag_count = Some(RangeExpr::parse(value, CastType::Integer));
            }
            "parent" => {
                q.parent_id = Some(match parse_cast(value, CastType::Integer) {
                    QueryValue::Integer(id) => id,
                    _ => NO_SUCH_ENTITY,
                });
            }
            "order" => q.order = Some(value.to_string()),
            "status" => q.status = Some(value.to_string()),
            _ => return Ok(false),
        }

        Ok(true)
    }

    /// Route a bare token into the tag clause sets
    fn parse_tag(&self, sets: &mut TagSets, token: &str) -> Result<(), StoreError> {
        if let Some(stripped) = token.strip_prefix('-')
            && !stripped.is_empty()
        {
            sets.exclude.push(stripped.to_string());
        } else if let Some(stripped) = token.strip_prefix('~')
            && !stripped.is_empty()
        {
            sets.include.push(stripped.to_string());
        } else if token.contains('*') {
            sets.include.extend(self.wildcards.expand(token)?);
        } else {
            sets.related.push(token.to_string());
        }

        Ok(())
    }

    fn user_id(&self, name: &str) -> Result<i64, StoreError> {
        Ok(self.names.user_name_to_id(name)?.unwrap_or(NO_SUCH_ENTITY))
    }

    /// User reference for a synthetic `fav:` clause; numeric values are
    /// already ids and pass through
    fn user_ref(&self, value: &str) -> Result<i64, StoreError> {
        if let Ok(id) = value.parse::<i64>() {
            return Ok(id);
        }
        self.user_id(value)
    }

    /// Pool reference for a synthetic `pool:` clause; numeric values are
    /// already ids and pass through
    fn pool_ref(&self, value: &str) -> Result<i64, StoreError> {
        if let Ok(id) = value.parse::<i64>() {
            return Ok(id);
        }
        Ok(self.names.pool_name_to_id(value)?.unwrap_or(NO_SUCH_ENTITY))
    }
}

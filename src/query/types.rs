//! Structured query representation
//!
//! Output types of the parser. Tag clauses are the boolean core
//! (related = AND, include = OR, exclude = NOT); everything else is a
//! typed metadata filter. Scalar fields are last-occurrence-wins when a
//! query repeats them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved tag name guaranteed to match no real content
///
/// Substituted when a wildcard pattern matches nothing, so a wildcard
/// miss never collapses the include set to empty (which would mean
/// "no OR constraint" rather than "explicitly match nothing").
pub const UNMATCHED_TAG: &str = "~no_matches~";

/// Sentinel id for user/pool names that did not resolve
///
/// The query stays valid but the clause can never match.
pub const NO_SUCH_ENTITY: i64 = -1;

/// Declared operand type for range parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Integer,
    Float,
    Date,
    Filesize,
}

/// A typed comparison operand
///
/// `None` represents a malformed operand: the surrounding comparison
/// becomes unsatisfiable instead of raising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Filesize(u64),
    None,
}

/// A parsed comparison over one metadata field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeExpr {
    Eq(QueryValue),
    Lt(QueryValue),
    Lte(QueryValue),
    Gt(QueryValue),
    Gte(QueryValue),
    Between(QueryValue, QueryValue),
}

/// The three tag clause sets forming the boolean match expression
///
/// Wildcard expansions land in `include` in popularity order, so these
/// are vectors rather than sets; token-level de-duplication already
/// happened during scanning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSets {
    /// Implicit AND tags
    pub related: Vec<String>,
    /// OR tags (`~tag` and wildcard expansions)
    pub include: Vec<String>,
    /// NOT tags (`-tag`)
    pub exclude: Vec<String>,
}

/// A fully parsed search query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub tags: TagSets,
    pub uploader_id: Option<i64>,
    pub uploader_id_neg: Vec<i64>,
    pub approver_id: Option<i64>,
    pub approver_id_neg: Vec<i64>,
    pub subscriptions: Vec<String>,
    pub md5: Vec<String>,
    pub rating: Option<String>,
    pub rating_negated: Option<String>,
    /// LIKE prefix pattern built from `source:`
    pub source: Option<String>,
    pub post_id: Option<RangeExpr>,
    pub width: Option<RangeExpr>,
    pub height: Option<RangeExpr>,
    pub mpixels: Option<RangeExpr>,
    pub score: Option<RangeExpr>,
    pub filesize: Option<RangeExpr>,
    pub date: Option<RangeExpr>,
    pub tag_count: Option<RangeExpr>,
    pub general_tag_count: Option<RangeExpr>,
    pub artist_tag_count: Option<RangeExpr>,
    pub character_tag_count: Option<RangeExpr>,
    pub copyright_tag_count: Option<RangeExpr>,
    pub parent_id: Option<i64>,
    pub order: Option<String>,
    pub status: Option<String>,
}

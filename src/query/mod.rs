//! Query language parsing
//!
//! The apex of the library: [`QueryParser::parse_query`] is the sole
//! entry point the search executor consumes. Supporting pieces are the
//! structured query types, the comparison sub-grammar, and wildcard
//! expansion.

pub mod parser;
pub mod range;
pub mod types;
pub mod wildcard;

pub use parser::QueryParser;
pub use range::parse_cast;
pub use types::{
    CastType, NO_SUCH_ENTITY, QueryValue, RangeExpr, StructuredQuery, TagSets, UNMATCHED_TAG,
};
pub use wildcard::WildcardExpander;

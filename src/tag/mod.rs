//! Tag metadata services
//!
//! One primary [`TagRecord`](crate::TagRecord) data type plus free-standing
//! services that take a tag or name as an explicit argument: name
//! normalization, category resolution, alias resolution, and the lazy
//! related-tag refresh. No behavior lives on the record itself beyond
//! plain data access.

pub mod alias;
pub mod category;
pub mod name;
pub mod related;

pub use alias::AliasResolver;
pub use category::{CategoryMapping, CategoryResolver};
pub use name::{normalize_name, scan_tags};
pub use related::{BackgroundQueue, RayonQueue, RelatedTagService};

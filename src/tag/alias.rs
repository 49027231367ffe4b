//! Tag alias resolution
//!
//! Maps deprecated or variant tag names to their canonical targets. The
//! alias chain itself is owned by an external collaborator; this service
//! is the single point the parser goes through before a structured query
//! is considered final, tying lexical tokens to indexed tag names.

use std::sync::Arc;

use crate::store::{AliasStore, StoreError};

/// Resolves raw tag names to their canonical aliased forms
pub struct AliasResolver {
    store: Arc<dyn AliasStore>,
}

impl AliasResolver {
    #[must_use]
    pub fn new(store: Arc<dyn AliasStore>) -> Self {
        Self { store }
    }

    /// Map each name to its canonical target; unaliased names pass through
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the alias chain cannot be read.
    pub fn to_aliased(&self, names: &[String]) -> Result<Vec<String>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.store.resolve_aliases(names)
    }
}

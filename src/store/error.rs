//! Store-specific error types
//!
//! These are the only infrastructure-level failures in the library. The
//! query parser itself never fails on user input; everything that can go
//! wrong during parsing is absorbed into "this clause matches nothing"
//! semantics. Collaborator connectivity problems propagate unchanged.

use thiserror::Error;

/// Errors raised by the authoritative store and its sibling collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query against the backing store failed
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// Invalid input provided to a store operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

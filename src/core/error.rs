//! Shared error types.
//!
//! Components return structured values for expected failure kinds
//! (validation, capacity, cheater/timing) rather than raising exceptions;
//! `CoreError` exists only for the rare cross-component context (e.g. a
//! collaborator sink failing) that needs a single umbrella type.

use thiserror::Error;

/// Umbrella error for code paths that bridge multiple components.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("session error: {0}")]
    Session(#[from] crate::game::session::SessionError),

    #[error("collaborator sink failed: {0}")]
    Collaborator(String),
}

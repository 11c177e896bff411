//! Error types for hermit-solver.

use thiserror::Error;

use hermit_data::DataError;
use hermit_store::StoreError;

/// Errors that can occur in solver operations.
#[derive(Debug, Error)]
pub enum SolverError {
    /// No in-flight match with the given id.
    #[error("match not found: {0}")]
    MatchNotFound(String),

    /// Illegal match lifecycle transition.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    /// A tracked match references offers the store no longer holds.
    ///
    /// This is an internal invariant violation; the operation is aborted
    /// and the store left unchanged.
    #[error("store inconsistency: {0}")]
    Inconsistent(String),

    /// Record encoding or identity derivation failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

//! Error kinds shared across every MLG crate.
//!
//! The taxonomy mirrors the error model: DAOs recover `NotFound` locally
//! by returning [`crate::Id::INVALID`], so it is rarely constructed outside
//! of `mlg-store`. Everything else is surfaced with `?` up through the MLG
//! DAO, coarsener, builder, filter and extractor.

use thiserror::Error;

/// The error type returned by fallible operations across the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An operation addressed an id that does not exist.
    ///
    /// Entity DAOs recover this locally (returning an invalid-id sentinel);
    /// it escapes as an `Err` only from store-adapter calls that have no
    /// sentinel to return (e.g. attribute statistics on an empty database).
    #[error("not found: {0}")]
    NotFound(String),

    /// Out-of-range configuration, malformed plan, mismatched layer
    /// affiliation, or any other caller error.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying store rejected an operation.
    ///
    /// The host session is no longer safe to commit once this is returned;
    /// the caller must roll back.
    #[error("store error: {0}")]
    StoreError(String),

    /// A postcondition check failed (e.g. base-layer flag missing after a
    /// remove). Always fatal to the current operation.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Shorthand for [`Error::StoreError`].
    pub fn store(msg: impl Into<String>) -> Self {
        Error::StoreError(msg.into())
    }

    /// Shorthand for [`Error::InvariantViolated`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolated(msg.into())
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

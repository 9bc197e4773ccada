// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the chunking operator.
//!
//! Every failure that terminates a chunked stream is one of three kinds:
//!
//! - [`ChunkError::InvalidArgument`] - the call site passed an absent source or a
//!   batch size below [`MIN_CHUNK_SIZE`]
//! - [`ChunkError::Cancelled`] - the cooperative cancellation token was observed
//! - [`ChunkError::Source`] - the upstream source failed; the original error is kept by value
//!
//! # Examples
//!
//! ```
//! use chunkwise_core::{ChunkError, ChunkResult};
//!
//! fn check_size(n: usize) -> ChunkResult<()> {
//!     if n == 0 {
//!         return Err(ChunkError::chunk_size_too_small(n));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_size(0).unwrap_err().is_invalid_argument());
//! ```

use std::convert::Infallible;

/// Smallest batch size accepted by the operator.
pub const MIN_CHUNK_SIZE: usize = 1;

/// Terminal failure of a chunked stream.
///
/// `E` is the error type of the upstream source. Sources that cannot fail use the
/// default, [`Infallible`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError<E = Infallible> {
    /// The operator was invoked with an invalid argument.
    ///
    /// Raised on the first poll, before the source is touched. Never retried:
    /// the call site has to be fixed.
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: &'static str,
        /// What the parameter violated
        reason: String,
    },

    /// The cancellation token was signalled.
    ///
    /// Any partially filled batch has been discarded.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The source failed while being pulled.
    ///
    /// Display and `source()` forward to the wrapped error.
    #[error(transparent)]
    Source(E),
}

impl<E> ChunkError<E> {
    /// Create an invalid argument error for `parameter`
    pub fn invalid_argument(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter,
            reason: reason.into(),
        }
    }

    /// The error reported when no source was supplied
    pub fn missing_source() -> Self {
        Self::invalid_argument("source", "source is required")
    }

    /// The error reported when the batch size is below [`MIN_CHUNK_SIZE`]
    pub fn chunk_size_too_small(actual: usize) -> Self {
        Self::invalid_argument(
            "max_chunk_size",
            format!("must be at least {MIN_CHUNK_SIZE}, got {actual}"),
        )
    }

    /// Returns `true` for [`ChunkError::InvalidArgument`]
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` for [`ChunkError::Cancelled`]
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` for [`ChunkError::Source`]
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Check if this is a recoverable error
    ///
    /// The operator never retries, so nothing it reports is recoverable in place.
    /// Retrying is up to the caller, around a fresh invocation.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    /// Check if this error indicates a permanent failure
    ///
    /// Invalid arguments fail the same way on every invocation.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Borrow the source error, if this is one
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Source(e) => Some(e),
            _ => None,
        }
    }

    /// Take the source error out, if this is one
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Source(e) => Some(e),
            _ => None,
        }
    }

    /// Map the source error, leaving the other variants untouched
    pub fn map_source<F, O>(self, f: O) -> ChunkError<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            Self::InvalidArgument { parameter, reason } => {
                ChunkError::InvalidArgument { parameter, reason }
            }
            Self::Cancelled => ChunkError::Cancelled,
            Self::Source(e) => ChunkError::Source(f(e)),
        }
    }
}

impl ChunkError<Infallible> {
    /// Convert an error from an infallible source into any source error type
    pub fn widen<E>(self) -> ChunkError<E> {
        self.map_source(|never| match never {})
    }
}

/// Specialized Result type for chunking operations
///
/// # Examples
///
/// ```
/// use chunkwise_core::ChunkResult;
///
/// fn batch() -> ChunkResult<Vec<u8>> {
///     Ok(vec![1, 2, 3])
/// }
/// ```
pub type ChunkResult<T, E = Infallible> = std::result::Result<T, ChunkError<E>>;

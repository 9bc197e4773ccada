// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Configuration for the [`chunk_by_count`](crate::chunk_by_count()) operator.
//!
//! ```
//! use chunkwise_stream::ChunkConfig;
//!
//! let config = ChunkConfig::new(1_000_000).with_preallocation_limit(1024);
//! assert_eq!(config.initial_capacity(), 1024);
//! assert!(config.validate::<std::convert::Infallible>().is_ok());
//! ```

use chunkwise_core::{ChunkError, MIN_CHUNK_SIZE};

/// Default cap on the number of elements reserved up front for a batch (64 Ki).
pub const DEFAULT_PREALLOCATION_LIMIT: usize = 64 * 1024;

/// Batch size plus allocation policy for one operator invocation.
///
/// Constructing a config never fails. An invalid size is reported by the operator when
/// its output is first polled, or eagerly through [`ChunkConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    max_chunk_size: usize,
    preallocation_limit: usize,
}

impl ChunkConfig {
    /// Creates a config producing batches of up to `max_chunk_size` elements.
    pub const fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size,
            preallocation_limit: DEFAULT_PREALLOCATION_LIMIT,
        }
    }

    /// Caps the capacity reserved for each new batch.
    ///
    /// Batches are pre-sized to `min(max_chunk_size, limit)` elements and still grow to
    /// `max_chunk_size` when needed. Keeps huge batch sizes from reserving memory that
    /// a short source would never fill.
    pub const fn with_preallocation_limit(mut self, limit: usize) -> Self {
        self.preallocation_limit = limit;
        self
    }

    /// Returns the batch size.
    pub const fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Returns the preallocation cap.
    pub const fn preallocation_limit(&self) -> usize {
        self.preallocation_limit
    }

    /// Capacity reserved for a fresh batch buffer.
    pub fn initial_capacity(&self) -> usize {
        self.max_chunk_size.min(self.preallocation_limit)
    }

    /// Checks the config, returning the error the operator would report.
    ///
    /// # Errors
    ///
    /// [`ChunkError::InvalidArgument`] if `max_chunk_size` is below
    /// [`MIN_CHUNK_SIZE`] or `preallocation_limit` is zero.
    pub fn validate<E>(&self) -> Result<(), ChunkError<E>> {
        if self.max_chunk_size < MIN_CHUNK_SIZE {
            return Err(ChunkError::chunk_size_too_small(self.max_chunk_size));
        }

        if self.preallocation_limit == 0 {
            return Err(ChunkError::invalid_argument(
                "preallocation_limit",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

impl From<usize> for ChunkConfig {
    fn from(max_chunk_size: usize) -> Self {
        Self::new(max_chunk_size)
    }
}

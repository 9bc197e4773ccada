// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Chunkwise
//!
//! Lazy, cancellable fixed-size batching for async streams.
//!
//! Chunkwise turns a stream of items into a stream of `Vec` batches of a fixed size,
//! emitting every batch as soon as it fills and a shorter final batch when the source
//! ends. Nothing runs until the batches are polled, and every invocation observes a
//! [`CancellationToken`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chunkwise::prelude::*;
//! use futures::{stream, TryStreamExt};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ChunkError<std::io::Error>> {
//! let lines = stream::iter(["a", "b", "c", "d", "e"].map(Ok::<_, std::io::Error>));
//!
//! let batches: Vec<Vec<&str>> = lines
//!     .chunk_by_count(2, CancellationToken::new())
//!     .try_collect()
//!     .await?;
//!
//! assert_eq!(batches, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stopping Early
//!
//! ```rust
//! use chunkwise::prelude::*;
//! use futures::{stream, StreamExt};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let token = CancellationToken::new();
//! let mut batches = stream::iter(0..100).chunk_values(10, token.clone());
//!
//! assert_eq!(batches.next().await, Some(Ok((0..10).collect())));
//!
//! token.cancel();
//! assert_eq!(batches.next().await, Some(Err(ChunkError::Cancelled)));
//! assert_eq!(batches.next().await, None);
//! # }
//! ```
//!
//! ## Crates
//!
//! - `chunkwise-core`: [`ChunkError`] and [`CancellationToken`]
//! - `chunkwise-stream`: the [`ChunkByCount`] operator and [`ChunkConfig`]

// Re-export core types
pub use chunkwise_core::{
    CancellationToken, ChunkError, ChunkResult, WaitForCancellation, MIN_CHUNK_SIZE,
};

// Re-export the operator
pub use chunkwise_stream::{
    chunk_by_count, chunk_by_count_with_config, ChunkByCount, ChunkByCountExt, ChunkConfig,
    ChunkValuesExt, IntoFallible, DEFAULT_PREALLOCATION_LIMIT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use chunkwise_stream::prelude::*;
}

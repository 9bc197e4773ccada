// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy, cancellable fixed-size batching for async streams.
//!
//! This crate provides [`chunk_by_count`](crate::chunk_by_count()), an operator that groups
//! a stream into consecutive batches of at most `n` items and emits each batch as soon
//! as it fills.
//!
//! # Architecture
//!
//! - **[`ChunkByCount`]**: the output stream, a pinned state machine over the source
//! - **[`ChunkConfig`]**: batch size plus a cap on up-front buffer reservation
//! - **Extension traits**: [`ChunkByCountExt`] for fallible streams, [`ChunkValuesExt`]
//!   for plain ones
//! - **Cooperative cancellation**: every invocation observes a
//!   [`CancellationToken`](chunkwise_core::CancellationToken)
//!
//! # Guarantees
//!
//! For a source of `L` items and batch size `n`:
//!
//! 1. Exactly `ceil(L / n)` batches are produced
//! 2. Every batch except possibly the last holds `n` items; the last holds `L - n * floor((L - 1) / n)`
//! 3. Concatenating the batches gives the source sequence back, in order
//! 4. The source is pulled once per item and never again after it reports the end
//!
//! # Example
//!
//! ```
//! use chunkwise_core::CancellationToken;
//! use chunkwise_stream::ChunkByCountExt;
//! use futures::{stream, TryStreamExt};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let rows = stream::iter((1..=7).map(Ok::<_, std::io::Error>));
//!
//! let batches: Vec<Vec<i32>> = rows
//!     .chunk_by_count(3, CancellationToken::new())
//!     .try_collect()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
//! # }
//! ```
//!
//! # Features
//!
//! - `tracing` (default): operator lifecycle events are logged through `tracing`

#![allow(clippy::multiple_crate_versions)]

mod logging;

pub mod chunk_by_count;
pub mod chunk_config;
pub mod prelude;

pub use self::chunk_by_count::{
    chunk_by_count, chunk_by_count_with_config, ChunkByCount, ChunkByCountExt, ChunkValuesExt,
    IntoFallible,
};
pub use self::chunk_config::{ChunkConfig, DEFAULT_PREALLOCATION_LIMIT};

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the chunkwise workspace.
//!
//! This crate provides instrumented sources, channels and assertion helpers for testing
//! the batching operator. It is designed for use in development and testing only, not
//! for production code.
//!
//! # Sources
//!
//! - [`test_channel`] / [`test_channel_with_errors`]: push items imperatively from the test
//! - [`ok_stream`]: a ready-made fallible stream over an iterator
//! - [`PullCountingStream`]: records polls, yielded items and drop
//! - [`ErrorInjectingStream`]: fails at a chosen position
//! - [`CancellingStream`]: cancels a token at a chosen position
//!
//! # Using Assertion Helpers
//!
//! ```rust
//! use chunkwise_test_utils::assert_no_element_emitted;
//! use futures::stream;
//!
//! # async fn example() {
//! let mut pending = stream::pending::<i32>();
//! assert_no_element_emitted(&mut pending, 10).await;
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod cancelling_stream;
pub mod error_injection;
pub mod helpers;
pub mod pull_counter;
pub mod test_error;

use futures::{stream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub use cancelling_stream::CancellingStream;
pub use error_injection::ErrorInjectingStream;
pub use helpers::{assert_no_element_emitted, assert_stream_ended, unwrap_batch, unwrap_stream};
pub use pull_counter::{PullCounter, PullCountingStream};
pub use test_error::TestError;

/// Creates a test channel whose stream wraps every sent value in `Ok`.
///
/// The stream ends once every sender has been dropped.
///
/// ```rust
/// use chunkwise_test_utils::test_channel;
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel();
///
/// tx.send(42).unwrap();
/// assert_eq!(stream.next().await, Some(Ok(42)));
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (
    mpsc::UnboundedSender<T>,
    impl Stream<Item = Result<T, TestError>> + Send + Unpin,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx).map(Ok::<T, TestError>);
    (tx, stream)
}

/// Creates a test channel that accepts `Result<T, TestError>` for testing error propagation.
pub fn test_channel_with_errors<T: Send + 'static>() -> (
    mpsc::UnboundedSender<Result<T, TestError>>,
    impl Stream<Item = Result<T, TestError>> + Send + Unpin,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    (tx, stream)
}

/// A fallible stream over `items` that never fails.
pub fn ok_stream<I>(items: I) -> impl Stream<Item = Result<I::Item, TestError>> + Unpin
where
    I: IntoIterator,
{
    stream::iter(items.into_iter().map(Ok::<I::Item, TestError>))
}

/// The sequence `1..=len`.
pub fn numbers(len: usize) -> Vec<usize> {
    (1..=len).collect()
}

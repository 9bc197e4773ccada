// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Chunk-by-count operator that batches stream items into fixed-size vectors.
//!
//! # Overview
//!
//! [`chunk_by_count`](crate::chunk_by_count()) collects consecutive items into batches of
//! `n`. Every full batch is emitted as soon as its last item arrives; a trailing partial
//! batch is emitted when the source ends. An empty source produces no batches at all,
//! never an empty one.
//!
//! ```
//! use chunkwise_core::CancellationToken;
//! use chunkwise_stream::ChunkValuesExt;
//! use futures::{stream, StreamExt};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let batches: Vec<_> = stream::iter(1..=5)
//!     .chunk_values(2, CancellationToken::new())
//!     .collect()
//!     .await;
//!
//! assert_eq!(batches, vec![Ok(vec![1, 2]), Ok(vec![3, 4]), Ok(vec![5])]);
//! # }
//! ```
//!
//! # Laziness
//!
//! Nothing happens until the output is polled. Argument validation, the first
//! cancellation check and the first pull all run inside the first `poll_next`.
//!
//! # Cancellation
//!
//! The [`CancellationToken`] is checked before the first pull, each time polling resumes,
//! after every pulled item (which is also the point right before a full batch is
//! handed over) and before the trailing partial batch is emitted. A pending pull is
//! never interrupted. When cancellation is observed, the partially filled batch is
//! dropped and the stream ends with [`ChunkError::Cancelled`].
//!
//! # Error Handling
//!
//! A source error is forwarded unchanged inside [`ChunkError::Source`] and ends the
//! stream; the partially filled batch is dropped. Nothing is retried.
//!
//! # Allocation
//!
//! Each batch is a fresh `Vec`, allocated when its first item arrives and pre-sized to
//! [`ChunkConfig::initial_capacity`]. When the batch size exceeds the preallocation
//! limit, the buffer grows geometrically but never past the batch size, so a full batch
//! has exactly `n` slots. Once yielded, a batch belongs to the consumer; the operator
//! keeps no reference to it. The trailing partial batch is shrunk to fit.

use crate::chunk_config::ChunkConfig;
use crate::logging::{debug, trace};
use chunkwise_core::{CancellationToken, ChunkError};
use futures::stream::{FusedStream, Map};
use futures::{ready, Stream, StreamExt, TryStream};
use pin_project::pin_project;
use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    NotStarted,
    Pulling,
    Completed,
    Cancelled,
    Failed,
}

impl ChunkState {
    const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Stream returned by [`chunk_by_count`](crate::chunk_by_count()) and the extension traits.
///
/// Yields `Ok(Vec<T>)` batches in source order, then either ends or yields exactly one
/// `Err` and ends. Fused: after the end, every poll returns `Ready(None)`.
#[pin_project(project = ChunkByCountProj)]
#[must_use = "streams do nothing unless polled"]
pub struct ChunkByCount<S: TryStream> {
    #[pin]
    source: Option<S>,
    config: ChunkConfig,
    cancel: CancellationToken,
    buffer: Option<Vec<S::Ok>>,
    state: ChunkState,
    emitted: usize,
}

impl<S: TryStream> ChunkByCount<S> {
    /// Wraps `source` without touching it.
    ///
    /// An absent source or an invalid config is reported on the first poll.
    pub fn new(source: Option<S>, config: ChunkConfig, cancel: CancellationToken) -> Self {
        Self {
            source,
            config,
            cancel,
            buffer: None,
            state: ChunkState::NotStarted,
            emitted: 0,
        }
    }

    /// The configuration this invocation runs with.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Number of items pulled into the batch currently being filled.
    pub fn buffered_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    /// Number of batches handed to the consumer so far.
    pub fn batches_emitted(&self) -> usize {
        self.emitted
    }
}

impl<S: TryStream> ChunkByCountProj<'_, S> {
    /// Enters a terminal state, releasing the source and any partial batch.
    fn finish(&mut self, state: ChunkState) {
        *self.state = state;
        self.buffer.take();
        self.source.set(None);
    }

    fn cancelled(&mut self) -> ChunkError<S::Error> {
        debug!(
            "chunk_by_count cancelled after {} batches, discarding {} buffered items",
            *self.emitted,
            self.buffer.as_ref().map_or(0, Vec::len)
        );
        self.finish(ChunkState::Cancelled);
        ChunkError::Cancelled
    }
}

fn validate<E>(
    source_present: bool,
    config: &ChunkConfig,
    cancel: &CancellationToken,
) -> Result<(), ChunkError<E>> {
    if !source_present {
        debug!("chunk_by_count rejected: no source");
        return Err(ChunkError::missing_source());
    }

    if let Err(error) = config.validate() {
        debug!(
            "chunk_by_count rejected: max_chunk_size={}, preallocation_limit={}",
            config.max_chunk_size(),
            config.preallocation_limit()
        );
        return Err(error);
    }

    if cancel.is_cancelled() {
        debug!("chunk_by_count cancelled before start");
        return Err(ChunkError::Cancelled);
    }

    Ok(())
}

impl<S: TryStream> Stream for ChunkByCount<S> {
    type Item = Result<Vec<S::Ok>, ChunkError<S::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match *this.state {
                ChunkState::NotStarted => {
                    match validate(this.source.is_some(), this.config, this.cancel) {
                        Ok(()) => *this.state = ChunkState::Pulling,
                        Err(error) => {
                            let state = if error.is_cancelled() {
                                ChunkState::Cancelled
                            } else {
                                ChunkState::Failed
                            };
                            this.finish(state);
                            return Poll::Ready(Some(Err(error)));
                        }
                    }
                }
                ChunkState::Pulling => {
                    // Covers the resume point right after the previous batch was handed over.
                    if this.cancel.is_cancelled() {
                        return Poll::Ready(Some(Err(this.cancelled())));
                    }

                    let Some(source) = this.source.as_mut().as_pin_mut() else {
                        this.finish(ChunkState::Completed);
                        return Poll::Ready(None);
                    };

                    match ready!(source.try_poll_next(cx)) {
                        Some(Ok(item)) => {
                            // Also the last check before a full batch is yielded.
                            if this.cancel.is_cancelled() {
                                return Poll::Ready(Some(Err(this.cancelled())));
                            }

                            let max_chunk_size = this.config.max_chunk_size();
                            let capacity = this.config.initial_capacity();
                            let buffer = this
                                .buffer
                                .get_or_insert_with(|| Vec::with_capacity(capacity));
                            if buffer.len() == buffer.capacity() {
                                // Double, but never past one batch.
                                let headroom = max_chunk_size - buffer.len();
                                buffer.reserve_exact(buffer.len().clamp(1, headroom));
                            }
                            buffer.push(item);

                            if buffer.len() >= max_chunk_size {
                                if let Some(batch) = this.buffer.take() {
                                    *this.emitted += 1;
                                    trace!(
                                        "chunk_by_count emitting batch {} ({} items)",
                                        *this.emitted,
                                        batch.len()
                                    );
                                    return Poll::Ready(Some(Ok(batch)));
                                }
                            }
                        }
                        Some(Err(error)) => {
                            debug!(
                                "chunk_by_count source failed after {} batches, discarding {} buffered items",
                                *this.emitted,
                                this.buffer.as_ref().map_or(0, Vec::len)
                            );
                            this.finish(ChunkState::Failed);
                            return Poll::Ready(Some(Err(ChunkError::Source(error))));
                        }
                        None => {
                            let buffered = this.buffer.as_ref().map_or(0, Vec::len);
                            if buffered > 0 && this.cancel.is_cancelled() {
                                return Poll::Ready(Some(Err(this.cancelled())));
                            }

                            let batch = this.buffer.take();
                            this.finish(ChunkState::Completed);

                            return match batch {
                                Some(mut batch) if !batch.is_empty() => {
                                    batch.shrink_to_fit();
                                    *this.emitted += 1;
                                    trace!(
                                        "chunk_by_count emitting final batch {} ({} items)",
                                        *this.emitted,
                                        batch.len()
                                    );
                                    Poll::Ready(Some(Ok(batch)))
                                }
                                _ => {
                                    trace!(
                                        "chunk_by_count completed after {} batches",
                                        *this.emitted
                                    );
                                    Poll::Ready(None)
                                }
                            };
                        }
                    }
                }
                ChunkState::Completed | ChunkState::Cancelled | ChunkState::Failed => {
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_terminal() {
            return (0, Some(0));
        }

        let max_chunk_size = self.config.max_chunk_size();
        let Some(source) = self.source.as_ref().filter(|_| max_chunk_size > 0) else {
            // Validation will fail: one error item.
            return (0, Some(1));
        };

        // Batches still to come, plus room for one terminal error.
        let upper = source
            .size_hint()
            .1
            .and_then(|remaining| remaining.checked_add(self.buffered_len()))
            .map(|items| items.div_ceil(max_chunk_size).saturating_add(1));

        (0, upper)
    }
}

impl<S: TryStream> FusedStream for ChunkByCount<S> {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

impl<S: TryStream> fmt::Debug for ChunkByCount<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkByCount")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("buffered", &self.buffered_len())
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// Groups a fallible source into batches of up to `max_chunk_size` items.
///
/// `source` is optional so that an absent source is reported like any other invalid
/// argument: as the first and only item of the returned stream, without panicking.
///
/// # Examples
///
/// ```
/// use chunkwise_core::{CancellationToken, ChunkError};
/// use chunkwise_stream::chunk_by_count;
/// use futures::{stream, StreamExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// let source = stream::iter([Ok::<_, std::io::Error>(1), Ok(2), Ok(3)]);
/// let mut batches = chunk_by_count(Some(source), 10, CancellationToken::new());
///
/// assert_eq!(batches.next().await.unwrap().unwrap(), vec![1, 2, 3]);
/// assert!(batches.next().await.is_none());
///
/// // Zero-sized batches are rejected on first poll.
/// let source = stream::iter([Ok::<i32, std::io::Error>(1)]);
/// let mut batches = chunk_by_count(Some(source), 0, CancellationToken::new());
/// assert!(matches!(
///     batches.next().await,
///     Some(Err(ChunkError::InvalidArgument { parameter: "max_chunk_size", .. }))
/// ));
/// # }
/// ```
pub fn chunk_by_count<S: TryStream>(
    source: Option<S>,
    max_chunk_size: usize,
    cancel: CancellationToken,
) -> ChunkByCount<S> {
    ChunkByCount::new(source, ChunkConfig::new(max_chunk_size), cancel)
}

/// Like [`chunk_by_count`](crate::chunk_by_count()) with a full [`ChunkConfig`].
pub fn chunk_by_count_with_config<S: TryStream>(
    source: Option<S>,
    config: ChunkConfig,
    cancel: CancellationToken,
) -> ChunkByCount<S> {
    ChunkByCount::new(source, config, cancel)
}

/// Extension trait providing [`chunk_by_count`](Self::chunk_by_count) on fallible streams.
///
/// Implemented for every [`TryStream`], i.e. every `Stream<Item = Result<T, E>>`. The
/// output is itself a `TryStream`, so chunked streams can be chunked again.
pub trait ChunkByCountExt: TryStream + Sized {
    /// Groups consecutive items into batches of up to `max_chunk_size`.
    ///
    /// # Behavior
    ///
    /// - **Values**: accumulated until the batch holds `max_chunk_size` items, then emitted
    /// - **Completion**: a non-empty partial batch is emitted, then the stream ends
    /// - **Errors**: the partial batch is dropped, the error is emitted, the stream ends
    /// - **Cancellation**: the partial batch is dropped, `ChunkError::Cancelled` is
    ///   emitted, the stream ends
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkwise_core::{CancellationToken, ChunkError};
    /// use chunkwise_stream::ChunkByCountExt;
    /// use futures::{stream, StreamExt};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let source = stream::iter([Ok(1), Ok(2), Ok(3), Err("disk gone"), Ok(5)]);
    /// let mut batches = source.chunk_by_count(2, CancellationToken::new());
    ///
    /// assert_eq!(batches.next().await, Some(Ok(vec![1, 2])));
    /// assert_eq!(batches.next().await, Some(Err(ChunkError::Source("disk gone"))));
    /// assert_eq!(batches.next().await, None);
    /// # }
    /// ```
    fn chunk_by_count(self, max_chunk_size: usize, cancel: CancellationToken) -> ChunkByCount<Self> {
        ChunkByCount::new(Some(self), ChunkConfig::new(max_chunk_size), cancel)
    }

    /// Same as [`chunk_by_count`](Self::chunk_by_count) with a full [`ChunkConfig`].
    fn chunk_by_count_with(self, config: ChunkConfig, cancel: CancellationToken) -> ChunkByCount<Self> {
        ChunkByCount::new(Some(self), config, cancel)
    }
}

impl<S: TryStream> ChunkByCountExt for S {}

/// A plain stream lifted into a stream that never fails.
pub type IntoFallible<S> =
    Map<S, fn(<S as Stream>::Item) -> Result<<S as Stream>::Item, Infallible>>;

/// Extension trait providing [`chunk_values`](Self::chunk_values) on infallible streams.
pub trait ChunkValuesExt: Stream + Sized {
    /// Groups consecutive items into batches of up to `max_chunk_size`.
    ///
    /// The error type is [`Infallible`], so only `InvalidArgument` and `Cancelled` can
    /// occur. Use [`ChunkError::widen`] to merge them into another error type.
    fn chunk_values(
        self,
        max_chunk_size: usize,
        cancel: CancellationToken,
    ) -> ChunkByCount<IntoFallible<Self>> {
        let lift: fn(Self::Item) -> Result<Self::Item, Infallible> = Ok;
        ChunkByCount::new(
            Some(self.map(lift)),
            ChunkConfig::new(max_chunk_size),
            cancel,
        )
    }
}

impl<S: Stream> ChunkValuesExt for S {}

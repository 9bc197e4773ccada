// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Instrumented source that records how an operator pulls from it.
//!
//! Laziness and exactly-once-pull properties can only be observed from the source side:
//! wrap the source in a [`PullCountingStream`], hand the stream to the operator and keep the
//! [`PullCounter`] to inspect afterwards.

use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Debug, Default)]
struct Counts {
    polls: AtomicUsize,
    yielded: AtomicUsize,
    polls_after_end: AtomicUsize,
    ended: AtomicBool,
    dropped: AtomicBool,
}

/// Shared view of the counters of a [`PullCountingStream`].
#[derive(Debug, Clone, Default)]
pub struct PullCounter {
    counts: Arc<Counts>,
}

impl PullCounter {
    /// Total `poll_next` calls, including the ones that returned `Pending`.
    pub fn polls(&self) -> usize {
        self.counts.polls.load(Ordering::SeqCst)
    }

    /// Items handed out by the source.
    pub fn yielded(&self) -> usize {
        self.counts.yielded.load(Ordering::SeqCst)
    }

    /// Polls made after the source already reported its end.
    pub fn polls_after_end(&self) -> usize {
        self.counts.polls_after_end.load(Ordering::SeqCst)
    }

    /// Whether the source has reported its end.
    pub fn ended(&self) -> bool {
        self.counts.ended.load(Ordering::SeqCst)
    }

    /// Whether the source has been dropped.
    pub fn dropped(&self) -> bool {
        self.counts.dropped.load(Ordering::SeqCst)
    }
}

/// Pass-through stream that counts the polls it receives.
#[derive(Debug)]
pub struct PullCountingStream<S> {
    inner: S,
    counter: PullCounter,
}

impl<S> PullCountingStream<S> {
    /// Wraps `inner`, returning the stream and a handle to its counters.
    ///
    /// ```rust
    /// use chunkwise_test_utils::PullCountingStream;
    /// use futures::{stream, StreamExt};
    ///
    /// # async fn example() {
    /// let (mut source, counter) = PullCountingStream::new(stream::iter([1, 2]));
    /// assert_eq!(counter.polls(), 0);
    ///
    /// source.next().await;
    /// assert_eq!(counter.yielded(), 1);
    /// # }
    /// ```
    pub fn new(inner: S) -> (Self, PullCounter) {
        let counter = PullCounter::default();
        let stream = Self {
            inner,
            counter: counter.clone(),
        };
        (stream, counter)
    }
}

impl<S> Stream for PullCountingStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let counts = Arc::clone(&self.counter.counts);

        counts.polls.fetch_add(1, Ordering::SeqCst);
        if counts.ended.load(Ordering::SeqCst) {
            counts.polls_after_end.fetch_add(1, Ordering::SeqCst);
        }

        let polled = Pin::new(&mut self.inner).poll_next(cx);
        match &polled {
            Poll::Ready(Some(_)) => {
                counts.yielded.fetch_add(1, Ordering::SeqCst);
            }
            Poll::Ready(None) => counts.ended.store(true, Ordering::SeqCst),
            Poll::Pending => {}
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Drop for PullCountingStream<S> {
    fn drop(&mut self) {
        self.counter.counts.dropped.store(true, Ordering::SeqCst);
    }
}

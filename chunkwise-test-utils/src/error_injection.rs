// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stream wrapper that turns a plain source into a fallible one failing at a chosen position.

use crate::TestError;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Wraps every item of `inner` in `Ok`, and emits `Err(TestError::injected())` in place of
/// the item at position `inject_error_at` (0-indexed).
///
/// The item that would have been at that position is not consumed: the error is emitted
/// without polling `inner`, and the inner stream resumes afterwards.
///
/// ```rust
/// use chunkwise_test_utils::{ErrorInjectingStream, TestError};
/// use futures::{stream, StreamExt};
///
/// # async fn example() {
/// let mut source = ErrorInjectingStream::new(stream::iter([1, 2]), 1);
///
/// assert_eq!(source.next().await, Some(Ok(1)));
/// assert_eq!(source.next().await, Some(Err(TestError::injected())));
/// assert_eq!(source.next().await, Some(Ok(2)));
/// # }
/// ```
#[derive(Debug)]
pub struct ErrorInjectingStream<S> {
    inner: S,
    inject_error_at: Option<usize>,
    count: usize,
}

impl<S> ErrorInjectingStream<S> {
    pub fn new(inner: S, inject_error_at: usize) -> Self {
        Self {
            inner,
            inject_error_at: Some(inject_error_at),
            count: 0,
        }
    }
}

impl<S> Stream for ErrorInjectingStream<S>
where
    S: Stream + Unpin,
{
    type Item = Result<S::Item, TestError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.inject_error_at == Some(self.count) {
            self.inject_error_at = None;
            self.count += 1;
            return Poll::Ready(Some(Err(TestError::injected())));
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(item)) => {
                self.count += 1;
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

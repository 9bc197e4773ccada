// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chunkwise_core::CancellationToken;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Pass-through stream that cancels a token as it hands out its `cancel_after`-th item.
///
/// Lets tests place a cancellation exactly between two pulls of an operator, without
/// timers. With `cancel_after == 0` the token is cancelled on the first poll, before the
/// inner stream is touched.
#[derive(Debug)]
pub struct CancellingStream<S> {
    inner: S,
    token: CancellationToken,
    cancel_after: usize,
    seen: usize,
}

impl<S> CancellingStream<S> {
    pub fn new(inner: S, token: CancellationToken, cancel_after: usize) -> Self {
        Self {
            inner,
            token,
            cancel_after,
            seen: 0,
        }
    }
}

impl<S> Stream for CancellingStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel_after == 0 {
            self.token.cancel();
        }

        let polled = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.seen += 1;
            if self.seen == self.cancel_after {
                self.token.cancel();
            }
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

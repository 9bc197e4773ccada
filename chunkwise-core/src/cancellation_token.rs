// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cooperative, runtime-agnostic cancellation token.
//!
//! The chunking operator never interrupts a pull. It consults the token at fixed
//! checkpoints through [`CancellationToken::is_cancelled`], so cancellation points are
//! deterministic on every executor.

use event_listener::{Event, EventListener};
use std::future::Future;
use std::iter;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Shared "cancellation requested" flag.
///
/// Clones are handles to the same state: calling [`cancel`](Self::cancel) on any clone
/// is observed by all of them. [`child_token`](Self::child_token) creates a dependent
/// token that is cancelled together with its parent but can also be cancelled alone.
///
/// # Example
///
/// ```
/// use chunkwise_core::CancellationToken;
///
/// # async fn example() {
/// let token = CancellationToken::new();
/// let token_clone = token.clone();
///
/// tokio::spawn(async move {
///     token_clone.cancelled().await;
///     println!("Cancelled!");
/// });
///
/// // Cancel from another task
/// token.cancel();
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    event: Event,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn new(parent: Option<Arc<Inner>>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            event: Event::new(),
            parent,
        }
    }

    /// Walks from this node up to the root.
    fn lineage(self: &Arc<Self>) -> impl Iterator<Item = &Arc<Inner>> {
        iter::successors(Some(self), |inner| inner.parent.as_ref())
    }
}

impl CancellationToken {
    /// Create a new cancellation token.
    ///
    /// The token is initially not cancelled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::new(None)),
        }
    }

    /// Create a token that is cancelled whenever `self` is.
    ///
    /// Cancelling the child does not affect the parent.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkwise_core::CancellationToken;
    ///
    /// let parent = CancellationToken::new();
    /// let child = parent.child_token();
    ///
    /// child.cancel();
    /// assert!(!parent.is_cancelled());
    ///
    /// let other = parent.child_token();
    /// parent.cancel();
    /// assert!(other.is_cancelled());
    /// ```
    #[must_use]
    pub fn child_token(&self) -> Self {
        Self {
            inner: Arc::new(Inner::new(Some(Arc::clone(&self.inner)))),
        }
    }

    /// Cancel the token, waking all listeners.
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        // Flag first, so woken waiters observe it.
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
    }

    /// Check if the token, or any ancestor, has been cancelled (non-blocking).
    ///
    /// # Example
    ///
    /// ```
    /// use chunkwise_core::CancellationToken;
    ///
    /// let token = CancellationToken::new();
    /// assert!(!token.is_cancelled());
    ///
    /// token.cancel();
    /// assert!(token.is_cancelled());
    /// ```
    pub fn is_cancelled(&self) -> bool {
        self.inner
            .lineage()
            .any(|inner| inner.cancelled.load(Ordering::Acquire))
    }

    /// Wait asynchronously until the token is cancelled.
    ///
    /// If the token is already cancelled, this returns immediately.
    pub fn cancelled(&self) -> WaitForCancellation<'_> {
        WaitForCancellation {
            token: self,
            listeners: None,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`CancellationToken::cancelled()`].
pub struct WaitForCancellation<'a> {
    token: &'a CancellationToken,
    listeners: Option<Vec<EventListener>>,
}

impl Future for WaitForCancellation<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;

        if this.token.is_cancelled() {
            return Poll::Ready(());
        }

        let registered = this.listeners.is_some();
        let listeners = this.listeners.get_or_insert_with(|| {
            this.token
                .inner
                .lineage()
                .map(|inner| inner.event.listen())
                .collect()
        });

        // cancel() may have run between the first check and listen().
        if !registered && this.token.is_cancelled() {
            return Poll::Ready(());
        }

        for listener in listeners.iter_mut() {
            if Pin::new(listener).poll(cx).is_ready() {
                return Poll::Ready(());
            }
        }

        Poll::Pending
    }
}

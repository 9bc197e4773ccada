// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chunkwise_core::{CancellationToken, ChunkError};
use chunkwise_stream::ChunkByCountExt;
use chunkwise_test_utils::{
    assert_no_element_emitted, assert_stream_ended, numbers, ok_stream, test_channel,
    unwrap_batch, unwrap_stream, CancellingStream, PullCountingStream, TestError,
};
use futures::stream::{self, FusedStream};
use futures::StreamExt;
use std::task::Poll;

#[tokio::test]
async fn test_cancelled_before_start_never_pulls() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    token.cancel();
    let (source, counter) = PullCountingStream::new(ok_stream(numbers(5)));
    let mut result = source.chunk_by_count(2, token);

    // Act & Assert
    assert_eq!(
        unwrap_stream(&mut result, 500).await,
        Err(ChunkError::Cancelled)
    );
    assert_stream_ended(&mut result, 100).await;
    assert_eq!(counter.polls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_cancel_between_batches() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let (source, counter) = PullCountingStream::new(ok_stream(numbers(10)));
    let mut result = source.chunk_by_count(2, token.clone());

    // Act
    assert_eq!(unwrap_batch(&mut result, 500).await, vec![1, 2]);
    token.cancel();

    // Assert
    assert_eq!(
        unwrap_stream(&mut result, 500).await,
        Err(ChunkError::Cancelled)
    );
    assert_stream_ended(&mut result, 100).await;
    assert_eq!(counter.yielded(), 2);
    assert!(counter.dropped());

    Ok(())
}

#[tokio::test]
async fn test_cancel_mid_batch_discards_partial() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let source = CancellingStream::new(ok_stream(numbers(5)), token.clone(), 3);
    let mut result = source.chunk_by_count(2, token);

    // Act
    let items: Vec<_> = result.by_ref().collect().await;

    // Assert
    assert_eq!(items, vec![Ok(vec![1, 2]), Err(ChunkError::Cancelled)]);
    assert!(result.is_terminated());

    Ok(())
}

#[tokio::test]
async fn test_cancel_on_last_item_of_batch_suppresses_it() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let source = CancellingStream::new(ok_stream(numbers(4)), token.clone(), 2);

    // Act
    let items: Vec<_> = source.chunk_by_count(2, token).collect().await;

    // Assert
    assert_eq!(items, vec![Err(ChunkError::Cancelled)]);

    Ok(())
}

#[tokio::test]
async fn test_cancel_at_exhaustion_discards_partial() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut items = numbers(3).into_iter();
    let source = stream::poll_fn(move |_| {
        Poll::Ready(match items.next() {
            Some(item) => Some(Ok::<_, TestError>(item)),
            None => {
                trigger.cancel();
                None
            }
        })
    });

    // Act
    let batches: Vec<_> = source.chunk_by_count(2, token).collect().await;

    // Assert
    assert_eq!(batches, vec![Ok(vec![1, 2]), Err(ChunkError::Cancelled)]);

    Ok(())
}

#[tokio::test]
async fn test_cancel_at_exhaustion_with_empty_buffer_completes() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut items = numbers(2).into_iter();
    let source = stream::poll_fn(move |_| {
        Poll::Ready(match items.next() {
            Some(item) => Some(Ok::<_, TestError>(item)),
            None => {
                trigger.cancel();
                None
            }
        })
    });

    // Act
    let batches: Vec<_> = source.chunk_by_count(2, token.clone()).collect().await;

    // Assert
    assert_eq!(batches, vec![Ok(vec![1, 2])]);
    assert!(token.is_cancelled());

    Ok(())
}

#[tokio::test]
async fn test_cancel_while_pending_is_seen_on_next_poll() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let (tx, stream) = test_channel::<usize>();
    let mut result = stream.chunk_by_count(2, token.clone());

    // Act & Assert
    tx.send(1)?;
    assert_no_element_emitted(&mut result, 100).await;

    token.cancel();
    assert!(!result.is_terminated());
    assert_eq!(result.buffered_len(), 1);

    assert_eq!(
        unwrap_stream(&mut result, 500).await,
        Err(ChunkError::Cancelled)
    );
    assert_stream_ended(&mut result, 100).await;

    Ok(())
}

#[tokio::test]
async fn test_parent_token_cancels_child_invocation() -> anyhow::Result<()> {
    // Arrange
    let parent = CancellationToken::new();
    let mut result = ok_stream(numbers(6)).chunk_by_count(2, parent.child_token());

    // Act
    assert_eq!(unwrap_batch(&mut result, 500).await, vec![1, 2]);
    parent.cancel();

    // Assert
    assert_eq!(
        unwrap_stream(&mut result, 500).await,
        Err(ChunkError::Cancelled)
    );

    Ok(())
}

#[tokio::test]
async fn test_child_token_leaves_siblings_running() -> anyhow::Result<()> {
    // Arrange
    let parent = CancellationToken::new();
    let cancelled = parent.child_token();
    let mut stopped = ok_stream(numbers(4)).chunk_by_count(2, cancelled.clone());
    let running = ok_stream(numbers(4)).chunk_by_count(2, parent.child_token());

    // Act
    cancelled.cancel();
    let batches: Vec<_> = running.collect().await;

    // Assert
    assert_eq!(
        unwrap_stream(&mut stopped, 500).await,
        Err(ChunkError::Cancelled)
    );
    assert_eq!(batches, vec![Ok(vec![1, 2]), Ok(vec![3, 4])]);

    Ok(())
}

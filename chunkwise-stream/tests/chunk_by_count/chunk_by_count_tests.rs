// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chunkwise_core::CancellationToken;
use chunkwise_stream::{ChunkByCountExt, ChunkConfig, DEFAULT_PREALLOCATION_LIMIT};
use chunkwise_test_utils::{
    assert_no_element_emitted, assert_stream_ended, numbers, ok_stream, test_channel,
    unwrap_batch,
};
use futures::stream::FusedStream;
use futures::{Stream, StreamExt, TryStreamExt};

#[tokio::test]
async fn test_emits_full_batches_then_partial() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(numbers(7));

    // Act
    let batches: Vec<Vec<usize>> = source
        .chunk_by_count(3, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);

    Ok(())
}

#[tokio::test]
async fn test_exact_multiple_has_no_partial_batch() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(numbers(6));

    // Act
    let batches: Vec<Vec<usize>> = source
        .chunk_by_count(3, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6]]);

    Ok(())
}

#[tokio::test]
async fn test_empty_source_emits_nothing() -> anyhow::Result<()> {
    // Arrange
    let mut result = ok_stream(numbers(0)).chunk_by_count(3, CancellationToken::new());

    // Act & Assert
    assert_stream_ended(&mut result, 500).await;
    assert!(result.is_terminated());

    Ok(())
}

#[tokio::test]
async fn test_size_larger_than_source_emits_single_batch() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(numbers(4));

    // Act
    let batches: Vec<Vec<usize>> = source
        .chunk_by_count(100, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches, vec![vec![1, 2, 3, 4]]);

    Ok(())
}

#[tokio::test]
async fn test_size_one_emits_singletons() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(["a", "b", "c"]);

    // Act
    let batches: Vec<Vec<&str>> = source
        .chunk_by_count(1, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches, vec![vec!["a"], vec!["b"], vec!["c"]]);

    Ok(())
}

#[tokio::test]
async fn test_huge_size_does_not_preallocate_it() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(numbers(5));

    // Act
    let batches: Vec<Vec<usize>> = source
        .chunk_by_count(usize::MAX, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches, vec![numbers(5)]);

    Ok(())
}

#[tokio::test]
async fn test_batch_emitted_as_soon_as_full() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<usize>();
    let mut result = stream.chunk_by_count(2, CancellationToken::new());

    // Act & Assert
    tx.send(1)?;
    assert_no_element_emitted(&mut result, 100).await;
    assert_eq!(result.buffered_len(), 1);

    tx.send(2)?;
    assert_eq!(unwrap_batch(&mut result, 500).await, vec![1, 2]);
    assert_eq!(result.buffered_len(), 0);

    tx.send(3)?;
    assert_no_element_emitted(&mut result, 100).await;

    tx.send(4)?;
    assert_eq!(unwrap_batch(&mut result, 500).await, vec![3, 4]);
    assert_eq!(result.batches_emitted(), 2);

    Ok(())
}

#[tokio::test]
async fn test_partial_batch_emitted_on_completion() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<usize>();
    let mut result = stream.chunk_by_count(3, CancellationToken::new());

    // Act & Assert
    tx.send(1)?;
    tx.send(2)?;
    assert_no_element_emitted(&mut result, 100).await;

    drop(tx);
    assert_eq!(unwrap_batch(&mut result, 500).await, vec![1, 2]);
    assert_stream_ended(&mut result, 100).await;

    Ok(())
}

#[tokio::test]
async fn test_partial_batch_is_trimmed() -> anyhow::Result<()> {
    // Arrange
    let source = ok_stream(numbers(5));

    // Act
    let batches: Vec<Vec<usize>> = source
        .chunk_by_count(1000, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].capacity(), batches[0].len());

    Ok(())
}

#[tokio::test]
async fn test_preallocation_limit_only_affects_capacity() -> anyhow::Result<()> {
    // Arrange
    let config = ChunkConfig::new(4).with_preallocation_limit(1);

    // Act
    let batches: Vec<Vec<usize>> = ok_stream(numbers(10))
        .chunk_by_count_with(config, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(
        batches,
        vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10]]
    );

    Ok(())
}

#[tokio::test]
async fn test_full_batches_are_capacity_exact_above_preallocation_limit() -> anyhow::Result<()> {
    // Arrange
    let config = ChunkConfig::new(5).with_preallocation_limit(1);

    // Act
    let batches: Vec<Vec<usize>> = ok_stream(numbers(12))
        .chunk_by_count_with(config, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches.len(), 3);
    for batch in &batches {
        assert_eq!(batch.capacity(), batch.len());
    }
    assert_eq!(batches[0].capacity(), 5);
    assert_eq!(batches[2], vec![11, 12]);

    Ok(())
}

#[tokio::test]
async fn test_full_batch_above_default_limit_is_capacity_exact() -> anyhow::Result<()> {
    // Arrange
    let chunk_size = DEFAULT_PREALLOCATION_LIMIT + 1;

    // Act
    let batches: Vec<Vec<usize>> = ok_stream(numbers(chunk_size))
        .chunk_by_count(chunk_size, CancellationToken::new())
        .try_collect()
        .await?;

    // Assert
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), chunk_size);
    assert_eq!(batches[0].capacity(), chunk_size);

    Ok(())
}

#[tokio::test]
async fn test_batches_are_owned_by_consumer() -> anyhow::Result<()> {
    // Arrange
    let mut result = ok_stream(numbers(4)).chunk_by_count(2, CancellationToken::new());

    // Act
    let mut first = unwrap_batch(&mut result, 500).await;
    let second = unwrap_batch(&mut result, 500).await;
    first.clear();
    first.push(99);

    // Assert
    assert_eq!(first, vec![99]);
    assert_eq!(second, vec![3, 4]);
    assert_ne!(first.as_ptr(), second.as_ptr());

    Ok(())
}

#[tokio::test]
async fn test_size_hint_bounds() -> anyhow::Result<()> {
    // Arrange
    let mut result = ok_stream(numbers(7)).chunk_by_count(3, CancellationToken::new());

    // Act & Assert
    assert_eq!(result.size_hint(), (0, Some(4)));

    let _ = unwrap_batch(&mut result, 500).await;
    assert_eq!(result.size_hint(), (0, Some(3)));

    while result.next().await.is_some() {}
    assert_eq!(result.size_hint(), (0, Some(0)));

    Ok(())
}

#[tokio::test]
async fn test_unbounded_source_has_no_upper_hint() -> anyhow::Result<()> {
    // Arrange
    let (_tx, stream) = test_channel::<usize>();

    // Act
    let result = stream.chunk_by_count(3, CancellationToken::new());

    // Assert
    assert_eq!(result.size_hint(), (0, None));

    Ok(())
}

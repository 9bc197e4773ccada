// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chunkwise_core::ChunkError;
use futures::stream::StreamExt;
use futures::Stream;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::{sleep, timeout};

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
    T: Debug,
{
    tokio::select! {
        item = stream.next() => {
            panic!("Unexpected item emitted, expected no output: {item:?}");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

/// Asserts that the stream reports its end within `timeout_ms`.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
    T: Debug,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(item)) => panic!("Expected end of stream, got {item:?}"),
        Err(_) => panic!("Timed out after {timeout_ms}ms waiting for end of stream"),
    }
}

/// Waits up to `timeout_ms` for the next item, panicking on timeout or end of stream.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> T
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(item)) => item,
        Ok(None) => panic!("Stream ended, expected an item"),
        Err(_) => panic!("Timed out after {timeout_ms}ms waiting for an item"),
    }
}

/// Like [`unwrap_stream`], additionally unwrapping an `Ok` batch.
pub async fn unwrap_batch<S, T, E>(stream: &mut S, timeout_ms: u64) -> Vec<T>
where
    S: Stream<Item = Result<Vec<T>, ChunkError<E>>> + Unpin,
    E: Debug,
{
    match unwrap_stream(stream, timeout_ms).await {
        Ok(batch) => batch,
        Err(error) => panic!("Expected a batch, got error {error:?}"),
    }
}

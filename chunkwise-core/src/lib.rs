// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by the chunkwise crates.
//!
//! - [`ChunkError`] - the three ways a chunked stream can terminate abnormally
//! - [`CancellationToken`] - cooperative cancellation signal polled at fixed checkpoints

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod cancellation_token;
pub mod chunk_error;

pub use self::cancellation_token::{CancellationToken, WaitForCancellation};
pub use self::chunk_error::{ChunkError, ChunkResult, MIN_CHUNK_SIZE};

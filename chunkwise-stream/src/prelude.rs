// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude re-exporting the extension traits and the types they return.
//!
//! ```
//! use chunkwise_stream::prelude::*;
//! use futures::stream;
//!
//! let batches = stream::iter(0..10).chunk_values(4, CancellationToken::new());
//! assert_eq!(batches.config().max_chunk_size(), 4);
//! ```

pub use crate::chunk_by_count::{ChunkByCount, ChunkByCountExt, ChunkValuesExt};
pub use crate::chunk_config::ChunkConfig;
pub use chunkwise_core::{CancellationToken, ChunkError, ChunkResult};

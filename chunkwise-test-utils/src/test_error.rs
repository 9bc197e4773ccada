// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Error type produced by the test sources in this crate.
///
/// Comparable, so tests can assert that an error reaches the consumer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("test error: {message}")]
pub struct TestError {
    message: String,
}

impl TestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error [`ErrorInjectingStream`](crate::ErrorInjectingStream) emits.
    pub fn injected() -> Self {
        Self::new("injected")
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

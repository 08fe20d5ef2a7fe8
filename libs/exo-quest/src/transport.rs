// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::RawResponse;

/// Sends SQL text to the engine and returns the decoded JSON response.
///
/// Authentication, timeouts, and retries are the implementation's business. Statements
/// rendered by this crate are deterministic, so an implementation may resend the same text
/// after a retryable failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<RawResponse, TransportError>;
}

#[derive(Error, Debug)]
pub enum TransportError {
    /// The engine answered with a non-success status
    #[error("Server responded with status {status}: {message}")]
    Server {
        status: u16,
        message: String,
        /// Character offset into `sql` where the engine located the error
        position: Option<usize>,
        sql: String,
    },

    #[error("Request timed out after {after:?}")]
    Timeout { sql: String, after: Duration },

    #[error("Network: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether resending the same statement may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Server { status, .. } => *status >= 500,
            TransportError::Timeout { .. } | TransportError::Network(_) => true,
            TransportError::InvalidResponse(_) => false,
        }
    }
}

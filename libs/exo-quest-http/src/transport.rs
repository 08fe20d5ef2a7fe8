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
use exo_quest::{RawResponse, Transport, TransportError};
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::{Auth, EnvError, Environment, HttpConfig};

/// The error body the engine sends with a failing status
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    position: Option<usize>,
}

/// A [Transport] over the engine's HTTP `/exec` endpoint.
///
/// Each statement is one `GET` request. Network failures, timeouts and server errors are
/// retried with exponential backoff, up to the configured number of retries.
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self::new(HttpConfig::from_env(env)?))
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    async fn attempt(&self, sql: &str) -> Result<RawResponse, TransportError> {
        let mut request = self.client.get(exec_url(&self.config.url, sql));
        request = match &self.config.auth {
            Some(Auth::Basic { user, password }) => request.basic_auth(user, password.as_ref()),
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        };

        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                sql: sql.to_string(),
                after: self.config.timeout,
            })?
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Received status {} with {} bytes", status, body.len());
        classify_response(status, &body, sql)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(sql.len = sql.len()))]
    async fn execute(&self, sql: &str) -> Result<RawResponse, TransportError> {
        let mut retries = 0;

        loop {
            match self.attempt(sql).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retries < self.config.max_retries => {
                    let delay = backoff_delay(self.config.retry_backoff, retries);
                    warn!("Retrying in {:?} after error: {}", delay, e);

                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(e) => {
                    error!("Statement failed after {} retries: {}", retries, e);
                    return Err(e);
                }
            }
        }
    }
}

/// The `/exec` URL carrying the statement as its `query` parameter
pub fn exec_url(base: &Url, sql: &str) -> Url {
    let mut url = base.clone();
    let path = format!("{}/exec", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut().clear().append_pair("query", sql);
    url
}

/// Turn a status and body into a response, or the engine's error
pub fn classify_response(
    status: u16,
    body: &str,
    sql: &str,
) -> Result<RawResponse, TransportError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body)
            .map_err(|e| TransportError::InvalidResponse(format!("{e}: {body}")));
    }

    let (message, position) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => (error_body.error, error_body.position),
        Err(_) if body.trim().is_empty() => (format!("HTTP status {status}"), None),
        Err(_) => (body.trim().to_string(), None),
    };

    Err(TransportError::Server {
        status,
        message,
        position,
        sql: sql.to_string(),
    })
}

/// The delay before retry number `retry` (starting at zero)
pub fn backoff_delay(initial: Duration, retry: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(retry))
}

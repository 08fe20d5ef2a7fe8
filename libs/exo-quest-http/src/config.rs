// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::env_const::{
    EXO_QUEST_MAX_RETRIES, EXO_QUEST_PASSWORD, EXO_QUEST_RETRY_BACKOFF_MS, EXO_QUEST_TIMEOUT_MS,
    EXO_QUEST_TOKEN, EXO_QUEST_URL, EXO_QUEST_USER,
};

const DEFAULT_URL: &str = "http://localhost:9000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Invalid value for {key}: {value}. Expected a non-negative integer")]
    InvalidNumber { key: &'static str, value: String },

    #[error("Invalid URL for {key}: {value}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
    fallback: Option<Arc<dyn Environment>>,
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|fb| fb.get(key)))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: HashMap::from_iter(
                values
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
            fallback: None,
        }
    }
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_fallback(fallback: Arc<dyn Environment>) -> Self {
        Self {
            values: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// How requests authenticate with the engine
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Basic {
        user: String,
        password: Option<String>,
    },
    Bearer(String),
}

impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { user, .. } => write!(f, "Basic({user}, ***)"),
            Auth::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the engine's HTTP endpoint; statements go to `<url>/exec`
    pub url: Url,
    pub auth: Option<Auth>,
    /// Limit for a single attempt, including reading the body
    pub timeout: Duration,
    /// Additional attempts after a retryable failure
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub retry_backoff: Duration,
}

impl HttpConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }

    /// Read the configuration from `EXO_QUEST_*` variables. A token takes precedence over a
    /// user and password.
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let url_value = env.get_or_else(EXO_QUEST_URL, DEFAULT_URL);
        let url = Url::parse(&url_value).map_err(|source| EnvError::InvalidUrl {
            key: EXO_QUEST_URL,
            value: url_value.clone(),
            source,
        })?;

        let auth = match (env.get(EXO_QUEST_TOKEN), env.get(EXO_QUEST_USER)) {
            (Some(token), _) => Some(Auth::Bearer(token)),
            (None, Some(user)) => Some(Auth::Basic {
                user,
                password: env.get(EXO_QUEST_PASSWORD),
            }),
            (None, None) => None,
        };

        Ok(Self {
            url,
            auth,
            timeout: Duration::from_millis(number(env, EXO_QUEST_TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?),
            max_retries: number(env, EXO_QUEST_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
            retry_backoff: Duration::from_millis(number(
                env,
                EXO_QUEST_RETRY_BACKOFF_MS,
                DEFAULT_RETRY_BACKOFF_MS,
            )?),
        })
    }
}

fn number<T: FromStr>(env: &dyn Environment, key: &'static str, default: T) -> Result<T, EnvError> {
    match env.get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| EnvError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

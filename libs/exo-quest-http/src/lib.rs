// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! An HTTP [Transport](exo_quest::Transport) for `exo-quest`, configured from `EXO_QUEST_*`
//! environment variables.

mod config;
mod transport;

pub mod env_const;
pub mod logging;

pub use config::{Auth, EnvError, Environment, HttpConfig, MapEnvironment, SystemEnvironment};
pub use transport::{HttpTransport, backoff_delay, classify_response, exec_url};

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub const EXO_QUEST_URL: &str = "EXO_QUEST_URL";
pub const EXO_QUEST_USER: &str = "EXO_QUEST_USER";
pub const EXO_QUEST_PASSWORD: &str = "EXO_QUEST_PASSWORD";
pub const EXO_QUEST_TOKEN: &str = "EXO_QUEST_TOKEN";

pub const EXO_QUEST_TIMEOUT_MS: &str = "EXO_QUEST_TIMEOUT_MS";
pub const EXO_QUEST_MAX_RETRIES: &str = "EXO_QUEST_MAX_RETRIES";
pub const EXO_QUEST_RETRY_BACKOFF_MS: &str = "EXO_QUEST_RETRY_BACKOFF_MS";

pub const EXO_QUEST_LOG: &str = "EXO_QUEST_LOG";

// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{AppError, AppResult};

/// Api keys the fixture knows by name.
///
/// Request headers keep the raw `i16` so that any key a client sends can be
/// decoded and echoed; this enum is only used to label diagnostics and to
/// build the advertised version table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ApiKey {
    Produce = 0,
    Fetch = 1,
    Metadata = 3,
    ApiVersions = 18,
    CreateTopics = 19,
    DescribeTopicPartitions = 75,
}

impl ApiKey {
    pub fn from_i16(value: i16) -> AppResult<Self> {
        match value {
            0 => Ok(ApiKey::Produce),
            1 => Ok(ApiKey::Fetch),
            3 => Ok(ApiKey::Metadata),
            18 => Ok(ApiKey::ApiVersions),
            19 => Ok(ApiKey::CreateTopics),
            75 => Ok(ApiKey::DescribeTopicPartitions),
            invalid => Err(AppError::MalformedProtocol(format!(
                "api key:{} is invalid",
                invalid
            ))),
        }
    }

    pub fn as_i16(&self) -> i16 {
        *self as i16
    }
}

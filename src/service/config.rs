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

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, PoolPolicy};
use crate::fixture::Scenario;

pub const DEFAULT_PORT: u16 = 9092;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    pub ip: String,
    pub port: u16,
    /// upper bound of the single read performed per connection
    pub read_buffer_size: usize,
    /// 0 means one task per connection without limit
    pub max_connection: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            ip: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_connection: 0,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub scenario: Scenario,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for an hourly rolling log file, in addition to stdout.
    pub dir: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FixtureConfig {
    pub network: NetworkConfig,
    pub fixture: ScenarioConfig,
    pub log: LogConfig,
}

impl FixtureConfig {
    /// Loads the configuration, starting from the built-in defaults and
    /// layering the optional config file on top.
    pub fn set_up_config(path: Option<&Path>) -> AppResult<FixtureConfig> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let path_str = path.to_str().ok_or(AppError::InvalidValue(format!(
                "config file path: {}",
                path.to_string_lossy()
            )))?;
            builder = builder.add_source(config::File::with_name(path_str));
        }
        let fixture_config: FixtureConfig = builder.build()?.try_deserialize()?;
        fixture_config.validate()?;
        Ok(fixture_config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.network.read_buffer_size == 0 {
            return Err(AppError::InvalidValue(
                "network.read_buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.network.ip.is_empty() {
            return Err(AppError::InvalidValue(
                "network.ip must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.network.ip, self.network.port)
    }

    pub fn pool_policy(&self) -> PoolPolicy {
        match self.network.max_connection {
            0 => PoolPolicy::Unbounded,
            limit => PoolPolicy::Bounded(limit),
        }
    }

    pub fn to_toml(&self) -> AppResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

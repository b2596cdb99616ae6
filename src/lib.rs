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

mod fixture;
mod network;
mod protocol;
mod service;

pub use fixture::{ApiVersionRange, ApiVersionsResponse, Scenario, MESSAGE_SIZE_LENGTH};
pub use network::{
    Connection, FrameObserver, HexDump, RequestFrame, RequestHeader, TracingObserver,
    REQUEST_HEADER_SIZE,
};
pub use protocol::ApiKey;
pub use service::{
    bind_reusable, setup_local_tracing, AppError, AppResult, FixtureBroker, FixtureConfig,
    HandlerSettings, LogConfig, NetworkConfig, PoolPolicy, ScenarioConfig, Server,
};

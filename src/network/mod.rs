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

//! Network Module Implementation
//!
//! Per-connection I/O for the fixture broker.
//!
//! # Components
//!
//! - `Connection`: one bounded read and one full write over a TCP stream
//! - `RequestFrame` / `RequestHeader`: decoding of the fixed 12-byte header
//! - `FrameObserver`: where received, decoded and sent frames are reported

pub use connection::Connection;
pub use frame::{RequestFrame, RequestHeader, REQUEST_HEADER_SIZE};
pub use observer::{FrameObserver, HexDump, TracingObserver};
mod connection;
mod frame;
mod observer;

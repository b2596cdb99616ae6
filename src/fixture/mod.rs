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

//! Scripted ApiVersions responses.
//!
//! Every [`Scenario`] turns a correlation id into the exact bytes written back
//! to the client. All of them except `WellFormed` break the protocol on
//! purpose; the broken part is the whole point of the scenario and must stay
//! broken.

use std::fmt;

use bytes::{BufMut, BytesMut};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use api_versions::{ApiVersionRange, ApiVersionsResponse};
use api_versions::BodyQuirks;

mod api_versions;

/// Width of the message size prefix.
pub const MESSAGE_SIZE_LENGTH: usize = 4;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// message size is one less than the bytes that follow it
    #[default]
    LengthTooSmall,
    /// message size is one more than the bytes that follow it
    LengthTooLarge,
    /// a correct ApiVersions response, for checking the client itself
    WellFormed,
    /// the api version entry is cut off in the middle of max version
    TruncatedPayload,
    /// three bytes, not even a full message size field
    InsufficientLengthBytes,
    /// message size 0 followed by the correlation id
    ZeroMessageLength,
    /// a correct response carrying a different correlation id
    CorrelationIdMismatch,
    /// the compact array length is written without the +1 offset
    WrongArrayLength,
    /// the api version entry lacks its tagged fields byte
    MissingTagBuffer,
}

impl Scenario {
    /// Encodes the response this scenario sends for a request carrying
    /// `correlation_id`.
    pub fn encode(&self, correlation_id: i32) -> BytesMut {
        match self {
            Scenario::InsufficientLengthBytes => BytesMut::from(&[0u8; 3][..]),
            Scenario::ZeroMessageLength => {
                let mut writer = BytesMut::with_capacity(MESSAGE_SIZE_LENGTH + 4);
                writer.put_i32(0);
                writer.put_i32(correlation_id);
                writer
            }
            _ => {
                let response = ApiVersionsResponse::fixture(self.echoed_id(correlation_id));
                let mut payload = BytesMut::with_capacity(32);
                response.write_payload(&mut payload, self.body_quirks());
                Self::frame(payload, self.size_skew())
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::LengthTooSmall => "message size field declares one byte less than sent",
            Scenario::LengthTooLarge => "message size field declares one byte more than sent",
            Scenario::WellFormed => "well-formed ApiVersions response",
            Scenario::TruncatedPayload => "ApiVersions entry truncated inside max version",
            Scenario::InsufficientLengthBytes => "response too short to hold a message size",
            Scenario::ZeroMessageLength => "message size of zero followed by the correlation id",
            Scenario::CorrelationIdMismatch => "response correlation id differs from the request",
            Scenario::WrongArrayLength => "compact array length written without the +1 offset",
            Scenario::MissingTagBuffer => "ApiVersions entry missing its tagged fields byte",
        }
    }

    fn echoed_id(&self, correlation_id: i32) -> i32 {
        match self {
            Scenario::CorrelationIdMismatch => correlation_id.wrapping_add(1),
            _ => correlation_id,
        }
    }

    fn body_quirks(&self) -> BodyQuirks {
        match self {
            Scenario::TruncatedPayload => BodyQuirks {
                truncate_max_version: true,
                ..Default::default()
            },
            Scenario::WrongArrayLength => BodyQuirks {
                raw_array_length: true,
                ..Default::default()
            },
            Scenario::MissingTagBuffer => BodyQuirks {
                omit_entry_tagged_fields: true,
                ..Default::default()
            },
            _ => BodyQuirks::default(),
        }
    }

    /// Difference between the declared message size and the real one.
    fn size_skew(&self) -> i32 {
        match self {
            Scenario::LengthTooSmall => -1,
            Scenario::LengthTooLarge => 1,
            _ => 0,
        }
    }

    fn frame(payload: BytesMut, size_skew: i32) -> BytesMut {
        let mut writer = BytesMut::with_capacity(MESSAGE_SIZE_LENGTH + payload.len());
        writer.put_i32(payload.len() as i32 + size_skew);
        writer.extend_from_slice(&payload);
        writer
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

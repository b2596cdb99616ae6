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

use bytes::{BufMut, BytesMut};

use crate::protocol::{
    put_compact_array_len, put_empty_tagged_fields, put_unsigned_varint, ApiKey,
};

pub const API_VERSIONS_MIN_VERSION: i16 = 0;
pub const API_VERSIONS_MAX_VERSION: i16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersionRange {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

/// ApiVersions v3+ response (response header v0, flexible body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub correlation_id: i32,
    pub error_code: i16,
    pub api_versions: Vec<ApiVersionRange>,
    pub throttle_time_ms: i32,
}

/// Deviations from the well-formed body layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BodyQuirks {
    /// write the entry count itself instead of count + 1
    pub raw_array_length: bool,
    /// drop the tagged-fields byte after each api version entry
    pub omit_entry_tagged_fields: bool,
    /// stop after the first entry's min version and write one stray byte
    pub truncate_max_version: bool,
}

impl ApiVersionsResponse {
    /// The single-entry table advertised by every fixture: ApiVersions, v0..=v4.
    pub fn fixture(correlation_id: i32) -> Self {
        ApiVersionsResponse {
            correlation_id,
            error_code: 0,
            api_versions: vec![ApiVersionRange {
                api_key: ApiKey::ApiVersions.as_i16(),
                min_version: API_VERSIONS_MIN_VERSION,
                max_version: API_VERSIONS_MAX_VERSION,
            }],
            throttle_time_ms: 0,
        }
    }

    /// Writes everything after the message size field.
    pub(crate) fn write_payload(&self, writer: &mut BytesMut, quirks: BodyQuirks) {
        writer.put_i32(self.correlation_id);
        writer.put_i16(self.error_code);
        if quirks.raw_array_length {
            put_unsigned_varint(writer, self.api_versions.len() as u32);
        } else {
            put_compact_array_len(writer, self.api_versions.len());
        }
        for entry in &self.api_versions {
            writer.put_i16(entry.api_key);
            writer.put_i16(entry.min_version);
            if quirks.truncate_max_version {
                writer.put_u8(1);
                return;
            }
            writer.put_i16(entry.max_version);
            if !quirks.omit_entry_tagged_fields {
                put_empty_tagged_fields(writer);
            }
        }
        writer.put_i32(self.throttle_time_ms);
        put_empty_tagged_fields(writer);
    }
}

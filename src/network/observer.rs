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

use std::fmt;

use tracing::info;

use crate::network::RequestHeader;
use crate::protocol::ApiKey;

/// Receives the frames flowing through a connection handler.
///
/// Handlers hold an `Arc<dyn FrameObserver>` so tests can swap in a recording
/// implementation; the broker uses [`TracingObserver`].
pub trait FrameObserver: Send + Sync + fmt::Debug {
    fn request_received(&self, connection_id: u64, raw: &[u8]);
    fn request_decoded(&self, connection_id: u64, header: &RequestHeader);
    fn response_sent(&self, connection_id: u64, response: &[u8]);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn request_received(&self, connection_id: u64, raw: &[u8]) {
        info!(
            connection_id,
            size = raw.len(),
            hex = %HexDump(raw),
            "received: {:?}",
            raw
        );
    }

    fn request_decoded(&self, connection_id: u64, header: &RequestHeader) {
        let api_name = ApiKey::from_i16(header.api_key)
            .map(|key| format!("{:?}", key))
            .unwrap_or_else(|_| "Unknown".to_string());
        info!(
            connection_id,
            length = header.length,
            api_key = header.api_key,
            api_name = %api_name,
            api_version = header.api_version,
            correlation_id = header.correlation_id,
            "decoded request header"
        );
    }

    fn response_sent(&self, connection_id: u64, response: &[u8]) {
        info!(
            connection_id,
            size = response.len(),
            hex = %HexDump(response),
            "sending: {:?}",
            response
        );
    }
}

/// Lower-case hex rendering of a byte slice, without separators.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump() {
        assert_eq!(HexDump(&[0x00, 0x12, 0xab, 0xff]).to_string(), "0012abff");
        assert_eq!(HexDump(&[]).to_string(), "");
    }
}

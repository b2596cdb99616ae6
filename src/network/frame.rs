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

use bytes::{Buf, BytesMut};

use crate::{AppError, AppResult};

/// message size(4) + api key(2) + api version(2) + correlation id(4)
pub const REQUEST_HEADER_SIZE: usize = 4 + 2 + 2 + 4;

/// The fixed 12-byte prefix of every request the fixture reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Declared message size. Logged only; the fixture never frames on it.
    pub length: i32,
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
}

impl RequestHeader {
    pub fn new(length: i32, api_key: i16, api_version: i16, correlation_id: i32) -> Self {
        RequestHeader {
            length,
            api_key,
            api_version,
            correlation_id,
        }
    }

    /// Decodes the header from the first [`REQUEST_HEADER_SIZE`] bytes of `raw`.
    ///
    /// Anything past the header is left untouched. Fewer than 12 bytes yields
    /// [`AppError::FrameTooShort`].
    pub fn read_from(raw: &[u8]) -> AppResult<RequestHeader> {
        if raw.len() < REQUEST_HEADER_SIZE {
            return Err(AppError::FrameTooShort {
                expected: REQUEST_HEADER_SIZE,
                actual: raw.len(),
            });
        }
        let mut header = &raw[..REQUEST_HEADER_SIZE];
        Ok(RequestHeader {
            length: header.get_i32(),
            api_key: header.get_i16(),
            api_version: header.get_i16(),
            correlation_id: header.get_i32(),
        })
    }
}

#[derive(Debug)]
pub struct RequestFrame {
    pub request_header: RequestHeader,
    /// Whatever followed the header in the same read; ignored by the fixture.
    pub request_body: BytesMut,
}

impl RequestFrame {
    pub fn parse(buffer: &mut BytesMut) -> AppResult<RequestFrame> {
        let request_header = RequestHeader::read_from(buffer)?;
        buffer.advance(REQUEST_HEADER_SIZE);
        Ok(RequestFrame {
            request_header,
            request_body: buffer.split(),
        })
    }
}

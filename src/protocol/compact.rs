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

//! Writers for the flexible-version encodings used by ApiVersions v3+.
//!
//! Compact arrays store `len + 1` as an unsigned varint, with `0` reserved for
//! a null array. An empty tagged-field section is a single zero byte.

use bytes::{BufMut, BytesMut};
use integer_encoding::VarInt;

/// Writes `value` as an unsigned varint (no zigzag).
pub fn put_unsigned_varint(writer: &mut BytesMut, value: u32) {
    let var = value.encode_var_vec();
    writer.put_slice(var.as_slice());
}

pub fn put_compact_array_len(writer: &mut BytesMut, len: usize) {
    put_unsigned_varint(writer, len as u32 + 1);
}

pub fn put_empty_tagged_fields(writer: &mut BytesMut) {
    writer.put_u8(0);
}

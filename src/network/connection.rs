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

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::{AppError, AppResult};

/// Represents a connection to a client under test.
///
/// The fixture reads exactly once per connection, so the buffer is sized to the
/// configured read limit and never grows past it.
#[derive(Debug)]
pub struct Connection {
    pub writer: BufWriter<TcpStream>,
    pub buffer: BytesMut,
    pub client_addr: String,
    read_buffer_size: usize,
}

impl Connection {
    pub fn new(socket: TcpStream, read_buffer_size: usize) -> Connection {
        let client_addr = socket
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Connection {
            writer: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(read_buffer_size),
            client_addr,
            read_buffer_size,
        }
    }

    /// Performs a single read of at most `read_buffer_size` bytes.
    ///
    /// Returns `None` when the peer closed the connection without sending
    /// anything. Whatever arrived in that one read is returned as is, even if
    /// it is shorter than a request header.
    pub async fn read_request(&mut self) -> AppResult<Option<BytesMut>> {
        self.buffer.clear();
        let limit = self.read_buffer_size as u64;
        let read = (&mut self.writer)
            .take(limit)
            .read_buf(&mut self.buffer)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(self.buffer.split()))
    }

    pub async fn write_response(&mut self, response: &[u8]) -> AppResult<()> {
        self.writer
            .write_all(response)
            .await
            .map_err(|e| AppError::DetailedIoError(format!("write response error: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| AppError::DetailedIoError(format!("flush response error: {}", e)))?;
        Ok(())
    }
}

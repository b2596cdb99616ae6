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

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::fixture::Scenario;
use crate::network::{Connection, FrameObserver, RequestFrame};
use crate::{AppError, AppResult};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How many connection handlers may run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPolicy {
    Unbounded,
    Bounded(usize),
}

/// Read-only state shared by every connection handler.
#[derive(Debug)]
pub struct HandlerSettings {
    pub scenario: Scenario,
    pub read_buffer_size: usize,
    pub observer: Arc<dyn FrameObserver>,
}

// handler for each connection
struct ConnectionHandler {
    connection_id: u64,
    connection: Connection,
    settings: Arc<HandlerSettings>,
}

impl ConnectionHandler {
    /// Serves exactly one request: read, decode, answer with the scenario's
    /// bytes. The socket is closed when the handler is dropped, whichever way
    /// this returns.
    async fn handle_connection(&mut self) -> AppResult<()> {
        let Some(mut raw) = self.connection.read_request().await? else {
            debug!(
                connection_id = self.connection_id,
                "client closed the connection without sending a request"
            );
            return Ok(());
        };
        let observer = &self.settings.observer;
        observer.request_received(self.connection_id, &raw);

        let frame = RequestFrame::parse(&mut raw)?;
        observer.request_decoded(self.connection_id, &frame.request_header);

        let response = self
            .settings
            .scenario
            .encode(frame.request_header.correlation_id);
        self.connection.write_response(&response).await?;
        observer.response_sent(self.connection_id, &response);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    limit_connections: Option<Arc<Semaphore>>,
    settings: Arc<HandlerSettings>,
}

impl Server {
    pub fn new(listener: TcpListener, pool_policy: PoolPolicy, settings: HandlerSettings) -> Self {
        let limit_connections = match pool_policy {
            PoolPolicy::Unbounded => None,
            PoolPolicy::Bounded(limit) => Some(Arc::new(Semaphore::new(limit))),
        };
        Server {
            listener,
            limit_connections,
            settings: Arc::new(settings),
        }
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the task is dropped, spawning one handler
    /// task per connection.
    ///
    /// Under a bounded pool the accept loop waits for a permit before taking
    /// the next connection; the permit is released when the handler finishes.
    /// A failed accept is logged and the loop carries on.
    pub async fn run(&self) -> AppResult<()> {
        loop {
            let permit = match &self.limit_connections {
                Some(limit) => Some(
                    limit
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| AppError::IllegalStateError(e.to_string()))?,
                ),
                None => None,
            };

            let (socket, peer_addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    error!("accept tcp connection error: {}", err);
                    continue;
                }
            };

            let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
            debug!(connection_id, %peer_addr, "accept new connection");

            let mut handler = ConnectionHandler {
                connection_id,
                connection: Connection::new(socket, self.settings.read_buffer_size),
                settings: self.settings.clone(),
            };

            tokio::spawn(async move {
                if let Err(err) = handler.handle_connection().await {
                    error!(
                        connection_id,
                        client = %handler.connection.client_addr,
                        "Connection error: {}",
                        err
                    );
                }
                // whether gracefully or unexpectedly closed, release connection
                drop(handler);
                drop(permit);
            });
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        debug!("tcp server dropped");
    }
}

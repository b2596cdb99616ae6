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

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tokio::{runtime, signal};
use tracing::{error, info};

use super::{FixtureConfig, HandlerSettings, Server};
use crate::network::{FrameObserver, TracingObserver};
use crate::{AppError, AppResult};

const LISTEN_BACKLOG: i32 = 1024;

pub struct FixtureBroker {
    config: FixtureConfig,
    observer: Arc<dyn FrameObserver>,
}

impl FixtureBroker {
    pub fn new(config: FixtureConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: FixtureConfig, observer: Arc<dyn FrameObserver>) -> Self {
        FixtureBroker { config, observer }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Runs the broker on `rt` until ctrl-c. A bind failure is returned to the
    /// caller and nothing is served.
    pub fn start(&self, rt: &runtime::Runtime) -> AppResult<()> {
        rt.block_on(self.run_tcp_server())?;
        info!("fixture broker shutdown complete");
        Ok(())
    }

    /// Binds the configured address with address reuse enabled and returns
    /// a server ready to run. A port still held by a live listener is
    /// reported as `AppError::Bind`.
    pub async fn bind(&self) -> AppResult<Server> {
        let listen_address = self.config.listen_address();
        let listener = bind_reusable(&listen_address).await.map_err(|err| {
            let error_msg = format!(
                "Failed to bind server to address: {} - Error: {}",
                listen_address, err
            );
            error!("{}", error_msg);
            AppError::Bind(error_msg)
        })?;
        info!("tcp server binding to {} for listening", &listen_address);

        let settings = HandlerSettings {
            scenario: self.config.fixture.scenario,
            read_buffer_size: self.config.network.read_buffer_size,
            observer: self.observer.clone(),
        };
        Ok(Server::new(listener, self.config.pool_policy(), settings))
    }

    async fn run_tcp_server(&self) -> AppResult<()> {
        let server = self.bind().await?;
        let scenario = self.config.fixture.scenario;
        info!(%scenario, "serving fixture: {}", scenario.description());

        tokio::select! {
          res = server.run() => {
              if let Err(err) = res {
                  error!(cause = %err, "failed to accept");
              }
          }
          _ = signal::ctrl_c() => {
              info!("get shutdown signal");
          }
        }
        Ok(())
    }
}

/// Creates a listening socket with SO_REUSEADDR so that a restarted fixture
/// can take the port back immediately. SO_REUSEPORT stays off: a second
/// listener on a port in use must fail.
pub async fn bind_reusable(listen_address: &str) -> io::Result<TcpListener> {
    let addr = tokio::net::lookup_host(listen_address)
        .await?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address resolved for {}", listen_address),
            )
        })?;
    let socket = Socket::new(
        match addr {
            SocketAddr::V4(_) => Domain::IPV4,
            SocketAddr::V6(_) => Domain::IPV6,
        },
        Type::STREAM,
        Some(Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    TcpListener::from_std(socket.into())
}

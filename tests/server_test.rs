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
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Buf;
use fixture_broker::{
    setup_local_tracing, AppResult, FixtureBroker, FixtureConfig, FrameObserver, RequestHeader,
    Scenario, TracingObserver,
};
use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

fn header_bytes(correlation_id: i32) -> [u8; 12] {
    let mut raw = [0u8; 12];
    raw[4..6].copy_from_slice(&18i16.to_be_bytes());
    raw[8..12].copy_from_slice(&correlation_id.to_be_bytes());
    raw
}

fn test_config(scenario: Scenario, port: u16, max_connection: usize) -> FixtureConfig {
    let _ = setup_local_tracing(2, None);
    let mut config = FixtureConfig::default();
    config.network.port = port;
    config.network.max_connection = max_connection;
    config.fixture.scenario = scenario;
    config
}

async fn start_broker(broker: FixtureBroker) -> (SocketAddr, JoinHandle<AppResult<()>>) {
    let server = broker.bind().await.expect("bind fixture broker");
    let addr = server.local_addr().expect("local addr");
    let handle = tokio::spawn(async move { server.run().await });
    (addr, handle)
}

async fn start_fixture(scenario: Scenario) -> (SocketAddr, JoinHandle<AppResult<()>>) {
    start_broker(FixtureBroker::new(test_config(scenario, 0, 0))).await
}

/// Sends `request`, then reads until the broker closes the connection.
async fn exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(request).await.expect("write request");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    response
}

#[tokio::test]
async fn test_api_versions_length_too_small() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;

    let raw = [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2A,
    ];
    let response = exchange(addr, &raw).await;
    assert_eq!(response.len(), 23);

    let mut response = &response[..];
    assert_eq!(response.get_i32(), 18);
    assert_eq!(response.get_i32(), 42);
    assert_eq!(response.remaining(), 15);

    handle.abort();
}

#[rstest]
#[case(Scenario::LengthTooLarge)]
#[case(Scenario::WellFormed)]
#[case(Scenario::TruncatedPayload)]
#[case(Scenario::InsufficientLengthBytes)]
#[case(Scenario::ZeroMessageLength)]
#[case(Scenario::CorrelationIdMismatch)]
#[case(Scenario::WrongArrayLength)]
#[case(Scenario::MissingTagBuffer)]
#[tokio::test]
async fn test_scenario_is_served_verbatim(#[case] scenario: Scenario) {
    let (addr, handle) = start_fixture(scenario).await;

    let response = exchange(addr, &header_bytes(1234)).await;
    assert_eq!(response, scenario.encode(1234).to_vec());

    handle.abort();
}

#[tokio::test]
async fn test_concurrent_connections_keep_their_correlation_ids() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;

    let mut first = TcpStream::connect(addr).await.unwrap();
    let mut second = TcpStream::connect(addr).await.unwrap();
    // answer order is independent of connect order
    second.write_all(&header_bytes(2)).await.unwrap();
    first.write_all(&header_bytes(1)).await.unwrap();

    let (first_response, second_response) = tokio::join!(
        async {
            let mut buf = Vec::new();
            first.read_to_end(&mut buf).await.unwrap();
            buf
        },
        async {
            let mut buf = Vec::new();
            second.read_to_end(&mut buf).await.unwrap();
            buf
        }
    );
    assert_eq!((&first_response[4..8]).get_i32(), 1);
    assert_eq!((&second_response[4..8]).get_i32(), 2);

    let many: Vec<_> = (0..16)
        .map(|id| tokio::spawn(async move { (id, exchange(addr, &header_bytes(id)).await) }))
        .collect();
    for task in many {
        let (id, response) = task.await.unwrap();
        assert_eq!((&response[4..8]).get_i32(), id);
    }

    handle.abort();
}

#[tokio::test]
async fn test_short_request_is_closed_without_response() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;

    let response = exchange(addr, &header_bytes(9)[..5]).await;
    assert!(response.is_empty());

    // the listener keeps serving
    let response = exchange(addr, &header_bytes(9)).await;
    assert_eq!(response.len(), 23);

    handle.abort();
}

#[tokio::test]
async fn test_silent_client_does_not_affect_others() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;

    // connects and hangs up without sending anything
    let mut quiet = TcpStream::connect(addr).await.unwrap();
    quiet.shutdown().await.unwrap();
    drop(quiet);

    // connects and never sends anything
    let _idle = TcpStream::connect(addr).await.unwrap();

    let response = exchange(addr, &header_bytes(77)).await;
    assert_eq!((&response[4..8]).get_i32(), 77);

    handle.abort();
}

#[tokio::test]
async fn test_bounded_pool_waits_for_a_free_permit() {
    let broker = FixtureBroker::new(test_config(Scenario::LengthTooSmall, 0, 1));
    let (addr, handle) = start_broker(broker).await;

    // sequential clients are all served
    for id in 0..3 {
        let response = exchange(addr, &header_bytes(id)).await;
        assert_eq!((&response[4..8]).get_i32(), id);
    }

    // an idle client holds the only permit
    let idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let waiting = tokio::spawn(async move { exchange(addr, &header_bytes(5)).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!waiting.is_finished());

    drop(idle);
    let response = tokio::time::timeout(Duration::from_secs(5), waiting)
        .await
        .expect("queued client served after permit release")
        .unwrap();
    assert_eq!((&response[4..8]).get_i32(), 5);

    handle.abort();
}

#[tokio::test]
async fn test_port_can_be_rebound_after_shutdown() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;
    let response = exchange(addr, &header_bytes(1)).await;
    assert_eq!(response.len(), 23);

    handle.abort();
    let _ = handle.await;

    let broker = FixtureBroker::new(test_config(Scenario::LengthTooSmall, addr.port(), 0));
    let server = broker.bind().await.expect("rebind the same port");
    assert_eq!(server.local_addr().unwrap().port(), addr.port());
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let mut config = test_config(Scenario::LengthTooSmall, 0, 0);
    // TEST-NET-1, never assigned to a local interface
    config.network.ip = "192.0.2.1".to_string();
    let broker = FixtureBroker::new(config);
    assert_eq!(broker.config().network.ip, "192.0.2.1");
    let err = broker.bind().await.unwrap_err();
    assert!(matches!(err, fixture_broker::AppError::Bind(_)));
}

#[tokio::test]
async fn test_port_in_use_is_fatal() {
    let (addr, handle) = start_fixture(Scenario::LengthTooSmall).await;

    let broker = FixtureBroker::new(test_config(Scenario::LengthTooSmall, addr.port(), 0));
    let err = broker.bind().await.unwrap_err();
    assert!(matches!(err, fixture_broker::AppError::Bind(_)));

    // the first listener still owns every connection
    let response = exchange(addr, &header_bytes(8)).await;
    assert_eq!((&response[4..8]).get_i32(), 8);

    handle.abort();
}

#[derive(Debug, Clone, PartialEq)]
enum FrameEvent {
    Received(Vec<u8>),
    Decoded(RequestHeader),
    Sent(Vec<u8>),
}

#[derive(Debug, Default)]
struct RecordingObserver {
    events: Mutex<Vec<FrameEvent>>,
}

impl FrameObserver for RecordingObserver {
    fn request_received(&self, _connection_id: u64, raw: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push(FrameEvent::Received(raw.to_vec()));
    }

    fn request_decoded(&self, _connection_id: u64, header: &RequestHeader) {
        self.events.lock().unwrap().push(FrameEvent::Decoded(*header));
    }

    fn response_sent(&self, _connection_id: u64, response: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push(FrameEvent::Sent(response.to_vec()));
    }
}

#[tokio::test]
async fn test_observer_sees_every_frame() {
    let observer = Arc::new(RecordingObserver::default());
    let broker = FixtureBroker::with_observer(
        test_config(Scenario::LengthTooSmall, 0, 0),
        observer.clone(),
    );
    let (addr, handle) = start_broker(broker).await;

    let mut request = header_bytes(42).to_vec();
    request.extend_from_slice(&[0x00, 0x00, 0x00]);
    let response = exchange(addr, &request).await;

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            FrameEvent::Received(request),
            FrameEvent::Decoded(RequestHeader::new(0, 18, 0, 42)),
            FrameEvent::Sent(response),
        ]
    );

    handle.abort();
}

#[tokio::test]
async fn test_observer_skips_undecodable_requests() {
    let observer = Arc::new(RecordingObserver::default());
    let broker = FixtureBroker::with_observer(
        test_config(Scenario::LengthTooSmall, 0, 0),
        observer.clone(),
    );
    let (addr, handle) = start_broker(broker).await;

    let response = exchange(addr, &[0x00, 0x00, 0x00]).await;
    assert!(response.is_empty());

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(events, vec![FrameEvent::Received(vec![0x00, 0x00, 0x00])]);

    handle.abort();
}

#[tokio::test]
async fn test_tracing_observer_serves_requests() {
    let broker = FixtureBroker::with_observer(
        test_config(Scenario::WellFormed, 0, 0),
        Arc::new(TracingObserver),
    );
    let (addr, handle) = start_broker(broker).await;
    let response = exchange(addr, &header_bytes(3)).await;
    assert_eq!((&response[..4]).get_i32(), 19);
    handle.abort();
}

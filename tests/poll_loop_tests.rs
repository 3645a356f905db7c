//! Tests for the reference poll loop driving a coordinator manager.

use async_trait::async_trait;
use findcoord::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const GROUP: &str = "loop-group";

/// Transport answering from a script, then with a fixed fallback.
struct ScriptedTransport {
    script: Mutex<VecDeque<ClientResult<FindCoordinatorResponseData>>>,
    fallback: ClientResult<FindCoordinatorResponseData>,
    sent: Arc<AtomicUsize>,
    delay: Duration,
}

impl ScriptedTransport {
    fn new(
        script: Vec<ClientResult<FindCoordinatorResponseData>>,
        fallback: ClientResult<FindCoordinatorResponseData>,
    ) -> (Self, Arc<AtomicUsize>) {
        let sent = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            script: Mutex::new(script.into()),
            fallback,
            sent: sent.clone(),
            delay: Duration::from_millis(1),
        };
        (transport, sent)
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Request = FindCoordinatorRequestData;
    type Response = FindCoordinatorResponseData;

    async fn send(&self, request: UnsentRequest<Self::Request>) -> ClientResult<Self::Response> {
        assert_eq!(request.request.key, GROUP);
        assert!(request.node.is_none());

        self.sent.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let next = self.script.lock().await.pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

fn manager(floor_ms: u64) -> CoordinatorRequestManager {
    let config = DiscoveryConfig::new(GROUP)
        .with_retry_backoff(Duration::from_millis(floor_ms), Duration::from_millis(floor_ms * 4))
        .with_jitter(0.0);
    CoordinatorRequestManager::new(config).unwrap()
}

fn found(node_id: i32) -> ClientResult<FindCoordinatorResponseData> {
    Ok(FindCoordinatorResponseData::legacy_success(node_id, "broker", 9092))
}

async fn run_for(
    poll_loop: PollLoop<CoordinatorRequestManager, ScriptedTransport>,
    duration: Duration,
) -> CoordinatorRequestManager {
    let handle = poll_loop.handle();
    let task = tokio::spawn(poll_loop.run());
    tokio::time::sleep(duration).await;
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("loop stops after shutdown")
        .expect("loop task does not panic")
}

#[tokio::test]
async fn test_loop_discovers_coordinator() {
    let (transport, sent) = ScriptedTransport::new(vec![], found(4));
    let poll_loop = PollLoop::new(manager(10), transport)
        .with_max_poll_interval(Duration::from_millis(5));

    let manager = run_for(poll_loop, Duration::from_millis(100)).await;

    let coordinator = manager.coordinator().expect("coordinator discovered");
    assert_eq!(coordinator.id, BrokerId(i32::MAX - 4));
    assert_eq!(sent.load(Ordering::SeqCst), 1);
    assert!(manager.is_closing());
    assert_eq!(manager.state(0), DiscoveryState::Closed);
}

#[tokio::test]
async fn test_loop_retries_after_retriable_failures() {
    let (transport, sent) = ScriptedTransport::new(
        vec![
            Err(ClientError::Network("connection refused".into())),
            Err(ClientError::from(KafkaCode::GroupCoordinatorNotAvailable)),
        ],
        found(2),
    );
    let poll_loop = PollLoop::new(manager(10), transport)
        .with_max_poll_interval(Duration::from_millis(5));

    let manager = run_for(poll_loop, Duration::from_millis(300)).await;

    assert!(manager.coordinator().is_some());
    assert!(manager.fatal_error().is_none());
    assert_eq!(sent.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_loop_keeps_single_request_in_flight() {
    let (transport, sent) = ScriptedTransport::new(vec![], found(1));
    let transport = transport.with_delay(Duration::from_millis(200));
    let poll_loop = PollLoop::new(manager(10), transport)
        .with_max_poll_interval(Duration::from_millis(1));

    let manager = run_for(poll_loop, Duration::from_millis(100)).await;

    assert_eq!(sent.load(Ordering::SeqCst), 1);
    assert!(manager.coordinator().is_none());
    assert!(manager.request_state().request_in_flight());
}

#[tokio::test]
async fn test_loop_surfaces_fatal_error() {
    let (transport, _sent) = ScriptedTransport::new(
        vec![],
        Err(ClientError::from(KafkaCode::GroupAuthorizationFailed)),
    );
    let poll_loop = PollLoop::new(manager(50), transport)
        .with_max_poll_interval(Duration::from_millis(5));

    let mut manager = run_for(poll_loop, Duration::from_millis(60)).await;

    assert_eq!(
        manager.get_and_clear_fatal_error(),
        Some(ClientError::GroupAuthorization {
            group_id: GROUP.to_string()
        })
    );
    assert!(manager.coordinator().is_none());
}

#[tokio::test]
async fn test_shutdown_before_run_stops_immediately() {
    let (transport, sent) = ScriptedTransport::new(vec![], found(1));
    let transport = transport.with_delay(Duration::from_millis(50));
    let poll_loop = PollLoop::new(manager(10), transport);
    let handle = poll_loop.handle();
    handle.shutdown();
    handle.shutdown();

    let manager = tokio::time::timeout(Duration::from_secs(5), poll_loop.run())
        .await
        .expect("loop stops");

    assert!(manager.is_closing());
    // The first turn polls before it observes the shutdown.
    assert!(sent.load(Ordering::SeqCst) <= 1);
}

//! Reference driver for a single [`RequestManager`].
//!
//! The loop polls the manager, hands every emitted request to a
//! [`Transport`] on its own task, and feeds completions back through a
//! channel so the manager is only ever touched from the loop's task.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use findcoord::client::{
//!     ClientResult, CoordinatorRequestManager, DiscoveryConfig, PollLoop, Transport,
//!     UnsentRequest,
//! };
//! use findcoord::protocol::{FindCoordinatorRequestData, FindCoordinatorResponseData};
//!
//! struct FixedCoordinator;
//!
//! #[async_trait]
//! impl Transport for FixedCoordinator {
//!     type Request = FindCoordinatorRequestData;
//!     type Response = FindCoordinatorResponseData;
//!
//!     async fn send(
//!         &self,
//!         _request: UnsentRequest<Self::Request>,
//!     ) -> ClientResult<Self::Response> {
//!         Ok(FindCoordinatorResponseData::legacy_success(1, "localhost", 9092))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = CoordinatorRequestManager::new(DiscoveryConfig::new("payments"))?;
//!     let poll_loop = PollLoop::new(manager, FixedCoordinator);
//!     let handle = poll_loop.handle();
//!
//!     let task = tokio::spawn(poll_loop.run());
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//!     handle.shutdown();
//!
//!     let manager = task.await?;
//!     println!("coordinator: {:?}", manager.coordinator());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::constants::{COMPLETION_CHANNEL_CAPACITY, DEFAULT_MAX_POLL_INTERVAL_MS};

use super::backoff::saturating_millis;
use super::error::ClientResult;
use super::network::{RequestCompletion, RequestManager, UnsentRequest};

/// Sends one request and resolves with the broker's answer.
///
/// Implementations own connection handling. A lost connection should be
/// reported as [`ClientError::Disconnected`](super::ClientError::Disconnected).
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;

    async fn send(&self, request: UnsentRequest<Self::Request>) -> ClientResult<Self::Response>;
}

/// Milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        saturating_millis(self.origin.elapsed())
    }
}

/// Cloneable handle that stops a running [`PollLoop`].
#[derive(Debug, Clone)]
pub struct PollLoopHandle {
    shutdown_tx: broadcast::Sender<()>,
}

impl PollLoopHandle {
    /// Signal the loop to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        debug!("Poll loop shutdown signal sent");
    }
}

/// Drives a request manager against a transport until shut down.
pub struct PollLoop<M, T>
where
    M: RequestManager,
    T: Transport<Request = M::Request, Response = M::Response>,
{
    manager: M,
    transport: Arc<T>,
    clock: MonotonicClock,
    max_poll_interval: Duration,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
    completion_tx: mpsc::Sender<RequestCompletion<M::Response>>,
    completion_rx: mpsc::Receiver<RequestCompletion<M::Response>>,
}

impl<M, T> PollLoop<M, T>
where
    M: RequestManager + Send,
    M::Request: Send + 'static,
    M::Response: Send + 'static,
    T: Transport<Request = M::Request, Response = M::Response>,
{
    pub fn new(manager: M, transport: T) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_CHANNEL_CAPACITY);

        Self {
            manager,
            transport: Arc::new(transport),
            clock: MonotonicClock::new(),
            max_poll_interval: Duration::from_millis(DEFAULT_MAX_POLL_INTERVAL_MS),
            shutdown_tx,
            shutdown_rx,
            completion_tx,
            completion_rx,
        }
    }

    /// Cap on how long the loop sleeps between polls.
    ///
    /// A zero interval is raised to 1ms.
    pub fn with_max_poll_interval(mut self, interval: Duration) -> Self {
        self.max_poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Use `clock` for the timestamps handed to the manager.
    pub fn with_clock(mut self, clock: MonotonicClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn handle(&self) -> PollLoopHandle {
        PollLoopHandle {
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Run until [`PollLoopHandle::shutdown`] is called.
    ///
    /// On shutdown the manager is told to close, completions already
    /// delivered are applied, and the manager is handed back.
    pub async fn run(mut self) -> M {
        info!("Poll loop started");

        loop {
            let now = self.clock.now_ms();
            let result = self.manager.poll(now);
            let wait_ms = result
                .time_until_next_poll_ms
                .min(self.manager.maximum_time_to_wait(now))
                .min(saturating_millis(self.max_poll_interval));

            for request in result.unsent_requests {
                self.dispatch(request);
            }

            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("Poll loop shutting down");
                    self.manager.signal_close();
                    while let Ok(completion) = self.completion_rx.try_recv() {
                        self.manager.on_complete(completion);
                    }
                    return self.manager;
                }
                Some(completion) = self.completion_rx.recv() => {
                    self.manager.on_complete(completion);
                }
                _ = tokio::time::sleep(Duration::from_millis(wait_ms)) => {}
            }
        }
    }

    fn dispatch(&self, request: UnsentRequest<M::Request>) {
        let transport = Arc::clone(&self.transport);
        let completion_tx = self.completion_tx.clone();
        let clock = self.clock;

        debug!(
            node = ?request.node.as_ref().map(|n| n.address()),
            created_time_ms = request.created_time_ms,
            "Dispatching request"
        );

        tokio::spawn(async move {
            let completion = match transport.send(request).await {
                Ok(response) => RequestCompletion::Response {
                    response,
                    received_time_ms: clock.now_ms(),
                },
                Err(error) => RequestCompletion::Failed {
                    error,
                    completion_time_ms: clock.now_ms(),
                },
            };

            if completion_tx.send(completion).await.is_err() {
                debug!("Poll loop stopped before the completion was delivered");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[tokio::test]
    async fn test_clock_advances() {
        let clock = MonotonicClock::new();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(clock.now_ms() >= 20);
    }
}

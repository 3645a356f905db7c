//! Group coordinator discovery.
//!
//! [`CoordinatorRequestManager`] keeps the client's belief about which broker
//! coordinates its consumer group. While the coordinator is unknown it emits
//! at most one FindCoordinator request at a time, backing off between failed
//! attempts. Once known, it stays silent until a dependent reports the
//! coordinator connection lost.
//!
//! # State Machine
//!
//! ```text
//!                     success response
//!   Unknown-Ready ──► Unknown-InFlight ──────────────► Known
//!        ▲                  │                            │
//!        │ backoff elapsed  │ failure / error response   │ disconnect
//!        │                  ▼                            │
//!   Unknown-Idle ◄──────────┘                            │
//!        ▲                                               │
//!        └───────────────────────────────────────────────┘
//! ```
//!
//! `signal_close` moves every state to Closed, where no new request is
//! produced. A request already in flight still completes.
//!
//! Fatal failures never leave a poll turn; they are parked in a one-shot
//! slot for the group's other managers to collect with
//! [`CoordinatorRequestManager::get_and_clear_fatal_error`]. A later
//! successful lookup discards a parked error nobody collected.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{Error, KafkaCode, Result};
use crate::protocol::{FindCoordinatorRequestData, FindCoordinatorResponseData};
use crate::types::Node;

use super::backoff::{ExponentialBackoff, saturating_millis};
use super::config::DiscoveryConfig;
use super::disconnect::{DisconnectReport, DisconnectTracker};
use super::error::ClientError;
use super::fatal_error::FatalErrorSlot;
use super::metrics;
use super::network::{PollResult, RequestCompletion, RequestManager, UnsentRequest};
use super::request_state::RequestState;

/// What the manager currently believes about the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CoordinatorBelief {
    #[default]
    Unknown,
    Known(Node),
}

impl CoordinatorBelief {
    #[inline]
    pub fn node(&self) -> Option<&Node> {
        match self {
            CoordinatorBelief::Known(node) => Some(node),
            CoordinatorBelief::Unknown => None,
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(self, CoordinatorBelief::Known(_))
    }
}

/// Observable discovery state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// `signal_close` was called.
    Closed,
    /// The coordinator is known.
    Known,
    /// Unknown, a lookup is awaiting its completion.
    UnknownInFlight,
    /// Unknown, waiting out the backoff.
    UnknownIdle,
    /// Unknown, the next poll sends a lookup.
    UnknownReady,
}

impl DiscoveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryState::Closed => "closed",
            DiscoveryState::Known => "known",
            DiscoveryState::UnknownInFlight => "unknown_in_flight",
            DiscoveryState::UnknownIdle => "unknown_idle",
            DiscoveryState::UnknownReady => "unknown_ready",
        }
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finds and tracks the coordinator of one consumer group.
#[derive(Debug)]
pub struct CoordinatorRequestManager {
    group_id: String,
    belief: CoordinatorBelief,
    request_state: RequestState,
    disconnect: DisconnectTracker,
    fatal_error: FatalErrorSlot,
    closing: bool,
}

impl CoordinatorRequestManager {
    /// Create a manager with the coordinator unknown.
    ///
    /// Fails with [`Error::Config`] when `config` does not validate.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| Error::Config(errors.join("; ")))?;

        let backoff = ExponentialBackoff::from_durations(
            config.retry_backoff,
            config.retry_backoff_max,
            config.retry_backoff_jitter,
        );

        Ok(Self {
            group_id: config.group_id,
            belief: CoordinatorBelief::Unknown,
            request_state: RequestState::new("CoordinatorRequestManager", backoff),
            disconnect: DisconnectTracker::new(saturating_millis(config.disconnect_log_interval)),
            fatal_error: FatalErrorSlot::new(),
            closing: false,
        })
    }

    /// Decide whether to look the coordinator up now.
    ///
    /// Never blocks and never fails. Returns at most one request.
    pub fn poll(&mut self, current_time_ms: u64) -> PollResult<FindCoordinatorRequestData> {
        if self.closing || self.belief.is_known() {
            return PollResult::empty();
        }

        if self.request_state.request_in_flight() {
            return PollResult::empty();
        }

        if self.request_state.can_send_request(current_time_ms) {
            let request = self.make_find_coordinator_request(current_time_ms);
            return PollResult::with_request(request);
        }

        PollResult::wait(self.request_state.remaining_backoff_ms(current_time_ms))
    }

    fn make_find_coordinator_request(
        &mut self,
        current_time_ms: u64,
    ) -> UnsentRequest<FindCoordinatorRequestData> {
        self.request_state.on_send_attempt(current_time_ms);
        metrics::record_request_sent();
        debug!(group_id = %self.group_id, "Sending FindCoordinator request");

        UnsentRequest::to_any_node(
            FindCoordinatorRequestData::for_group(self.group_id.as_str()),
            current_time_ms,
        )
    }

    /// Apply the outcome of a FindCoordinator request.
    pub fn on_complete(&mut self, completion: RequestCompletion<FindCoordinatorResponseData>) {
        match completion {
            RequestCompletion::Response {
                response,
                received_time_ms,
            } => self.on_response(received_time_ms, &response),
            RequestCompletion::Failed {
                error,
                completion_time_ms,
            } => self.on_failed_response(completion_time_ms, error),
        }
    }

    fn on_response(&mut self, current_time_ms: u64, response: &FindCoordinatorResponseData) {
        let Some(coordinator) = response.coordinator_by_key(&self.group_id) else {
            let error = ClientError::IllegalState(format!(
                "FindCoordinator response did not contain a coordinator for group {}",
                self.group_id
            ));
            self.on_failed_response(current_time_ms, error);
            return;
        };

        if coordinator.error_code != KafkaCode::None {
            let error = ClientError::from_code(coordinator.error_code, coordinator.error_message);
            self.on_failed_response(current_time_ms, error);
            return;
        }

        let node = Node::coordinator(coordinator.node_id, coordinator.host, coordinator.port);
        self.on_successful_response(current_time_ms, node);
    }

    fn on_successful_response(&mut self, current_time_ms: u64, coordinator: Node) {
        info!(
            group_id = %self.group_id,
            coordinator = %coordinator,
            "Discovered group coordinator"
        );
        metrics::record_discovery_success();

        self.belief = CoordinatorBelief::Known(coordinator);
        self.fatal_error.take();
        self.disconnect.reset();
        self.request_state.on_successful_attempt(current_time_ms);
    }

    fn on_failed_response(&mut self, current_time_ms: u64, error: ClientError) {
        self.request_state.on_failed_attempt(current_time_ms);
        self.mark_coordinator_unknown(&error.to_string(), current_time_ms);

        if error.is_retriable() {
            debug!(
                group_id = %self.group_id,
                error = %error,
                backoff_ms = self.request_state.backoff_ms(),
                "FindCoordinator request failed due to retriable exception"
            );
            metrics::record_retriable_failure();
            return;
        }

        if error.is_group_authorization_failure() {
            debug!(
                group_id = %self.group_id,
                "FindCoordinator request hit fatal exception: not authorized for group"
            );
            let error = ClientError::GroupAuthorization {
                group_id: self.group_id.clone(),
            };
            metrics::record_fatal_failure(error.kind());
            self.fatal_error.set(error);
            return;
        }

        warn!(
            group_id = %self.group_id,
            error = %error,
            "FindCoordinator request failed due to fatal exception"
        );
        metrics::record_fatal_failure(error.kind());
        self.fatal_error.set(error);
    }

    /// Forget the coordinator.
    ///
    /// Logs the transition when a known coordinator is dropped. While the
    /// coordinator stays unknown, repeated calls log a warning at most once
    /// per disconnect logging interval.
    pub fn mark_coordinator_unknown(&mut self, cause: &str, current_time_ms: u64) {
        if let CoordinatorBelief::Known(previous) = std::mem::take(&mut self.belief) {
            info!(
                group_id = %self.group_id,
                coordinator = %previous,
                cause,
                "Group coordinator is unavailable or invalid; will attempt rediscovery"
            );
            metrics::record_coordinator_unknown();
            self.disconnect.start(current_time_ms);
            return;
        }

        if let DisconnectReport::Warn { disconnected_ms } = self.disconnect.observe(current_time_ms) {
            warn!(
                group_id = %self.group_id,
                disconnected_ms,
                cause,
                "Consumer has been disconnected from the group coordinator"
            );
            metrics::record_disconnect_warning();
        }
    }

    /// Forget the coordinator if `error` reports a lost connection.
    ///
    /// Any other error leaves the belief untouched.
    pub fn handle_coordinator_disconnect(&mut self, error: &ClientError, current_time_ms: u64) {
        if error.is_disconnect() {
            self.mark_coordinator_unknown(&error.to_string(), current_time_ms);
        }
    }

    /// The current coordinator, if known.
    #[inline]
    pub fn coordinator(&self) -> Option<&Node> {
        self.belief.node()
    }

    #[inline]
    pub fn belief(&self) -> &CoordinatorBelief {
        &self.belief
    }

    /// The pending fatal error, left in place.
    #[inline]
    pub fn fatal_error(&self) -> Option<&ClientError> {
        self.fatal_error.peek()
    }

    /// The pending fatal error, cleared so it is reported once.
    pub fn get_and_clear_fatal_error(&mut self) -> Option<ClientError> {
        self.fatal_error.take()
    }

    /// Stop sending lookups. A request already in flight still completes.
    pub fn signal_close(&mut self) {
        if !self.closing {
            debug!(group_id = %self.group_id, "Coordinator discovery closing");
        }
        self.closing = true;
    }

    #[inline]
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn state(&self, current_time_ms: u64) -> DiscoveryState {
        if self.closing {
            DiscoveryState::Closed
        } else if self.belief.is_known() {
            DiscoveryState::Known
        } else if self.request_state.request_in_flight() {
            DiscoveryState::UnknownInFlight
        } else if self.request_state.remaining_backoff_ms(current_time_ms) > 0 {
            DiscoveryState::UnknownIdle
        } else {
            DiscoveryState::UnknownReady
        }
    }

    #[inline]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    #[inline]
    pub fn request_state(&self) -> &RequestState {
        &self.request_state
    }

    #[inline]
    pub fn disconnect_tracker(&self) -> &DisconnectTracker {
        &self.disconnect
    }
}

impl RequestManager for CoordinatorRequestManager {
    type Request = FindCoordinatorRequestData;
    type Response = FindCoordinatorResponseData;

    fn poll(&mut self, current_time_ms: u64) -> PollResult<Self::Request> {
        CoordinatorRequestManager::poll(self, current_time_ms)
    }

    fn on_complete(&mut self, completion: RequestCompletion<Self::Response>) {
        CoordinatorRequestManager::on_complete(self, completion)
    }

    fn signal_close(&mut self) {
        CoordinatorRequestManager::signal_close(self)
    }
}

//! Contract between request managers and the loop that drives them.
//!
//! A request manager never touches the network. On each poll turn it
//! describes what it wants sent as a [`PollResult`]; the driver sends the
//! requests and hands every outcome back as a [`RequestCompletion`]. The
//! driver must apply completions on the same logical thread that polls,
//! which [`RequestManager`] enforces by taking `&mut self`.

use crate::constants::WAIT_FOREVER_MS;
use crate::types::Node;

use super::error::ClientError;

/// A request a manager wants sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsentRequest<Req> {
    pub request: Req,
    /// Target node; `None` lets the driver pick any available broker.
    pub node: Option<Node>,
    /// Poll time at which the manager produced the request.
    pub created_time_ms: u64,
}

impl<Req> UnsentRequest<Req> {
    /// Request for any available broker.
    pub fn to_any_node(request: Req, created_time_ms: u64) -> Self {
        Self {
            request,
            node: None,
            created_time_ms,
        }
    }
}

/// Output of one poll turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult<Req> {
    /// Advisory wait before the manager needs polling again.
    /// [`WAIT_FOREVER_MS`] means "nothing scheduled".
    pub time_until_next_poll_ms: u64,
    pub unsent_requests: Vec<UnsentRequest<Req>>,
}

impl<Req> PollResult<Req> {
    /// Nothing to send and nothing scheduled.
    pub fn empty() -> Self {
        Self::wait(WAIT_FOREVER_MS)
    }

    /// Nothing to send; poll again after `time_until_next_poll_ms`.
    pub fn wait(time_until_next_poll_ms: u64) -> Self {
        Self {
            time_until_next_poll_ms,
            unsent_requests: Vec::new(),
        }
    }

    /// A single request to send.
    pub fn with_request(request: UnsentRequest<Req>) -> Self {
        Self {
            time_until_next_poll_ms: WAIT_FOREVER_MS,
            unsent_requests: vec![request],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.unsent_requests.is_empty()
    }
}

/// Outcome of a sent request, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestCompletion<Resp> {
    /// The broker answered.
    Response { response: Resp, received_time_ms: u64 },
    /// No response: the transport failed or the broker could not be reached.
    Failed {
        error: ClientError,
        completion_time_ms: u64,
    },
}

impl<Resp> RequestCompletion<Resp> {
    /// When the outcome was observed.
    pub fn completion_time_ms(&self) -> u64 {
        match self {
            RequestCompletion::Response {
                received_time_ms, ..
            } => *received_time_ms,
            RequestCompletion::Failed {
                completion_time_ms, ..
            } => *completion_time_ms,
        }
    }
}

/// A component that decides when to send requests of one kind.
///
/// Implementations must be cheap to poll when idle: the driver calls
/// [`poll`](RequestManager::poll) on every turn.
pub trait RequestManager {
    type Request;
    type Response;

    /// Describe what to send now, or how long to wait.
    fn poll(&mut self, current_time_ms: u64) -> PollResult<Self::Request>;

    /// Apply the outcome of a request produced by [`poll`](RequestManager::poll).
    fn on_complete(&mut self, completion: RequestCompletion<Self::Response>);

    /// Stop producing new requests. In-flight requests still complete.
    fn signal_close(&mut self);

    /// Upper bound on how long the driver may wait before the next poll.
    fn maximum_time_to_wait(&self, _current_time_ms: u64) -> u64 {
        WAIT_FOREVER_MS
    }
}

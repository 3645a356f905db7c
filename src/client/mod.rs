//! Client-side request managers.
//!
//! # Module Structure
//!
//! - [`coordinator`]: Group coordinator discovery and tracking
//! - [`network`]: Poll/completion contract shared by request managers
//! - [`request_state`]: Attempt timing for one retryable request
//! - [`backoff`]: Exponential backoff with jitter
//! - [`disconnect`]: Throttled reporting of coordinator outages
//! - [`fatal_error`]: One-shot fatal error delivery
//! - [`poll_loop`]: Reference async driver for a request manager
//! - [`config`]: Discovery settings
//! - [`error`]: Request failure taxonomy
//! - [`metrics`]: Prometheus metrics
//!
//! # Usage
//!
//! ```rust
//! use findcoord::client::{CoordinatorRequestManager, DiscoveryConfig, RequestCompletion};
//! use findcoord::protocol::FindCoordinatorResponseData;
//!
//! let mut manager = CoordinatorRequestManager::new(DiscoveryConfig::new("payments")).unwrap();
//!
//! let result = manager.poll(0);
//! assert_eq!(result.unsent_requests.len(), 1);
//!
//! manager.on_complete(RequestCompletion::Response {
//!     response: FindCoordinatorResponseData::legacy_success(3, "broker-3", 9092),
//!     received_time_ms: 5,
//! });
//! assert_eq!(manager.coordinator().unwrap().address(), "broker-3:9092");
//! ```

pub mod backoff;
pub mod config;
pub mod coordinator;
pub mod disconnect;
pub mod error;
pub mod fatal_error;
pub mod metrics;
pub mod network;
pub mod poll_loop;
pub mod request_state;

pub use backoff::ExponentialBackoff;
pub use config::DiscoveryConfig;
pub use coordinator::{CoordinatorBelief, CoordinatorRequestManager, DiscoveryState};
pub use disconnect::{DisconnectReport, DisconnectTracker};
pub use error::{ClientError, ClientResult};
pub use fatal_error::FatalErrorSlot;
pub use network::{PollResult, RequestCompletion, RequestManager, UnsentRequest};
pub use poll_loop::{MonotonicClock, PollLoop, PollLoopHandle, Transport};
pub use request_state::RequestState;

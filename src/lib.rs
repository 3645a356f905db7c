//! # findcoord
//! Non-blocking Kafka group coordinator discovery.
//!
//! A consumer group member has to know which broker coordinates its group
//! before it can join, heartbeat or commit. This crate provides the request
//! manager that finds that broker with FindCoordinator requests and keeps
//! track of it afterwards, without ever blocking or touching the network
//! itself.
//!
//! # Goals
//! - Never block the caller: every operation is a plain state update
//! - At most one lookup in flight, exponential backoff between failures
//! - Retriable failures stay internal; fatal ones are handed out once
//! - Quiet logs during long outages
//!
//! ## Getting started
//!
//! Drive a [`CoordinatorRequestManager`](client::CoordinatorRequestManager)
//! from your own poll loop:
//!
//! ```rust
//! use findcoord::prelude::*;
//!
//! let mut manager = CoordinatorRequestManager::new(DiscoveryConfig::new("payments"))?;
//!
//! // The coordinator is unknown, so the first poll asks for a lookup.
//! let result = manager.poll(0);
//! let request = &result.unsent_requests[0];
//! assert_eq!(request.request.key, "payments");
//!
//! // Hand the broker's answer back.
//! manager.on_complete(RequestCompletion::Response {
//!     response: FindCoordinatorResponseData::legacy_success(3, "broker-3", 9092),
//!     received_time_ms: 5,
//! });
//! assert_eq!(manager.coordinator().map(|n| n.address()).as_deref(), Some("broker-3:9092"));
//!
//! // Known coordinator: nothing more to send.
//! assert!(manager.poll(10).is_empty());
//! # Ok::<(), findcoord::error::Error>(())
//! ```
//!
//! Or hand it to the reference async driver, [`PollLoop`](client::PollLoop),
//! with your own [`Transport`](client::Transport).
//!
//! ## Resources
//! - [Kafka Protocol Spec](https://kafka.apache.org/protocol.html)
//! - [FindCoordinator API](https://kafka.apache.org/protocol.html#The_Messages_FindCoordinator)

#![forbid(unsafe_code)]

pub mod client;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod types;

pub mod prelude {
    //! Main exports for driving coordinator discovery.
    pub use crate::client::{
        ClientError, ClientResult, CoordinatorRequestManager, DiscoveryConfig, DiscoveryState,
        PollLoop, PollLoopHandle, PollResult, RequestCompletion, RequestManager, Transport,
        UnsentRequest,
    };
    pub use crate::error::{Error, KafkaCode, Result};
    pub use crate::protocol::{
        CoordinatorData, FindCoordinatorRequestData, FindCoordinatorResponseData,
    };
    pub use crate::types::{BrokerId, CoordinatorType, Node};
}

//! FindCoordinator request and response data.
//!
//! These are the decoded forms exchanged with the transport. Encoding them
//! to the wire is the transport's job.
//!
//! Version 4 of the API batches lookups: the request carries
//! `coordinator_keys` and the response a `coordinators` array with one entry
//! per key. Older versions carry a single `key` and answer with top-level
//! node fields. [`FindCoordinatorResponseData::coordinator_by_key`] hides the
//! difference.

use crate::constants::{FIND_COORDINATOR_API_KEY, FIND_COORDINATOR_BATCHED_MIN_VERSION};
use crate::error::KafkaCode;
use crate::types::{BrokerId, CoordinatorType};

// ============================================================================
// FindCoordinator Request
// ============================================================================

/// FindCoordinator request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCoordinatorRequestData {
    /// Lookup key for versions before batching.
    pub key: String,
    pub key_type: i8,
    /// Lookup keys for batched versions.
    pub coordinator_keys: Vec<String>,
}

impl FindCoordinatorRequestData {
    pub const API_KEY: i16 = FIND_COORDINATOR_API_KEY;

    /// Whether `api_version` sends `coordinator_keys` rather than `key`.
    #[inline]
    pub fn is_batched_version(api_version: i16) -> bool {
        api_version >= FIND_COORDINATOR_BATCHED_MIN_VERSION
    }

    /// Request looking up the coordinator for a single key.
    pub fn new(key: impl Into<String>, coordinator_type: CoordinatorType) -> Self {
        let key = key.into();
        Self {
            coordinator_keys: vec![key.clone()],
            key,
            key_type: coordinator_type.id(),
        }
    }

    /// Request looking up a consumer group coordinator.
    pub fn for_group(group_id: impl Into<String>) -> Self {
        Self::new(group_id, CoordinatorType::Group)
    }

    /// The decoded key type, if it is one this crate knows.
    pub fn coordinator_type(&self) -> Option<CoordinatorType> {
        CoordinatorType::from_id(self.key_type)
    }
}

// ============================================================================
// FindCoordinator Response
// ============================================================================

/// One coordinator entry of a FindCoordinator response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinatorData {
    pub key: String,
    pub node_id: BrokerId,
    pub host: String,
    pub port: i32,
    pub error_code: KafkaCode,
    pub error_message: Option<String>,
}

impl CoordinatorData {
    /// Entry naming the coordinator for `key`.
    pub fn success(key: impl Into<String>, node_id: i32, host: impl Into<String>, port: i32) -> Self {
        Self {
            key: key.into(),
            node_id: BrokerId(node_id),
            host: host.into(),
            port,
            error_code: KafkaCode::None,
            error_message: None,
        }
    }

    /// Entry reporting why no coordinator could be named for `key`.
    pub fn error(key: impl Into<String>, error_code: KafkaCode, error_message: Option<String>) -> Self {
        Self {
            key: key.into(),
            node_id: BrokerId::INVALID,
            host: String::new(),
            port: -1,
            error_code,
            error_message,
        }
    }
}

/// FindCoordinator response data.
///
/// Batched responses fill `coordinators`; legacy responses leave it empty
/// and fill the top-level fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindCoordinatorResponseData {
    pub throttle_time_ms: i32,
    pub error_code: KafkaCode,
    pub error_message: Option<String>,
    pub node_id: BrokerId,
    pub host: String,
    pub port: i32,
    pub coordinators: Vec<CoordinatorData>,
}

impl FindCoordinatorResponseData {
    /// Batched response with the given entries.
    pub fn batched(coordinators: Vec<CoordinatorData>) -> Self {
        Self {
            node_id: BrokerId::INVALID,
            port: -1,
            coordinators,
            ..Default::default()
        }
    }

    /// Legacy success response with top-level coordinator info.
    pub fn legacy_success(node_id: i32, host: impl Into<String>, port: i32) -> Self {
        Self {
            node_id: BrokerId(node_id),
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Legacy error response.
    pub fn legacy_error(error_code: KafkaCode, error_message: Option<String>) -> Self {
        Self {
            error_code,
            error_message,
            node_id: BrokerId::INVALID,
            port: -1,
            ..Default::default()
        }
    }

    /// The coordinator entry answering `key`.
    ///
    /// A legacy response answers exactly one key, so its top-level fields
    /// are returned as the entry for whatever key was asked. A response
    /// with no entries and neither a node nor an error answers nothing.
    pub fn coordinator_by_key(&self, key: &str) -> Option<CoordinatorData> {
        if self.coordinators.is_empty() {
            if !self.node_id.is_valid() && self.error_code == KafkaCode::None {
                return None;
            }
            return Some(CoordinatorData {
                key: key.to_string(),
                node_id: self.node_id,
                host: self.host.clone(),
                port: self.port,
                error_code: self.error_code,
                error_message: self.error_message.clone(),
            });
        }

        self.coordinators.iter().find(|c| c.key == key).cloned()
    }
}

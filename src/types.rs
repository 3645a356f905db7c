//! Type-safe wrappers for Kafka client primitives.
//!
//! These newtypes keep broker identifiers, connection identifiers and
//! coordinator key types from being mixed up with plain integers.

use std::fmt;

use crate::constants::{
    COORDINATOR_KEY_TYPE_GROUP, COORDINATOR_KEY_TYPE_SHARE, COORDINATOR_KEY_TYPE_TRANSACTION,
};

/// A Kafka broker identifier.
///
/// Broker IDs are 32-bit signed integers that uniquely identify
/// brokers within a Kafka cluster. The same type is used for the synthetic
/// connection id of a coordinator node, see
/// [`BrokerId::coordinator_connection_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BrokerId(pub i32);

impl BrokerId {
    /// Invalid broker ID, typically used to indicate no leader.
    pub const INVALID: Self = BrokerId(-1);

    /// Create a new broker ID from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        BrokerId(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Check if this is a valid (non-negative) broker ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Connection id used for the coordinator role of this broker.
    ///
    /// `i32::MAX - id` maps every valid broker id `[0, i32::MAX]` onto the
    /// same range in reverse, so a client that keys connections by id keeps
    /// a coordinator connection apart from the data connection to the same
    /// broker. The mapping is its own inverse.
    #[inline]
    pub const fn coordinator_connection_id(self) -> BrokerId {
        BrokerId(i32::MAX.wrapping_sub(self.0))
    }
}

impl From<i32> for BrokerId {
    fn from(value: i32) -> Self {
        BrokerId(value)
    }
}

impl From<BrokerId> for i32 {
    fn from(id: BrokerId) -> Self {
        id.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A network endpoint a client can open a connection to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: BrokerId,
    pub host: String,
    pub port: i32,
}

impl Node {
    pub fn new(id: impl Into<BrokerId>, host: impl Into<String>, port: i32) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
        }
    }

    /// Build the coordinator node for a broker reported by FindCoordinator.
    ///
    /// The node keeps the broker's address but carries the synthetic
    /// connection id instead of the broker id.
    pub fn coordinator(reported_id: BrokerId, host: impl Into<String>, port: i32) -> Self {
        Self::new(reported_id.coordinator_connection_id(), host, port)
    }

    /// `host:port` form used by transports to resolve the endpoint.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (id: {})", self.host, self.port, self.id)
    }
}

/// Which kind of coordinator a FindCoordinator request looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinatorType {
    /// Consumer group coordinator.
    #[default]
    Group,
    /// Transaction coordinator for a transactional id.
    Transaction,
    /// Share group coordinator.
    Share,
}

impl CoordinatorType {
    /// Wire tag sent as the request's `key_type`.
    #[inline]
    pub const fn id(self) -> i8 {
        match self {
            CoordinatorType::Group => COORDINATOR_KEY_TYPE_GROUP,
            CoordinatorType::Transaction => COORDINATOR_KEY_TYPE_TRANSACTION,
            CoordinatorType::Share => COORDINATOR_KEY_TYPE_SHARE,
        }
    }

    /// Decode a wire tag.
    pub fn from_id(id: i8) -> Option<Self> {
        match id {
            COORDINATOR_KEY_TYPE_GROUP => Some(CoordinatorType::Group),
            COORDINATOR_KEY_TYPE_TRANSACTION => Some(CoordinatorType::Transaction),
            COORDINATOR_KEY_TYPE_SHARE => Some(CoordinatorType::Share),
            _ => None,
        }
    }
}

impl fmt::Display for CoordinatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorType::Group => write!(f, "group"),
            CoordinatorType::Transaction => write!(f, "transaction"),
            CoordinatorType::Share => write!(f, "share"),
        }
    }
}

//! Crate & protocol level errors.
//!
//! # Error Hierarchy
//!
//! The crate uses a two-layer error hierarchy:
//!
//! ## Crate Layer (`crate::error`)
//!
//! - [`Error`]: Construction and configuration errors
//! - [`KafkaCode`]: Wire protocol error codes carried by broker responses
//!
//! ## Request Layer (`crate::client::error`)
//!
//! - [`ClientError`]: Why a single request attempt failed
//! - Classified as retriable or fatal via `is_retriable()`
//!
//! [`ClientError`]: crate::client::ClientError

use num_derive::FromPrimitive;
use std::{fmt, result};
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Crate level errors.
///
/// These never come out of a poll turn; they are raised while building
/// request managers.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Various errors reported by a remote Kafka server.
/// See also [Kafka Errors](http://kafka.apache.org/protocol.html)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, Default)]
pub enum KafkaCode {
    /// An unexpected server error
    Unknown = -1,
    #[default]
    None = 0,
    /// The requested offset is outside the range of offsets
    /// maintained by the server for the given topic/partition
    OffsetOutOfRange = 1,
    /// This indicates that a message contents does not match its CRC
    CorruptMessage = 2,
    /// This request is for a topic or partition that does not exist
    /// on this broker.
    UnknownTopicOrPartition = 3,
    /// The message has a negative size
    InvalidMessageSize = 4,
    /// There is currently no leader for this partition and hence it
    /// is unavailable for writes.
    LeaderNotAvailable = 5,
    /// The client's metadata is out of date.
    NotLeaderForPartition = 6,
    /// The request exceeded the user-specified time limit.
    RequestTimedOut = 7,
    /// This is not a client facing error and is used mostly by tools
    /// when a broker is not alive.
    BrokerNotAvailable = 8,
    /// If replica is expected on a broker, but is not.
    ReplicaNotAvailable = 9,
    /// The message is larger than the broker allows.
    MessageSizeTooLarge = 10,
    /// Internal error code for broker-to-broker communication.
    StaleControllerEpoch = 11,
    /// Offset metadata string is larger than the configured maximum.
    OffsetMetadataTooLarge = 12,
    /// The server disconnected before a response was received.
    NetworkException = 13,
    /// The coordinator is still loading group metadata (after a
    /// leader change for the offsets topic partition).
    GroupLoadInProgress = 14,
    /// The offsets topic has not yet been created, or the group
    /// coordinator is not active.
    GroupCoordinatorNotAvailable = 15,
    /// The broker is not the coordinator for this group.
    NotCoordinatorForGroup = 16,
    /// The topic name is illegal or names an internal topic.
    InvalidTopic = 17,
    /// A message batch exceeds the maximum configured segment size.
    RecordListTooLarge = 18,
    /// Fewer in-sync replicas than the configured minimum.
    NotEnoughReplicas = 19,
    /// Written, but with fewer in-sync replicas than required.
    NotEnoughReplicasAfterAppend = 20,
    /// requiredAcks is anything other than -1, 1, or 0.
    InvalidRequiredAcks = 21,
    /// The generation id is not the current generation.
    IllegalGeneration = 22,
    /// Protocol type or protocols incompatible with the current group.
    InconsistentGroupProtocol = 23,
    /// The group id is empty or null.
    InvalidGroupId = 24,
    /// The member id is not in the current generation.
    UnknownMemberId = 25,
    /// The session timeout is outside the allowed range.
    InvalidSessionTimeout = 26,
    /// The coordinator has begun rebalancing the group.
    RebalanceInProgress = 27,
    /// Offset commit rejected because of oversize metadata.
    InvalidCommitOffsetSize = 28,
    /// The client is not authorized to access the requested topic.
    TopicAuthorizationFailed = 29,
    /// The client is not authorized to access a particular group id.
    GroupAuthorizationFailed = 30,
    /// The client is not authorized to use an inter-broker or
    /// administrative API.
    ClusterAuthorizationFailed = 31,
    /// The timestamp of the message is out of acceptable range.
    InvalidTimestamp = 32,
    /// The broker does not support the requested SASL mechanism.
    UnsupportedSaslMechanism = 33,
    /// Request is not valid given the current SASL state.
    IllegalSaslState = 34,
    /// The version of API is not supported.
    UnsupportedVersion = 35,
    /// Topic with this name already exists.
    TopicAlreadyExists = 36,
    /// This is not the correct controller for this cluster.
    NotController = 41,
    /// The request is malformed.
    InvalidRequest = 42,
    /// The message format version on the broker does not support the request.
    UnsupportedForMessageFormat = 43,
    /// The producer attempted to use a sequence number outside the valid range.
    OutOfOrderSequenceNumber = 45,
    /// The producer attempted to assign a sequence number that was already used.
    DuplicateSequenceNumber = 46,
    /// The client is not authorized to use the transactional id.
    TransactionalIdAuthorizationFailed = 53,
    /// Disk error when trying to access a log file on the broker.
    KafkaStorageError = 56,
    /// SASL Authentication failed.
    SaslAuthenticationFailed = 58,
}

impl KafkaCode {
    /// Translate a raw wire code.
    ///
    /// Codes this enum does not know map to [`KafkaCode::Unknown`], the
    /// same way brokers report unexpected server errors.
    pub fn from_code(code: i16) -> Self {
        <KafkaCode as num_traits::FromPrimitive>::from_i16(code).unwrap_or(KafkaCode::Unknown)
    }

    /// The raw wire value.
    #[inline]
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Whether a request that failed with this code may succeed if retried
    /// after a backoff, without any change on the client side.
    pub fn is_retriable(self) -> bool {
        matches!(
            self,
            KafkaCode::CorruptMessage
                | KafkaCode::UnknownTopicOrPartition
                | KafkaCode::LeaderNotAvailable
                | KafkaCode::NotLeaderForPartition
                | KafkaCode::RequestTimedOut
                | KafkaCode::ReplicaNotAvailable
                | KafkaCode::NetworkException
                | KafkaCode::GroupLoadInProgress
                | KafkaCode::GroupCoordinatorNotAvailable
                | KafkaCode::NotCoordinatorForGroup
                | KafkaCode::NotEnoughReplicas
                | KafkaCode::NotEnoughReplicasAfterAppend
                | KafkaCode::NotController
                | KafkaCode::KafkaStorageError
        )
    }
}

impl fmt::Display for KafkaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

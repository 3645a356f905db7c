//! Request-level failure taxonomy.
//!
//! Every failed request attempt is described by a [`ClientError`], whether
//! the transport failed to deliver a response or the broker answered with an
//! error code. Request managers branch on three questions:
//!
//! - [`ClientError::is_retriable`]: absorb locally and retry after backoff
//! - [`ClientError::is_disconnect`]: the connection itself was lost
//! - [`ClientError::is_group_authorization_failure`]: access was denied
//!
//! Anything not retriable is fatal and must reach the application.

use thiserror::Error;

use crate::error::KafkaCode;

/// Result type for a single request attempt.
pub type ClientResult<T> = Result<T, ClientError>;

/// Why a request attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The connection to the node was lost before a response arrived.
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// The transport gave up waiting for a response.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other transport level I/O failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The broker answered with an error code.
    #[error("Broker error {code}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Broker {
        code: KafkaCode,
        message: Option<String>,
    },

    /// The client is not authorized to access the group.
    #[error("Not authorized to access group: {group_id}")]
    GroupAuthorization { group_id: String },

    /// SASL authentication with the broker failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request or response contradicts the protocol state.
    #[error("Illegal state: {0}")]
    IllegalState(String),
}

impl ClientError {
    /// Build the error for a broker error code.
    pub fn from_code(code: KafkaCode, message: Option<String>) -> Self {
        match code {
            KafkaCode::SaslAuthenticationFailed => ClientError::Authentication(
                message.unwrap_or_else(|| "SASL authentication failed".to_string()),
            ),
            code => ClientError::Broker { code, message },
        }
    }

    /// Check if this error is retriable (transient).
    #[inline]
    pub fn is_retriable(&self) -> bool {
        match self {
            ClientError::Disconnected(_) => true,
            ClientError::Timeout(_) => true,
            ClientError::Network(_) => true,
            ClientError::Broker { code, .. } => code.is_retriable(),

            ClientError::GroupAuthorization { .. } => false,
            ClientError::Authentication(_) => false,
            ClientError::IllegalState(_) => false,
        }
    }

    /// Check if this error reports a lost connection.
    #[inline]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ClientError::Disconnected(_))
    }

    /// Check if this error denies access to the group.
    #[inline]
    pub fn is_group_authorization_failure(&self) -> bool {
        matches!(
            self,
            ClientError::GroupAuthorization { .. }
                | ClientError::Broker {
                    code: KafkaCode::GroupAuthorizationFailed,
                    ..
                }
        )
    }

    /// The broker error code behind this error, if any.
    pub fn kafka_code(&self) -> Option<KafkaCode> {
        match self {
            ClientError::Broker { code, .. } => Some(*code),
            ClientError::GroupAuthorization { .. } => Some(KafkaCode::GroupAuthorizationFailed),
            ClientError::Authentication(_) => Some(KafkaCode::SaslAuthenticationFailed),
            _ => None,
        }
    }

    /// Returns a string label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Disconnected(_) => "disconnected",
            ClientError::Timeout(_) => "timeout",
            ClientError::Network(_) => "network",
            ClientError::Broker { .. } => "broker",
            ClientError::GroupAuthorization { .. } => "group_authorization",
            ClientError::Authentication(_) => "authentication",
            ClientError::IllegalState(_) => "illegal_state",
        }
    }
}

impl From<KafkaCode> for ClientError {
    fn from(code: KafkaCode) -> Self {
        ClientError::from_code(code, None)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match e.kind() {
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::NotConnected => ClientError::Disconnected(e.to_string()),
            ErrorKind::TimedOut => ClientError::Timeout(e.to_string()),
            _ => ClientError::Network(e.to_string()),
        }
    }
}

//! Centralized protocol and configuration constants.
//!
//! # Categories
//!
//! - **Protocol Constants**: FindCoordinator key types and API identifiers
//! - **Retry Constants**: Backoff floor, ceiling, growth and jitter defaults
//! - **Discovery Constants**: Disconnect logging and poll timing

// =============================================================================
// Protocol Constants (Kafka Wire Protocol)
// =============================================================================

/// Kafka API key for FindCoordinator.
pub const FIND_COORDINATOR_API_KEY: i16 = 10;

/// FindCoordinator key type for consumer groups.
pub const COORDINATOR_KEY_TYPE_GROUP: i8 = 0;

/// FindCoordinator key type for transactional ids.
pub const COORDINATOR_KEY_TYPE_TRANSACTION: i8 = 1;

/// FindCoordinator key type for share groups.
pub const COORDINATOR_KEY_TYPE_SHARE: i8 = 2;

/// First FindCoordinator version that answers with a `coordinators` array
/// instead of top-level node fields.
pub const FIND_COORDINATOR_BATCHED_MIN_VERSION: i16 = 4;

// =============================================================================
// Retry Constants
// =============================================================================

/// Default floor for the discovery backoff (Kafka `retry.backoff.ms`).
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

/// Default ceiling for the discovery backoff (Kafka `retry.backoff.max.ms`).
pub const DEFAULT_RETRY_BACKOFF_MAX_MS: u64 = 1000;

/// Growth factor applied per consecutive failed attempt.
pub const RETRY_BACKOFF_EXP_BASE: u32 = 2;

/// Default jitter ratio. A backoff of `b` becomes a value in
/// `[b * (1 - jitter), b * (1 + jitter)]` before clamping.
pub const DEFAULT_RETRY_BACKOFF_JITTER: f64 = 0.2;

// =============================================================================
// Discovery Constants
// =============================================================================

/// How long the coordinator must stay unknown between two disconnect warnings.
pub const COORDINATOR_DISCONNECT_LOGGING_INTERVAL_MS: u64 = 60 * 1000;

/// Advisory wait returned by a poll turn with nothing to schedule.
pub const WAIT_FOREVER_MS: u64 = u64::MAX;

/// Upper bound on how long the reference poll loop sleeps between turns.
pub const DEFAULT_MAX_POLL_INTERVAL_MS: u64 = 1000;

/// Capacity of the completion channel feeding the reference poll loop.
pub const COMPLETION_CHANNEL_CAPACITY: usize = 16;

//! Attempt timing for a single retryable request.
//!
//! A [`RequestState`] answers one question on every poll turn: may a new
//! attempt go out now, and if not, how long until it may. It is fed the
//! outcome of every attempt and never performs I/O.
//!
//! # Rules
//!
//! - At most one attempt is in flight; nothing may be sent until its
//!   outcome is recorded.
//! - After a failed attempt the next one waits for the current backoff,
//!   measured from the failure.
//! - Each consecutive failure grows the backoff exponentially up to the
//!   ceiling; a success resets it to the floor and lifts the wait.

use tracing::trace;

use super::backoff::ExponentialBackoff;

/// Backoff bookkeeping for one logical request.
#[derive(Debug, Clone)]
pub struct RequestState {
    owner: &'static str,
    backoff: ExponentialBackoff,
    last_sent_ms: Option<u64>,
    last_received_ms: Option<u64>,
    last_failure_ms: Option<u64>,
    in_flight: bool,
    num_attempts: u32,
    backoff_ms: u64,
}

impl RequestState {
    /// Create a state with nothing sent yet.
    ///
    /// `owner` names the request manager in trace output.
    pub fn new(owner: &'static str, backoff: ExponentialBackoff) -> Self {
        let backoff_ms = backoff.initial_ms();
        Self {
            owner,
            backoff,
            last_sent_ms: None,
            last_received_ms: None,
            last_failure_ms: None,
            in_flight: false,
            num_attempts: 0,
            backoff_ms,
        }
    }

    /// Whether an attempt may be sent at `current_time_ms`.
    pub fn can_send_request(&self, current_time_ms: u64) -> bool {
        if self.in_flight {
            trace!(
                owner = self.owner,
                last_sent_ms = ?self.last_sent_ms,
                "An inflight request already exists"
            );
            return false;
        }

        self.remaining_backoff_ms(current_time_ms) == 0
    }

    /// Milliseconds until the backoff elapses; 0 when nothing holds an
    /// attempt back.
    ///
    /// In-flight status is not considered here.
    pub fn remaining_backoff_ms(&self, current_time_ms: u64) -> u64 {
        match self.last_failure_ms {
            Some(failed_at) => {
                let elapsed = current_time_ms.saturating_sub(failed_at);
                self.backoff_ms.saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    /// Whether an attempt was sent and its outcome not yet recorded.
    #[inline]
    pub fn request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record that an attempt is going out.
    pub fn on_send_attempt(&mut self, current_time_ms: u64) {
        self.last_sent_ms = Some(current_time_ms);
        self.in_flight = true;
    }

    /// Record a successful attempt: backoff back to the floor.
    pub fn on_successful_attempt(&mut self, current_time_ms: u64) {
        self.last_received_ms = Some(current_time_ms);
        self.last_failure_ms = None;
        self.in_flight = false;
        self.num_attempts = 0;
        self.backoff_ms = self.backoff.initial_ms();
    }

    /// Record a failed attempt: the next one waits for a longer backoff.
    pub fn on_failed_attempt(&mut self, current_time_ms: u64) {
        self.last_received_ms = Some(current_time_ms);
        self.last_failure_ms = Some(current_time_ms);
        self.in_flight = false;
        self.num_attempts = self.num_attempts.saturating_add(1);
        self.backoff_ms = self.backoff.backoff(self.num_attempts);
    }

    /// Current backoff duration in milliseconds.
    #[inline]
    pub fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Consecutive failed attempts since the last success.
    #[inline]
    pub fn num_attempts(&self) -> u32 {
        self.num_attempts
    }

    #[inline]
    pub fn last_sent_ms(&self) -> Option<u64> {
        self.last_sent_ms
    }

    #[inline]
    pub fn last_received_ms(&self) -> Option<u64> {
        self.last_received_ms
    }

    #[inline]
    pub fn last_failure_ms(&self) -> Option<u64> {
        self.last_failure_ms
    }
}

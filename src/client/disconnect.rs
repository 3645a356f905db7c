//! Throttled reporting of a prolonged coordinator outage.
//!
//! While the coordinator stays unknown, every failed lookup marks it
//! unknown again. Logging each of those would flood the output, so the
//! [`DisconnectTracker`] only reports once per full logging interval.
//!
//! The tracker is a plain value: it decides *whether* to report and leaves
//! the logging to its owner.

/// Outcome of observing the outage at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReport {
    /// No new full interval has elapsed since the last report.
    Suppressed,
    /// A new full interval elapsed; the outage has lasted `disconnected_ms`.
    Warn { disconnected_ms: u64 },
}

/// Start time and report count of the ongoing outage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectTracker {
    interval_ms: u64,
    marked_unknown_at_ms: Option<u64>,
    logged_interval_count: u64,
}

impl DisconnectTracker {
    /// Create a tracker reporting at most once per `interval_ms`.
    ///
    /// An interval of 0 is treated as 1ms.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            marked_unknown_at_ms: None,
            logged_interval_count: 0,
        }
    }

    /// Whether an outage start has been recorded.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.marked_unknown_at_ms.is_some()
    }

    /// Start a new outage at `current_time_ms`.
    pub fn start(&mut self, current_time_ms: u64) {
        self.marked_unknown_at_ms = Some(current_time_ms);
        self.logged_interval_count = 0;
    }

    /// Forget the outage; the coordinator is known again.
    pub fn reset(&mut self) {
        self.marked_unknown_at_ms = None;
        self.logged_interval_count = 0;
    }

    /// Observe the ongoing outage at `current_time_ms`.
    ///
    /// Starts the outage if none is recorded. Returns
    /// [`DisconnectReport::Warn`] only when the number of full intervals
    /// elapsed exceeds the number already reported.
    pub fn observe(&mut self, current_time_ms: u64) -> DisconnectReport {
        let Some(started_at) = self.marked_unknown_at_ms else {
            self.start(current_time_ms);
            return DisconnectReport::Suppressed;
        };

        let disconnected_ms = current_time_ms.saturating_sub(started_at);
        let intervals = disconnected_ms / self.interval_ms;
        if intervals > self.logged_interval_count {
            self.logged_interval_count = intervals;
            DisconnectReport::Warn { disconnected_ms }
        } else {
            DisconnectReport::Suppressed
        }
    }

    /// When the ongoing outage started.
    #[inline]
    pub fn marked_unknown_at_ms(&self) -> Option<u64> {
        self.marked_unknown_at_ms
    }

    /// Full intervals already reported for the ongoing outage.
    #[inline]
    pub fn logged_interval_count(&self) -> u64 {
        self.logged_interval_count
    }

    #[inline]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

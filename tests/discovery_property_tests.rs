//! Property tests for discovery timing and request accounting.

use findcoord::client::{DisconnectReport, DisconnectTracker, ExponentialBackoff};
use findcoord::prelude::*;
use proptest::prelude::*;
use std::time::Duration;

const GROUP: &str = "props";

#[derive(Debug, Clone)]
enum Step {
    Poll { advance_ms: u64 },
    Succeed,
    FailRetriable,
    FailFatal,
    Disconnect,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0u64..2_000).prop_map(|advance_ms| Step::Poll { advance_ms }),
        1 => Just(Step::Succeed),
        2 => Just(Step::FailRetriable),
        1 => Just(Step::FailFatal),
        1 => Just(Step::Disconnect),
    ]
}

fn manager(floor_ms: u64, ceiling_ms: u64, jitter: f64) -> CoordinatorRequestManager {
    let config = DiscoveryConfig::new(GROUP)
        .with_retry_backoff(
            Duration::from_millis(floor_ms),
            Duration::from_millis(ceiling_ms),
        )
        .with_jitter(jitter);
    CoordinatorRequestManager::new(config).expect("valid config")
}

fn success(at: u64) -> RequestCompletion<FindCoordinatorResponseData> {
    RequestCompletion::Response {
        response: FindCoordinatorResponseData::legacy_success(1, "h", 9092),
        received_time_ms: at,
    }
}

fn failure(error: ClientError, at: u64) -> RequestCompletion<FindCoordinatorResponseData> {
    RequestCompletion::Failed {
        error,
        completion_time_ms: at,
    }
}

proptest! {
    #[test]
    fn test_single_flight(steps in proptest::collection::vec(arb_step(), 1..200)) {
        let mut manager = manager(50, 2_000, 0.2);
        let mut now = 0u64;
        let mut outstanding = 0usize;

        for step in steps {
            match step {
                Step::Poll { advance_ms } => {
                    now += advance_ms;
                    outstanding += manager.poll(now).unsent_requests.len();
                }
                Step::Succeed if outstanding > 0 => {
                    outstanding -= 1;
                    manager.on_complete(success(now));
                }
                Step::FailRetriable if outstanding > 0 => {
                    outstanding -= 1;
                    manager.on_complete(failure(ClientError::Network("down".into()), now));
                }
                Step::FailFatal if outstanding > 0 => {
                    outstanding -= 1;
                    manager.on_complete(failure(ClientError::IllegalState("bad".into()), now));
                }
                Step::Disconnect => {
                    manager.handle_coordinator_disconnect(
                        &ClientError::Disconnected("reset".into()),
                        now,
                    );
                }
                _ => {}
            }
            prop_assert!(outstanding <= 1);
        }
    }

    #[test]
    fn test_backoff_after_consecutive_failures(
        floor_ms in 1u64..1_000,
        ceiling_factor in 1u64..64,
        failures in 0u32..16,
    ) {
        let ceiling_ms = floor_ms * ceiling_factor;
        let mut manager = manager(floor_ms, ceiling_ms, 0.0);
        let mut now = 0u64;

        for _ in 0..failures {
            prop_assert_eq!(manager.poll(now).unsent_requests.len(), 1);
            manager.on_complete(failure(ClientError::Timeout("t".into()), now));
            now += manager.request_state().backoff_ms();
        }

        let expected = if failures == 0 {
            floor_ms
        } else {
            (floor_ms << failures).min(ceiling_ms)
        };
        prop_assert_eq!(manager.request_state().backoff_ms(), expected);

        prop_assert_eq!(manager.poll(now).unsent_requests.len(), 1);
        manager.on_complete(success(now));
        prop_assert_eq!(manager.request_state().backoff_ms(), floor_ms);
    }

    #[test]
    fn test_jittered_backoff_stays_in_bounds(
        floor_ms in 1u64..1_000,
        ceiling_factor in 1u64..64,
        jitter in 0.0f64..0.99,
        attempts in 0u32..40,
    ) {
        let ceiling_ms = floor_ms * ceiling_factor;
        let backoff = ExponentialBackoff::new(floor_ms, 2, ceiling_ms, jitter);
        let value = backoff.backoff(attempts);
        prop_assert!(value >= floor_ms);
        prop_assert!(value <= ceiling_ms);
    }

    #[test]
    fn test_disconnect_warnings_match_full_intervals(
        interval_ms in 1u64..10_000,
        duration_ms in 0u64..200_000,
        step_fraction in 1u64..=4,
    ) {
        let step_ms = (interval_ms / step_fraction).max(1);
        let mut tracker = DisconnectTracker::new(interval_ms);
        tracker.start(0);

        let mut warnings = 0;
        let mut now = 0;
        loop {
            now = (now + step_ms).min(duration_ms);
            if matches!(tracker.observe(now), DisconnectReport::Warn { .. }) {
                warnings += 1;
            }
            if now == duration_ms {
                break;
            }
        }

        prop_assert_eq!(warnings, duration_ms / interval_ms);
    }

    #[test]
    fn test_known_coordinator_is_idle(advances in proptest::collection::vec(0u64..1_000_000, 1..50)) {
        let mut manager = manager(100, 1_000, 0.2);
        manager.poll(0);
        manager.on_complete(success(0));

        let mut now = 0;
        for advance in advances {
            now += advance;
            let result = manager.poll(now);
            prop_assert!(result.is_empty());
            prop_assert_eq!(result.time_until_next_poll_ms, u64::MAX);
        }
    }
}

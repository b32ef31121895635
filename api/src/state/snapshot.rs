use serde::{Deserialize, Serialize};

use super::EarningState;

/// Accrual parameters captured when the host loses visibility, consumed once
/// on resume to credit the time spent in the background.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEarningsSnapshot {
    /// Unix millisecond timestamp of the moment visibility was lost.
    pub last_active_timestamp: i64,

    /// Per-second rate in effect at that moment.
    pub base_earning_rate: f64,
}

impl OfflineEarningsSnapshot {
    pub fn capture(state: &EarningState, now: i64) -> Self {
        Self {
            last_active_timestamp: now,
            base_earning_rate: if state.is_active {
                state.base_earning_rate
            } else {
                0.0
            },
        }
    }

    /// Earnings owed for the time between the snapshot and `now`.
    pub fn earnings_until(&self, now: i64) -> f64 {
        let elapsed_ms = now.saturating_sub(self.last_active_timestamp).max(0);
        self.base_earning_rate * elapsed_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_up_is_rate_times_elapsed() {
        let snapshot = OfflineEarningsSnapshot {
            last_active_timestamp: 1_000_000,
            base_earning_rate: 0.25,
        };
        assert!((snapshot.earnings_until(1_000_000 + 3_600_000) - 900.0).abs() < 1e-9);
        assert!((snapshot.earnings_until(1_000_500) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_catch_up_ignores_clock_going_backwards() {
        let snapshot = OfflineEarningsSnapshot {
            last_active_timestamp: 5_000,
            base_earning_rate: 1.0,
        };
        assert_eq!(snapshot.earnings_until(4_000), 0.0);
    }

    #[test]
    fn test_inactive_state_captures_zero_rate() {
        let mut state = EarningState::new(0);
        state.base_earning_rate = 3.0;
        state.is_active = false;
        let snapshot = OfflineEarningsSnapshot::capture(&state, 10);
        assert_eq!(snapshot.base_earning_rate, 0.0);
        assert_eq!(snapshot.last_active_timestamp, 10);
    }
}

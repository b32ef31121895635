use serde::{Deserialize, Serialize};

use crate::ledger::EarningsRecord;
use crate::rate::EarningRate;

use super::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningState {
    /// Unix millisecond timestamp of the last accrual computation.
    pub last_update: i64,

    /// Accrued, unclaimed reward. Only a claim lowers it.
    pub current_earnings: f64,

    /// Reward units accrued per second.
    pub base_earning_rate: f64,

    /// Whether accrual progresses (the staked balance is positive).
    pub is_active: bool,

    /// When the current staking period began.
    pub start_date: Option<i64>,
}

impl EarningState {
    pub fn new(now: i64) -> Self {
        Self {
            last_update: now,
            current_earnings: 0.0,
            base_earning_rate: 0.0,
            is_active: false,
            start_date: None,
        }
    }

    /// Advances earnings by the wall-clock time since the last update and
    /// returns the amount credited. Late ticks self-correct; a clock that
    /// moved backwards credits nothing and leaves `last_update` alone.
    pub fn accrue(&mut self, now: i64) -> f64 {
        if now <= self.last_update {
            return 0.0;
        }
        let elapsed_secs = (now - self.last_update) as f64 / 1000.0;
        let earned = if self.is_active {
            self.base_earning_rate * elapsed_secs
        } else {
            0.0
        };
        self.current_earnings += earned;
        self.last_update = now;
        earned
    }

    /// Adds a lump sum, ignoring anything that would lower earnings.
    pub fn credit(&mut self, amount: f64) {
        if amount > 0.0 && amount.is_finite() {
            self.current_earnings += amount;
        }
    }

    pub fn apply_rate(&mut self, rate: &EarningRate) {
        self.base_earning_rate = rate.per_second;
        self.is_active = rate.is_active;
    }

    /// Merges a server copy into this one.
    ///
    /// The higher of the two amounts wins and is extrapolated from its own
    /// last update to `now`, so a lower server value never overwrites local
    /// progress. Applying the same server copy again is a no-op.
    pub fn reconcile(&mut self, server: &EarningsRecord, now: i64) {
        let (base, since) = if self.current_earnings >= server.current_earnings {
            (self.current_earnings, self.last_update)
        } else {
            (server.current_earnings, server.last_update)
        };
        let elapsed_secs = now.saturating_sub(since).max(0) as f64 / 1000.0;
        let rate = if self.is_active {
            self.base_earning_rate
        } else {
            0.0
        };

        self.current_earnings = base + rate * elapsed_secs;
        self.last_update = self.last_update.max(now);
        if server.start_date.is_some() {
            self.start_date = server.start_date;
        }
    }

    /// Zeroes the earnings after a claim and opens a new staking period.
    pub fn reset(&mut self, now: i64) {
        self.current_earnings = 0.0;
        self.start_date = Some(now);
        self.last_update = now;
    }

    pub fn to_record(&self, user_id: UserId) -> EarningsRecord {
        EarningsRecord {
            user_id,
            current_earnings: self.current_earnings,
            last_update: self.last_update,
            start_date: self.start_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_state(now: i64, rate: f64) -> EarningState {
        EarningState {
            last_update: now,
            current_earnings: 0.0,
            base_earning_rate: rate,
            is_active: true,
            start_date: Some(now),
        }
    }

    fn server(earnings: f64, last_update: i64) -> EarningsRecord {
        EarningsRecord {
            user_id: UserId(1),
            current_earnings: earnings,
            last_update,
            start_date: None,
        }
    }

    #[test]
    fn test_accrue_uses_wall_clock_delta() {
        let mut state = active_state(0, 2.0);
        assert_eq!(state.accrue(1_000), 2.0);
        // A late tick credits the whole gap.
        assert_eq!(state.accrue(6_000), 10.0);
        assert_eq!(state.current_earnings, 12.0);
        assert_eq!(state.last_update, 6_000);
    }

    #[test]
    fn test_accrue_never_rewinds() {
        let mut state = active_state(10_000, 1.0);
        state.current_earnings = 4.0;
        assert_eq!(state.accrue(9_000), 0.0);
        assert_eq!(state.current_earnings, 4.0);
        assert_eq!(state.last_update, 10_000);
    }

    #[test]
    fn test_inactive_state_does_not_accrue() {
        let mut state = EarningState::new(0);
        state.base_earning_rate = 5.0;
        assert_eq!(state.accrue(60_000), 0.0);
        assert_eq!(state.last_update, 60_000);
    }

    #[test]
    fn test_ticks_are_monotonic() {
        let mut state = active_state(0, 0.0000389583);
        let mut previous = state.current_earnings;
        for now in [1_000, 2_000, 1_500, 2_000, 7_300, 7_301, 120_000] {
            state.accrue(now);
            assert!(state.current_earnings >= previous);
            previous = state.current_earnings;
        }
    }

    #[test]
    fn test_reconcile_keeps_higher_local_value() {
        let mut state = active_state(5_000, 0.0);
        state.current_earnings = 10.0;
        state.reconcile(&server(7.0, 5_000), 5_000);
        assert_eq!(state.current_earnings, 10.0);
    }

    #[test]
    fn test_reconcile_adopts_higher_server_value() {
        let mut state = active_state(0, 1.0);
        state.current_earnings = 3.0;
        state.reconcile(&server(20.0, 10_000), 15_000);
        assert_eq!(state.current_earnings, 25.0);
        assert_eq!(state.last_update, 15_000);
    }

    #[test]
    fn test_reconcile_extrapolates_from_the_winning_copy() {
        let mut state = active_state(8_000, 1.0);
        state.current_earnings = 10.0;
        state.reconcile(&server(7.0, 0), 10_000);
        assert_eq!(state.current_earnings, 12.0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let record = server(7.0, 1_000);
        let mut state = active_state(0, 0.5);
        state.current_earnings = 10.0;
        state.reconcile(&record, 4_000);
        let once = state;
        state.reconcile(&record, 4_000);
        assert_eq!(state, once);
    }

    #[test]
    fn test_reconcile_takes_server_start_date() {
        let mut state = active_state(0, 1.0);
        let mut record = server(0.0, 0);
        record.start_date = Some(-86_400_000);
        state.reconcile(&record, 0);
        assert_eq!(state.start_date, Some(-86_400_000));
    }

    #[test]
    fn test_credit_ignores_negative_amounts() {
        let mut state = active_state(0, 1.0);
        state.credit(3.0);
        state.credit(-10.0);
        state.credit(f64::NAN);
        assert_eq!(state.current_earnings, 3.0);
    }

    #[test]
    fn test_reset_after_claim() {
        let mut state = active_state(0, 1.0);
        state.current_earnings = 42.0;
        state.reset(99_000);
        assert_eq!(state.current_earnings, 0.0);
        assert_eq!(state.start_date, Some(99_000));
        assert_eq!(state.last_update, 99_000);
    }
}

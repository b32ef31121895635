use crate::consts::*;

/// Tunables of an earnings session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarningsConfig {
    /// Daily return on the staked balance.
    pub base_roi: f64,

    /// Period of the local accrual ticker.
    pub tick_interval_ms: i64,

    /// Minimum time between two ledger pushes.
    pub sync_interval_ms: i64,

    /// Minimum time between two claims.
    pub claim_cooldown_ms: i64,

    /// Whether referred users boost the rate.
    pub referral_boost: bool,
}

impl Default for EarningsConfig {
    fn default() -> Self {
        Self {
            base_roi: DEFAULT_BASE_ROI,
            tick_interval_ms: TICK_INTERVAL_MS,
            sync_interval_ms: SYNC_INTERVAL_MS,
            claim_cooldown_ms: CLAIM_COOLDOWN_MS,
            referral_boost: true,
        }
    }
}

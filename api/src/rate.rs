use crate::consts::*;

/// Reward accrual rate derived from a staked balance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarningRate {
    /// Reward units accrued per day.
    pub daily: f64,

    /// Reward units accrued per second.
    pub per_second: f64,

    /// Whether accrual should progress at all.
    pub is_active: bool,
}

impl EarningRate {
    pub const INACTIVE: Self = Self {
        daily: 0.0,
        per_second: 0.0,
        is_active: false,
    };
}

/// Day-tier multiplier. Boundary days belong to the lower tier.
pub fn day_multiplier(days_staked: u64) -> f64 {
    if days_staked <= FIRST_TIER_LAST_DAY {
        FIRST_TIER_MULTIPLIER
    } else if days_staked <= SECOND_TIER_LAST_DAY {
        SECOND_TIER_MULTIPLIER
    } else {
        THIRD_TIER_MULTIPLIER
    }
}

/// Referral multiplier: +5% per referred user, capped at +50%.
pub fn referral_multiplier(referral_count: u32) -> f64 {
    1.0 + (referral_count as f64 * REFERRAL_BOOST_PER_REFERRAL).min(MAX_REFERRAL_BOOST)
}

/// Whole days elapsed since the stake started.
pub fn days_staked(start_date: Option<i64>, now: i64) -> u64 {
    match start_date {
        Some(start) => (now.saturating_sub(start).max(0) / ONE_DAY_MS) as u64,
        None => 0,
    }
}

/// Maps a staked balance to its accrual rate.
///
/// `daily = balance * roi * day_multiplier [* referral_multiplier]` and the
/// per-second rate is the daily reward spread over 86 400 seconds. A balance
/// that is not strictly positive yields an inactive, zero rate.
pub fn earning_rate(
    staked_balance: f64,
    days_staked: u64,
    base_roi: f64,
    referral_count: Option<u32>,
) -> EarningRate {
    if !(staked_balance > 0.0) || !staked_balance.is_finite() {
        return EarningRate::INACTIVE;
    }

    let mut daily = staked_balance * base_roi.max(0.0) * day_multiplier(days_staked);
    if let Some(count) = referral_count {
        daily *= referral_multiplier(count);
    }

    EarningRate {
        daily,
        per_second: daily / SECONDS_PER_DAY,
        is_active: true,
    }
}

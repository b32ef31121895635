/// One second in milliseconds.
pub const ONE_SECOND_MS: i64 = 1_000;

/// One minute in milliseconds.
pub const ONE_MINUTE_MS: i64 = 60 * ONE_SECOND_MS;

/// One day in milliseconds.
pub const ONE_DAY_MS: i64 = 86_400 * ONE_SECOND_MS;

/// Seconds per day, used to spread the daily reward into a per-second rate.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Default daily return on the staked balance (3.06%).
pub const DEFAULT_BASE_ROI: f64 = 0.0306;

/// How often the local accrual ticker fires.
pub const TICK_INTERVAL_MS: i64 = ONE_SECOND_MS;

/// How often local earnings are pushed to the ledger.
pub const SYNC_INTERVAL_MS: i64 = ONE_MINUTE_MS;

/// Minimum time between two claims.
pub const CLAIM_COOLDOWN_MS: i64 = ONE_DAY_MS;

// ============ Day tiers ============

/// Last day (inclusive) of the first tier.
pub const FIRST_TIER_LAST_DAY: u64 = 7;

/// Last day (inclusive) of the second tier.
pub const SECOND_TIER_LAST_DAY: u64 = 30;

pub const FIRST_TIER_MULTIPLIER: f64 = 1.0;
pub const SECOND_TIER_MULTIPLIER: f64 = 1.1;
pub const THIRD_TIER_MULTIPLIER: f64 = 1.25;

// ============ Referrals ============

/// Rate boost granted per referred user (+5%).
pub const REFERRAL_BOOST_PER_REFERRAL: f64 = 0.05;

/// Cap on the total referral boost (+50%).
pub const MAX_REFERRAL_BOOST: f64 = 0.5;

// ============ Limits (TON) ============

pub const MIN_DEPOSIT: f64 = 1.0;
pub const MIN_WITHDRAWAL: f64 = 1.0;

// ============ Local storage keys ============

pub const EARNINGS_STATE_KEY: &str = "earnings_state";
pub const LAST_SYNC_KEY: &str = "last_sync";
pub const OFFLINE_SNAPSHOT_KEY: &str = "offline_snapshot";
pub const ONBOARDING_SEEN_KEY: &str = "onboarding_seen";
pub const CLAIM_COOLDOWN_KEY: &str = "claim_cooldown";

// ============ Ledger tables and RPCs ============

pub const USERS_TABLE: &str = "users";
pub const EARNINGS_TABLE: &str = "user_earnings";
pub const ACTIVITIES_TABLE: &str = "activities";
pub const CLAIM_RPC: &str = "claim_earnings";
pub const DEPOSIT_RPC: &str = "update_deposit_balance";
pub const WITHDRAW_RPC: &str = "request_withdrawal";

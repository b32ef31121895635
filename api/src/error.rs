use thiserror::Error;

#[derive(Debug, Error)]
pub enum EarnError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("amount {amount} is below the minimum of {minimum}")]
    AmountBelowMinimum { amount: f64, minimum: f64 },

    #[error("amount {amount} exceeds the available balance of {available}")]
    InsufficientBalance { amount: f64, available: f64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("claim is on cooldown until {until}")]
    ClaimCooldown { until: i64 },

    #[error("earnings session is not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, EarnError>;

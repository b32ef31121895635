use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identity of a player: the ledger's user row id.
///
/// Every local storage key and every ledger call is keyed by this id. The
/// Telegram id is carried on [`UserAccount`] for display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// The ledger row id of this user.
    pub id: UserId,

    /// The Telegram id the account was registered with.
    #[serde(default)]
    pub telegram_id: Option<i64>,

    /// The staked TON balance.
    #[serde(default)]
    pub balance: f64,

    /// The number of users this user referred.
    #[serde(default)]
    pub referral_count: u32,
}

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::{UserAccount, UserId};

/// Earnings row as stored by the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub user_id: UserId,
    pub current_earnings: f64,
    /// Unix milliseconds.
    pub last_update: i64,
    /// Unix milliseconds.
    #[serde(default)]
    pub start_date: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Deposit,
    Withdrawal,
    Claim,
}

/// Audit log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: UserId,
    pub kind: ActivityKind,
    pub amount: f64,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// The authoritative ledger holding balances, earnings and payouts.
pub trait LedgerClient {
    /// Reads the user's account row.
    fn get_account(&self, user_id: UserId) -> impl Future<Output = Result<UserAccount>> + Send;

    /// Reads the user's earnings row, if one exists.
    fn get_earnings(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<EarningsRecord>>> + Send;

    /// Creates or replaces the user's earnings row.
    fn upsert_earnings(&self, record: &EarningsRecord)
        -> impl Future<Output = Result<()>> + Send;

    /// Finalizes a payout of `amount` accrued earnings and returns the amount
    /// credited to the spendable balance.
    fn claim(&self, user_id: UserId, amount: f64) -> impl Future<Output = Result<f64>> + Send;

    /// Credits a confirmed on-chain deposit to the staked balance.
    fn record_deposit(
        &self,
        user_id: UserId,
        amount: f64,
        tx_hash: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Files a withdrawal request to `address`.
    fn request_withdrawal(
        &self,
        user_id: UserId,
        amount: f64,
        address: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn log_activity(&self, entry: &ActivityEntry) -> impl Future<Output = Result<()>> + Send;
}

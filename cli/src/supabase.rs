use std::fmt::Display;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tonmine_api::error::Result;
use tonmine_api::prelude::*;

/// Ledger client over Supabase's PostgREST interface.
#[derive(Clone)]
pub struct SupabaseLedger {
    client: reqwest::Client,
    base_url: String,
}

impl SupabaseLedger {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))?,
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: impl Display,
    ) -> Result<Option<T>> {
        let rows: Vec<T> = self
            .client
            .get(self.table_url(table))
            .query(&[
                (column, format!("eq.{}", value)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(ledger_error)?
            .error_for_status()
            .map_err(ledger_error)?
            .json()
            .await
            .map_err(ledger_error)?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, table: &str, body: Value, on_conflict: Option<&str>) -> Result<()> {
        let mut request = self.client.post(self.table_url(table)).json(&body);
        request = match on_conflict {
            Some(column) => request
                .query(&[("on_conflict", column)])
                .header("Prefer", "resolution=merge-duplicates,return=minimal"),
            None => request.header("Prefer", "return=minimal"),
        };
        request
            .send()
            .await
            .map_err(ledger_error)?
            .error_for_status()
            .map_err(ledger_error)?;
        Ok(())
    }

    async fn call_rpc(&self, function: &str, params: Value) -> Result<reqwest::Response> {
        self.client
            .post(self.rpc_url(function))
            .json(&params)
            .send()
            .await
            .map_err(ledger_error)?
            .error_for_status()
            .map_err(ledger_error)
    }
}

impl LedgerClient for SupabaseLedger {
    async fn get_account(&self, user_id: UserId) -> Result<UserAccount> {
        self.select_one(USERS_TABLE, "id", user_id)
            .await?
            .ok_or_else(|| EarnError::Ledger(format!("user {} not found", user_id)))
    }

    async fn get_earnings(&self, user_id: UserId) -> Result<Option<EarningsRecord>> {
        self.select_one(EARNINGS_TABLE, "user_id", user_id).await
    }

    async fn upsert_earnings(&self, record: &EarningsRecord) -> Result<()> {
        let body = serde_json::to_value([record])?;
        self.insert(EARNINGS_TABLE, body, Some("user_id")).await
    }

    async fn claim(&self, user_id: UserId, amount: f64) -> Result<f64> {
        self.call_rpc(CLAIM_RPC, json!({ "p_user_id": user_id, "p_amount": amount }))
            .await?
            .json::<f64>()
            .await
            .map_err(ledger_error)
    }

    async fn record_deposit(&self, user_id: UserId, amount: f64, tx_hash: &str) -> Result<()> {
        self.call_rpc(
            DEPOSIT_RPC,
            json!({ "p_user_id": user_id, "p_amount": amount, "p_tx_hash": tx_hash }),
        )
        .await?;
        Ok(())
    }

    async fn request_withdrawal(&self, user_id: UserId, amount: f64, address: &str) -> Result<()> {
        self.call_rpc(
            WITHDRAW_RPC,
            json!({ "p_user_id": user_id, "p_amount": amount, "p_address": address }),
        )
        .await?;
        Ok(())
    }

    async fn log_activity(&self, entry: &ActivityEntry) -> Result<()> {
        let body = serde_json::to_value(entry)?;
        self.insert(ACTIVITIES_TABLE, body, None).await
    }
}

fn ledger_error(err: reqwest::Error) -> EarnError {
    EarnError::Ledger(err.to_string())
}

use tracing::{debug, error, info, warn};

use crate::config::EarningsConfig;
use crate::error::{EarnError, Result};
use crate::ledger::{ActivityEntry, ActivityKind, EarningsRecord, LedgerClient};
use crate::rate::{days_staked, earning_rate, EarningRate};
use crate::state::{EarningState, OfflineEarningsSnapshot, UserAccount, UserId};
use crate::storage::Storage;
use crate::store::EarningsStore;
use crate::validate::{validate_claim, validate_deposit, validate_withdrawal};

/// A ledger push captured at fire time.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSync {
    pub record: EarningsRecord,
    pub started_at: i64,
}

/// One user's accrual session: local ticking, ledger reconciliation, offline
/// catch-up, claims and teardown.
///
/// All timestamps are unix milliseconds supplied by the caller. The session
/// is the single owner of the in-memory [`EarningState`]; every mutation is
/// written through to the [`EarningsStore`].
pub struct EarningsSession<S, L> {
    store: EarningsStore<S>,
    ledger: L,
    config: EarningsConfig,
    account: Option<UserAccount>,
    state: Option<EarningState>,
    visible: bool,
}

impl<S: Storage, L: LedgerClient> EarningsSession<S, L> {
    pub fn new(store: EarningsStore<S>, ledger: L, config: EarningsConfig) -> Self {
        Self {
            store,
            ledger,
            config,
            account: None,
            state: None,
            visible: true,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.store.user_id()
    }

    pub fn config(&self) -> &EarningsConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn store(&self) -> &EarningsStore<S> {
        &self.store
    }

    pub fn state(&self) -> Option<&EarningState> {
        self.state.as_ref()
    }

    pub fn account(&self) -> Option<&UserAccount> {
        self.account.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The rate the account earns at `now`.
    pub fn current_rate(&self, now: i64) -> EarningRate {
        match &self.state {
            Some(state) => self.rate_for(state, now),
            None => EarningRate::INACTIVE,
        }
    }

    /// Loads the server and local copies, merges them and writes the result
    /// back to the ledger.
    ///
    /// A missing server row is created from the local cache. A present one is
    /// reconciled with the cache, the higher amount winning.
    pub async fn initialize(&mut self, now: i64) -> Result<EarningState> {
        let user_id = self.user_id();
        let account = self.ledger.get_account(user_id).await?;
        let server = self.ledger.get_earnings(user_id).await?;
        let cached = self.store.load_state()?;

        // Time since the previous process stopped is credited below.
        if self.store.take_snapshot()?.is_some() {
            debug!("Dropping stale offline snapshot for user {}", user_id);
        }

        let has_balance = account.balance > 0.0;
        self.account = Some(account);

        let mut state = cached.unwrap_or_else(|| EarningState::new(now));
        if let Some(start_date) = server.as_ref().and_then(|record| record.start_date) {
            state.start_date = Some(start_date);
        }
        if state.start_date.is_none() && has_balance {
            state.start_date = Some(now);
        }
        let rate = self.rate_for(&state, now);
        state.apply_rate(&rate);

        match &server {
            Some(record) => state.reconcile(record, now),
            None => {
                state.accrue(now);
            }
        }

        self.state = Some(state);
        self.store.save_state(&state)?;
        info!(
            "Earnings initialized for user {}: {} (rate {}/s, server row {})",
            user_id,
            state.current_earnings,
            state.base_earning_rate,
            if server.is_some() { "found" } else { "created" }
        );

        let pending = PendingSync {
            record: state.to_record(user_id),
            started_at: now,
        };
        let result = self.ledger.upsert_earnings(&pending.record).await;
        self.complete_sync(&pending, result)?;

        Ok(state)
    }

    /// Advances local accrual to `now` and persists it. Returns the amount
    /// credited. Accrual is suspended while hidden; [`Self::resume`] credits
    /// that time in one lump sum.
    pub fn tick(&mut self, now: i64) -> Result<f64> {
        let mut state = self.state.ok_or(EarnError::NotInitialized)?;
        if !self.visible {
            return Ok(0.0);
        }

        let earned = state.accrue(now);
        let rate = self.rate_for(&state, now);
        state.apply_rate(&rate);

        self.state = Some(state);
        self.store.save_state(&state)?;
        debug!("Tick: +{} -> {}", earned, state.current_earnings);
        Ok(earned)
    }

    /// Returns the record to push if the sync interval has elapsed since the
    /// last successful push. The record reflects the state at `now`.
    pub fn sync_due(&mut self, now: i64) -> Result<Option<PendingSync>> {
        if self.state.is_none() {
            return Ok(None);
        }
        if let Some(last_sync) = self.store.last_sync()? {
            if now.saturating_sub(last_sync) < self.config.sync_interval_ms {
                return Ok(None);
            }
        }

        self.tick(now)?;
        let user_id = self.user_id();
        Ok(self.state.map(|state| PendingSync {
            record: state.to_record(user_id),
            started_at: now,
        }))
    }

    /// Records the outcome of a push. A failure is logged and left for the
    /// next interval; local earnings are never touched.
    pub fn complete_sync(&mut self, pending: &PendingSync, result: Result<()>) -> Result<bool> {
        match result {
            Ok(()) => {
                let newer = self
                    .store
                    .last_sync()?
                    .map_or(true, |last_sync| pending.started_at > last_sync);
                if newer {
                    self.store.set_last_sync(pending.started_at)?;
                }
                debug!(
                    "Synced earnings {} for user {}",
                    pending.record.current_earnings, pending.record.user_id
                );
                Ok(true)
            }
            Err(err) => {
                warn!("Earnings sync failed, retrying next interval: {}", err);
                Ok(false)
            }
        }
    }

    /// Pushes local earnings if the sync interval has elapsed.
    pub async fn sync(&mut self, now: i64) -> Result<bool> {
        let Some(pending) = self.sync_due(now)? else {
            return Ok(false);
        };
        let result = self.ledger.upsert_earnings(&pending.record).await;
        self.complete_sync(&pending, result)
    }

    /// The host lost visibility: bring accrual up to date and snapshot the rate.
    pub fn hide(&mut self, now: i64) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        if self.state.is_some() {
            self.tick(now)?;
        }
        if let Some(state) = &self.state {
            let snapshot = OfflineEarningsSnapshot::capture(state, now);
            self.store.save_snapshot(&snapshot)?;
        }
        self.visible = false;
        info!("Session hidden at {}", now);
        Ok(())
    }

    /// The host regained visibility: credit the time since the snapshot once.
    pub fn resume(&mut self, now: i64) -> Result<f64> {
        if self.visible {
            return Ok(0.0);
        }
        self.visible = true;

        let Some(mut state) = self.state else {
            return Ok(0.0);
        };
        let Some(snapshot) = self.store.take_snapshot()? else {
            return Ok(0.0);
        };

        let credited = snapshot.earnings_until(now);
        state.credit(credited);
        state.last_update = state.last_update.max(now);
        self.state = Some(state);
        self.store.save_state(&state)?;
        info!("Credited {} offline earnings", credited);
        Ok(credited)
    }

    /// Claims all accrued earnings.
    ///
    /// On success earnings restart from zero with a new staking period and a
    /// claim cooldown. On failure the last persisted state is restored.
    pub async fn claim(&mut self, now: i64) -> Result<f64> {
        self.tick(now)?;
        let state = self.state.ok_or(EarnError::NotInitialized)?;
        validate_claim(
            state.current_earnings,
            self.store.claim_cooldown_until()?,
            now,
        )?;

        let user_id = self.user_id();
        let claimed = match self.ledger.claim(user_id, state.current_earnings).await {
            Ok(claimed) => claimed,
            Err(err) => {
                warn!("Claim failed for user {}: {}", user_id, err);
                self.state = self.store.load_state()?.or(Some(state));
                return Err(err);
            }
        };

        let mut state = state;
        state.reset(now);
        let rate = self.rate_for(&state, now);
        state.apply_rate(&rate);
        self.state = Some(state);
        self.store.save_state(&state)?;
        self.store
            .set_claim_cooldown_until(now + self.config.claim_cooldown_ms)?;
        info!("User {} claimed {}", user_id, claimed);

        let pending = PendingSync {
            record: state.to_record(user_id),
            started_at: now,
        };
        let result = self.ledger.upsert_earnings(&pending.record).await;
        self.complete_sync(&pending, result)?;
        self.log_activity(ActivityKind::Claim, claimed, now).await;

        Ok(claimed)
    }

    /// Reports a confirmed wallet deposit and picks up the new balance. The
    /// first deposit opens the staking period.
    pub async fn deposit(
        &mut self,
        amount: f64,
        wallet_balance: f64,
        tx_hash: &str,
        now: i64,
    ) -> Result<()> {
        validate_deposit(amount, wallet_balance)?;
        self.tick(now)?;

        let user_id = self.user_id();
        self.ledger.record_deposit(user_id, amount, tx_hash).await?;
        info!("Recorded deposit of {} TON ({})", amount, tx_hash);
        self.log_activity(ActivityKind::Deposit, amount, now).await;

        self.refresh_account(now).await
    }

    /// Requests a withdrawal of staked TON to `address`.
    pub async fn withdraw(&mut self, amount: f64, address: &str, now: i64) -> Result<()> {
        let available = self
            .account
            .as_ref()
            .map(|account| account.balance)
            .ok_or(EarnError::NotInitialized)?;
        validate_withdrawal(amount, available)?;
        self.tick(now)?;

        let user_id = self.user_id();
        if let Err(err) = self
            .ledger
            .request_withdrawal(user_id, amount, address)
            .await
        {
            warn!("Withdrawal failed for user {}: {}", user_id, err);
            self.state = self.store.load_state()?.or(self.state);
            return Err(err);
        }
        info!("Requested withdrawal of {} TON to {}", amount, address);
        self.log_activity(ActivityKind::Withdrawal, amount, now).await;

        self.refresh_account(now).await
    }

    /// Re-reads the account and applies the resulting rate from `now` on.
    pub async fn refresh_account(&mut self, now: i64) -> Result<()> {
        let account = self.ledger.get_account(self.user_id()).await?;
        self.tick(now)?;

        let mut state = self.state.ok_or(EarnError::NotInitialized)?;
        if state.start_date.is_none() && account.balance > 0.0 {
            state.start_date = Some(now);
        }
        self.account = Some(account);
        let rate = self.rate_for(&state, now);
        state.apply_rate(&rate);

        self.state = Some(state);
        self.store.save_state(&state)?;
        Ok(())
    }

    /// Final best-effort flush to local storage and the ledger.
    pub async fn teardown(&mut self, now: i64) {
        if self.state.is_none() {
            return;
        }
        if let Err(err) = self.tick(now) {
            error!("Failed to persist earnings on teardown: {}", err);
        }
        let Some(state) = self.state else {
            return;
        };

        let pending = PendingSync {
            record: state.to_record(self.user_id()),
            started_at: now,
        };
        match self.ledger.upsert_earnings(&pending.record).await {
            Ok(()) => {
                if let Err(err) = self.complete_sync(&pending, Ok(())) {
                    error!("Failed to record final sync: {}", err);
                }
            }
            Err(err) => error!("Final earnings flush failed: {}", err),
        }
    }

    fn rate_for(&self, state: &EarningState, now: i64) -> EarningRate {
        let Some(account) = &self.account else {
            return EarningRate::INACTIVE;
        };
        let referrals = self
            .config
            .referral_boost
            .then_some(account.referral_count);
        earning_rate(
            account.balance,
            days_staked(state.start_date, now),
            self.config.base_roi,
            referrals,
        )
    }

    async fn log_activity(&self, kind: ActivityKind, amount: f64, now: i64) {
        let entry = ActivityEntry {
            user_id: self.user_id(),
            kind,
            amount,
            created_at: now,
        };
        if let Err(err) = self.ledger.log_activity(&entry).await {
            warn!("Failed to log {:?} activity: {}", kind, err);
        }
    }
}

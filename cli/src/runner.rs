use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tonmine_api::prelude::*;

use crate::file_storage::FileStorage;
use crate::now_ms;
use crate::supabase::SupabaseLedger;

pub type CliSession = EarningsSession<FileStorage, SupabaseLedger>;

type SyncResult = (PendingSync, Result<(), EarnError>);

/// Drives a session until ctrl-c or `quit`, then flushes it.
///
/// Ticks and sync checks come from the scheduler. Ledger pushes run on their
/// own tasks and report back over a channel, so a slow request never holds up
/// a tick. Lines on stdin stand in for visibility changes and user actions.
pub async fn run(session: &mut CliSession) -> anyhow::Result<()> {
    let tick_interval = session.config().tick_interval_ms.max(1) as u64;
    let mut scheduler = Scheduler::new(session.config(), now_ms());
    let mut ticker = time::interval(Duration::from_millis(tick_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let (sync_tx, mut sync_rx) = mpsc::unbounded_channel::<SyncResult>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("Mining. Commands: status, hide, show, claim, quit");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let now = now_ms();
                for event in scheduler.poll(now) {
                    match event {
                        ScheduleEvent::Tick => {
                            if let Err(err) = session.tick(now) {
                                tracing::warn!("Tick failed: {}", err);
                            }
                        }
                        ScheduleEvent::SyncDue => match session.sync_due(now) {
                            Ok(Some(pending)) => {
                                spawn_sync(session.ledger().clone(), pending, sync_tx.clone());
                            }
                            Ok(None) => {}
                            Err(err) => tracing::warn!("Sync check failed: {}", err),
                        },
                    }
                }
            }
            Some((pending, result)) = sync_rx.recv() => {
                match session.complete_sync(&pending, result) {
                    Ok(true) => print_status(session, now_ms()),
                    Ok(false) => {}
                    Err(err) => tracing::warn!("Failed to record sync: {}", err),
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if handle_command(session, line.trim()).await {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(err) => {
                    tracing::warn!("Stopped reading stdin: {}", err);
                    stdin_open = false;
                }
            },
        }
    }

    session.teardown(now_ms()).await;
    println!("Session closed.");
    Ok(())
}

fn spawn_sync(ledger: SupabaseLedger, pending: PendingSync, tx: mpsc::UnboundedSender<SyncResult>) {
    tokio::spawn(async move {
        let result = ledger.upsert_earnings(&pending.record).await;
        let _ = tx.send((pending, result));
    });
}

/// Returns true when the session should stop.
async fn handle_command(session: &mut CliSession, input: &str) -> bool {
    let now = now_ms();
    match input {
        "status" => print_status(session, now),
        "hide" => match session.hide(now) {
            Ok(()) => println!("Hidden. Accrual resumes on `show`."),
            Err(err) => println!("Error: {}", err),
        },
        "show" => match session.resume(now) {
            Ok(credited) => println!("Credited {:.9} TON while away", credited),
            Err(err) => println!("Error: {}", err),
        },
        "claim" => match session.claim(now).await {
            Ok(claimed) => println!("Claimed {:.9} TON", claimed),
            Err(err) => println!("Claim failed: {}", err),
        },
        "quit" | "exit" => return true,
        "" => {}
        other => println!("Unknown command: {}", other),
    }
    false
}

pub fn print_status(session: &CliSession, now: i64) {
    let Some(state) = session.state() else {
        println!("Earnings not initialized");
        return;
    };
    let rate = session.current_rate(now);
    println!("Earnings");
    println!("  user: {}", session.user_id());
    if let Some(account) = session.account() {
        println!("  balance: {} TON", account.balance);
        println!("  referrals: {}", account.referral_count);
    }
    println!("  current_earnings: {:.9} TON", state.current_earnings);
    println!("  rate: {:.10} TON/s ({:.6} TON/day)", rate.per_second, rate.daily);
    println!("  active: {}", state.is_active);
    println!(
        "  start_date: {}",
        state
            .start_date
            .map(|start| start.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  days_staked: {}", days_staked(state.start_date, now));
    println!("  last_update: {}", state.last_update);
}

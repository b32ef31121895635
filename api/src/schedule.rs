use crate::config::EarningsConfig;

/// Timer-driven events. Visibility changes are fed to the session directly by
/// the host and are not scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleEvent {
    /// Advance local accrual.
    Tick,
    /// Push local earnings to the ledger.
    SyncDue,
}

/// Owns the tick and sync periods and their next deadlines.
#[derive(Clone, Debug)]
pub struct Scheduler {
    tick_interval_ms: i64,
    sync_interval_ms: i64,
    next_tick: i64,
    next_sync: i64,
}

impl Scheduler {
    pub fn new(config: &EarningsConfig, now: i64) -> Self {
        let tick_interval_ms = config.tick_interval_ms.max(1);
        let sync_interval_ms = config.sync_interval_ms.max(1);
        Self {
            tick_interval_ms,
            sync_interval_ms,
            next_tick: now + tick_interval_ms,
            next_sync: now + sync_interval_ms,
        }
    }

    /// Returns the events due at `now`, at most one of each kind.
    ///
    /// Missed periods collapse into a single event and the next deadline is
    /// measured from `now`; accrual uses wall-clock deltas so nothing is lost.
    pub fn poll(&mut self, now: i64) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();
        if now >= self.next_tick {
            events.push(ScheduleEvent::Tick);
            self.next_tick = now + self.tick_interval_ms;
        }
        if now >= self.next_sync {
            events.push(ScheduleEvent::SyncDue);
            self.next_sync = now + self.sync_interval_ms;
        }
        events
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> i64 {
        self.next_tick.min(self.next_sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EarningsConfig {
        EarningsConfig {
            tick_interval_ms: 1_000,
            sync_interval_ms: 60_000,
            ..EarningsConfig::default()
        }
    }

    #[test]
    fn test_nothing_due_before_first_period() {
        let mut scheduler = Scheduler::new(&config(), 0);
        assert!(scheduler.poll(999).is_empty());
        assert_eq!(scheduler.next_deadline(), 1_000);
    }

    #[test]
    fn test_tick_every_second_sync_every_minute() {
        let mut scheduler = Scheduler::new(&config(), 0);
        let mut ticks = 0;
        let mut syncs = 0;
        for now in (1_000..=120_000).step_by(1_000) {
            for event in scheduler.poll(now) {
                match event {
                    ScheduleEvent::Tick => ticks += 1,
                    ScheduleEvent::SyncDue => syncs += 1,
                }
            }
        }
        assert_eq!(ticks, 120);
        assert_eq!(syncs, 2);
    }

    #[test]
    fn test_missed_periods_collapse() {
        let mut scheduler = Scheduler::new(&config(), 0);
        let events = scheduler.poll(600_000);
        assert_eq!(events, vec![ScheduleEvent::Tick, ScheduleEvent::SyncDue]);
        assert_eq!(scheduler.next_deadline(), 601_000);
        assert!(scheduler.poll(600_500).is_empty());
    }
}

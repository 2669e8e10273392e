use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::routine::{CycleError, CycleReport, CycleStatus, SecretaryRoutine};
use super::status::StatusBoard;

/// Fixed-interval gate deciding when the next cycle may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSchedule {
    interval: chrono::Duration,
    last_run: Option<DateTime<Utc>>,
}

impl RoutineSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: chrono::Duration::from_std(interval)
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            last_run: None,
        }
    }

    /// Due immediately before the first run, then once per interval.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    pub fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
    }

    pub fn until_due(&self, now: DateTime<Utc>) -> Duration {
        match self.last_run {
            Some(last) => (last + self.interval - now)
                .to_std()
                .unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }
}

/// Secretary routine driven on a schedule, publishing every outcome to a [`StatusBoard`].
pub struct ScheduledRoutine {
    routine: SecretaryRoutine,
    schedule: RoutineSchedule,
    board: Arc<StatusBoard>,
}

impl ScheduledRoutine {
    pub fn new(routine: SecretaryRoutine, interval: Duration, board: Arc<StatusBoard>) -> Self {
        let now = routine.session().clock.now();
        board.publish_state(routine.state(), now);
        Self {
            routine,
            schedule: RoutineSchedule::new(interval),
            board,
        }
    }

    /// Run one cycle if the schedule allows it. Failures are logged, not propagated.
    pub fn tick(&mut self) -> Option<Result<CycleReport, CycleError>> {
        let clock = self.routine.session().clock.clone();
        let now = clock.now();
        if !self.schedule.is_due(now) {
            return None;
        }
        self.schedule.mark_run(now);

        let result = self.routine.run_cycle();
        match &result {
            Ok(report) => match &report.status {
                CycleStatus::Completed => info!(
                    accepted = report.accepted(),
                    rejected = report.rejected(),
                    evictions = report.evictions.len(),
                    "secretary cycle completed"
                ),
                CycleStatus::Aborted(reason) => {
                    warn!(?reason, "secretary cycle aborted")
                }
            },
            Err(err) => error!(error = %err, "secretary cycle failed"),
        }
        self.board
            .record_cycle(self.routine.state(), &result, clock.now());
        Some(result)
    }

    /// Keep ticking until `cycles` cycles ran, or forever when `cycles` is `None`.
    pub fn run(&mut self, cycles: Option<u64>) {
        let clock = self.routine.session().clock.clone();
        let mut completed = 0;
        loop {
            if cycles.is_some_and(|limit| completed >= limit) {
                return;
            }
            if self.tick().is_some() {
                completed += 1;
                continue;
            }
            clock.sleep(self.schedule.until_due(clock.now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid")
    }

    #[test]
    fn first_run_is_due_immediately() {
        let schedule = RoutineSchedule::new(Duration::from_secs(300));
        assert!(schedule.is_due(epoch()));
        assert_eq!(schedule.until_due(epoch()), Duration::ZERO);
    }

    #[test]
    fn next_run_waits_for_the_interval() {
        let mut schedule = RoutineSchedule::new(Duration::from_secs(300));
        schedule.mark_run(epoch());

        let later = epoch() + chrono::Duration::seconds(120);
        assert!(!schedule.is_due(later));
        assert_eq!(schedule.until_due(later), Duration::from_secs(180));
        assert!(schedule.is_due(epoch() + chrono::Duration::seconds(300)));
    }
}

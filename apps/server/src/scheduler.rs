//! Wall-clock scheduler.
//!
//! Owns an explicit list of (cadence, operation) pairs and drives each one
//! on its own task: optionally run once at startup, then fire once per hour
//! at a fixed minute. A pass runs to completion before its next tick is
//! armed, so ticks within one cadence never overlap. The engine stays free
//! of timing logic; it only ever sees "now".

use chrono::{DateTime, Timelike, Utc};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

type JobOp = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// One scheduled operation.
pub struct ScheduledJob {
    pub name: &'static str,
    /// Minute of the hour at which the job fires.
    pub minute: u32,
    /// Run once immediately on startup before the first wall-clock tick.
    pub run_at_startup: bool,
    op: JobOp,
}

impl ScheduledJob {
    pub fn new<F, Fut>(name: &'static str, minute: u32, run_at_startup: bool, op: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            minute,
            run_at_startup,
            op: Box::new(move || Box::pin(op())),
        }
    }
}

/// Time until the next wall-clock occurrence of `minute` within the hour,
/// strictly in the future. Hitting the minute exactly schedules the next
/// hour, so a pass that finishes within its own minute cannot double-fire.
pub fn duration_until_minute(now: DateTime<Utc>, minute: u32) -> Duration {
    let this_hour = now
        .with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let target = if this_hour > now {
        this_hour
    } else {
        this_hour + chrono::Duration::hours(1)
    };

    (target - now).to_std().unwrap_or(Duration::ZERO)
}

async fn drive(job: ScheduledJob) {
    info!(job = job.name, minute = job.minute, "job scheduled");

    if job.run_at_startup {
        debug!(job = job.name, "startup run");
        (job.op)().await;
    }

    loop {
        let wait = duration_until_minute(Utc::now(), job.minute);
        debug!(job = job.name, wait_secs = wait.as_secs(), "sleeping until next tick");
        tokio::time::sleep(wait).await;
        (job.op)().await;
    }
}

/// Scheduler owning the job list.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_job(&mut self, job: ScheduledJob) {
        self.jobs.push(job);
    }

    /// Spawn every job and park forever. Individual passes failing is a
    /// job-local concern; the scheduler itself never exits.
    pub async fn run(self) {
        let handles: Vec<_> = self
            .jobs
            .into_iter()
            .map(|job| tokio::spawn(drive(job)))
            .collect();

        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_minute_later_this_hour() {
        let wait = duration_until_minute(at(10, 12, 0), 30);
        assert_eq!(wait, Duration::from_secs(18 * 60));
    }

    #[test]
    fn test_minute_already_passed_wraps_to_next_hour() {
        let wait = duration_until_minute(at(10, 45, 0), 30);
        assert_eq!(wait, Duration::from_secs(45 * 60));
    }

    #[test]
    fn test_exact_minute_schedules_next_hour() {
        let wait = duration_until_minute(at(10, 0, 0), 0);
        assert_eq!(wait, Duration::from_secs(3600));
    }

    #[test]
    fn test_seconds_are_accounted_for() {
        let wait = duration_until_minute(at(10, 29, 30), 30);
        assert_eq!(wait, Duration::from_secs(30));
    }
}

//! Wall-clock trigger for the daily reminder scan.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use time::Date;
use tokio::task::JoinHandle;

use crate::AppResources;
use crate::expiry::local_today;
use crate::reminders::dispatch::{ReminderDispatcher, ScanSummary};

/// Fires once a day at a fixed local time in a fixed zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    pub timezone: Tz,
    pub at: NaiveTime,
}

impl DailySchedule {
    pub fn new(timezone: Tz, at: NaiveTime) -> Self {
        Self { timezone, at }
    }

    /// Instant the schedule fires on local calendar day `day`.
    ///
    /// A time skipped by a DST jump fires one hour later; a repeated time fires on
    /// its first occurrence.
    fn fire_on(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        let local = day.and_time(self.at);
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(local + TimeDelta::hours(1)))
                    .earliest()
            })
            .map(|t| t.with_timezone(&Utc))
    }

    /// First firing strictly after `now`.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut day = now.with_timezone(&self.timezone).date_naive();
        for _ in 0..3 {
            if let Some(candidate) = self.fire_on(day).filter(|c| *c > now) {
                return candidate;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        now + TimeDelta::days(1)
    }

    /// Next firing after both `now` and the `previous` firing.
    ///
    /// The sleep timer can wake a little before the wall clock reaches `previous`,
    /// in which case `now` alone would yield the same instant again.
    pub fn next_fire_following(
        &self,
        now: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> DateTime<Utc> {
        let from = previous.map_or(now, |p| p.max(now));
        self.next_fire_after(from)
    }

    pub fn local_today(&self, now: DateTime<Utc>) -> Date {
        local_today(self.timezone, now)
    }
}

/// Runs one scan for the local date at `now`. Failures are already logged by the dispatcher.
pub async fn run_tick(
    dispatcher: &ReminderDispatcher,
    schedule: &DailySchedule,
    now: DateTime<Utc>,
) -> Option<ScanSummary> {
    dispatcher
        .run_daily_reminder_scan(schedule.local_today(now))
        .await
        .ok()
}

/// Starts the background reminder loop. Returns `None` when reminders are disabled.
pub fn spawn_reminder_scheduler(resources: Arc<AppResources>) -> Option<JoinHandle<()>> {
    if !resources.config.reminders.enabled {
        tracing::info!(
            name = "reminders.scheduler.disabled",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            message = "Reminder e-mails are disabled"
        );
        return None;
    }
    let schedule = match resources.config.reminders.schedule() {
        Ok(schedule) => schedule,
        Err(e) => {
            tracing::error!(
                name = "reminders.scheduler.invalid_config",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Reminder scheduler not started"
            );
            return None;
        }
    };
    let dispatcher = ReminderDispatcher::from_resources(&resources);

    Some(tokio::spawn(async move {
        let mut previous = None;
        loop {
            let now = Utc::now();
            let next = schedule.next_fire_following(now, previous);
            tracing::info!(
                name = "reminders.scheduler.sleeping",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                next_run = %next,
                timezone = %schedule.timezone,
                message = "Next reminder scan scheduled"
            );
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            run_tick(&dispatcher, &schedule, Utc::now().max(next)).await;
            previous = Some(next);
        }
    }))
}

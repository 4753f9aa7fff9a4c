//! Reminder dispatch policy.
//!
//! Decisions are a pure function of the days remaining; there is no record of
//! earlier sends, so a document inside the threshold is mailed on every tick.

use serde::Deserialize;

/// Days before the due date at which reminders start.
pub const DEFAULT_THRESHOLD_DAYS: i64 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Every day from the threshold onwards, overdue days included.
    #[default]
    Continuous,
    /// Only on the day that is exactly `threshold_days` before the due date.
    ExactDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub threshold_days: i64,
    pub trigger: TriggerMode,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            trigger: TriggerMode::Continuous,
        }
    }
}

/// Which message a reminder carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderVariant {
    Overdue { days: i64 },
    DueToday,
    DueIn { days: i64 },
}

impl ReminderVariant {
    pub fn from_days(days_remaining: i64) -> Self {
        match days_remaining {
            d if d < 0 => ReminderVariant::Overdue { days: d.abs() },
            0 => ReminderVariant::DueToday,
            d => ReminderVariant::DueIn { days: d },
        }
    }

    pub fn status_prefix(&self) -> &'static str {
        match self {
            ReminderVariant::Overdue { .. } => "⚠️ DEADLINE PASSED",
            ReminderVariant::DueToday => "🔥 DUE TODAY",
            ReminderVariant::DueIn { .. } => "🔔 Upcoming deadline",
        }
    }

    pub fn status_text(&self) -> String {
        match self {
            ReminderVariant::Overdue { days } => format!("overdue by {days} days"),
            ReminderVariant::DueToday => "due today".to_string(),
            ReminderVariant::DueIn { days } => format!("due in {days} days"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderDispatchDecision {
    Skip,
    Send(ReminderVariant),
}

impl ReminderPolicy {
    pub fn decide(&self, days_remaining: Option<i64>) -> ReminderDispatchDecision {
        let Some(days) = days_remaining else {
            return ReminderDispatchDecision::Skip;
        };
        let triggered = match self.trigger {
            TriggerMode::Continuous => days <= self.threshold_days,
            TriggerMode::ExactDay => days == self.threshold_days,
        };
        if triggered {
            ReminderDispatchDecision::Send(ReminderVariant::from_days(days))
        } else {
            ReminderDispatchDecision::Skip
        }
    }
}

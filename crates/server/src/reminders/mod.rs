//! Daily reminder e-mails for expiring vehicle documents.
//!
//! - `policy`: decides whether a document warrants a reminder today
//! - `email`: the [`email::Notifier`] seam and its SMTP implementation
//! - `dispatch`: the scan over all vehicles
//! - `schedule`: the timezone-pinned daily trigger

pub mod dispatch;
pub mod email;
pub mod policy;
pub mod schedule;

pub use dispatch::{ReminderDispatcher, ScanSummary};
pub use email::{Notifier, NotifyError, SmtpNotifier};
pub use policy::{ReminderDispatchDecision, ReminderPolicy, ReminderVariant, TriggerMode};
pub use schedule::{DailySchedule, spawn_reminder_scheduler};

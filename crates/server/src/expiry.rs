//! Expiry evaluation for tracked vehicle documents.
//!
//! Due dates arrive as loosely formatted strings from the record store. Anything
//! that does not start with an ISO calendar date is treated as "not tracked".
//! Values written as UTC instants are rewritten to plain local dates on write and
//! at startup (see [`parse_due_date`] and `store::normalize_due_dates`).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use utoipa::ToSchema;

use crate::entity::vehicle;

/// A calendar-date obligation tracked per vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackedDocument {
    Insurance,
    Inspection,
}

impl TrackedDocument {
    /// Evaluation order: insurance before inspection.
    pub const ALL: [TrackedDocument; 2] = [TrackedDocument::Insurance, TrackedDocument::Inspection];

    /// Human-readable name used in alerts and e-mails.
    pub fn label(self) -> &'static str {
        match self {
            TrackedDocument::Insurance => "Insurance",
            TrackedDocument::Inspection => "Technical inspection",
        }
    }

    /// Stable identifier persisted in the reminder log.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackedDocument::Insurance => "insurance",
            TrackedDocument::Inspection => "inspection",
        }
    }

    pub fn due_date(self, vehicle: &vehicle::Model) -> Option<&str> {
        match self {
            TrackedDocument::Insurance => vehicle.insurance_date.as_deref(),
            TrackedDocument::Inspection => vehicle.inspection_date.as_deref(),
        }
    }
}

/// Parses the calendar-date prefix of `raw`.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time part separated by `T` or a
/// space. Returns `None` for blank or malformed input. The prefix is taken as
/// written, so an instant like `2026-03-11T23:00:00Z` yields 11 March; use
/// [`parse_due_date`] where the zone is known.
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let date_part = raw.trim().split(['T', ' ']).next()?;
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .ok()
}

fn to_date(day: NaiveDate) -> Option<Date> {
    Date::from_ordinal_date(day.year(), day.ordinal() as u16).ok()
}

/// Calendar date of a stored due-date value as seen in `tz`.
///
/// Values with a UTC designator or offset (`2026-03-11T23:00:00.000Z`,
/// `2026-03-11 23:00:00+00`) are instants and are converted into `tz` first.
/// Everything else falls back to [`parse_iso_date`].
pub fn parse_due_date(raw: &str, tz: Tz) -> Option<Date> {
    let raw = raw.trim();
    match parse_instant(raw) {
        Some(instant) => to_date(instant.with_timezone(&tz).date_naive()),
        None => parse_iso_date(raw),
    }
}

/// Signed number of calendar days from `today` until `due`.
///
/// Negative once the date has passed, zero on the due day, `None` when the date is
/// absent or unparseable.
pub fn days_remaining(due: Option<&str>, today: Date) -> Option<i64> {
    let due = parse_iso_date(due?)?;
    Some((due - today).whole_days())
}

/// The calendar date at `now` in `tz`.
pub fn local_today(tz: Tz, now: DateTime<Utc>) -> Date {
    to_date(now.with_timezone(&tz).date_naive())
        .unwrap_or_else(|| OffsetDateTime::now_utc().date())
}

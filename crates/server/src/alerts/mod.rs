//! In-app expiry alerts.
//!
//! Alerts are recomputed from the vehicle snapshot on every read. Nothing here is
//! cached or persisted, so two calls with the same input always agree.

use serde::Serialize;
use time::Date;
use utoipa::ToSchema;

use crate::entity::vehicle;
use crate::expiry::{TrackedDocument, days_remaining};

/// Documents expiring within this many days produce an "upcoming" alert.
pub const ALERT_WINDOW_DAYS: i64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Due today or already past.
    Expired,
    /// Due within the alert window.
    Upcoming,
}

impl Severity {
    /// `None` when the document is outside the alert window.
    pub fn classify(days_remaining: i64, window_days: i64) -> Option<Self> {
        if days_remaining <= 0 {
            Some(Severity::Expired)
        } else if days_remaining <= window_days {
            Some(Severity::Upcoming)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct AlertRecord {
    pub vehicle_id: i32,
    pub vehicle_name: String,
    pub document: TrackedDocument,
    pub days_remaining: i64,
    pub severity: Severity,
}

impl AlertRecord {
    pub fn message(&self) -> String {
        let name = &self.vehicle_name;
        let days = self.days_remaining;
        match (self.document, self.severity) {
            (TrackedDocument::Insurance, Severity::Expired) => {
                format!("⚠️ {name} - insurance has expired!")
            }
            (TrackedDocument::Insurance, Severity::Upcoming) => {
                format!("📅 {name} - insurance ends in {days} days")
            }
            (TrackedDocument::Inspection, Severity::Expired) => {
                format!("❌ {name} - no valid technical inspection!")
            }
            (TrackedDocument::Inspection, Severity::Upcoming) => {
                format!("🔧 {name} - technical inspection ends in {days} days")
            }
        }
    }
}

/// Structured alerts in vehicle order, insurance before inspection per vehicle.
pub fn compute_alert_records(
    vehicles: &[vehicle::Model],
    today: Date,
    window_days: i64,
) -> Vec<AlertRecord> {
    vehicles
        .iter()
        .flat_map(|v| {
            TrackedDocument::ALL.into_iter().filter_map(move |document| {
                let days = days_remaining(document.due_date(v), today)?;
                let severity = Severity::classify(days, window_days)?;
                Some(AlertRecord {
                    vehicle_id: v.id,
                    vehicle_name: v.display_name(),
                    document,
                    days_remaining: days,
                    severity,
                })
            })
        })
        .collect()
}

pub fn compute_alerts_within(
    vehicles: &[vehicle::Model],
    today: Date,
    window_days: i64,
) -> Vec<String> {
    compute_alert_records(vehicles, today, window_days)
        .iter()
        .map(AlertRecord::message)
        .collect()
}

/// Alert strings for page rendering using the default 30-day window.
pub fn compute_alerts(vehicles: &[vehicle::Model], today: Date) -> Vec<String> {
    compute_alerts_within(vehicles, today, ALERT_WINDOW_DAYS)
}

//! Daily reminder scan.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use time::Date;

use crate::AppResources;
use crate::email_templates::ReminderEmail;
use crate::entity::vehicle;
use crate::error::StoreError;
use crate::expiry::{TrackedDocument, days_remaining};
use crate::reminders::email::{Notifier, NotifyError};
use crate::reminders::policy::{ReminderDispatchDecision, ReminderPolicy};
use crate::store;

/// Outcome counters of one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub vehicles_scanned: usize,
    pub skipped_without_recipient: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct ReminderDispatcher {
    db: Arc<DatabaseConnection>,
    notifier: Arc<dyn Notifier>,
    policy: ReminderPolicy,
    send_timeout: Duration,
}

impl ReminderDispatcher {
    pub fn new(
        db: Arc<DatabaseConnection>,
        notifier: Arc<dyn Notifier>,
        policy: ReminderPolicy,
        send_timeout: Duration,
    ) -> Self {
        Self {
            db,
            notifier,
            policy,
            send_timeout,
        }
    }

    pub fn from_resources(resources: &AppResources) -> Self {
        Self::new(
            resources.db.clone(),
            resources.notifier.clone(),
            resources.config.reminders.policy(),
            resources.config.reminders.send_timeout(),
        )
    }

    /// Evaluates every vehicle against `today` and mails the ones inside the threshold.
    ///
    /// A failed send is logged and does not stop the scan. Only a failure to read
    /// the vehicle list aborts it.
    #[tracing::instrument(skip(self))]
    pub async fn run_daily_reminder_scan(&self, today: Date) -> Result<ScanSummary, StoreError> {
        let vehicles = store::all_vehicles(&self.db).await.inspect_err(|e| {
            tracing::error!(
                name = "reminders.scan.load_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to load vehicles for reminder scan"
            );
        })?;

        let mut summary = ScanSummary {
            vehicles_scanned: vehicles.len(),
            ..ScanSummary::default()
        };

        for v in &vehicles {
            let Some(recipient) = v.reminder_recipient() else {
                summary.skipped_without_recipient += 1;
                continue;
            };
            for document in TrackedDocument::ALL {
                self.process_document(v, document, recipient, today, &mut summary)
                    .await;
            }
        }

        tracing::info!(
            name = "reminders.scan.completed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            %today,
            vehicles = summary.vehicles_scanned,
            skipped = summary.skipped_without_recipient,
            sent = summary.sent,
            failed = summary.failed,
            message = "Reminder scan finished"
        );
        Ok(summary)
    }

    async fn process_document(
        &self,
        v: &vehicle::Model,
        document: TrackedDocument,
        recipient: &str,
        today: Date,
        summary: &mut ScanSummary,
    ) {
        let Some(due) = document.due_date(v) else {
            return;
        };
        let Some(days) = days_remaining(Some(due), today) else {
            return;
        };
        let ReminderDispatchDecision::Send(variant) = self.policy.decide(Some(days)) else {
            return;
        };

        let vehicle_name = v.display_name();
        let email = ReminderEmail {
            vehicle_name: &vehicle_name,
            document,
            variant,
            due_date: due,
        };

        match self.send(recipient, &email.subject(), &email.render_text()).await {
            Ok(()) => {
                summary.sent += 1;
                tracing::info!(
                    name = "reminders.send.succeeded",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    vehicle_id = v.id,
                    document = document.as_str(),
                    days_remaining = days,
                    message = "Reminder e-mail sent"
                );
                if let Err(e) =
                    store::record_reminder(&self.db, v.id, document, recipient, days).await
                {
                    tracing::warn!(
                        name = "reminders.log.insert_failed",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        error = %e,
                        vehicle_id = v.id,
                        message = "Failed to record sent reminder"
                    );
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(
                    name = "reminders.send.failed",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    vehicle_id = v.id,
                    document = document.as_str(),
                    message = "Failed to send reminder e-mail"
                );
            }
        }
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tokio::time::timeout(self.send_timeout, self.notifier.send(to, subject, body))
            .await
            .map_err(|_| NotifyError::Timeout(self.send_timeout))?
    }
}

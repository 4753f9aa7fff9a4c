//! Plain-text reminder e-mail rendering.

use crate::expiry::TrackedDocument;
use crate::reminders::policy::ReminderVariant;

pub struct ReminderEmail<'a> {
    pub vehicle_name: &'a str,
    pub document: TrackedDocument,
    pub variant: ReminderVariant,
    /// Due date as stored on the vehicle.
    pub due_date: &'a str,
}

impl ReminderEmail<'_> {
    pub fn subject(&self) -> String {
        format!(
            "{}: {} - {}",
            self.variant.status_prefix(),
            self.vehicle_name,
            self.document.label()
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn render_text(&self) -> String {
        format!(
            r#"Hello,

Vehicle: {}
Item: {}
Status: {} ({}).

Please update the record in the fleet system once the matter has been dealt with.

Fleet Tracker"#,
            self.vehicle_name,
            self.document.label(),
            self.variant.status_text(),
            self.due_date.trim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_subject_and_body() {
        let email = ReminderEmail {
            vehicle_name: "Ford Transit",
            document: TrackedDocument::Insurance,
            variant: ReminderVariant::from_days(-3),
            due_date: "2026-03-07",
        };
        assert_eq!(
            email.subject(),
            "⚠️ DEADLINE PASSED: Ford Transit - Insurance"
        );
        let body = email.render_text();
        assert!(body.contains("Vehicle: Ford Transit"));
        assert!(body.contains("Status: overdue by 3 days (2026-03-07)."));
    }

    #[test]
    fn due_today_and_upcoming_subjects() {
        let mut email = ReminderEmail {
            vehicle_name: "VW Golf",
            document: TrackedDocument::Inspection,
            variant: ReminderVariant::DueToday,
            due_date: "2026-03-10",
        };
        assert_eq!(email.subject(), "🔥 DUE TODAY: VW Golf - Technical inspection");
        email.variant = ReminderVariant::DueIn { days: 5 };
        assert!(email.subject().starts_with("🔔 Upcoming deadline"));
        assert!(email.render_text().contains("due in 5 days"));
    }
}

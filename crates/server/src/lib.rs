//! Fleet management service.
//!
//! Keeps a register of company vehicles with their mileage history, warns about
//! expiring insurance and technical inspections, and mails daily reminders to the
//! address configured per vehicle.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use time::Date;

use crate::config::AppConfig;
use crate::reminders::Notifier;

pub mod alerts;
pub mod api;
pub mod config;
pub mod email_templates;
pub mod entity;
pub mod error;
pub mod expiry;
pub mod export;
pub mod reminders;
pub mod store;

#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<AppConfig>,
}

impl AppResources {
    /// Current calendar date in the configured reminder timezone.
    pub fn today(&self) -> Date {
        expiry::local_today(self.config.reminders.timezone, chrono::Utc::now())
    }
}

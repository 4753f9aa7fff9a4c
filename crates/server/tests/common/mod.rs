#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fleet_tracker::AppResources;
use fleet_tracker::config::{AdminConfig, AppConfig, ReminderConfig, SmtpConfig};
use fleet_tracker::entity::vehicle;
use fleet_tracker::reminders::{Notifier, NotifyError};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Statement,
};
use time::Date;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const TOKEN_SECRET: &str = "12345678901234567890123456789012";

/// In-memory SQLite database with the fleet tables.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE vehicle (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NULL,
            model TEXT NULL,
            plate TEXT NULL,
            vin TEXT NULL,
            year TEXT NULL,
            garage TEXT NULL,
            note TEXT NULL,
            image_path TEXT NULL,
            policy_number TEXT NULL,
            insurance_date TEXT NULL,
            inspection_date TEXT NULL,
            reminder_email TEXT NULL,
            created_on TEXT NOT NULL
        );"#,
    ))
    .await
    .expect("create vehicle table");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE mileage_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vehicle_id INTEGER NOT NULL REFERENCES vehicle(id) ON DELETE CASCADE,
            mileage BIGINT NOT NULL,
            action TEXT NOT NULL,
            event_date TEXT NOT NULL,
            date_added TEXT NOT NULL
        );"#,
    ))
    .await
    .expect("create mileage_log table");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE reminder_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vehicle_id INTEGER NOT NULL,
            document TEXT NOT NULL,
            recipient TEXT NOT NULL,
            days_remaining INTEGER NOT NULL,
            sent_at TEXT NOT NULL
        );"#,
    ))
    .await
    .expect("create reminder_log table");

    db
}

pub fn create_test_config(uploads_dir: &str) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        bind_address: "127.0.0.1:0".into(),
        uploads_dir: uploads_dir.into(),
        smtp: SmtpConfig {
            server: "localhost".into(),
            port: 25,
            username: "test".into(),
            password: "test".into(),
            from: "fleet@test.example.org".into(),
        },
        admin: AdminConfig {
            username: ADMIN_USER.into(),
            password: ADMIN_PASSWORD.into(),
            token_secret: TOKEN_SECRET.into(),
            token_ttl_hours: 12,
        },
        reminders: ReminderConfig::default(),
    }
}

pub async fn create_test_resources(notifier: Arc<RecordingNotifier>) -> AppResources {
    let uploads = std::env::temp_dir().join(format!("fleet-uploads-{}", uuid::Uuid::new_v4()));
    AppResources {
        db: Arc::new(create_test_db().await),
        notifier,
        config: Arc::new(create_test_config(&uploads.to_string_lossy())),
    }
}

/// Fields of a vehicle row for seeding; unspecified ones stay NULL.
#[derive(Default)]
pub struct VehicleSeed<'a> {
    pub brand: Option<&'a str>,
    pub model: Option<&'a str>,
    pub garage: Option<&'a str>,
    pub insurance_date: Option<&'a str>,
    pub inspection_date: Option<&'a str>,
    pub reminder_email: Option<&'a str>,
}

pub async fn insert_vehicle(db: &DatabaseConnection, seed: VehicleSeed<'_>) -> vehicle::Model {
    let own = |v: Option<&str>| v.map(str::to_string);
    vehicle::ActiveModel {
        brand: Set(own(seed.brand)),
        model_name: Set(own(seed.model)),
        garage: Set(own(seed.garage)),
        insurance_date: Set(own(seed.insurance_date)),
        inspection_date: Set(own(seed.inspection_date)),
        reminder_email: Set(own(seed.reminder_email)),
        created_on: Set(time::macros::date!(2026 - 01 - 01)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert vehicle")
}

/// ISO string for `today + offset` days.
pub fn iso_offset(today: Date, offset: i64) -> String {
    (today + time::Duration::days(offset)).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    attempts: Mutex<Vec<String>>,
    failing: Vec<String>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every send to one of `addresses` fails with a transport-style error.
    pub fn failing_for(addresses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        })
    }

    /// Every send takes `delay` before succeeding.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(to.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|a| a == to) {
            return Err(NotifyError::InvalidAddress {
                address: to.to_string(),
                reason: "simulated relay rejection".into(),
            });
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

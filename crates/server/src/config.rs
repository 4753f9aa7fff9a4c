use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::reminders::policy::{DEFAULT_THRESHOLD_DAYS, ReminderPolicy, TriggerMode};
use crate::reminders::schedule::DailySchedule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Credentials for the single administrator account and the key its tokens are signed with.
#[derive(Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub token_secret: String,
    /// Lifetime of an issued bearer token.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

#[derive(Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Zone used for "today" and for the daily scan trigger.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Local wall-clock time of the daily scan, `HH:MM`.
    #[serde(default = "default_send_at")]
    pub send_at: String,
    #[serde(default = "default_threshold_days")]
    pub threshold_days: i64,
    #[serde(default)]
    pub trigger: TriggerMode,
    /// Documents expiring within this many days show up as in-app alerts.
    #[serde(default = "default_alert_window_days")]
    pub alert_window_days: i64,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: default_timezone(),
            send_at: default_send_at(),
            threshold_days: default_threshold_days(),
            trigger: TriggerMode::default(),
            alert_window_days: default_alert_window_days(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl ReminderConfig {
    pub fn policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            threshold_days: self.threshold_days,
            trigger: self.trigger,
        }
    }

    pub fn send_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.send_at.trim(), "%H:%M").map_err(|e| {
            ConfigError::Validation(format!(
                "reminders.send_at must be HH:MM, got '{}': {e}",
                self.send_at
            ))
        })
    }

    pub fn schedule(&self) -> Result<DailySchedule, ConfigError> {
        Ok(DailySchedule::new(self.timezone, self.send_time()?))
    }

    pub fn send_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.send_timeout_secs)
    }
}

#[derive(Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Directory uploaded vehicle photos are written to and served from.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    pub smtp: SmtpConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_token_ttl_hours() -> i64 {
    12
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Warsaw
}

fn default_send_at() -> String {
    "10:00".to_string()
}

fn default_threshold_days() -> i64 {
    DEFAULT_THRESHOLD_DAYS
}

fn default_alert_window_days() -> i64 {
    crate::alerts::ALERT_WINDOW_DAYS
}

fn default_send_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.token_secret.len() < 32 {
            return Err(ConfigError::Validation(
                "admin.token_secret must be at least 32 characters".into(),
            ));
        }
        if self.admin.username.trim().is_empty() || self.admin.password.is_empty() {
            return Err(ConfigError::Validation(
                "admin.username and admin.password must be set".into(),
            ));
        }
        if self.admin.token_ttl_hours <= 0 {
            return Err(ConfigError::Validation(
                "admin.token_ttl_hours must be > 0".into(),
            ));
        }
        if self.smtp.port == 0 {
            return Err(ConfigError::Validation("smtp.port must be > 0".into()));
        }
        if self.reminders.alert_window_days < 0 {
            return Err(ConfigError::Validation(
                "reminders.alert_window_days must not be negative".into(),
            ));
        }
        if self.reminders.send_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "reminders.send_timeout_secs must be > 0".into(),
            ));
        }
        self.reminders.send_time()?;
        Ok(())
    }
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching the key path separated by double underscores
/// (e.g. `SMTP__PORT`, `REMINDERS__SEND_AT`) overrides the file value.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from("config.yaml")
}

pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_defaults_match_daily_policy() {
        let reminders = ReminderConfig::default();
        assert!(reminders.enabled);
        assert_eq!(reminders.timezone, chrono_tz::Europe::Warsaw);
        assert_eq!(reminders.threshold_days, 10);
        assert_eq!(reminders.trigger, TriggerMode::Continuous);
        assert_eq!(reminders.alert_window_days, 30);
        assert_eq!(
            reminders.send_time().unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn send_time_rejects_garbage() {
        let reminders = ReminderConfig {
            send_at: "25:99".into(),
            ..ReminderConfig::default()
        };
        assert!(matches!(
            reminders.send_time(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn policy_reflects_config() {
        let reminders = ReminderConfig {
            threshold_days: 7,
            trigger: TriggerMode::ExactDay,
            ..ReminderConfig::default()
        };
        let policy = reminders.policy();
        assert_eq!(policy.threshold_days, 7);
        assert_eq!(policy.trigger, TriggerMode::ExactDay);
    }
}

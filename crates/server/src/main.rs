use std::sync::Arc;

use fleet_tracker::AppResources;
use fleet_tracker::api::start_webserver;
use fleet_tracker::config::load_config;
use fleet_tracker::reminders::{SmtpNotifier, spawn_reminder_scheduler};
use fleet_tracker::store::normalize_due_dates;
use sea_orm::Database;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "fleet_tracker=info,sea_orm=info,tower_http=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    initialize_standard_tracing();

    let config = Arc::new(load_config()?);

    let db = Arc::new(Database::connect(&config.database_url).await?);
    let normalized = normalize_due_dates(&db, config.reminders.timezone).await?;
    if normalized > 0 {
        tracing::info!(vehicles = normalized, "normalized stored due dates");
    }
    let notifier = Arc::new(SmtpNotifier::from_config(&config.smtp)?);

    tracing::info!(
        enabled = config.reminders.enabled,
        timezone = %config.reminders.timezone,
        send_at = %config.reminders.send_at,
        threshold_days = config.reminders.threshold_days,
        trigger = ?config.reminders.trigger,
        "reminder configuration"
    );

    let resources = Arc::new(AppResources {
        db,
        notifier,
        config,
    });
    spawn_reminder_scheduler(resources.clone());

    start_webserver((*resources).clone()).await?;
    Ok(())
}

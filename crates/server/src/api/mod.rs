//! HTTP API.
//!
//! - `health` - liveness check (/healthz)
//! - `auth` - admin login and the bearer-token extractor (/api/auth/*)
//! - `vehicles` - vehicle CRUD, reminder settings and log, photo upload (/api/vehicles/*, /api/garages)
//! - `mileage` - per-vehicle mileage log (/api/vehicles/{id}/mileage)
//! - `dashboard` - dashboard snapshot and in-app alerts (/api/dashboard, /api/alerts)
//! - `export` - report downloads (/api/export/*)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod auth;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod mileage;
pub mod openapi;
pub mod vehicles;

use axum::{Extension, Router, extract::DefaultBodyLimit};
use chrono_tz::Tz;
use time::Date;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_redoc::{Redoc, Servable};

use crate::AppResources;
use crate::error::ApiError;
use crate::expiry::parse_due_date;

/// Largest accepted request body, sized for phone camera photos.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parses an optional ISO date field. Blank means "not set"; anything else must parse.
/// Timestamps with an offset are converted into `tz` before the date is taken.
pub(crate) fn parse_date_field(
    field: &str,
    value: Option<&str>,
    tz: Tz,
) -> Result<Option<Date>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_due_date(raw, tz).map(Some).ok_or_else(|| {
            ApiError::bad_request(format!("{field} must be a date in YYYY-MM-DD format"))
        }),
    }
}

/// Builds the application router with all routes, docs and middleware.
pub fn router(resources: AppResources) -> Router {
    let uploads = ServeDir::new(&resources.config.uploads_dir);

    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(vehicles::router())
        .merge(mileage::router())
        .merge(export::router())
        .split_for_parts();

    router
        .merge(Redoc::with_url("/api-docs", api))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(Extension(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(resources))]
pub async fn start_webserver(resources: AppResources) -> color_eyre::Result<()> {
    let addr = resources.config.bind_address.clone();
    let app = router(resources);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        name = "api.server.listening",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        addr = %addr,
        message = "Server running"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}

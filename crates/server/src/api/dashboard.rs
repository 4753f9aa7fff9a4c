//! Dashboard snapshot and in-app alerts.

use axum::{Extension, Json, extract::Query};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::alerts::{AlertRecord, compute_alert_records, compute_alerts_within};
use crate::api::auth::AdminSession;
use crate::entity::vehicle;
use crate::error::ApiError;
use crate::store;

/// Tag for OpenAPI documentation.
pub const DASHBOARD_TAG: &str = "Dashboard";

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub vehicles: Vec<vehicle::Model>,
    pub garages: Vec<String>,
    pub alerts: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AlertsResponse {
    #[schema(value_type = String, format = Date)]
    pub today: time::Date,
    pub alerts: Vec<String>,
    pub records: Vec<AlertRecord>,
}

/// Narrows the dashboard to one garage.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    pub garage: Option<String>,
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(dashboard))
        .routes(routes!(alerts))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = DASHBOARD_TAG,
    operation_id = "Dashboard",
    summary = "Vehicles, garages and current alerts",
    description = "Alerts are recomputed on every request and always cover the whole fleet, \
                   even when the vehicle list is filtered by garage.",
    security(("Authorization" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    )
)]
pub async fn dashboard(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let vehicles = store::all_vehicles(&resources.db).await?;
    let window = resources.config.reminders.alert_window_days;
    let alerts = compute_alerts_within(&vehicles, resources.today(), window);
    let garages = store::garages_of(&vehicles);

    let vehicles = match query.garage.as_deref().map(str::trim) {
        Some(garage) if !garage.is_empty() => vehicles
            .into_iter()
            .filter(|v| v.garage.as_deref().map(str::trim) == Some(garage))
            .collect(),
        _ => vehicles,
    };

    Ok(Json(DashboardResponse {
        vehicles,
        garages,
        alerts,
    }))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = DASHBOARD_TAG,
    operation_id = "Alerts",
    summary = "Expiry alerts for today",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Alert strings with their structured records", body = AlertsResponse)
    )
)]
pub async fn alerts(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let vehicles = store::all_vehicles(&resources.db).await?;
    let today = resources.today();
    let records = compute_alert_records(
        &vehicles,
        today,
        resources.config.reminders.alert_window_days,
    );
    Ok(Json(AlertsResponse {
        today,
        alerts: records.iter().map(AlertRecord::message).collect(),
        records,
    }))
}

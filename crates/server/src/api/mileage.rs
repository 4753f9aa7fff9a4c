//! Mileage log endpoints.

use axum::{Extension, Json, extract::Path, http::StatusCode};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::api::auth::AdminSession;
use crate::api::parse_date_field;
use crate::entity::mileage_log;
use crate::error::ApiError;
use crate::store::{self, NewMileageEntry};

/// Tag for OpenAPI documentation.
pub const MILEAGE_TAG: &str = "Mileage log";

#[derive(Deserialize, ToSchema)]
pub struct NewMileageRequest {
    /// Odometer reading in kilometres; a number or a numeric string.
    #[serde(default)]
    #[schema(value_type = i64, example = 120500)]
    pub mileage: Option<serde_json::Value>,
    #[serde(default)]
    pub action: Option<String>,
    /// Defaults to today.
    #[serde(default, alias = "eventDate", alias = "eventdate", alias = "date")]
    #[schema(example = "2026-03-10")]
    pub event_date: Option<String>,
}

/// A positive whole number of kilometres, given as a JSON number or string.
fn parse_mileage(value: Option<&serde_json::Value>) -> Result<i64, ApiError> {
    let mileage = match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    mileage
        .filter(|m| *m > 0)
        .ok_or_else(|| ApiError::bad_request("mileage must be a positive whole number"))
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(list_mileage, add_mileage))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}/mileage",
    tag = MILEAGE_TAG,
    operation_id = "List Mileage Entries",
    summary = "Log entries, most recent event first",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Log entries", body = Vec<mileage_log::Model>),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn list_mileage(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<mileage_log::Model>>, ApiError> {
    if store::vehicle_by_id(&resources.db, id).await?.is_none() {
        return Err(ApiError::not_found(format!("Vehicle {id} not found")));
    }
    Ok(Json(store::mileage_entries(&resources.db, id).await?))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    post,
    path = "/api/vehicles/{id}/mileage",
    tag = MILEAGE_TAG,
    operation_id = "Add Mileage Entry",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    request_body(content = NewMileageRequest),
    responses(
        (status = 201, description = "Entry added", body = mileage_log::Model),
        (status = 400, description = "Invalid mileage or date", body = ApiError),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn add_mileage(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    Json(payload): Json<NewMileageRequest>,
) -> Result<(StatusCode, Json<mileage_log::Model>), ApiError> {
    let mileage = parse_mileage(payload.mileage.as_ref())?;
    let tz = resources.config.reminders.timezone;
    let event_date = parse_date_field("event_date", payload.event_date.as_deref(), tz)?
        .unwrap_or_else(|| resources.today());
    let entry = NewMileageEntry {
        mileage,
        action: payload.action.unwrap_or_default(),
        event_date,
    };
    let created = store::add_mileage_entry(&resources.db, id, entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

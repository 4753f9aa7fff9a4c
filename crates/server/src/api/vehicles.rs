//! Vehicle endpoints.
//!
//! Request bodies accept the snake_case field names as well as the camelCase and
//! all-lowercase spellings older clients send (`insurance_date`, `insuranceDate`,
//! `insurancedate`). Everything past this module only sees the canonical names.

use std::path::{Path as FsPath, PathBuf};

use axum::{
    Extension, Json,
    extract::{Multipart, Path},
    http::StatusCode,
};
use chrono_tz::Tz;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::AppResources;
use crate::api::auth::AdminSession;
use crate::api::parse_date_field;
use crate::entity::{reminder_log, vehicle};
use crate::error::ApiError;
use crate::store::{self, NewVehicle, ReminderSettings, VehicleChanges};

/// Tag for OpenAPI documentation.
pub const VEHICLES_TAG: &str = "Vehicles";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub garage: Option<String>,
}

/// Omitted fields keep their stored value.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateVehicleRequest {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub garage: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// An empty value or the placeholder image keeps the stored photo.
    #[serde(default, alias = "imagePath", alias = "imagepath", alias = "image")]
    pub image_path: Option<String>,
}

/// Replaces all reminder settings; omitted or blank fields are cleared.
#[derive(Deserialize, ToSchema, Default)]
pub struct ReminderSettingsRequest {
    #[serde(default, alias = "insuranceDate", alias = "insurancedate")]
    #[schema(example = "2026-05-01")]
    pub insurance_date: Option<String>,
    #[serde(default, alias = "inspectionDate", alias = "inspectiondate")]
    #[schema(example = "2026-11-15")]
    pub inspection_date: Option<String>,
    #[serde(default, alias = "reminderEmail", alias = "reminderemail")]
    pub reminder_email: Option<String>,
    #[serde(default, alias = "policyNumber", alias = "policynumber")]
    pub policy_number: Option<String>,
}

impl ReminderSettingsRequest {
    fn into_settings(self, tz: Tz) -> Result<ReminderSettings, ApiError> {
        let insurance_date =
            parse_date_field("insurance_date", self.insurance_date.as_deref(), tz)?;
        let inspection_date =
            parse_date_field("inspection_date", self.inspection_date.as_deref(), tz)?;
        let reminder_email = self
            .reminder_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(email) = &reminder_email {
            email.parse::<lettre::Address>().map_err(|_| {
                ApiError::bad_request(format!("reminder_email '{email}' is not a valid address"))
            })?;
        }
        Ok(ReminderSettings {
            insurance_date,
            inspection_date,
            reminder_email,
            policy_number: self.policy_number,
        })
    }
}

/// Multipart body of the photo upload.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_vehicles, create_vehicle))
        .routes(routes!(get_vehicle, update_vehicle, delete_vehicle))
        .routes(routes!(update_reminders))
        .routes(routes!(reminder_history))
        .routes(routes!(upload_image))
        .routes(routes!(list_garages))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = VEHICLES_TAG,
    operation_id = "List Vehicles",
    summary = "All vehicles, newest first",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Vehicle list", body = Vec<vehicle::Model>),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    )
)]
pub async fn list_vehicles(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Json<Vec<vehicle::Model>>, ApiError> {
    Ok(Json(store::all_vehicles(&resources.db).await?))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/api/vehicles",
    tag = VEHICLES_TAG,
    operation_id = "Create Vehicle",
    summary = "Register a new vehicle",
    security(("Authorization" = [])),
    request_body(content = CreateVehicleRequest),
    responses(
        (status = 201, description = "Vehicle created", body = vehicle::Model),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    )
)]
pub async fn create_vehicle(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<vehicle::Model>), ApiError> {
    let created = store::create_vehicle(
        &resources.db,
        NewVehicle {
            brand: payload.brand,
            model: payload.model,
            garage: payload.garage,
        },
        resources.today(),
    )
    .await?;
    tracing::info!(
        name = "api.vehicles.created",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        vehicle_id = created.id,
        message = "Vehicle created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = VEHICLES_TAG,
    operation_id = "Get Vehicle",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "The vehicle", body = vehicle::Model),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn get_vehicle(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Result<Json<vehicle::Model>, ApiError> {
    store::vehicle_by_id(&resources.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Vehicle {id} not found")))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}",
    tag = VEHICLES_TAG,
    operation_id = "Update Vehicle",
    summary = "Update descriptive fields",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    request_body(content = UpdateVehicleRequest),
    responses(
        (status = 200, description = "Updated vehicle", body = vehicle::Model),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn update_vehicle(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<Json<vehicle::Model>, ApiError> {
    let changes = VehicleChanges {
        brand: payload.brand,
        model: payload.model,
        plate: payload.plate,
        vin: payload.vin,
        year: payload.year,
        garage: payload.garage,
        note: payload.note,
        image_path: payload.image_path,
    };
    Ok(Json(store::update_vehicle(&resources.db, id, changes).await?))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    delete,
    path = "/api/vehicles/{id}",
    tag = VEHICLES_TAG,
    operation_id = "Delete Vehicle",
    summary = "Delete a vehicle and its mileage log",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn delete_vehicle(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !store::delete_vehicle(&resources.db, id).await? {
        return Err(ApiError::not_found(format!("Vehicle {id} not found")));
    }
    tracing::info!(
        name = "api.vehicles.deleted",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        vehicle_id = id,
        message = "Vehicle deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}/reminders",
    tag = VEHICLES_TAG,
    operation_id = "Update Reminder Settings",
    summary = "Set document due dates, policy number and reminder address",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    request_body(content = ReminderSettingsRequest),
    responses(
        (status = 200, description = "Updated vehicle", body = vehicle::Model),
        (status = 400, description = "Malformed date or e-mail address", body = ApiError),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn update_reminders(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    Json(payload): Json<ReminderSettingsRequest>,
) -> Result<Json<vehicle::Model>, ApiError> {
    let settings = payload.into_settings(resources.config.reminders.timezone)?;
    Ok(Json(store::update_reminders(&resources.db, id, settings).await?))
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}/reminder-log",
    tag = VEHICLES_TAG,
    operation_id = "Reminder Log",
    summary = "Reminder e-mails sent for the vehicle, most recent first",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Sent reminders", body = Vec<reminder_log::Model>),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn reminder_history(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<reminder_log::Model>>, ApiError> {
    if store::vehicle_by_id(&resources.db, id).await?.is_none() {
        return Err(ApiError::not_found(format!("Vehicle {id} not found")));
    }
    Ok(Json(store::reminders_for_vehicle(&resources.db, id).await?))
}

fn image_extension(file_name: Option<&str>) -> Result<String, ApiError> {
    let ext = file_name
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "jpg".to_string());
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ApiError::bad_request(format!(
            "Unsupported image type '.{ext}'"
        )))
    }
}

#[tracing::instrument(skip_all, fields(vehicle_id = id))]
#[utoipa::path(
    post,
    path = "/api/vehicles/{id}/image",
    tag = VEHICLES_TAG,
    operation_id = "Upload Vehicle Photo",
    summary = "Replace the vehicle photo",
    security(("Authorization" = [])),
    params(("id" = i32, Path, description = "Vehicle id")),
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated vehicle", body = vehicle::Model),
        (status = 400, description = "Missing or unsupported image", body = ApiError),
        (status = 404, description = "No such vehicle", body = ApiError)
    )
)]
pub async fn upload_image(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<vehicle::Model>, ApiError> {
    if store::vehicle_by_id(&resources.db, id).await?.is_none() {
        return Err(ApiError::not_found(format!("Vehicle {id} not found")));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let ext = image_extension(field.file_name())?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        if data.is_empty() {
            return Err(ApiError::bad_request("Uploaded image is empty"));
        }

        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let dir = PathBuf::from(&resources.config.uploads_dir);
        let written = async {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(dir.join(&file_name), &data).await
        }
        .await;
        if let Err(e) = written {
            tracing::error!(
                name = "api.vehicles.upload_write_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                vehicle_id = id,
                message = "Failed to store uploaded photo"
            );
            return Err(ApiError::server_error());
        }

        let updated =
            store::set_vehicle_image(&resources.db, id, format!("/uploads/{file_name}")).await?;
        return Ok(Json(updated));
    }

    Err(ApiError::bad_request("Missing 'image' field"))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/garages",
    tag = VEHICLES_TAG,
    operation_id = "List Garages",
    summary = "Distinct garage names",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Garage names in order of first appearance", body = Vec<String>)
    )
)]
pub async fn list_garages(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(store::unique_garages(&resources.db).await?))
}

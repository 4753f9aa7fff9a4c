//! OpenAPI/Utoipa configuration.

use crate::api::{
    auth::AUTH_TAG, dashboard::DASHBOARD_TAG, export::EXPORT_TAG, health::MISC_TAG,
    mileage::MILEAGE_TAG, vehicles::VEHICLES_TAG,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    #[tracing::instrument(skip(self, openapi))]
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Use the token returned by `/api/auth/login` to authenticate.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fleet Tracker API",
        version = "1.0.0",
        description = "Vehicle register with mileage log, document expiry alerts and report export."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = AUTH_TAG, description = "Admin login"),
        (name = DASHBOARD_TAG, description = "Dashboard and expiry alerts"),
        (name = VEHICLES_TAG, description = "Vehicle records"),
        (name = MILEAGE_TAG, description = "Per-vehicle mileage log"),
        (name = EXPORT_TAG, description = "Report downloads")
    )
)]
pub struct ApiDoc;

//! Admin login and the bearer-token extractor guarding the fleet endpoints.

use axum::{Extension, Json, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::config::AdminConfig;
use crate::error::ApiError;

/// Tag for OpenAPI documentation.
pub const AUTH_TAG: &str = "Authentication";

#[derive(Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(login))
}

/// Signs a token for the configured admin user.
pub fn issue_token(
    admin: &AdminConfig,
    now: OffsetDateTime,
) -> Result<LoginResponse, jsonwebtoken::errors::Error> {
    let ttl = time::Duration::hours(admin.token_ttl_hours);
    let claims = AdminClaims {
        sub: admin.username.clone(),
        iat: now.unix_timestamp() as usize,
        exp: (now + ttl).unix_timestamp() as usize,
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(admin.token_secret.as_bytes()),
    )?;
    Ok(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ttl.whole_seconds(),
    })
}

pub fn verify_token(
    admin: &AdminConfig,
    token: &str,
) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(admin.token_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[tracing::instrument(skip(resources, payload), fields(username = %payload.username))]
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_TAG,
    operation_id = "Login",
    summary = "Exchange admin credentials for a bearer token",
    request_body(content = LoginRequest, description = "Admin credentials"),
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Wrong username or password", body = ApiError)
    )
)]
pub async fn login(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let admin = &resources.config.admin;
    if payload.username != admin.username || payload.password != admin.password {
        tracing::warn!(
            name = "api.login.rejected",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            message = "Rejected admin login"
        );
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let response = issue_token(admin, OffsetDateTime::now_utc()).map_err(|e| {
        tracing::error!(
            name = "api.login.token_failed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            error = %e,
            message = "Failed to sign admin token"
        );
        ApiError::server_error()
    })?;
    Ok(Json(response))
}

/// Axum extractor that only succeeds for requests carrying a valid admin token.
///
/// ```ignore
/// async fn handler(_session: AdminSession) -> impl IntoResponse { "secret" }
/// ```
pub struct AdminSession {
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiError::server_error()
            })?;

        let token = match parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
        {
            Some(header) => header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    ApiError::unauthorized("Authorization header must use Bearer scheme")
                })?,
            None => return Err(ApiError::unauthorized("Missing Authorization header")),
        };

        let claims = verify_token(&resources.config.admin, token.trim()).map_err(|e| {
            tracing::debug!(
                name = "api.auth.token_rejected",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Rejected bearer token"
            );
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if claims.sub != resources.config.admin.username {
            return Err(ApiError::unauthorized("Token subject is not the admin user"));
        }
        Ok(AdminSession {
            username: claims.sub,
        })
    }
}

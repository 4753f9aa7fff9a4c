//! Report download endpoints.

use std::path::PathBuf;

use axum::{
    Extension,
    http::header,
    response::{IntoResponse, Response},
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::api::auth::AdminSession;
use crate::error::ApiError;
use crate::export::{
    XLSX_CONTENT_TYPE, load_fleet_report, render_csv, render_pdf, render_xlsx, report_file_name,
};

/// Tag for OpenAPI documentation.
pub const EXPORT_TAG: &str = "Export";

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(export_xlsx))
        .routes(routes!(export_csv))
        .routes(routes!(export_pdf))
}

fn attachment(content_type: &'static str, file_name: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/export/xlsx",
    tag = EXPORT_TAG,
    operation_id = "Export XLSX",
    summary = "Fleet report workbook",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Excel workbook, one row per log entry",
         content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    )
)]
pub async fn export_xlsx(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Response, ApiError> {
    let reports = load_fleet_report(&resources.db).await?;
    let body = render_xlsx(&reports)?;
    Ok(attachment(
        XLSX_CONTENT_TYPE,
        report_file_name(resources.today(), "xlsx"),
        body,
    ))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/export/csv",
    tag = EXPORT_TAG,
    operation_id = "Export CSV",
    summary = "Fleet report spreadsheet",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "UTF-8 CSV, one row per log entry", content_type = "text/csv")
    )
)]
pub async fn export_csv(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Response, ApiError> {
    let reports = load_fleet_report(&resources.db).await?;
    let body = render_csv(&reports)?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        report_file_name(resources.today(), "csv"),
        body,
    ))
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/api/export/pdf",
    tag = EXPORT_TAG,
    operation_id = "Export PDF",
    summary = "Fleet report document, one page per vehicle with its photo",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "PDF report", content_type = "application/pdf")
    )
)]
pub async fn export_pdf(
    _session: AdminSession,
    Extension(resources): Extension<AppResources>,
) -> Result<Response, ApiError> {
    let reports = load_fleet_report(&resources.db).await?;
    let today = resources.today();
    let uploads_dir = PathBuf::from(&resources.config.uploads_dir);
    let body = tokio::task::spawn_blocking(move || render_pdf(&reports, today, &uploads_dir))
        .await
        .map_err(|e| {
            tracing::error!(
                name = "api.export.pdf_task_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "PDF rendering task failed"
            );
            ApiError::server_error()
        })??;
    Ok(attachment(
        "application/pdf",
        report_file_name(today, "pdf"),
        body,
    ))
}

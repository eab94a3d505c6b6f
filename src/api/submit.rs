//! Report submission endpoint.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{SubmitReportRequest, SubmitResponse};

/// Store a test session: one report per client version in the document.
///
/// The whole submission is rejected when any status is unknown.
#[utoipa::path(
    post,
    path = "/api/v1/submit",
    tag = "Reports",
    request_body = SubmitReportRequest,
    responses(
        (status = 201, description = "Reports stored", body = SubmitResponse),
        (status = 400, description = "Invalid submission", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorResponse),
        (status = 403, description = "Key may not submit reports"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn submit_report(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    if !auth.caller.can_submit() {
        return Err(AppError::Forbidden(format!(
            "Role '{}' cannot submit reports",
            auth.caller.role
        )));
    }

    let (request, raw_json) = parse_submission(&body)?;
    let submissions = request.validate().map_err(AppError::InvalidInput)?;
    let reports = pool
        .insert_submission(&request.meta, &submissions, Some(raw_json))
        .await?;

    Ok(HttpResponse::Created().json(SubmitResponse {
        success: true,
        reports,
    }))
}

/// Parse the posted document, keeping it as sent for `raw_json`.
fn parse_submission(body: &[u8]) -> AppResult<(SubmitReportRequest, JsonValue)> {
    let raw: JsonValue = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Malformed JSON body: {}", e)))?;
    let request = SubmitReportRequest::deserialize(&raw)
        .map_err(|e| AppError::InvalidInput(format!("Invalid submission: {}", e)))?;
    Ok((request, raw))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/submit").route(web::post().to(submit_report)));
}

//! Report listing endpoint.

use actix_web::{HttpResponse, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{ReportListResponse, ReportSummary, ReportsQuery};

/// List stored reports, newest first.
///
/// `tester`, `version` and `type` match exactly; empty values are ignored.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    params(ReportsQuery),
    responses(
        (status = 200, description = "Matching reports", body = ReportListResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_reports(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ReportsQuery>,
) -> AppResult<HttpResponse> {
    let reports = pool
        .list_reports(&query.filter())
        .await?
        .into_iter()
        .map(|r| ReportSummary {
            id: r.id,
            tester: r.tester,
            client_version: r.client_version,
            test_type: r.test_type,
            commit_hash: r.commit_hash,
            submitted_at: r.submitted_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ReportListResponse {
        success: true,
        reports,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/reports").route(web::get().to(list_reports)));
}

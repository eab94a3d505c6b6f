//! Test template administration.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    AssignVersionsRequest, CoverageQuery, CoverageResponse, TemplateRequest, TemplateSummary,
};
use crate::services::visibility;

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignVersionsResponse {
    pub template_id: i64,
    /// Versions now assigned to the template
    pub version_ids: Vec<String>,
}

/// List templates with their assigned client versions.
///
/// Creates the default template first when none exists.
#[utoipa::path(
    get,
    path = "/api/v1/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Templates", body = TemplateListResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_templates(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    if let Err(e) = pool.ensure_default_template().await {
        warn!("Could not create default template: {}", e);
    }

    let templates = pool.list_template_summaries().await?;
    Ok(HttpResponse::Ok().json(TemplateListResponse { templates }))
}

/// Create a template.
#[utoipa::path(
    post,
    path = "/api/v1/templates",
    tag = "Templates",
    request_body = TemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateSummary),
        (status = 400, description = "Invalid name or unknown test keys", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_template(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    body: web::Json<TemplateRequest>,
) -> AppResult<HttpResponse> {
    let template = pool.create_template(&body, &auth.caller.name).await?;
    info!("Template {} '{}' created by {}", template.id, template.name, auth.caller.name);

    Ok(HttpResponse::Created().json(TemplateSummary::from_model(template, Vec::new())))
}

/// Replace a template's name, description and test keys.
#[utoipa::path(
    put,
    path = "/api/v1/templates/{id}",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template id")
    ),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateSummary),
        (status = 400, description = "Invalid name or unknown test keys", body = crate::error::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn update_template(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<TemplateRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let template = pool.update_template(id, &body).await?;

    // Report the current assignments alongside the new contents
    let summary = pool
        .list_template_summaries()
        .await?
        .into_iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| TemplateSummary::from_model(template, Vec::new()));
    Ok(HttpResponse::Ok().json(summary))
}

/// Delete a template. System and default templates are refused.
#[utoipa::path(
    delete,
    path = "/api/v1/templates/{id}",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template id")
    ),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 400, description = "Template is protected", body = crate::error::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_template(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    pool.delete_template(id).await?;
    info!("Template {} deleted by {}", id, auth.caller.name);

    Ok(HttpResponse::NoContent().finish())
}

/// Make a template the global default.
#[utoipa::path(
    post,
    path = "/api/v1/templates/{id}/default",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template id")
    ),
    responses(
        (status = 204, description = "Default template changed"),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn set_default_template(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    pool.set_default_template(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign client versions to a template.
///
/// Versions assigned elsewhere are moved; versions no longer listed fall
/// back to the default template.
#[utoipa::path(
    put,
    path = "/api/v1/templates/{id}/versions",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template id")
    ),
    request_body = AssignVersionsRequest,
    responses(
        (status = 200, description = "Assignment replaced", body = AssignVersionsResponse),
        (status = 400, description = "Unknown client versions", body = crate::error::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn assign_versions(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<AssignVersionsRequest>,
) -> AppResult<HttpResponse> {
    let template_id = path.into_inner();
    let version_ids = pool
        .assign_template_versions(template_id, &body.version_ids)
        .await?;

    Ok(HttpResponse::Ok().json(AssignVersionsResponse {
        template_id,
        version_ids,
    }))
}

/// Which enabled tests a template covers and which already have results.
#[utoipa::path(
    get,
    path = "/api/v1/templates/{id}/coverage",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template id"),
        CoverageQuery
    ),
    responses(
        (status = 200, description = "Coverage of the template", body = CoverageResponse),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn template_coverage(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    query: web::Query<CoverageQuery>,
) -> AppResult<HttpResponse> {
    let coverage =
        visibility::template_coverage(pool.get_ref(), path.into_inner(), query.version_list())
            .await?;
    Ok(HttpResponse::Ok().json(coverage))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/templates")
            .route(web::get().to(list_templates))
            .route(web::post().to(create_template)),
    )
    .service(
        web::resource("/templates/{id}")
            .route(web::put().to(update_template))
            .route(web::delete().to(delete_template)),
    )
    .service(web::resource("/templates/{id}/default").route(web::post().to(set_default_template)))
    .service(web::resource("/templates/{id}/versions").route(web::put().to(assign_versions)))
    .service(web::resource("/templates/{id}/coverage").route(web::get().to(template_coverage)));
}

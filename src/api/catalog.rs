//! Client version and test catalog endpoints.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{AdminAuth, ApiKeyAuth};
use crate::db::DbPool;
use crate::entity::test_type;
use crate::error::{AppError, AppResult};
use crate::models::catalog::flag_enabled;
use crate::models::{
    CategoryInfo, CreateCategoryRequest, UpsertTestTypeRequest, UpsertVersionRequest, VersionInfo,
    VersionsQuery,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionListResponse {
    pub versions: Vec<VersionInfo>,
}

/// A stored test definition.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestTypeResponse {
    pub id: i64,
    pub test_key: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub is_enabled: bool,
    pub sort_order: i32,
}

impl From<test_type::Model> for TestTypeResponse {
    fn from(model: test_type::Model) -> Self {
        Self {
            id: model.id,
            test_key: model.test_key,
            name: model.name,
            description: model.description,
            category_id: model.category_id,
            is_enabled: model.is_enabled,
            sort_order: model.sort_order,
        }
    }
}

/// List client versions in display order.
#[utoipa::path(
    get,
    path = "/api/v1/versions",
    tag = "Catalog",
    params(VersionsQuery),
    responses(
        (status = 200, description = "Client versions", body = VersionListResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_versions(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    query: web::Query<VersionsQuery>,
) -> AppResult<HttpResponse> {
    let include_disabled = flag_enabled(query.all.as_deref());
    let versions = pool.list_client_versions(include_disabled).await?;

    Ok(HttpResponse::Ok().json(VersionListResponse {
        versions: versions.into_iter().map(VersionInfo::from).collect(),
    }))
}

/// Create or update a client version.
#[utoipa::path(
    post,
    path = "/api/v1/versions",
    tag = "Catalog",
    request_body = UpsertVersionRequest,
    responses(
        (status = 200, description = "Stored client version", body = VersionInfo),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn upsert_version(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    body: web::Json<UpsertVersionRequest>,
) -> AppResult<HttpResponse> {
    let version = pool.upsert_client_version(&body).await?;
    info!(
        "Client version '{}' saved by {}",
        version.version_id, auth.caller.name
    );

    Ok(HttpResponse::Ok().json(VersionInfo::from(version)))
}

/// Create a test category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Catalog",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryInfo),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_category(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = pool.create_category(&body).await?;

    Ok(HttpResponse::Created().json(CategoryInfo {
        id: Some(category.id),
        name: category.name,
        sort_order: category.sort_order,
    }))
}

/// Delete a category. Its tests are disabled and left uncategorized.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "Catalog",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_category(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !pool.delete_category(id).await? {
        return Err(AppError::NotFound(format!("Category {}", id)));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Create or update a test definition.
#[utoipa::path(
    post,
    path = "/api/v1/test-types",
    tag = "Catalog",
    request_body = UpsertTestTypeRequest,
    responses(
        (status = 200, description = "Stored test definition", body = TestTypeResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn upsert_test_type(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    body: web::Json<UpsertTestTypeRequest>,
) -> AppResult<HttpResponse> {
    let test = pool.upsert_test_type(&body).await?;
    Ok(HttpResponse::Ok().json(TestTypeResponse::from(test)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/versions")
            .route(web::get().to(list_versions))
            .route(web::post().to(upsert_version)),
    )
    .service(web::resource("/categories").route(web::post().to(create_category)))
    .service(web::resource("/categories/{id}").route(web::delete().to(delete_category)))
    .service(web::resource("/test-types").route(web::post().to(upsert_test_type)));
}

//! API Key management endpoints.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKeyCreateResponse, ApiKeyListItem, ApiKeyRole, CreateApiKeyRequest};
use crate::services::api_key;

/// Configure auth admin routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_api_key)
        .service(list_api_keys)
        .service(get_api_key)
        .service(revoke_api_key);
}

/// Response for listing API keys.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListApiKeysResponse {
    pub keys: Vec<ApiKeyListItem>,
}

/// Create a new API key.
///
/// POST /api/v1/auth/keys
/// Authorization: X-API-Key (admin role) or X-Admin-Key (bootstrap)
#[utoipa::path(
    post,
    path = "/api/v1/auth/keys",
    tag = "Auth",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKeyCreateResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid key", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/auth/keys")]
pub async fn create_api_key(
    auth: AdminAuth,
    body: web::Json<CreateApiKeyRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let role = match body.role.as_deref().map(str::trim) {
        None | Some("") => ApiKeyRole::default(),
        Some(raw) => ApiKeyRole::parse(raw)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown role '{}'", raw)))?,
    };

    let (full_key, api_key) =
        api_key::create_key(pool.get_ref(), &body.name, role, body.expires_in.as_deref()).await?;
    info!("API key {} issued by {}", api_key.key_prefix, auth.caller.name);

    Ok(HttpResponse::Created().json(ApiKeyCreateResponse {
        id: api_key.id,
        key: full_key,
        name: api_key.name,
        role: api_key.role,
        expires_at: api_key.expires_at.map(|d| d.to_rfc3339()),
        created_at: api_key.created_at.to_rfc3339(),
    }))
}

/// List all API keys.
///
/// GET /api/v1/auth/keys
#[utoipa::path(
    get,
    path = "/api/v1/auth/keys",
    tag = "Auth",
    responses(
        (status = 200, description = "List of API keys", body = ListApiKeysResponse),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/auth/keys")]
pub async fn list_api_keys(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let keys = pool.list_api_keys().await?;
    let items: Vec<ApiKeyListItem> = keys.into_iter().map(ApiKeyListItem::from).collect();

    Ok(HttpResponse::Ok().json(ListApiKeysResponse { keys: items }))
}

/// Get a single API key by ID.
#[utoipa::path(
    get,
    path = "/api/v1/auth/keys/{id}",
    tag = "Auth",
    params(
        ("id" = i64, Path, description = "API key id")
    ),
    responses(
        (status = 200, description = "API key details", body = ApiKeyListItem),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "API key not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/auth/keys/{id}")]
pub async fn get_api_key(
    _auth: AdminAuth,
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let key = pool
        .get_api_key(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("API key {}", id)))?;

    Ok(HttpResponse::Ok().json(ApiKeyListItem::from(key)))
}

/// Revoke an API key.
///
/// DELETE /api/v1/auth/keys/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/auth/keys/{id}",
    tag = "Auth",
    params(
        ("id" = i64, Path, description = "API key id")
    ),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "API key not found or already revoked", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[delete("/auth/keys/{id}")]
pub async fn revoke_api_key(
    auth: AdminAuth,
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    // A key cannot revoke itself
    if auth.caller.key_id == Some(id) {
        return Err(AppError::InvalidInput(
            "Cannot revoke the key used for this request".to_string(),
        ));
    }

    if !pool.revoke_api_key(id).await? {
        return Err(AppError::NotFound(format!("API key {}", id)));
    }
    info!("API key {} revoked by {}", id, auth.caller.name);

    Ok(HttpResponse::NoContent().finish())
}

//! Caller identity endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::ApiKeyAuth;
use crate::error::AppResult;
use crate::models::ApiKeyRole;

#[derive(Debug, Serialize, ToSchema)]
pub struct CallerInfo {
    /// Key name; the tool shows it as the tester name
    pub username: String,
    pub role: ApiKeyRole,
    pub key_prefix: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: CallerInfo,
}

/// Describe the key the request was made with.
#[utoipa::path(
    get,
    path = "/api/v1/user",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated caller", body = UserResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn current_user(auth: ApiKeyAuth) -> AppResult<HttpResponse> {
    let caller = auth.caller;
    Ok(HttpResponse::Ok().json(UserResponse {
        success: true,
        user: CallerInfo {
            username: caller.name,
            role: caller.role,
            key_prefix: caller.key_prefix,
        },
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/user").route(web::get().to(current_user)));
}

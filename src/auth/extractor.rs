//! Actix-web extractors for API key authentication.
//!
//! # Security
//! - All secret values (API keys, admin keys) are wrapped in `SecretString`
//! - Secret values are never logged or exposed in debug output
//! - Constant-time comparison is used for the bootstrap admin key

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};

use super::AdminKey;
use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::db::DbPool;
use crate::error::{AppError, ErrorResponse};
use crate::models::{ApiKeyRole, AuthenticatedCaller};
use crate::services::api_key;

/// Body sent to authenticated callers without the admin role.
pub const ADMIN_REQUIRED_MSG: &str = "Admin access required";

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized(message) => Self::unauthorized(message),
            AppError::Forbidden(message) => Self::forbidden(message),
            other => {
                tracing::error!("Authentication lookup failed: {}", other);
                Self::internal("Authentication unavailable")
            }
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        if self.status == StatusCode::FORBIDDEN {
            return HttpResponse::build(self.status)
                .content_type("text/plain; charset=utf-8")
                .body(self.message.clone());
        }

        let error = match self.status {
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            _ => "INTERNAL_ERROR",
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: error.to_string(),
            message: self.message.clone(),
        })
    }
}

/// Resolve the caller from the admin key or API key headers.
async fn authenticate(req: &HttpRequest) -> Result<AuthenticatedCaller, AuthError> {
    let pool = req
        .app_data::<web::Data<DbPool>>()
        .ok_or_else(|| AuthError::internal("Internal configuration error"))?;

    // Bootstrap admin key first
    if let Some(provided) = extract_secret_header(req, ADMIN_KEY_HEADER)
        && let Some(stored) = req.app_data::<web::Data<AdminKey>>()
        && stored.verify(provided.expose_secret())
    {
        return Ok(AuthenticatedCaller {
            key_id: None,
            name: "Admin (Bootstrap)".to_string(),
            key_prefix: "admin".to_string(),
            role: ApiKeyRole::Admin,
        });
    }

    let provided = extract_secret_header(req, API_KEY_HEADER).ok_or_else(|| {
        AuthError::unauthorized(format!("Missing API key. Provide {} header.", API_KEY_HEADER))
    })?;

    Ok(api_key::verify_key(pool.get_ref(), provided.expose_secret()).await?)
}

/// Extractor that requires a valid API key of any role.
///
/// ```ignore
/// async fn protected_handler(auth: ApiKeyAuth) -> impl Responder {
///     // auth.caller contains the authenticated caller info
/// }
/// ```
pub struct ApiKeyAuth {
    pub caller: AuthenticatedCaller,
}

impl FromRequest for ApiKeyAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let caller = authenticate(&req).await?;
            Ok(ApiKeyAuth { caller })
        })
    }
}

/// Extractor that requires an admin caller.
///
/// Missing or invalid keys are rejected with 401; valid keys without the
/// admin role get 403 with a plain-text body before the handler runs.
pub struct AdminAuth {
    pub caller: AuthenticatedCaller,
}

impl FromRequest for AdminAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let caller = authenticate(&req).await?;
            if !caller.is_admin() {
                tracing::warn!(
                    target: "auth",
                    key_prefix = %caller.key_prefix,
                    path = %req.path(),
                    "Non-admin key rejected"
                );
                return Err(AuthError::forbidden(ADMIN_REQUIRED_MSG));
            }
            Ok(AdminAuth { caller })
        })
    }
}

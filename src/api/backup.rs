//! SQL backup export and import endpoints.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use futures_util::StreamExt;
use tracing::info;

use crate::auth::AdminAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::db::backup::backup_filename;
use crate::error::{AppError, AppResult};
use crate::models::ImportSummary;
use crate::services::sql_script::ImportMode;

/// Parts collected from an import form before validation.
#[derive(Debug, Default)]
struct ImportUpload {
    filename: Option<String>,
    data: Vec<u8>,
    mode: Option<String>,
    oversized: bool,
}

impl ImportUpload {
    /// Check the upload and decode the script.
    fn validate(self, max_size: usize) -> AppResult<(String, ImportMode)> {
        let filename = self
            .filename
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

        if !filename.to_lowercase().ends_with(".sql") {
            return Err(AppError::InvalidInput(
                "Only .sql files can be imported".to_string(),
            ));
        }
        if self.oversized || self.data.len() > max_size {
            return Err(AppError::InvalidInput(format!(
                "File exceeds the {} byte import limit",
                max_size
            )));
        }
        if self.data.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
        }

        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => ImportMode::default(),
            Some(raw) => ImportMode::parse(raw).ok_or_else(|| {
                AppError::InvalidInput(format!("Unknown import mode '{}'", raw))
            })?,
        };

        let script = String::from_utf8(self.data)
            .map_err(|_| AppError::InvalidInput("File is not valid UTF-8".to_string()))?;

        Ok((script, mode))
    }
}

async fn read_upload(mut payload: Multipart, max_size: usize) -> AppResult<ImportUpload> {
    let mut upload = ImportUpload::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };

        match name.as_deref() {
            Some("file") => {
                upload.filename = filename;
                while let Some(chunk) = field.next().await {
                    let data =
                        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                    // Drain the rest of the part; validate() reports the overflow
                    if upload.data.len() + data.len() > max_size {
                        upload.oversized = true;
                        continue;
                    }
                    upload.data.extend_from_slice(&data);
                }
            }
            Some("mode") => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let data =
                        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                    value.extend_from_slice(&data);
                }
                upload.mode = Some(String::from_utf8_lossy(&value).into_owned());
            }
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                }
            }
        }
    }

    Ok(upload)
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Download the database as a SQL script.
#[utoipa::path(
    get,
    path = "/api/v1/admin/export",
    tag = "Backup",
    responses(
        (status = 200, description = "SQL dump", content_type = "application/sql", body = String),
        (status = 401, description = "Missing or invalid key", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn export_database(auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let dump = pool.export_sql().await?;
    let filename = backup_filename(Utc::now());
    info!(
        "Export of {} bytes requested by {}",
        dump.len(),
        auth.caller.name
    );

    Ok(HttpResponse::Ok()
        .content_type("application/sql")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(dump))
}

/// Replay an uploaded SQL script.
///
/// Multipart form with a `file` part and an optional `mode` part
/// (`full` or `data_only`). Failed statements are reported, not fatal.
#[utoipa::path(
    post,
    path = "/api/v1/admin/import",
    tag = "Backup",
    request_body(content_type = "multipart/form-data", description = "SQL file and import mode"),
    responses(
        (status = 200, description = "Import summary as HTML, or JSON when requested", body = ImportSummary),
        (status = 400, description = "Invalid upload", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid key", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required"),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn import_database(
    auth: AdminAuth,
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_upload(payload, config.max_import_size).await?;
    let (script, mode) = upload.validate(config.max_import_size)?;

    info!(
        "Import ({}) of {} bytes started by {}",
        mode,
        script.len(),
        auth.caller.name
    );
    let report = pool.import_sql(&script, mode).await?;
    let summary = report.summary(mode, config.import_error_limit);

    if wants_json(&req) {
        return Ok(HttpResponse::Ok().json(summary));
    }
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(summary.flash_html()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/export").route(web::get().to(export_database)))
        .service(web::resource("/admin/import").route(web::post().to(import_database)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: Option<&str>, data: &[u8], mode: Option<&str>) -> ImportUpload {
        ImportUpload {
            filename: filename.map(str::to_string),
            data: data.to_vec(),
            mode: mode.map(str::to_string),
            oversized: false,
        }
    }

    fn rejected(upload: ImportUpload) -> String {
        match upload.validate(1024) {
            Err(AppError::InvalidInput(message)) => message,
            other => panic!("expected invalid input, got {:?}", other.map(|(_, m)| m)),
        }
    }

    #[test]
    fn test_valid_upload_defaults_to_full() {
        let (script, mode) = upload(Some("dump.SQL"), b"SELECT 1;", None)
            .validate(1024)
            .unwrap();
        assert_eq!(script, "SELECT 1;");
        assert_eq!(mode, ImportMode::Full);
    }

    #[test]
    fn test_data_only_mode() {
        let (_, mode) = upload(Some("dump.sql"), b"SELECT 1;", Some("data_only"))
            .validate(1024)
            .unwrap();
        assert_eq!(mode, ImportMode::DataOnly);
    }

    #[test]
    fn test_rejections() {
        assert!(rejected(upload(None, b"SELECT 1;", None)).contains("No file"));
        assert!(rejected(upload(Some("dump.txt"), b"SELECT 1;", None)).contains(".sql"));
        assert!(rejected(upload(Some("dump.sql"), b" \n\t", None)).contains("empty"));
        assert!(rejected(upload(Some("dump.sql"), &[0xff, 0xfe, b';'], None)).contains("UTF-8"));
        assert!(rejected(upload(Some("dump.sql"), b"SELECT 1;", Some("merge"))).contains("merge"));
        assert!(rejected(upload(Some("dump.sql"), &vec![b'x'; 2048], None)).contains("limit"));
    }

    #[test]
    fn test_oversized_flag_rejects() {
        let mut big = upload(Some("dump.sql"), b"SELECT 1;", None);
        big.oversized = true;
        assert!(rejected(big).contains("limit"));
    }
}

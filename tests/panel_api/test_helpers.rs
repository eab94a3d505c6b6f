//! Shared helpers for the panel API tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use actix_web::{App, dev::ServiceResponse, test, web};
use chrono::Utc;
use sea_orm::{DatabaseConnection, DbBackend, MockDatabase, Value};
use test_panel_lib::auth::AdminKey;
use test_panel_lib::config::{Config, DatabaseSettings, Environment};
use test_panel_lib::db::DbPool;
use test_panel_lib::entity::api_key;
use test_panel_lib::services::visibility::VersionMatchPolicy;

/// Admin key used in tests.
pub const TEST_ADMIN_KEY: &str = "test-admin-key-for-panel-api";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "panelboundary";

pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseSettings {
            url: "mysql://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        admin_key: Some(TEST_ADMIN_KEY.to_string()),
        backup_dir: PathBuf::from("./unused"),
        max_import_size: 1024,
        import_error_limit: 20,
        version_match: VersionMatchPolicy::Exact,
    }
}

/// Mock connection that answers nothing; for requests rejected before any query.
pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DbBackend::MySql).into_connection()
}

/// Mock connection whose first query returns one API key with `role`.
pub fn db_with_key(role: &str) -> MockDatabase {
    MockDatabase::new(DbBackend::MySql).append_query_results([vec![api_key::Model {
        id: 7,
        key_hash: "0".repeat(64),
        key_prefix: "tp_abcde".to_string(),
        name: format!("{} key", role),
        role: role.to_string(),
        expires_at: None,
        created_at: Utc::now(),
        deleted_at: None,
    }]])
}

/// Raw row for statements read without an entity.
pub fn raw_row(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, Value> {
    pairs
        .iter()
        .map(|(column, value)| (*column, Value::from(value.to_string())))
        .collect()
}

/// Create a test app with every `/api/v1` route.
pub async fn create_test_app(
    conn: DatabaseConnection,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    create_test_app_with_config(conn, test_config()).await
}

/// Same as [`create_test_app`] with a custom config.
pub async fn create_test_app_with_config(
    conn: DatabaseConnection,
    config: Config,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(DbPool::from_connection(conn)))
            .app_data(web::Data::new(AdminKey::new(Some(TEST_ADMIN_KEY.to_string()))))
            .app_data(web::Data::new(config))
            .service(web::scope("/api/v1").configure(test_panel_lib::api::configure_api)),
    )
    .await
}

/// Build a multipart form body from `(name, filename, content)` parts.
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

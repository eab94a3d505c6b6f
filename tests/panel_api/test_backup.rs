//! Export and import endpoints.

use actix_web::test;
use sea_orm::{DbBackend, DbErr, MockDatabase, MockExecResult};
use serde_json::Value;

use super::test_helpers::*;

async fn import_status(parts: &[(&str, Option<&str>, &[u8])]) -> (u16, Value) {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/import")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .insert_header(("content-type", multipart_content_type()))
        .set_payload(multipart_body(parts))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_rt::test]
async fn test_import_without_file_is_400() {
    let (status, body) = import_status(&[("mode", None, b"full")]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_import_rejects_wrong_extension() {
    let (status, body) = import_status(&[("file", Some("dump.txt"), b"SELECT 1;")]).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap_or_default().contains(".sql"));
}

#[actix_rt::test]
async fn test_import_rejects_empty_file() {
    let (status, _) = import_status(&[("file", Some("dump.sql"), b"")]).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_import_rejects_unknown_mode() {
    let (status, body) = import_status(&[
        ("file", Some("dump.sql"), b"SELECT 1;"),
        ("mode", None, b"merge"),
    ])
    .await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap_or_default().contains("merge"));
}

#[actix_rt::test]
async fn test_import_rejects_oversized_file() {
    let big = vec![b'x'; 4096];
    let (status, body) = import_status(&[("file", Some("dump.sql"), &big)]).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap_or_default().contains("limit"));
}

#[actix_rt::test]
async fn test_data_only_import_reports_json_summary() {
    let db = MockDatabase::new(DbBackend::MySql).append_exec_results([
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        },
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        },
    ]);
    let app = create_test_app(db.into_connection()).await;

    let script = b"-- dump\nCREATE TABLE t (id INT);\nINSERT INTO t VALUES (1);\n";
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/import")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .insert_header(("accept", "application/json"))
        .insert_header(("content-type", multipart_content_type()))
        .set_payload(multipart_body(&[
            ("file", Some("backup.sql"), script),
            ("mode", None, b"data_only"),
        ]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["mode"], "data_only");
    assert_eq!(body["executed"], 1);
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["error_count"], 0);
}

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn import_request(script: &[u8]) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/v1/admin/import")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .insert_header(("accept", "application/json"))
        .insert_header(("content-type", multipart_content_type()))
        .set_payload(multipart_body(&[
            ("file", Some("backup.sql"), script),
            ("mode", None, b"full"),
        ]))
        .to_request()
}

#[actix_rt::test]
async fn test_failed_statement_does_not_stop_import() {
    let db = MockDatabase::new(DbBackend::MySql)
        .append_exec_results([exec_ok()])
        .append_exec_errors([DbErr::Custom(
            "Table 'panel.missing' doesn't exist".to_string(),
        )])
        .append_exec_results([exec_ok(), exec_ok()]);
    let app = create_test_app(db.into_connection()).await;

    let script: &[u8] =
        b"INSERT INTO reports VALUES (1);\nINSERT INTO missing VALUES (2);\nINSERT INTO test_results VALUES (3);\n";
    let resp = test::call_service(&app, import_request(script)).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["executed"], 2);
    assert_eq!(body["error_count"], 1);

    let failure = &body["errors"][0];
    assert!(
        failure["statement"]
            .as_str()
            .unwrap_or_default()
            .starts_with("INSERT INTO missing")
    );
    assert!(
        failure["error"]
            .as_str()
            .unwrap_or_default()
            .contains("Table 'panel.missing' doesn't exist")
    );
}

#[actix_rt::test]
async fn test_reported_failures_capped_at_limit() {
    let db = MockDatabase::new(DbBackend::MySql)
        .append_exec_errors([
            DbErr::Custom("first".to_string()),
            DbErr::Custom("second".to_string()),
            DbErr::Custom("third".to_string()),
        ])
        .append_exec_results([exec_ok()]);
    let mut config = test_config();
    config.import_error_limit = 2;
    let app = create_test_app_with_config(db.into_connection(), config).await;

    let script: &[u8] = b"DELETE FROM a;\nDELETE FROM b;\nDELETE FROM c;\n";
    let resp = test::call_service(&app, import_request(script)).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["executed"], 0);
    assert_eq!(body["error_count"], 3);
    let errors = body["errors"].as_array().cloned().unwrap_or_default();
    assert_eq!(errors.len(), 2);
    assert!(errors[1]["error"].as_str().unwrap_or_default().contains("second"));
}

#[actix_rt::test]
async fn test_export_returns_sql_attachment() {
    let mut db = MockDatabase::new(DbBackend::MySql);
    for table in test_panel_lib::db::backup::EXPORT_TABLES {
        let create = format!("CREATE TABLE `{}` (`id` bigint NOT NULL)", table);
        db = db.append_query_results([
            vec![raw_row(&[("Table", table), ("Create Table", create.as_str())])],
            vec![raw_row(&[("column_name", "id")])],
            vec![],
        ]);
    }
    let app = create_test_app(db.into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/export")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    assert_eq!(header("content-type"), "application/sql");
    let disposition = header("content-disposition");
    assert!(disposition.starts_with("attachment; filename=\"test_panel_backup_"));
    assert!(disposition.ends_with(".sql\""));

    let body = test::read_body(resp).await;
    let dump = String::from_utf8_lossy(&body);
    assert!(dump.contains("CREATE TABLE `test_results`"));
    assert!(dump.contains("CREATE TABLE `test_categories`"));
}

//! Authentication and role checks on admin routes.

use actix_web::test;
use serde_json::Value;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_needs_no_key() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_export_without_key_is_401_json() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/export")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_wrong_admin_key_falls_through_to_401() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/templates")
        .insert_header(("X-Admin-Key", "not-the-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_tester_key_on_export_is_403_plain_text() {
    let app = create_test_app(db_with_key("tester").into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/export")
        .insert_header(("X-API-Key", "tp_someTesterKey"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "got {}", content_type);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Admin access required");
}

#[actix_rt::test]
async fn test_tester_key_on_import_is_403_before_upload_checks() {
    let app = create_test_app(db_with_key("tester").into_connection()).await;

    // Invalid upload; the role check must answer first
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/import")
        .insert_header(("X-API-Key", "tp_someTesterKey"))
        .insert_header(("content-type", multipart_content_type()))
        .set_payload(multipart_body(&[("file", Some("notes.txt"), b"hello")]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
async fn test_viewer_key_cannot_manage_keys() {
    let app = create_test_app(db_with_key("viewer").into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/keys")
        .insert_header(("X-API-Key", "tp_someViewerKey"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

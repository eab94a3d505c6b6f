//! Report listing and caller identity.

use actix_web::test;
use chrono::{TimeZone, Utc};
use sea_orm::{DbBackend, MockDatabase};
use serde_json::Value;
use test_panel_lib::entity::report;

use super::test_helpers::*;

fn stored_report(id: i64, client_version: &str) -> report::Model {
    report::Model {
        id,
        tester: "amy".to_string(),
        client_version: client_version.to_string(),
        test_type: "WAN".to_string(),
        commit_hash: Some("abc123".to_string()),
        raw_json: None,
        submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[actix_rt::test]
async fn test_reports_listing_returns_newest_rows() {
    let db = MockDatabase::new(DbBackend::MySql)
        .append_query_results([vec![stored_report(42, "2004.1"), stored_report(17, "2004.1")]]);
    let app = create_test_app(db.into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/reports?tester=amy&version=2004.1&type=WAN&limit=2")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reports"][0]["id"], 42);
    assert_eq!(body["reports"][0]["client_version"], "2004.1");
    assert_eq!(body["reports"][0]["commit_hash"], "abc123");
    assert!(body["reports"][0].get("raw_json").is_none());
    assert_eq!(body["reports"].as_array().map(Vec::len), Some(2));
}

#[actix_rt::test]
async fn test_reports_listing_open_to_viewers() {
    let db = db_with_key("viewer").append_query_results([Vec::<report::Model>::new()]);
    let app = create_test_app(db.into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/reports")
        .insert_header(("X-API-Key", "tp_someViewerKey"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["reports"], Value::Array(Vec::new()));
}

#[actix_rt::test]
async fn test_reports_listing_requires_key() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get().uri("/api/v1/reports").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_user_describes_calling_key() {
    let app = create_test_app(db_with_key("tester").into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/user")
        .insert_header(("X-API-Key", "tp_someTesterKey"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "tester key");
    assert_eq!(body["user"]["role"], "tester");
    assert_eq!(body["user"]["key_prefix"], "tp_abcde");
}

#[actix_rt::test]
async fn test_user_without_key_is_401() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get().uri("/api/v1/user").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

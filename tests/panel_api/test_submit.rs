//! Report submission.

use actix_web::test;
use serde_json::{Value, json};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_viewer_cannot_submit() {
    let app = create_test_app(db_with_key("viewer").into_connection()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/submit")
        .insert_header(("X-API-Key", "tp_someViewerKey"))
        .set_json(json!({"results": {"2004.1": {"1": {"status": "Working"}}}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
async fn test_unknown_status_rejects_submission() {
    let app = create_test_app(db_with_key("tester").into_connection()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/submit")
        .insert_header(("X-API-Key", "tp_someTesterKey"))
        .set_json(json!({
            "meta": {"tester": "amy", "WAN": true},
            "results": {"2004.1": {"1": {"status": "Working"}, "2": {"status": "Exploded"}}}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
    assert!(body["message"].as_str().unwrap_or_default().contains("Exploded"));
}

#[actix_rt::test]
async fn test_malformed_submission_is_400() {
    let app = create_test_app(db_with_key("tester").into_connection()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/submit")
        .insert_header(("X-API-Key", "tp_someTesterKey"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"results\": {\"2004.1\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
}

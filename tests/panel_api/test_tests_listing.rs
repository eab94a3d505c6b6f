//! Tests listing for client versions.

use actix_web::test;
use chrono::Utc;
use std::collections::BTreeMap;

use sea_orm::{DbBackend, DbErr, MockDatabase};
use serde_json::{Value, json};
use test_panel_lib::entity::{client_version, template_version, test_category, test_template, test_type};
use test_panel_lib::models::catalog::FALLBACK_TESTS;
use test_panel_lib::services::visibility::VersionMatchPolicy;

use super::test_helpers::*;

fn test_type(key: &str, category_id: Option<i64>, sort_order: i32) -> test_type::Model {
    test_type::Model {
        id: 0,
        test_key: key.to_string(),
        name: format!("Test {}", key),
        description: None,
        category_id,
        is_enabled: true,
        sort_order,
    }
}

fn template(id: i64, keys: Value, is_default: bool) -> test_template::Model {
    test_template::Model {
        id,
        name: format!("Template {}", id),
        description: None,
        test_keys: keys,
        is_default,
        is_system: false,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Mock answering the catalog, version, template and assignment queries in order.
fn catalog_db() -> MockDatabase {
    MockDatabase::new(DbBackend::MySql)
        .append_query_results([vec![
            test_category::Model {
                id: 1,
                name: "Launch".to_string(),
                sort_order: 0,
            },
            test_category::Model {
                id: 2,
                name: "Accounts".to_string(),
                sort_order: 1,
            },
        ]])
        .append_query_results([vec![
            test_type("1", Some(1), 0),
            test_type("2", Some(1), 1),
            test_type("3", Some(2), 0),
            test_type("9", None, 0),
        ]])
        .append_query_results([vec![client_version::Model {
            id: 10,
            version_id: "2004.1".to_string(),
            display_name: None,
            sort_order: 0,
            is_enabled: true,
            skip_tests: Some(json!(["2"])),
        }]])
        .append_query_results([vec![
            template(1, json!(["1", "2", "3", "9"]), true),
            template(2, json!(["3", "9"]), false),
        ]])
        .append_query_results([vec![template_version::Model {
            template_id: 2,
            client_version_id: 10,
        }]])
}

fn keys(body: &Value) -> Vec<String> {
    body["tests"]
        .as_array()
        .map(|tests| {
            tests
                .iter()
                .filter_map(|t| t["test_key"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[actix_rt::test]
async fn test_listing_requires_key() {
    let app = create_test_app(empty_db()).await;

    let req = test::TestRequest::get().uri("/api/v1/tests").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_assigned_template_filters_tests() {
    let app = create_test_app(catalog_db().into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/tests?client_version=2004.1")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(keys(&body), vec!["3", "9"]);
    assert_eq!(body["template"]["id"], 2);
    assert_eq!(body["template"]["source"], "assigned");
    assert_eq!(body["skip_tests"], json!(["2"]));
    assert_eq!(body["categories"][0]["name"], "Accounts");
    assert_eq!(body["categories"][1]["name"], "Uncategorized");
    assert!(body["grouped"]["Launch"].is_null());
}

#[actix_rt::test]
async fn test_unknown_version_uses_default_template() {
    let app = create_test_app(catalog_db().into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/tests?client_version=1999.9")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(keys(&body), vec!["1", "2", "3", "9"]);
    assert_eq!(body["template"]["source"], "default");
    assert!(body["client_version"].is_null());
    assert_eq!(body["skip_tests"], json!([]));
}

#[actix_rt::test]
async fn test_missing_catalog_serves_builtin_list() {
    let db = MockDatabase::new(DbBackend::MySql).append_query_errors([DbErr::Custom(
        "error returned from database: 1146 (42S02): Table 'panel.test_categories' doesn't exist"
            .to_string(),
    )]);
    let app = create_test_app(db.into_connection()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/tests")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(keys(&body).len(), FALLBACK_TESTS.len());
    assert!(body["template"].is_null());
    assert_eq!(body["categories"][0]["name"], "Uncategorized");
}

#[actix_rt::test]
async fn test_tested_counts_follow_prefix_match() {
    let counts = BTreeMap::from([
        ("test_key", sea_orm::Value::from("3".to_string())),
        ("result_count", sea_orm::Value::from(2i64)),
        ("report_count", sea_orm::Value::from(1i64)),
    ]);
    let db = MockDatabase::new(DbBackend::MySql)
        .append_query_results([vec![test_category::Model {
            id: 2,
            name: "Accounts".to_string(),
            sort_order: 1,
        }]])
        .append_query_results([vec![test_type("3", Some(2), 0), test_type("4", Some(2), 1)]])
        .append_query_results([vec![client_version::Model {
            id: 10,
            version_id: "2004.1".to_string(),
            display_name: None,
            sort_order: 0,
            is_enabled: true,
            skip_tests: None,
        }]])
        .append_query_results([vec![counts]])
        .append_query_results([Vec::<test_template::Model>::new()])
        .append_query_results([Vec::<template_version::Model>::new()]);

    let mut config = test_config();
    config.version_match = VersionMatchPolicy::Prefix;
    let app = create_test_app_with_config(db.into_connection(), config).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/tests?client_version=2004.1-beta&include_tested=1")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["client_version"], "2004.1");
    assert_eq!(body["tests"][0]["test_key"], "3");
    assert_eq!(body["tests"][0]["tested"], true);
    assert_eq!(body["tests"][0]["result_count"], 2);
    assert_eq!(body["tests"][1]["tested"], false);
}

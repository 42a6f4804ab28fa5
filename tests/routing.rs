//! Integration tests for the API root, health check and general routing.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, get, send};

#[tokio::test]
async fn api_root_lists_collections() {
    let app = build_test_app().await;
    let response = get(&app, "/api/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["departments"], "/api/departments/");
    assert_eq!(json["employees"], "/api/employees/");
    assert_eq!(json["projects"], "/api/projects/");
}

#[tokio::test]
async fn health_reports_database() {
    let app = build_test_app().await;
    let response = get(&app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], true);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404_body() {
    let app = build_test_app().await;
    let response = get(&app, "/api/buildings/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Not Found");
}

#[tokio::test]
async fn unsupported_verb_is_rejected() {
    let app = build_test_app().await;
    let response = send(&app, Method::DELETE, "/api/departments/", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let app = build_test_app().await;
    for uri in ["/api/departments/abc/", "/api/employees/1.5/", "/api/projects/-/"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn empty_collections_list_as_empty_arrays() {
    let app = build_test_app().await;
    for uri in ["/api/departments/", "/api/employees/", "/api/projects/"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }
}

//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use orgdesk::config::DatabaseConfig;
use orgdesk::{db, routes, AppState, Config};

/// Build the full router over a fresh in-memory SQLite database.
pub async fn build_test_app() -> Router {
    let db = db::init_database(&DatabaseConfig::sqlite_memory())
        .await
        .expect("in-memory database");
    routes::create_router(AppState::new(db, Config::default()))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST and return the created record's id field.
pub async fn create(app: &Router, uri: &str, body: Value, id_field: &str) -> i64 {
    let response = post(app, uri, body).await;
    assert_eq!(response.status(), 201, "create at {} failed", uri);
    body_json(response).await[id_field].as_i64().unwrap()
}

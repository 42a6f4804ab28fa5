use axum::{
    http::{header, HeaderMap},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AppError, AppResult};
use crate::handlers::{department, employee, project};
use crate::state::AppState;

pub mod health;

/// Collection endpoints listed at the API root
#[derive(Debug, Serialize)]
pub struct ApiRoot {
    pub departments: String,
    pub employees: String,
    pub projects: String,
}

impl ApiRoot {
    fn with_base(base: &str) -> Self {
        Self {
            departments: format!("{}/api/departments/", base),
            employees: format!("{}/api/employees/", base),
            projects: format!("{}/api/projects/", base),
        }
    }
}

/// GET /api/
///
/// Absolute URLs when the request names its host, paths otherwise.
pub async fn api_root(headers: HeaderMap) -> Json<ApiRoot> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    let base = match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            format!("{}://{}", scheme, host)
        }
        None => String::new(),
    };

    Json(ApiRoot::with_base(&base))
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API root
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/health", get(health::health_check))
        // Department routes
        .route(
            "/api/departments/",
            get(department::list_departments).post(department::create_department),
        )
        .route(
            "/api/departments/:id/",
            get(department::get_department)
                .put(department::update_department)
                .patch(department::partial_update_department)
                .delete(department::delete_department),
        )
        .route(
            "/api/departments/:id/employees/",
            get(department::list_department_employees),
        )
        .route(
            "/api/departments/:id/projects/",
            get(department::list_department_projects),
        )
        // Employee routes
        .route(
            "/api/employees/",
            get(employee::list_employees).post(employee::create_employee),
        )
        .route(
            "/api/employees/:id/",
            get(employee::get_employee)
                .put(employee::update_employee)
                .patch(employee::partial_update_employee)
                .delete(employee::delete_employee),
        )
        .route(
            "/api/employees/:id/projects/",
            get(employee::list_employee_projects),
        )
        // Project routes
        .route(
            "/api/projects/",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/api/projects/:id/",
            get(project::get_project)
                .put(project::update_project)
                .patch(project::partial_update_project)
                .delete(project::delete_project),
        )
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> AppResult<()> {
    Err(AppError::NotFound("No route matches the given path".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_api_root_relative_without_host() {
        let Json(root) = api_root(HeaderMap::new()).await;
        assert_eq!(root.departments, "/api/departments/");
        assert_eq!(root.employees, "/api/employees/");
        assert_eq!(root.projects, "/api/projects/");
    }

    #[tokio::test]
    async fn test_api_root_absolute_with_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("records.local:8000"));
        let Json(root) = api_root(headers.clone()).await;
        assert_eq!(root.departments, "http://records.local:8000/api/departments/");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let Json(root) = api_root(headers).await;
        assert_eq!(root.projects, "https://records.local:8000/api/projects/");
    }
}

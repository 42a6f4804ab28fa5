use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name -> messages, reported together for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details, fields) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg), None),
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "Validation Error", None, Some(errors))
            }
            AppError::ReferentialIntegrity(msg) => {
                tracing::warn!("Referential integrity violation: {}", msg);
                (StatusCode::CONFLICT, "Referential Integrity Error", Some(msg), None)
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database Error", None, None)
            }
            AppError::Json(err) => {
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(err.to_string()), None)
            }
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            message: message.to_string(),
            details,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Foreign-key violations reported by the driver are surfaced as conflicts
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::ReferentialIntegrity(msg),
            _ => AppError::Database(err),
        }
    }
}

/// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting Option to AppError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = AppError::NotFound("Department 7 not found".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let mut errors = FieldErrors::new();
        errors.add("dept_name", "This field is required.");
        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_referential_integrity_is_conflict() {
        let response =
            AppError::ReferentialIntegrity("FOREIGN KEY constraint failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_plain_db_error_is_internal() {
        let err: AppError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_fk_violation_is_conflict() {
        use crate::config::DatabaseConfig;
        use crate::entity::employee;
        use sea_orm::{ActiveModelTrait, Set};

        let db = crate::db::init_database(&DatabaseConfig::sqlite_memory())
            .await
            .unwrap();
        let err = employee::ActiveModel {
            dept_id: Set(999),
            emp_name: Set("Alice".to_string()),
            emp_age: Set(30),
            emp_sex: Set("F".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err();

        let err = AppError::from(err);
        assert!(matches!(err, AppError::ReferentialIntegrity(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_field_errors_collect() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.add("emp_age", "A valid integer is required.");
        errors.add("emp_age", "second");
        errors.add("dept_id", "This field is required.");
        assert_eq!(errors.get("emp_age").map(|m| m.len()), Some(2));
        assert_eq!(errors.to_string(), "invalid fields: dept_id, emp_age");
        assert!(matches!(errors.into_result(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_not_found("Item not found");
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

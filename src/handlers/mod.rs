//! Request handlers module
//!
//! One module per resource; each maps the REST verbs onto its table.

use sea_orm::DbErr;

use crate::error::AppError;

pub mod department;
pub mod employee;
pub mod project;

/// Parse an id taken from the URL path. Anything that is not a valid key
/// simply matches no row.
pub(crate) fn parse_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

/// An update that touched no row means the row was deleted after lookup
pub(crate) fn not_updated_as_not_found(err: DbErr, msg: String) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::NotFound(msg),
        other => other.into(),
    }
}

//! Orgdesk - department, employee and project records over HTTP
//!
//! A JSON REST API over three related tables. Deleting a department removes
//! its employees and projects; deleting an employee removes their projects.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod serializer;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;

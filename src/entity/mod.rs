//! Entity module - SeaORM entity definitions
//!
//! One module per table. Foreign keys cascade on delete at the database level.

pub mod department;
pub mod employee;
pub mod project;

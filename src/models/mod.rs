//! Core data models for the task board service.
//!
//! These entities map cleanly to database tables via `sqlx::FromRow` and
//! serialize as JSON via `serde`. Relations are plain id columns; derived
//! fields (`tasks`, `count`, `created_by`, ...) are skipped by `sqlx` and filled
//! in by the services.

pub mod bucket;
pub mod import;
pub mod label;
pub mod project;
pub mod task;
pub mod user;

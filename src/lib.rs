//! Task board backend: projects, Kanban buckets and fractionally ordered tasks.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;

/// The complete application router with its state attached.
pub fn app(state: state::AppState) -> Router {
    routes::routes::routes().with_state(state)
}

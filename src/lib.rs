//! Petalworks Storefront API Library
//!
//! Cart aggregation, product catalog, and order ingestion for the
//! Petalworks flower shop. Order creation writes through a durable store
//! when reachable and an in-memory fallback list otherwise.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cart;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    /// `None` when the durable store was unreachable at startup; the service
    /// keeps running on mock catalog data and in-memory order capture.
    pub db: Option<Arc<DatabaseConnection>>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/products", handlers::products::products_routes())
        .nest("/orders", handlers::orders::orders_routes())
}

/// The full application router, without middleware layers. `main` stacks
/// tracing/compression/CORS on top; tests drive this directly.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "petalworks-api up" }))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}

//! Bookstore API Server
//!
//! A Rust REST JSON API for an online bookstore. Every failing request is
//! normalized to a single error shape: payload validation failures are
//! rejected before handlers run, and database errors are translated to HTTP
//! statuses through a static mapping table.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

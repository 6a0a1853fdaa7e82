//! Biblion Lending Library Server
//!
//! A Rust back end for a small lending library, exposing the inventory
//! ledger, member registry and staff authentication over an HTTP/JSON RPC
//! surface for front-end clients.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

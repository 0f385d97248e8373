//! # Detection Service
//!
//! The HTTP side of the system: configuration, request metrics and the axum
//! routes serving the detection API.

pub mod config;
pub mod metrics;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{router, AppState};

//! Email sign-up intake.
//!
//! Accepts `POST /api/subscribe` with a JSON or form body carrying an `email`, normalizes and
//! validates the address and records one subscriber entry per address in a key-value store.

pub mod app;
pub mod config;
mod error;
pub mod model;
pub mod store;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;

use tracing_subscriber::EnvFilter;

/// Compact human readable logs for local development.
/// `RUST_LOG` takes precedence over the default filter.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("signup_intake=debug,tower_http=debug")),
        )
        .compact()
        .init();
}

/// JSON logs for production.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();
}

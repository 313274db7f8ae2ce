//! compose-middleware - HTTP remote control for docker-compose services
//!
//! Exposes `pull`, `up`, `ps` and `logs` for the services declared in a
//! compose file. Each request is checked against the declared service names
//! and then runs exactly one docker-compose command:
//!
//! - Service registry loaded once from the compose file
//! - Verb to argument mapping and command dispatch
//! - A small HTTP daemon returning `{output, error}` JSON

pub mod compose;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod error;

pub use error::{MiddlewareError, Result};

/// Service name reported in logs and `/version`
pub const SERVICE_NAME: &str = "compose-middleware";

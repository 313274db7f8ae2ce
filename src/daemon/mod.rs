//! HTTP daemon
//!
//! Listens on a TCP port and exposes `PUT /{pull,up,ps,logs}/{name}`,
//! answering each request with the output of one docker-compose run.

mod api;
mod server;

pub use api::{ApiHandler, ApiResponse, CommandResponse};
pub use server::MiddlewareDaemon;

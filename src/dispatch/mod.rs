//! Command dispatch
//!
//! Translates a validated (verb, service) pair into one docker-compose
//! invocation and a structured result.

pub mod dispatcher;
pub mod runner;
pub mod verb;

pub use dispatcher::{CommandResult, Dispatcher};
pub use runner::{CommandOutput, CommandRunner, ComposeCli, DEFAULT_COMPOSE_BIN};
pub use verb::{CommandRequest, Verb};

//! Service validation and command dispatch

use super::runner::CommandRunner;
use super::verb::CommandRequest;
use crate::compose::ServiceRegistry;
use crate::error::{MiddlewareError, Result, NO_SUCH_SERVICE};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a dispatched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Raw combined stdout/stderr
    pub output: String,
    pub succeeded: bool,
    pub error_message: Option<String>,
    /// Whether an external process was started at all
    pub executed: bool,
}

impl CommandResult {
    fn success(output: String) -> Self {
        Self {
            output,
            succeeded: true,
            error_message: None,
            executed: true,
        }
    }

    fn failure(output: String, message: String) -> Self {
        Self {
            output,
            succeeded: false,
            error_message: Some(message),
            executed: true,
        }
    }

    fn no_such_service() -> Self {
        Self {
            output: String::new(),
            succeeded: false,
            error_message: Some(NO_SUCH_SERVICE.to_string()),
            executed: false,
        }
    }

    /// True when the request named an undeclared service
    pub fn is_unknown_service(&self) -> bool {
        !self.executed && !self.succeeded
    }
}

/// Validates requests against the registry and runs the mapped command
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    runner: Arc<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ServiceRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { registry, runner }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Fail with `UnknownService` unless the request names a declared service
    pub fn check(&self, request: &CommandRequest) -> Result<()> {
        if self.registry.contains(&request.service) {
            Ok(())
        } else {
            Err(MiddlewareError::UnknownService(request.service.clone()))
        }
    }

    /// Validate and execute a request, blocking until the command exits
    pub fn dispatch(&self, request: &CommandRequest) -> CommandResult {
        if let Err(e) = self.check(request) {
            warn!("{}", e);
            return CommandResult::no_such_service();
        }

        let args = request.args();
        let command = format!("{} {}", self.runner.program(), args.join(" "));
        info!("Running {}", command);

        match self.runner.run(&args) {
            Ok(output) if output.success => CommandResult::success(output.combined()),
            Ok(output) => {
                let err = MiddlewareError::CommandFailed {
                    command,
                    reason: output.status_text(),
                };
                warn!("{}", err);
                CommandResult::failure(output.combined(), err.to_string())
            }
            Err(source) => {
                let err = MiddlewareError::CommandSpawn { command, source };
                warn!("{}", err);
                CommandResult::failure(String::new(), err.to_string())
            }
        }
    }
}

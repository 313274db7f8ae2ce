//! REST API handler
//!
//! Routes a parsed request to the dispatcher and renders the JSON body.

use crate::config::StatusPolicy;
use crate::dispatch::{CommandRequest, CommandResult, Dispatcher, Verb};
use crate::error::MiddlewareError;
use crate::SERVICE_NAME;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of every command response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub output: String,
    pub error: Option<String>,
}

/// Version info response
#[derive(Debug, Clone, Serialize)]
struct VersionResponse {
    service: String,
    version: String,
}

/// Service list response
#[derive(Debug, Clone, Serialize)]
struct ServicesResponse {
    services: Vec<String>,
}

/// Status and body to write back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::text(500, &MiddlewareError::from(e).to_string()),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    /// JSON error body in the same shape as command responses
    pub fn error(status: u16, message: &str) -> Self {
        let body = CommandResponse {
            output: String::new(),
            error: Some(message.to_string()),
        };
        Self::json(status, &body)
    }
}

/// API Handler for processing requests
#[derive(Clone)]
pub struct ApiHandler {
    dispatcher: Dispatcher,
    policy: StatusPolicy,
}

impl ApiHandler {
    pub fn new(dispatcher: Dispatcher, policy: StatusPolicy) -> Self {
        Self { dispatcher, policy }
    }

    /// Handle an incoming API request
    ///
    /// Command routes block until docker-compose exits.
    pub fn handle_request(&self, method: &str, path: &str) -> ApiResponse {
        debug!("API request: {} {}", method, path);

        let path = path.split('?').next().unwrap_or_default();
        let path_parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (method, path_parts.as_slice()) {
            ("GET", ["_ping"]) => ApiResponse::text(200, "OK"),
            ("GET", ["version"]) => self.get_version(),
            ("GET", ["services"]) => self.list_services(),

            (method, [verb, name]) if !name.is_empty() => match verb.parse::<Verb>() {
                Ok(verb) if method == "PUT" => self.run_command(verb, name),
                Ok(_) => ApiResponse::error(405, &format!("Method {} not allowed", method)),
                Err(_) => Self::not_found(method, path),
            },

            _ => Self::not_found(method, path),
        }
    }

    fn not_found(method: &str, path: &str) -> ApiResponse {
        ApiResponse::error(404, &format!("Unknown endpoint: {} {}", method, path))
    }

    fn run_command(&self, verb: Verb, name: &str) -> ApiResponse {
        let result = self.dispatcher.dispatch(&CommandRequest::new(verb, name));
        let status = self.status_for(&result);

        let body = CommandResponse {
            output: result.output,
            error: result.error_message,
        };
        ApiResponse::json(status, &body)
    }

    /// HTTP status for a dispatch outcome under the configured policy
    pub fn status_for(&self, result: &CommandResult) -> u16 {
        match (self.policy, result.succeeded, result.is_unknown_service()) {
            (_, true, _) => 200,
            (StatusPolicy::Strict, false, true) => 404,
            (StatusPolicy::Strict, false, false) => 502,
            (StatusPolicy::Legacy, false, true) => 200,
            (StatusPolicy::Legacy, false, false) => 500,
        }
    }

    fn get_version(&self) -> ApiResponse {
        let response = VersionResponse {
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        ApiResponse::json(200, &response)
    }

    fn list_services(&self) -> ApiResponse {
        let response = ServicesResponse {
            services: self
                .dispatcher
                .registry()
                .names()
                .map(str::to_string)
                .collect(),
        };
        ApiResponse::json(200, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ServiceRegistry;
    use crate::dispatch::{CommandOutput, CommandRunner};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Echoes its arguments, failing for `pull`
    #[derive(Default)]
    struct EchoRunner {
        runs: AtomicUsize,
    }

    impl CommandRunner for EchoRunner {
        fn program(&self) -> &str {
            "docker-compose"
        }

        fn run(&self, args: &[String]) -> io::Result<CommandOutput> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let success = args[0] != "pull";
            Ok(CommandOutput {
                stdout: args.join(" "),
                stderr: String::new(),
                success,
                code: Some(if success { 0 } else { 1 }),
            })
        }
    }

    fn create_test_handler(policy: StatusPolicy) -> (ApiHandler, Arc<EchoRunner>) {
        let runner = Arc::new(EchoRunner::default());
        let registry = Arc::new(ServiceRegistry::from_names(["web", "db"]));
        let dispatcher = Dispatcher::new(registry, runner.clone());
        (ApiHandler::new(dispatcher, policy), runner)
    }

    fn body(response: &ApiResponse) -> CommandResponse {
        serde_json::from_str(&response.body).unwrap()
    }

    #[test]
    fn test_up_success() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("PUT", "/up/web");
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/json");
        assert_eq!(
            body(&response),
            CommandResponse {
                output: "up -d web".to_string(),
                error: None,
            }
        );
    }

    #[test]
    fn test_error_response_shape() {
        let response = ApiResponse::error(400, "Request header too large");
        assert_eq!(response.status, 400);
        assert_eq!(response.content_type, "application/json");
        assert_eq!(
            response.body,
            r#"{"output":"","error":"Request header too large"}"#
        );
    }

    #[test]
    fn test_error_is_null_on_success() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("PUT", "/ps/db");
        assert_eq!(response.body, r#"{"output":"ps db","error":null}"#);
    }

    #[test]
    fn test_unknown_service_strict() {
        let (handler, runner) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("PUT", "/logs/cache");
        assert_eq!(response.status, 404);
        assert_eq!(
            body(&response),
            CommandResponse {
                output: String::new(),
                error: Some("No such service".to_string()),
            }
        );
        assert_eq!(runner.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_service_legacy() {
        let (handler, _) = create_test_handler(StatusPolicy::Legacy);
        let response = handler.handle_request("PUT", "/logs/cache");
        assert_eq!(response.status, 200);
        assert_eq!(body(&response).error.as_deref(), Some("No such service"));
    }

    #[test]
    fn test_command_failure_status() {
        let (strict, _) = create_test_handler(StatusPolicy::Strict);
        let response = strict.handle_request("PUT", "/pull/web");
        assert_eq!(response.status, 502);
        let parsed = body(&response);
        assert_eq!(parsed.output, "pull web");
        assert_eq!(
            parsed.error.as_deref(),
            Some("docker-compose pull web failed: exit status 1")
        );

        let (legacy, _) = create_test_handler(StatusPolicy::Legacy);
        assert_eq!(legacy.handle_request("PUT", "/pull/web").status, 500);
    }

    #[test]
    fn test_wrong_method() {
        let (handler, runner) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("GET", "/up/web");
        assert_eq!(response.status, 405);
        assert_eq!(runner.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_endpoints() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        assert_eq!(handler.handle_request("PUT", "/down/web").status, 404);
        assert_eq!(handler.handle_request("PUT", "/up/").status, 404);
        assert_eq!(handler.handle_request("PUT", "/up/web/extra").status, 404);
        assert_eq!(handler.handle_request("PUT", "/").status, 404);
    }

    #[test]
    fn test_query_string_ignored() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("PUT", "/ps/web?verbose=1");
        assert_eq!(response.status, 200);
        assert_eq!(body(&response).output, "ps web");
    }

    #[test]
    fn test_ping() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("GET", "/_ping");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "OK");
    }

    #[test]
    fn test_get_version() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("GET", "/version");
        assert_eq!(response.status, 200);
        assert!(response.body.contains(SERVICE_NAME));
        assert!(response.body.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_list_services() {
        let (handler, _) = create_test_handler(StatusPolicy::Strict);
        let response = handler.handle_request("GET", "/services");
        assert_eq!(response.body, r#"{"services":["db","web"]}"#);
    }
}

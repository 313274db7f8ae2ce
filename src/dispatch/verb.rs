//! Verbs and their docker-compose argument templates

use crate::error::MiddlewareError;
use std::fmt;
use std::str::FromStr;

/// Operation applied to a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Pull,
    Up,
    Ps,
    Logs,
}

impl Verb {
    /// Every verb, in route order
    pub const ALL: [Verb; 4] = [Verb::Pull, Verb::Up, Verb::Ps, Verb::Logs];

    /// Route segment naming this verb
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Pull => "pull",
            Verb::Up => "up",
            Verb::Ps => "ps",
            Verb::Logs => "logs",
        }
    }

    /// docker-compose arguments preceding the service name
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Verb::Pull => &["pull"],
            Verb::Up => &["up", "-d"],
            Verb::Ps => &["ps"],
            Verb::Logs => &["logs"],
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = MiddlewareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| MiddlewareError::BadRequest(format!("Unknown verb: {}", s)))
    }
}

/// A verb applied to a named service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub verb: Verb,
    pub service: String,
}

impl CommandRequest {
    pub fn new(verb: Verb, service: impl Into<String>) -> Self {
        Self {
            verb,
            service: service.into(),
        }
    }

    /// Full argument list: the verb template followed by the service name
    pub fn args(&self) -> Vec<String> {
        self.verb
            .args()
            .iter()
            .map(|arg| arg.to_string())
            .chain(std::iter::once(self.service.clone()))
            .collect()
    }
}

//! Docker Compose configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The parts of a compose file this service reads
///
/// Service definitions are kept as raw YAML values. Only their keys are used;
/// every other top-level key is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeFile {
    /// Services, keyed by name
    #[serde(default)]
    services: Option<BTreeMap<String, serde_yaml::Value>>,
}

impl ComposeFile {
    /// Build a compose file from service names with empty definitions
    pub fn with_services<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: Some(
                names
                    .into_iter()
                    .map(|n| (n.into(), serde_yaml::Value::Null))
                    .collect(),
            ),
        }
    }

    /// Declared service names, sorted
    ///
    /// `services:` left empty (YAML null) counts as no services.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .flat_map(|services| services.keys())
            .map(String::as_str)
    }
}

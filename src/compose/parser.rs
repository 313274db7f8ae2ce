//! Docker Compose file parser

use super::config::ComposeFile;
use crate::error::{MiddlewareError, Result};
use std::path::{Path, PathBuf};

/// Default compose file names
pub const DEFAULT_COMPOSE_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Find compose file in directory
    pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_COMPOSE_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Resolve a configured path, looking inside it when it is a directory
    pub fn resolve(path: &Path) -> PathBuf {
        if path.is_dir() {
            if let Some(found) = Self::find_compose_file(path) {
                return found;
            }
        }
        path.to_path_buf()
    }

    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<ComposeFile> {
        let content = std::fs::read_to_string(path).map_err(|source| MiddlewareError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content)
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<ComposeFile> {
        serde_yaml::from_str(content)
            .map_err(|e| MiddlewareError::ComposeParse(format!("Failed to parse YAML: {}", e)))
    }

    /// Render a compose file back to YAML
    pub fn to_yaml(file: &ComposeFile) -> Result<String> {
        serde_yaml::to_string(file).map_err(|e| MiddlewareError::Yaml(e.to_string()))
    }
}

//! Registry of known compose services

use super::config::ComposeFile;
use super::parser::ComposeParser;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Immutable set of service names declared in the compose file
///
/// Built once at startup and shared read-only for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
    names: BTreeSet<String>,
}

impl ServiceRegistry {
    /// Load the registry from a compose file (or a directory holding one)
    pub fn load(path: &Path) -> Result<Self> {
        let path = ComposeParser::resolve(path);
        let file = ComposeParser::parse_file(&path)?;
        let registry = Self::from_compose(&file);

        info!(
            "Loaded {} services from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build the registry from an already parsed compose file
    pub fn from_compose(file: &ComposeFile) -> Self {
        Self::from_names(file.service_names())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Service names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render as a compose `services:` mapping with empty definitions
    pub fn to_yaml(&self) -> Result<String> {
        ComposeParser::to_yaml(&ComposeFile::with_services(self.names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MiddlewareError;
    use tempfile::TempDir;

    #[test]
    fn test_load_null_services() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker-compose.yml");
        std::fs::write(&path, "services: {a: null, b: null}\n").unwrap();

        let registry = ServiceRegistry::load(&path).unwrap();
        assert_eq!(registry, ServiceRegistry::from_names(["a", "b"]));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_load_from_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("compose.yml"),
            "services:\n  web:\n    image: nginx\n",
        )
        .unwrap();

        let registry = ServiceRegistry::load(temp.path()).unwrap();
        assert!(registry.contains("web"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ServiceRegistry::load(&temp.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, MiddlewareError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_unparseable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker-compose.yml");
        std::fs::write(&path, "services: [web, db]\n").unwrap();

        let err = ServiceRegistry::load(&path).unwrap_err();
        assert!(matches!(err, MiddlewareError::ComposeParse(_)));
    }

    #[test]
    fn test_contains_is_exact() {
        let registry = ServiceRegistry::from_names(["web"]);
        assert!(registry.contains("web"));
        assert!(!registry.contains("Web"));
        assert!(!registry.contains("we"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_to_yaml_lists_only_names() {
        let file = ComposeParser::parse_str(
            "services:\n  web:\n    image: nginx\n  db:\n    image: postgres\n",
        )
        .unwrap();
        let yaml = ServiceRegistry::from_compose(&file).to_yaml().unwrap();

        assert_eq!(yaml, "services:\n  db: null\n  web: null\n");
        let reloaded = ComposeParser::parse_str(&yaml).unwrap();
        assert_eq!(
            ServiceRegistry::from_compose(&reloaded),
            ServiceRegistry::from_names(["db", "web"])
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ServiceRegistry::from_compose(&ComposeFile::default());
        assert!(registry.is_empty());
        assert!(!registry.contains("web"));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class registry.
//!
//! Maps integer class ids to human labels. Loaded once at startup from a
//! YAML file with a `names:` sequence and immutable for the process
//! lifetime. A missing or unparseable registry is startup-fatal.

use crate::error::StartupError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RegistryFile {
    names: Vec<String>,
}

/// Immutable id-to-label mapping.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Load the registry from a YAML file.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| StartupError::RegistryRead {
                path: path.to_path_buf(),
                source,
            })?;
        let file: RegistryFile =
            serde_yaml::from_str(&text).map_err(|source| StartupError::RegistryParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { names: file.names })
    }

    /// Build a registry from labels directly. Used in tests.
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Label for a class id, or a stable fallback for unknown ids.
    pub fn label(&self, class_id: usize) -> &str {
        self.names
            .get(class_id)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "names:\n  - scratch\n  - dent\n  - crack").unwrap();

        let registry = ClassRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.label(0), "scratch");
        assert_eq!(registry.label(2), "crack");
    }

    #[test]
    fn test_unknown_id_falls_back() {
        let registry = ClassRegistry::from_names(vec!["scratch".into()]);
        assert_eq!(registry.label(7), "unknown");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClassRegistry::load(&dir.path().join("absent.yaml"));
        assert!(matches!(err, Err(StartupError::RegistryRead { .. })));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yaml");
        std::fs::write(&path, "nc: [not a registry").unwrap();
        let err = ClassRegistry::load(&path);
        assert!(matches!(err, Err(StartupError::RegistryParse { .. })));
    }
}

//! App manifest discovery and loading
//!
//! The manifest (`app.json`) is found by walking ancestor directories from a
//! starting point. Parsed manifests are memoized per project root in a
//! context object owned by the current invocation; nothing is cached
//! process-wide.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_JSON: &str = "app.json";

/// Walks from `start_dir` up through parent directories until a file or
/// directory with the given name is found.
pub fn find_file(name: &str, start_dir: &Path) -> Option<PathBuf> {
    let mut current = if start_dir.is_absolute() {
        start_dir.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(start_dir)
    };

    loop {
        let candidate = current.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Reads and parses a JSON file.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Per-invocation state shared across the pipeline.
///
/// Owns the manifest memoization cache so repeated lookups within one run
/// hit the disk once, and concurrent or repeated invocations in the same
/// process never observe each other's state.
#[derive(Default)]
pub struct ProjectContext {
    manifests: HashMap<PathBuf, Option<Value>>,
}

impl ProjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed app manifest for a project root, or `None` when
    /// no manifest exists or it fails to parse. Callers decide whether
    /// absence is fatal.
    pub fn app_manifest(&mut self, project_root: &Path) -> Option<&Value> {
        if !self.manifests.contains_key(project_root) {
            let manifest = find_file(APP_JSON, project_root)
                .and_then(|path| read_json_file(&path).ok());
            self.manifests.insert(project_root.to_path_buf(), manifest);
        }

        self.manifests
            .get(project_root)
            .and_then(|cached| cached.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_file_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("example/node_modules/some-package");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("example/app.json"), r#"{ "name": "Example" }"#).unwrap();

        assert!(find_file(APP_JSON, &nested).is_some());
        assert!(find_file(APP_JSON, &dir.path().join("example")).is_some());
        assert_eq!(find_file("no-such-file.json", &nested), None);
    }

    #[test]
    fn test_find_file_stops_at_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_file("definitely-not-here.xyz", dir.path()), None);
    }

    #[test]
    fn test_app_manifest_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(APP_JSON), r#"{ "name": "Example" }"#).unwrap();

        let mut context = ProjectContext::new();
        let name = context
            .app_manifest(dir.path())
            .and_then(|m| m["name"].as_str())
            .map(String::from);
        assert_eq!(name.as_deref(), Some("Example"));

        // Cached entry survives the manifest disappearing from disk.
        fs::remove_file(dir.path().join(APP_JSON)).unwrap();
        assert!(context.app_manifest(dir.path()).is_some());
        assert!(ProjectContext::new().app_manifest(dir.path()).is_none());
    }

    #[test]
    fn test_malformed_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(APP_JSON), "not json").unwrap();

        let mut context = ProjectContext::new();
        assert!(context.app_manifest(dir.path()).is_none());
    }
}

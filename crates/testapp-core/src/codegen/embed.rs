//! Embedded-manifest generation driver
//!
//! Validates the app manifest, computes its checksum, and writes the
//! rendered source for one platform under the disposable
//! `node_modules/.generated/<platform>/` staging directory. The checksum
//! and byte length let the native runtime detect manifest-vs-binary
//! mismatches.

use super::{cpp, kotlin, swift};
use crate::manifest::{find_file, validate, Schema, APP_JSON};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Embedding target; one per platform language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedTarget {
    Android,
    Apple,
    Windows,
}

impl EmbedTarget {
    fn platform_dir(&self) -> &'static str {
        match self {
            EmbedTarget::Android => "android",
            EmbedTarget::Apple => "apple",
            EmbedTarget::Windows => "windows",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            EmbedTarget::Android => "ManifestProvider.kt",
            EmbedTarget::Apple => "Manifest+Embedded.g.swift",
            EmbedTarget::Windows => "Manifest.g.cpp",
        }
    }
}

/// The validated manifest prepared for embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedManifest {
    pub manifest: serde_json::Value,
    pub json: String,
    pub checksum: String,
    pub length: usize,
}

impl EmbeddedManifest {
    /// Validates the manifest at `manifest_path` and prepares its compact
    /// serialization with checksum and byte length. Returns the process
    /// exit code on validation failure.
    pub fn prepare(manifest_path: Option<&Path>, schema: &Schema) -> Result<Self, i32> {
        let manifest = validate(manifest_path, schema)?;
        let json = serde_json::to_string(&manifest).map_err(|_| 1)?;
        let checksum = format!("{:x}", Sha256::digest(json.as_bytes()));
        let length = json.len();
        Ok(Self {
            manifest,
            json,
            checksum,
            length,
        })
    }

    fn render(&self, target: EmbedTarget) -> String {
        let Some(json) = self.manifest.as_object() else {
            return String::new();
        };
        match target {
            EmbedTarget::Android => kotlin::generate(json, &self.checksum),
            EmbedTarget::Apple => swift::generate(json, &self.checksum),
            EmbedTarget::Windows => cpp::generate(json, &self.checksum),
        }
    }
}

fn generated_dir(project_root: &Path, target: EmbedTarget) -> Result<PathBuf, i32> {
    let Some(node_modules) = find_file("node_modules", project_root) else {
        eprintln!(
            "Failed to find 'node_modules' — make sure you've installed npm dependencies"
        );
        return Err(1);
    };
    Ok(node_modules.join(".generated").join(target.platform_dir()))
}

/// Generates the embedded-manifest source for one platform.
///
/// Returns the process exit code: 0 on success, 1 when prerequisites are
/// missing, `1000 + N` when the manifest fails validation with N errors.
pub fn embed(target: EmbedTarget, project_root: &Path, schema: &Schema) -> i32 {
    let manifest_path = find_file(APP_JSON, project_root);
    let embedded = match EmbeddedManifest::prepare(manifest_path.as_deref(), schema) {
        Ok(embedded) => embedded,
        Err(code) => return code,
    };

    let dir = match generated_dir(project_root, target) {
        Ok(dir) => dir,
        Err(code) => return code,
    };

    let dest = dir.join(target.file_name());
    let code = embedded.render(target);
    if fs::create_dir_all(&dir).is_err() || fs::write(&dest, &code).is_err() {
        eprintln!("Failed to write {}", dest.display());
        return 1;
    }

    println!("{} -> {}", APP_JSON, dest.display());
    0
}

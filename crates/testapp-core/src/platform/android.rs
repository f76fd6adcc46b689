//! Android Gradle glue
//!
//! Renders the manifest-driven pieces of the Gradle build: application id,
//! version code, and signing configurations. Store files are resolved
//! relative to the app manifest; missing stores warn and are skipped.

use crate::console;
use serde_json::Value;
use std::path::Path;

/// Default values applied when a signing config omits them.
const DEFAULT_KEY_ALIAS: &str = "androiddebugkey";
const DEFAULT_KEY_PASSWORD: &str = "android";
const DEFAULT_STORE_PASSWORD: &str = "android";

/// Returns the application id override, if the manifest declares one.
pub fn application_id(android: &Value) -> Option<&str> {
    android.get("package").and_then(Value::as_str)
}

/// Returns the version code override, if the manifest declares one.
pub fn version_code(android: &Value) -> Option<&str> {
    android.get("versionCode").and_then(Value::as_str)
}

fn signing_config_block(
    name: &str,
    config: &Value,
    project_path: &Path,
) -> Option<String> {
    let Some(store_file) = config.get("storeFile").and_then(Value::as_str) else {
        console::warn(&format!(
            "Missing `storeFile` in `{}` signing config; skipping",
            name
        ));
        return None;
    };

    if !project_path.join(store_file).exists() {
        console::warn(&format!("Key store file not found: {}", store_file));
        return None;
    }

    let key_alias = config
        .get("keyAlias")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_KEY_ALIAS);
    let key_password = config
        .get("keyPassword")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_KEY_PASSWORD);
    let store_password = config
        .get("storePassword")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_STORE_PASSWORD);

    Some(
        [
            format!("    {} {{", name),
            format!("        keyAlias '{}'", key_alias),
            format!("        keyPassword '{}'", key_password),
            format!("        storeFile rootProject.file('{}')", store_file),
            format!("        storePassword '{}'", store_password),
            "    }".to_string(),
        ]
        .join("\n"),
    )
}

/// Renders the `signingConfigs` Gradle block from the manifest's
/// `android.signingConfigs`. Returns `None` when nothing usable remains.
pub fn signing_configs_gradle(android: &Value, project_path: &Path) -> Option<String> {
    let configs = android.get("signingConfigs")?.as_object()?;

    let mut blocks = Vec::new();
    for name in ["debug", "release"] {
        if let Some(config) = configs.get(name) {
            if let Some(block) = signing_config_block(name, config, project_path) {
                blocks.push(block);
            }
        }
    }

    if blocks.is_empty() {
        return None;
    }

    Some(format!("signingConfigs {{\n{}\n}}", blocks.join("\n")))
}

//! Apple project glue (iOS, macOS, visionOS)
//!
//! Locates the installed framework package, selects the version-specific
//! CocoaPods shim, renders Xcode build-setting overrides from the
//! manifest's signing fields, and regenerates the resources-bundle podspec
//! only when its content actually changes.

use crate::config::platforms::{default_platform_package_name, Platform};
use crate::manifest::{find_file, read_json_file, APP_JSON};
use crate::version::v;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the pod that carries the manifest-declared resources.
pub const RESOURCES_POD_NAME: &str = "ReactTestApp-Resources";

/// Locates the framework package serving the given Apple platform.
/// Missing installations are fatal.
pub fn find_react_native(project_root: &Path, platform: Platform) -> Result<PathBuf> {
    let package = default_platform_package_name(platform);
    find_file(&format!("node_modules/{}", package), project_root).ok_or_else(|| {
        anyhow::anyhow!(
            "Failed to find `{}` — make sure you've installed npm dependencies",
            package
        )
    })
}

/// Returns the CocoaPods shim matching the framework version. Historical
/// API differences require one shim per breaking release.
pub fn react_native_pods(version_number: u32) -> Result<&'static str> {
    if version_number == 0 || version_number >= v(0, 71, 0) {
        Ok("use_react_native-0.71")
    } else if version_number >= v(0, 70, 0) {
        Ok("use_react_native-0.70")
    } else if version_number >= v(0, 68, 0) {
        Ok("use_react_native-0.68")
    } else if version_number >= v(0, 64, 0) {
        Ok("use_react_native-0.64")
    } else {
        Err(anyhow::anyhow!(
            "Unsupported React Native version: {}",
            version_number
        ))
    }
}

/// Xcode build-setting overrides derived from the manifest's platform
/// block.
pub fn build_settings(platform_config: &Value) -> IndexMap<String, String> {
    let mut settings = IndexMap::new();
    let entries = [
        ("bundleIdentifier", "PRODUCT_BUNDLE_IDENTIFIER"),
        ("buildNumber", "CURRENT_PROJECT_VERSION"),
        ("codeSignEntitlements", "CODE_SIGN_ENTITLEMENTS"),
        ("codeSignIdentity", "CODE_SIGN_IDENTITY"),
        ("developmentTeam", "DEVELOPMENT_TEAM"),
    ];
    for (manifest_key, setting) in entries {
        if let Some(value) = platform_config.get(manifest_key).and_then(Value::as_str) {
            settings.insert(setting.to_string(), value.to_string());
        }
    }
    settings
}

/// Resolves the resource list for the given platform from the manifest.
fn resolve_resources(manifest: &Value, platform: Platform) -> Vec<String> {
    let resources = match manifest.get("resources") {
        Some(Value::Array(list)) => list.as_slice(),
        Some(Value::Object(map)) => match map.get(platform.name()).and_then(Value::as_array) {
            Some(list) => list.as_slice(),
            None => &[],
        },
        _ => &[],
    };
    resources
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

fn resources_podspec(resources: &[String]) -> Value {
    let mut all_resources = vec![APP_JSON.to_string()];
    all_resources.extend(resources.iter().cloned());
    json!({
        "name": RESOURCES_POD_NAME,
        "version": "1.0.0-dev",
        "summary": "Resources for ReactTestApp",
        "homepage": "https://github.com/microsoft/react-native-test-app",
        "license": "Unlicense",
        "authors": "@microsoft/react-native-test-app",
        "source": { "git": "https://github.com/microsoft/react-native-test-app.git" },
        "platforms": {
            "ios": "12.0",
            "osx": "10.14",
            "visionos": "1.0",
        },
        "resources": all_resources,
    })
}

/// Writes the resources-bundle podspec next to the app manifest and
/// returns the directory containing it, relative to the project root.
///
/// The file is rewritten only when its content hash changes, so the native
/// build does not reinstall pods for untouched resource lists. Returns
/// `None` when there is no app manifest to describe.
pub fn resources_pod(project_root: &Path, platform: Platform) -> Result<Option<PathBuf>> {
    let Some(manifest_path) = find_file(APP_JSON, project_root) else {
        return Ok(None);
    };
    let manifest = read_json_file(&manifest_path)?;
    let resources = resolve_resources(&manifest, platform);

    let spec = serde_json::to_string(&resources_podspec(&resources))
        .context("Failed to serialize podspec")?;

    let app_dir = manifest_path.parent().unwrap_or(project_root);
    let podspec_path = app_dir.join(format!("{}.podspec.json", RESOURCES_POD_NAME));

    let unchanged = fs::read_to_string(&podspec_path)
        .map(|existing| Sha256::digest(existing.as_bytes()) == Sha256::digest(spec.as_bytes()))
        .unwrap_or(false);
    if !unchanged {
        fs::write(&podspec_path, &spec)
            .with_context(|| format!("Failed to write {}", podspec_path.display()))?;
    }

    Ok(Some(
        app_dir
            .strip_prefix(project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| app_dir.to_path_buf()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pods_shim_is_keyed_by_version() {
        assert_eq!(react_native_pods(v(0, 73, 2)).unwrap(), "use_react_native-0.71");
        assert_eq!(react_native_pods(v(0, 70, 6)).unwrap(), "use_react_native-0.70");
        assert_eq!(react_native_pods(v(0, 68, 0)).unwrap(), "use_react_native-0.68");
        assert_eq!(react_native_pods(v(0, 64, 2)).unwrap(), "use_react_native-0.64");
        assert_eq!(react_native_pods(0).unwrap(), "use_react_native-0.71");
        assert!(react_native_pods(v(0, 59, 0)).is_err());
    }

    #[test]
    fn test_build_settings_map_manifest_keys() {
        let config: Value = serde_json::from_str(
            r#"{
                "bundleIdentifier": "com.example.app",
                "buildNumber": "42",
                "codeSignIdentity": "Apple Development",
                "developmentTeam": "ABCDEFGHIJ"
            }"#,
        )
        .unwrap();

        let settings = build_settings(&config);
        assert_eq!(settings["PRODUCT_BUNDLE_IDENTIFIER"], "com.example.app");
        assert_eq!(settings["CURRENT_PROJECT_VERSION"], "42");
        assert_eq!(settings["CODE_SIGN_IDENTITY"], "Apple Development");
        assert_eq!(settings["DEVELOPMENT_TEAM"], "ABCDEFGHIJ");
        assert!(!settings.contains_key("CODE_SIGN_ENTITLEMENTS"));
    }

    #[test]
    fn test_resources_pod_writes_podspec_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(APP_JSON),
            r#"{ "name": "Example", "displayName": "Example", "resources": { "ios": ["dist/assets"] } }"#,
        )
        .unwrap();

        let pod_dir = resources_pod(dir.path(), Platform::Ios).unwrap().unwrap();
        assert_eq!(pod_dir, PathBuf::from(""));

        let podspec_path = dir
            .path()
            .join(format!("{}.podspec.json", RESOURCES_POD_NAME));
        let spec = read_json_file(&podspec_path).unwrap();
        assert_eq!(spec["name"], RESOURCES_POD_NAME);
        assert_eq!(spec["resources"], json!(["app.json", "dist/assets"]));

        // Unchanged resources leave the file untouched.
        let before = fs::metadata(&podspec_path).unwrap().modified().unwrap();
        resources_pod(dir.path(), Platform::Ios).unwrap();
        let after = fs::metadata(&podspec_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_resources_pod_selects_platform_bucket() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(APP_JSON),
            r#"{
                "name": "Example",
                "displayName": "Example",
                "resources": {
                    "ios": ["dist/main.ios.jsbundle"],
                    "macos": ["dist/main.macos.jsbundle"]
                }
            }"#,
        )
        .unwrap();

        resources_pod(dir.path(), Platform::Macos).unwrap();
        let spec = read_json_file(
            &dir.path()
                .join(format!("{}.podspec.json", RESOURCES_POD_NAME)),
        )
        .unwrap();
        assert_eq!(spec["resources"], json!(["app.json", "dist/main.macos.jsbundle"]));
    }

    #[test]
    fn test_resources_pod_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resources_pod(dir.path(), Platform::Ios).unwrap(), None);
    }

    #[test]
    fn test_find_react_native_requires_installation() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_react_native(dir.path(), Platform::Macos).is_err());

        fs::create_dir_all(dir.path().join("node_modules/react-native-macos")).unwrap();
        let path = find_react_native(dir.path(), Platform::Macos).unwrap();
        assert!(path.ends_with("node_modules/react-native-macos"));
    }
}

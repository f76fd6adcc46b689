//! Project configuration engine
//!
//! Computes the set of files, scripts, and dependencies required to set up
//! the selected platforms, gates destructive operations, and applies the
//! result to the target package.

pub mod platforms;
pub mod templates;

pub use platforms::{get_platform_package, Platform};

use crate::console;
use crate::manifest::{find_file, read_json_file, ProjectContext, APP_JSON};
use crate::version::{to_version_number, Capabilities};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// npm package name under which this toolkit is installed.
pub const TOOLKIT_PACKAGE_NAME: &str = "react-native-test-app";

/// A file to be written into the target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    /// Literal text content
    Content(String),
    /// Copy from an existing source file
    Copy { source: PathBuf },
}

impl FileEntry {
    pub fn copy(source: PathBuf) -> Self {
        FileEntry::Copy { source }
    }
}

/// Computed output of the configuration engine. Not persisted; rebuilt on
/// every invocation.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    /// Relative destination path -> content or copy source
    pub files: IndexMap<String, FileEntry>,
    /// Stale artifacts from previous scaffold versions, deleted if found
    pub old_files: Vec<String>,
    /// Scripts merged into the package manifest
    pub scripts: IndexMap<String, String>,
    /// Dependencies merged into the package manifest
    pub dependencies: IndexMap<String, String>,
}

impl Configuration {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.old_files.is_empty()
            && self.scripts.is_empty()
            && self.dependencies.is_empty()
    }
}

/// Merges two configurations. Right-biased: entries in `rhs` override
/// entries in `lhs` for `files`/`scripts`/`dependencies`; `old_files`
/// concatenates.
pub fn merge_config(lhs: Configuration, rhs: Configuration) -> Configuration {
    let mut merged = lhs;
    merged.files.extend(rhs.files);
    merged.old_files.extend(rhs.old_files);
    merged.scripts.extend(rhs.scripts);
    merged.dependencies.extend(rhs.dependencies);
    merged
}

/// Parameters for one `configure` run.
#[derive(Debug, Clone)]
pub struct ConfigureParams {
    /// App name, used to parameterize templates
    pub name: String,
    /// Path of the package to modify
    pub package_path: PathBuf,
    /// Path to the toolkit's own npm installation
    pub test_app_path: PathBuf,
    /// Path to the project template; resolved from the installed framework
    /// when unset
    pub template_path: Option<PathBuf>,
    /// Target framework version
    pub target_version: String,
    /// Platforms to configure
    pub platforms: Vec<Platform>,
    /// Collapse the per-platform directory structure (single platform only)
    pub flatten: bool,
    /// Allow destructive operations
    pub force: bool,
    /// Bootstrap a brand new project
    pub init: bool,
}

fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Returns the installed version of an npm package, if present.
pub fn package_version(package: &str, start_dir: &Path) -> Option<String> {
    let manifest = find_file(&format!("node_modules/{}/package.json", package), start_dir)?;
    read_json_file(&manifest)
        .ok()?
        .get("version")?
        .as_str()
        .map(String::from)
}

/// Resolves the project template directory.
///
/// Newer framework versions ship the template in a separate community
/// package; older versions bundle it with the framework itself.
pub fn find_template_dir(params: &ConfigureParams) -> Result<PathBuf> {
    if let Some(template_path) = &params.template_path {
        return Ok(template_path.clone());
    }

    let capabilities = Capabilities::for_version(to_version_number(&params.target_version));
    if capabilities.community_template {
        if let Some(dir) = find_file(
            "node_modules/@react-native-community/template/template",
            &params.package_path,
        ) {
            return Ok(dir);
        }
    }

    find_file("node_modules/react-native/template", &params.package_path)
        .ok_or_else(|| anyhow::anyhow!("Failed to find the React Native project template"))
}

/// Returns the appropriate `react-native.config.js` for the parameters.
pub fn react_native_config(params: &ConfigureParams) -> Result<FileEntry> {
    let should_flatten = params.flatten && params.platforms.len() == 1;
    if should_flatten {
        let content = match params.platforms[0] {
            Platform::Android => templates::react_native_config_android_flat(),
            Platform::Ios | Platform::Macos | Platform::Visionos => {
                templates::react_native_config_apple_flat()
            }
            Platform::Windows => templates::react_native_config_windows_flat(&params.name),
        };
        return Ok(FileEntry::Content(content));
    }

    let config = params.test_app_path.join("example/react-native.config.js");
    let content = read_text_file(&config)?.replace("Example", &params.name);
    Ok(FileEntry::Content(content))
}

/// `.gitignore` files are only renamed when the toolkit is published.
fn find_gitignore(dir: &Path) -> Result<PathBuf> {
    ["_gitignore", ".gitignore"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| anyhow::anyhow!("Failed to find `.gitignore`"))
}

/// Cross-platform files and scripts included whenever any platform
/// produced output.
pub fn get_common_config(params: &ConfigureParams) -> Result<Configuration> {
    let example = params.test_app_path.join("example");
    let template_dir = find_template_dir(params)?;

    let mut files = IndexMap::new();
    files.insert(
        ".gitignore".to_string(),
        FileEntry::copy(find_gitignore(&example)?),
    );
    files.insert(
        ".watchmanconfig".to_string(),
        FileEntry::copy(template_dir.join("_watchmanconfig")),
    );
    files.insert(
        "babel.config.js".to_string(),
        FileEntry::copy(template_dir.join("babel.config.js")),
    );
    files.insert(
        "metro.config.js".to_string(),
        FileEntry::copy(example.join("metro.config.js")),
    );
    files.insert(
        "react-native.config.js".to_string(),
        react_native_config(params)?,
    );

    if params.init {
        if template_dir.join("App.tsx").exists() {
            files.insert(
                "App.tsx".to_string(),
                FileEntry::copy(template_dir.join("App.tsx")),
            );
            files.insert(
                "tsconfig.json".to_string(),
                FileEntry::copy(template_dir.join("tsconfig.json")),
            );
        } else {
            files.insert(
                "App.js".to_string(),
                FileEntry::copy(template_dir.join("App.js")),
            );
        }
        files.insert(
            APP_JSON.to_string(),
            FileEntry::Content(templates::app_manifest(&params.name)),
        );
        files.insert(
            "index.js".to_string(),
            FileEntry::copy(template_dir.join("index.js")),
        );
        files.insert(
            "package.json".to_string(),
            FileEntry::Content(
                read_text_file(&template_dir.join("package.json"))?
                    .replace("HelloWorld", &params.name),
            ),
        );
    }

    let mut scripts = IndexMap::new();
    scripts.insert(
        "mkdist".to_string(),
        r#"node -e "require('node:fs').mkdirSync('dist', { recursive: true, mode: 0o755 })""#
            .to_string(),
    );
    scripts.insert("start".to_string(), "react-native start".to_string());

    Ok(Configuration {
        files,
        old_files: Vec::new(),
        scripts,
        dependencies: IndexMap::new(),
    })
}

fn apple_config(params: &ConfigureParams, platform: Platform) -> Configuration {
    let name = &params.name;
    let prefix = match platform {
        Platform::Ios => "",
        Platform::Macos => "macos/",
        Platform::Visionos => "visionos/",
        _ => unreachable!("not an Apple platform"),
    };

    // Older iOS CLI versions need an explicit project path when flattened.
    let project_path_flag = if params.flatten
        && to_version_number(
            &package_version("@react-native-community/cli-platform-ios", &params.package_path)
                .unwrap_or_default(),
        ) < crate::version::v(8, 0, 0)
    {
        " --project-path ."
    } else {
        ""
    };

    let mut files = IndexMap::new();
    files.insert(
        "Podfile".to_string(),
        FileEntry::Content(templates::podfile(name, prefix)),
    );

    let old_files = vec![
        "Podfile.lock".to_string(),
        "Pods".to_string(),
        format!("{}.xcodeproj", name),
        format!("{}.xcworkspace", name),
    ];

    let mut scripts = IndexMap::new();
    match platform {
        Platform::Ios => {
            scripts.insert(
                "build:ios".to_string(),
                "npm run mkdist && react-native bundle --entry-file index.js --platform ios --dev true --bundle-output dist/main.ios.jsbundle --assets-dest dist".to_string(),
            );
            scripts.insert(
                "ios".to_string(),
                format!("react-native run-ios{}", project_path_flag),
            );
        }
        Platform::Macos => {
            scripts.insert(
                "build:macos".to_string(),
                "npm run mkdist && react-native bundle --entry-file index.js --platform macos --dev true --bundle-output dist/main.macos.jsbundle --assets-dest dist".to_string(),
            );
            scripts.insert(
                "macos".to_string(),
                format!("react-native run-macos --scheme {}{}", name, project_path_flag),
            );
        }
        Platform::Visionos => {
            scripts.insert(
                "build:visionos".to_string(),
                "npm run mkdist && react-native bundle --entry-file index.js --platform ios --dev true --bundle-output dist/main.visionos.jsbundle --assets-dest dist".to_string(),
            );
            scripts.insert("visionos".to_string(), "react-native run-visionos".to_string());
        }
        _ => {}
    }

    Configuration {
        files,
        old_files,
        scripts,
        dependencies: IndexMap::new(),
    }
}

fn android_config(params: &ConfigureParams) -> Result<Configuration> {
    let example_android = params.test_app_path.join("example/android");
    let wrapper = example_android.join("gradle/wrapper");

    let mut files = IndexMap::new();
    files.insert(
        "build.gradle".to_string(),
        FileEntry::Content(templates::build_gradle()),
    );
    files.insert(
        "gradle/wrapper/gradle-wrapper.jar".to_string(),
        FileEntry::copy(wrapper.join("gradle-wrapper.jar")),
    );

    let props = read_text_file(&wrapper.join("gradle-wrapper.properties"))?;
    let capabilities = Capabilities::for_version(to_version_number(&params.target_version));
    let props = if capabilities.modern_gradle {
        props
    } else {
        regex::Regex::new(r"gradle-[.0-9]*-bin\.zip")
            .expect("valid regex")
            .replace(&props, "gradle-7.6.4-bin.zip")
            .into_owned()
    };
    files.insert(
        "gradle/wrapper/gradle-wrapper.properties".to_string(),
        FileEntry::Content(props),
    );
    files.insert(
        "gradle.properties".to_string(),
        FileEntry::copy(example_android.join("gradle.properties")),
    );
    files.insert(
        "gradlew".to_string(),
        FileEntry::copy(example_android.join("gradlew")),
    );
    files.insert(
        "gradlew.bat".to_string(),
        FileEntry::copy(example_android.join("gradlew.bat")),
    );
    files.insert(
        "settings.gradle".to_string(),
        FileEntry::Content(templates::settings_gradle(&params.name)),
    );

    let mut scripts = IndexMap::new();
    scripts.insert("android".to_string(), "react-native run-android".to_string());
    scripts.insert(
        "build:android".to_string(),
        "npm run mkdist && react-native bundle --entry-file index.js --platform android --dev true --bundle-output dist/main.android.jsbundle --assets-dest dist/res".to_string(),
    );

    Ok(Configuration {
        files,
        old_files: Vec::new(),
        scripts,
        dependencies: IndexMap::new(),
    })
}

fn windows_config(params: &ConfigureParams) -> Result<Configuration> {
    let name = &params.name;

    let mut files = IndexMap::new();
    files.insert(
        ".gitignore".to_string(),
        FileEntry::copy(find_gitignore(&params.test_app_path.join("example/windows"))?),
    );

    let old_files = vec![
        format!("{}.sln", name),
        format!("{}.vcxproj", name),
        format!("{}/{}.vcxproj", name, name),
    ];

    let mut scripts = IndexMap::new();
    scripts.insert(
        "build:windows".to_string(),
        "npm run mkdist && react-native bundle --entry-file index.js --platform windows --dev true --bundle-output dist/main.windows.bundle --assets-dest dist".to_string(),
    );
    scripts.insert(
        "windows".to_string(),
        format!(
            "react-native run-windows --sln {}{}.sln",
            if params.flatten { "" } else { "windows/" },
            name
        ),
    );

    Ok(Configuration {
        files,
        old_files,
        scripts,
        dependencies: IndexMap::new(),
    })
}

/// Returns the configuration for one platform.
pub fn get_config(params: &ConfigureParams, platform: Platform) -> Result<Configuration> {
    match platform {
        Platform::Android => android_config(params),
        Platform::Ios | Platform::Macos | Platform::Visionos => Ok(apple_config(params, platform)),
        Platform::Windows => windows_config(params),
    }
}

/// Collects and merges configuration for all selected platforms.
///
/// Unless flattening, every file and stale path is remapped into its
/// platform-named subdirectory. The common configuration is merged in only
/// when the per-platform reduction produced anything at all; an entirely
/// empty result short-circuits without pulling in common files.
pub fn gather_config(params: &ConfigureParams) -> Result<Configuration> {
    let should_flatten = params.flatten && params.platforms.len() == 1;
    let options = ConfigureParams {
        flatten: should_flatten,
        ..params.clone()
    };

    let mut config = Configuration::default();
    for platform in &options.platforms {
        let platform_config = get_config(&options, *platform)?;
        let Some(platform_dependencies) =
            get_platform_package(*platform, &options.target_version)?
        else {
            continue;
        };

        let remapped = if should_flatten {
            platform_config
        } else {
            // Map each file into its platform specific folder, e.g.
            // `Podfile` -> `ios/Podfile`.
            let Configuration {
                files,
                old_files,
                scripts,
                dependencies,
            } = platform_config;
            Configuration {
                files: files
                    .into_iter()
                    .map(|(filename, content)| {
                        (format!("{}/{}", platform.name(), filename), content)
                    })
                    .collect(),
                old_files: old_files
                    .into_iter()
                    .map(|file| format!("{}/{}", platform.name(), file))
                    .collect(),
                scripts,
                dependencies,
            }
        };

        config = merge_config(
            config,
            Configuration {
                dependencies: platform_dependencies,
                ..remapped
            },
        );
    }

    if config.is_empty() {
        return Ok(config);
    }

    Ok(merge_config(get_common_config(&options)?, config))
}

/// Retrieves the app name from the app manifest, falling back to a default.
pub fn get_app_name(context: &mut ProjectContext, package_path: &Path) -> String {
    if let Some(name) = context
        .app_manifest(package_path)
        .and_then(|manifest| manifest.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
    {
        return name.to_string();
    }

    console::warn("Could not determine app name; using 'ReactTestApp'");
    "ReactTestApp".to_string()
}

/// Returns whether applying `config` would overwrite or remove existing
/// files, logging every affected path.
pub fn is_destructive(package_path: &Path, config: &Configuration) -> bool {
    let mut modified: Vec<_> = config
        .files
        .keys()
        .map(|file| package_path.join(file))
        .filter(|path| path.exists())
        .collect();

    let mut removed: Vec<_> = config
        .old_files
        .iter()
        .map(|file| package_path.join(file))
        .filter(|path| path.exists())
        .collect();

    if modified.is_empty() && removed.is_empty() {
        return false;
    }

    if !modified.is_empty() {
        console::warn("The following files will be overwritten:");
        modified.sort();
        for file in &modified {
            console::warn_tagged("   ", &file.display().to_string());
        }
    }
    if !removed.is_empty() {
        console::warn("The following files will be removed:");
        removed.sort();
        for file in &removed {
            console::warn_tagged("   ", &file.display().to_string());
        }
    }

    true
}

/// Writes all files to disk. Distinct destination files have no ordering
/// dependency, so writes run concurrently.
pub async fn write_all_files(
    files: &IndexMap<String, FileEntry>,
    destination: &Path,
) -> Result<()> {
    let writes = files.iter().map(|(filename, content)| {
        let file = destination.join(filename);
        async move {
            if let Some(parent) = file.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            match content {
                FileEntry::Content(text) => tokio::fs::write(&file, text)
                    .await
                    .with_context(|| format!("Failed to write {}", file.display())),
                FileEntry::Copy { source } => {
                    match tokio::fs::copy(source, &file).await {
                        Ok(_) => Ok(()),
                        // Published copies rename `_gitignore`; fall back
                        // when the unrenamed file is what's on disk.
                        Err(_)
                            if source.file_name().and_then(|n| n.to_str())
                                == Some(".gitignore") =>
                        {
                            let fallback = source.with_file_name("_gitignore");
                            tokio::fs::copy(&fallback, &file).await.map(|_| ()).with_context(
                                || format!("Failed to copy {}", source.display()),
                            )
                        }
                        Err(e) => Err(e).with_context(|| {
                            format!("Failed to copy {}", source.display())
                        }),
                    }
                }
            }
        }
    });

    futures::future::try_join_all(writes).await?;
    Ok(())
}

/// Removes all stale files and directories, ignoring missing entries.
pub async fn remove_all_files(files: &[String], destination: &Path) -> Result<()> {
    let removals = files.iter().map(|filename| {
        let path = destination.join(filename);
        async move {
            let result = if path.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match result {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => {
                    Err(anyhow::Error::from(e)
                        .context(format!("Failed to remove {}", path.display())))
                }
            }
        }
    });

    futures::future::try_join_all(removals).await?;
    Ok(())
}

fn sort_by_keys(map: &serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    let mut keys: Vec<_> = map.keys().cloned().collect();
    keys.sort();
    keys.into_iter()
        .filter_map(|key| map.get(&key).map(|value| (key.clone(), value.clone())))
        .collect()
}

fn merge_objects(lhs: Option<&Value>, rhs: &IndexMap<String, String>) -> Value {
    let mut merged = lhs
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (key, value) in rhs {
        merged.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(sort_by_keys(&merged))
}

/// Returns the package manifest with this toolkit's additions.
pub fn update_package_manifest(path: &Path, config: &Configuration) -> Result<Value> {
    let mut manifest = read_json_file(path)?;
    let Some(object) = manifest.as_object_mut() else {
        anyhow::bail!("Invalid package manifest: {}", path.display());
    };

    let scripts = merge_objects(object.get("scripts"), &config.scripts);
    object.insert("scripts".to_string(), scripts);

    let dependencies = merge_objects(object.get("dependencies"), &config.dependencies);
    object.insert("dependencies".to_string(), dependencies);

    let mut dev_dependencies = IndexMap::new();
    dev_dependencies.insert("@rnx-kit/metro-config".to_string(), "^2.0.0".to_string());
    dev_dependencies.insert(
        TOOLKIT_PACKAGE_NAME.to_string(),
        format!("^{}", env!("CARGO_PKG_VERSION")),
    );
    let dev_dependencies = merge_objects(object.get("devDependencies"), &dev_dependencies);
    object.insert("devDependencies".to_string(), dev_dependencies);

    Ok(manifest)
}

/// Configures the target package. Returns the process exit code.
///
/// Writes and deletions proceed without rollback; a failure partway
/// through leaves a partially updated tree for the next run to fix up.
pub async fn configure(params: &ConfigureParams) -> Result<i32> {
    let config = gather_config(params)?;

    if !params.force && is_destructive(&params.package_path, &config) {
        console::error("Destructive file operations are required.");
        println!("Re-run with --force if you're fine with this.");
        return Ok(1);
    }

    write_all_files(&config.files, &params.package_path).await?;
    remove_all_files(&config.old_files, &params.package_path).await?;

    let package_manifest = params.package_path.join("package.json");
    if !package_manifest.exists() {
        // The target may not be an npm package itself; some libraries keep
        // the example app in a plain subdirectory.
        console::warn(&format!(
            "skipped modifying 'package.json' because it was not found in path '{}'",
            params.package_path.display()
        ));
        return Ok(0);
    }

    let manifest = update_package_manifest(&package_manifest, &config)?;
    fs::write(&package_manifest, templates::serialize(&manifest))
        .with_context(|| format!("Failed to write {}", package_manifest.display()))?;

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Stages a fake project tree with the toolkit and framework installed.
    fn fake_project() -> (tempfile::TempDir, ConfigureParams) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let test_app = root.join("node_modules").join(TOOLKIT_PACKAGE_NAME);
        write(&test_app.join("example/_gitignore"), "node_modules/\n");
        write(&test_app.join("example/metro.config.js"), "module.exports = {};\n");
        write(
            &test_app.join("example/react-native.config.js"),
            "module.exports = { project: { ios: { sourceDir: \"ios\" } } }; // Example\n",
        );
        write(&test_app.join("example/windows/_gitignore"), "msbuild.binlog\n");
        let android = test_app.join("example/android");
        write(&android.join("gradle/wrapper/gradle-wrapper.jar"), "jar");
        write(
            &android.join("gradle/wrapper/gradle-wrapper.properties"),
            "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.8-bin.zip\n",
        );
        write(&android.join("gradle.properties"), "org.gradle.jvmargs=-Xmx4g\n");
        write(&android.join("gradlew"), "#!/bin/sh\n");
        write(&android.join("gradlew.bat"), "@echo off\n");

        let template = root.join("node_modules/react-native/template");
        write(&template.join("_watchmanconfig"), "{}\n");
        write(&template.join("babel.config.js"), "module.exports = {};\n");
        write(&template.join("index.js"), "import './App';\n");
        write(&template.join("App.tsx"), "export default function App() {}\n");
        write(&template.join("tsconfig.json"), "{}\n");
        write(
            &template.join("package.json"),
            r#"{ "name": "HelloWorld", "version": "0.0.1" }"#,
        );

        let params = ConfigureParams {
            name: "Example".to_string(),
            package_path: root.to_path_buf(),
            test_app_path: test_app,
            template_path: None,
            target_version: "0.73.2".to_string(),
            platforms: vec![Platform::Ios],
            flatten: false,
            force: false,
            init: false,
        };
        (dir, params)
    }

    #[test]
    fn test_merge_config_is_right_biased() {
        let mut lhs = Configuration::default();
        lhs.scripts.insert("start".to_string(), "a".to_string());
        lhs.old_files.push("Podfile.lock".to_string());

        let mut rhs = Configuration::default();
        rhs.scripts.insert("start".to_string(), "b".to_string());
        rhs.old_files.push("Pods".to_string());

        let merged = merge_config(lhs, rhs);
        assert_eq!(merged.scripts["start"], "b");
        assert_eq!(merged.old_files, ["Podfile.lock", "Pods"]);
    }

    #[test]
    fn test_ios_configuration() {
        let (_dir, params) = fake_project();
        let config = gather_config(&params).unwrap();

        match &config.files["ios/Podfile"] {
            FileEntry::Content(content) => assert!(content.contains("use_test_app!")),
            FileEntry::Copy { .. } => panic!("expected literal Podfile content"),
        }
        for stale in [
            "ios/Podfile.lock",
            "ios/Pods",
            "ios/Example.xcodeproj",
            "ios/Example.xcworkspace",
        ] {
            assert!(config.old_files.iter().any(|f| f == stale), "missing {}", stale);
        }

        // Common files ride along with platform output.
        assert!(config.files.contains_key(".gitignore"));
        assert!(config.files.contains_key("react-native.config.js"));
        assert_eq!(config.scripts["start"], "react-native start");
    }

    #[test]
    fn test_flatten_removes_platform_directory() {
        let (_dir, mut params) = fake_project();
        params.flatten = true;
        let config = gather_config(&params).unwrap();

        assert!(config.files.contains_key("Podfile"));
        assert!(!config.files.keys().any(|f| f.starts_with("ios/")));
        assert!(config.old_files.iter().any(|f| f == "Podfile.lock"));
    }

    #[test]
    fn test_flatten_requires_a_single_platform() {
        let (_dir, mut params) = fake_project();
        params.flatten = true;
        params.platforms = vec![Platform::Android, Platform::Ios];
        let config = gather_config(&params).unwrap();

        assert!(config.files.contains_key("ios/Podfile"));
        assert!(config.files.contains_key("android/build.gradle"));
        assert!(!config.files.contains_key("Podfile"));
    }

    #[test]
    fn test_unsupported_platform_version_short_circuits_common_config() {
        let (_dir, mut params) = fake_project();
        params.platforms = vec![Platform::Macos];
        params.target_version = "0.59".to_string();

        let config = gather_config(&params).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_platform_dependencies_follow_target_version() {
        let (_dir, mut params) = fake_project();
        params.platforms = vec![Platform::Macos];
        params.target_version = "0.68.2".to_string();

        let config = gather_config(&params).unwrap();
        assert_eq!(config.dependencies["react-native-macos"], "^0.68.0");
        assert!(config.files.contains_key("macos/Podfile"));
    }

    #[test]
    fn test_init_adds_bootstrap_files() {
        let (_dir, mut params) = fake_project();
        params.init = true;
        let config = gather_config(&params).unwrap();

        assert!(config.files.contains_key("App.tsx"));
        assert!(config.files.contains_key("tsconfig.json"));
        match &config.files["app.json"] {
            FileEntry::Content(content) => assert!(content.contains("\"displayName\": \"Example\"")),
            FileEntry::Copy { .. } => panic!("expected literal app manifest"),
        }
        match &config.files["package.json"] {
            FileEntry::Content(content) => assert!(content.contains("\"name\": \"Example\"")),
            FileEntry::Copy { .. } => panic!("expected templated package manifest"),
        }
    }

    #[test]
    fn test_old_gradle_pinned_below_0_73() {
        let (_dir, mut params) = fake_project();
        params.platforms = vec![Platform::Android];
        params.target_version = "0.72.0".to_string();
        let config = gather_config(&params).unwrap();

        match &config.files["android/gradle/wrapper/gradle-wrapper.properties"] {
            FileEntry::Content(content) => assert!(content.contains("gradle-7.6.4-bin.zip")),
            FileEntry::Copy { .. } => panic!("expected patched wrapper properties"),
        }

        params.target_version = "0.73.0".to_string();
        let config = gather_config(&params).unwrap();
        match &config.files["android/gradle/wrapper/gradle-wrapper.properties"] {
            FileEntry::Content(content) => assert!(content.contains("gradle-8.8-bin.zip")),
            FileEntry::Copy { .. } => panic!("expected unpatched wrapper properties"),
        }
    }

    #[test]
    fn test_get_app_name_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = ProjectContext::new();
        assert_eq!(get_app_name(&mut context, dir.path()), "ReactTestApp");

        write(&dir.path().join(APP_JSON), r#"{ "name": "Example" }"#);
        // A fresh context sees the new manifest; the old one kept its miss.
        assert_eq!(
            get_app_name(&mut ProjectContext::new(), dir.path()),
            "Example"
        );
    }

    #[test]
    fn test_is_destructive_reports_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::default();
        config
            .files
            .insert("Podfile".to_string(), FileEntry::Content(String::new()));
        config.old_files.push("Podfile.lock".to_string());

        assert!(!is_destructive(dir.path(), &config));

        write(&dir.path().join("Podfile.lock"), "");
        assert!(is_destructive(dir.path(), &config));
    }

    #[tokio::test]
    async fn test_configure_writes_and_removes_files() {
        let (dir, mut params) = fake_project();
        params.force = true;
        write(
            &dir.path().join("package.json"),
            r#"{ "name": "example", "scripts": { "start": "old" }, "dependencies": {} }"#,
        );
        write(&dir.path().join("ios/Podfile.lock"), "stale");

        let code = configure(&params).await.unwrap();
        assert_eq!(code, 0);

        assert!(dir.path().join("ios/Podfile").exists());
        assert!(!dir.path().join("ios/Podfile.lock").exists());

        let manifest = read_json_file(&dir.path().join("package.json")).unwrap();
        assert_eq!(manifest["scripts"]["start"], "react-native start");
        assert_eq!(manifest["scripts"]["ios"], "react-native run-ios");
        assert_eq!(manifest["devDependencies"]["@rnx-kit/metro-config"], "^2.0.0");
        assert_eq!(
            manifest["devDependencies"][TOOLKIT_PACKAGE_NAME],
            json!(format!("^{}", env!("CARGO_PKG_VERSION")))
        );

        // Keys end up sorted.
        let scripts: Vec<_> = manifest["scripts"].as_object().unwrap().keys().collect();
        let mut sorted = scripts.clone();
        sorted.sort();
        assert_eq!(scripts, sorted);
    }

    #[tokio::test]
    async fn test_configure_refuses_destructive_without_force() {
        let (dir, params) = fake_project();
        write(&dir.path().join("ios/Podfile"), "existing");

        let code = configure(&params).await.unwrap();
        assert_eq!(code, 1);
        // The existing file was not touched.
        assert_eq!(
            fs::read_to_string(dir.path().join("ios/Podfile")).unwrap(),
            "existing"
        );
    }

    #[tokio::test]
    async fn test_configure_without_package_manifest_warns_and_succeeds() {
        let (_dir, params) = fake_project();
        let code = configure(&params).await.unwrap();
        assert_eq!(code, 0);
    }
}

//! Windows MSBuild project assembly
//!
//! Computes the feature set for the installed `react-native-windows`
//! version, resolves manifest resources into MSBuild content items and
//! Visual Studio filter groups, discovers transitive NuGet dependencies
//! from linked native projects, and stages the solution under the
//! disposable `.generated/windows/` directory.

use crate::console;
use crate::manifest::{find_file, read_json_file, APP_JSON};
use crate::tool::{run_command, run_command_checked, DEFAULT_TOOL_TIMEOUT};
use crate::version::{to_version_number, Capabilities};
use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Namespace for deterministic Visual Studio filter identifiers. Stable so
/// re-running the generator produces identical project files.
const UNIQUE_FILTER_NAMESPACE: &str = "e48dc53e-40b1-40cb-970a-f89935452892";

const DEFAULT_APP_NAME: &str = "ReactTestApp";
const DEFAULT_APPX_MANIFEST: &str = "windows/Package.appxmanifest";

/// Options accepted by the solution generator.
#[derive(Debug, Clone, Default)]
pub struct MsBuildProjectOptions {
    pub use_fabric: bool,
    /// `None` defers to the version default
    pub use_hermes: Option<bool>,
    pub use_nuget: bool,
}

/// MSBuild fragments computed from the manifest's resource lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assets {
    pub asset_items: String,
    pub asset_item_filters: String,
    pub asset_filters: String,
}

/// Application bundle descriptor; rebuilt every run.
#[derive(Debug, Clone)]
pub struct AppxBundle {
    pub app_name: String,
    pub single_app: Option<String>,
    pub appx_manifest: String,
    pub package_certificate: String,
    pub assets: Assets,
}

/// Everything the project templates need to know about the target.
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub version: String,
    pub version_number: u32,
    pub bundle: AppxBundle,
    pub hermes_version: Option<String>,
    pub nuget_dependencies: Vec<(String, String)>,
    pub use_experimental_nuget: bool,
    pub use_fabric: bool,
    pub use_package_references: bool,
    pub xaml_version: &'static str,
}

/// MSBuild wants backslashes regardless of host platform.
fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut last_was_separator = false;
    for c in path.chars() {
        if c == '/' || c == '\\' {
            if !last_was_separator {
                normalized.push('\\');
            }
            last_was_separator = true;
        } else {
            normalized.push(c);
            last_was_separator = false;
        }
    }
    normalized
}

/// Computes `path` relative to `base` by stripping the common prefix.
fn relative_path(base: &Path, path: &Path) -> PathBuf {
    let base_components: Vec<Component> = base.components().collect();
    let path_components: Vec<Component> = path.components().collect();

    let common = base_components
        .iter()
        .zip(path_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component);
    }
    relative
}

/// Returns the path to an asset relative to the project, normalized for
/// MSBuild.
fn project_relative_path(project_path: &Path, asset_path: &Path) -> String {
    let relative = if asset_path.is_absolute() {
        relative_path(project_path, asset_path)
    } else {
        asset_path.to_path_buf()
    };
    normalize_path(&relative.to_string_lossy())
}

fn generate_certificate_items(windows: &Value, project_path: &Path) -> String {
    let mut items = Vec::new();
    if let Some(key_file) = windows.get("certificateKeyFile").and_then(Value::as_str) {
        items.push("<AppxPackageSigningEnabled>true</AppxPackageSigningEnabled>".to_string());
        items.push(format!(
            "<PackageCertificateKeyFile>$(ProjectRootDir)\\{}</PackageCertificateKeyFile>",
            project_relative_path(project_path, Path::new(key_file))
        ));
    }
    if let Some(thumbprint) = windows.get("certificateThumbprint").and_then(Value::as_str) {
        items.push(format!(
            "<PackageCertificateThumbprint>{}</PackageCertificateThumbprint>",
            thumbprint
        ));
    }
    if let Some(password) = windows.get("certificatePassword").and_then(Value::as_str) {
        items.push(format!(
            "<PackageCertificatePassword>{}</PackageCertificatePassword>",
            password
        ));
    }
    items.join("\n    ")
}

#[derive(Default)]
struct AssetItems {
    asset_filters: Vec<String>,
    asset_item_filters: Vec<String>,
    asset_items: Vec<String>,
}

fn generate_content_items(
    resources: &[PathBuf],
    project_path: &Path,
    assets: &mut AssetItems,
    current_filter: &str,
    source: Option<&Path>,
) {
    let namespace = Uuid::parse_str(UNIQUE_FILTER_NAMESPACE).expect("valid namespace UUID");

    for resource in resources {
        let resource_path = if resource.is_absolute() {
            relative_path(project_path, resource)
        } else {
            resource.clone()
        };
        let full_path = project_path.join(&resource_path);
        if !full_path.exists() {
            console::warn(&format!("Resource not found: {}", resource.display()));
            continue;
        }

        if full_path.is_dir() {
            let nested = match source {
                Some(source) => relative_path(source, &resource_path),
                None => resource_path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_default(),
            };
            let filter = format!(
                "Assets\\{}",
                normalize_path(&nested.to_string_lossy())
            );
            let id = Uuid::new_v5(&namespace, filter.as_bytes());
            assets.asset_filters.push(format!("<Filter Include=\"{}\">", filter));
            assets
                .asset_filters
                .push(format!("  <UniqueIdentifier>{{{}}}</UniqueIdentifier>", id));
            assets.asset_filters.push("</Filter>".to_string());

            let mut entries: Vec<PathBuf> = match fs::read_dir(&full_path) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .map(|e| resource_path.join(e.file_name()))
                    .collect(),
                Err(_) => Vec::new(),
            };
            entries.sort();

            let source = source
                .map(Path::to_path_buf)
                .unwrap_or_else(|| resource_path.parent().unwrap_or(Path::new("")).to_path_buf());
            generate_content_items(&entries, project_path, assets, &filter, Some(&source));
        } else {
            let asset_path = project_relative_path(project_path, &full_path);

            // Bundled directory structure must be preserved below
            // `$(OutDir)\Bundle`, mirroring the layout under the source.
            let destination = match source {
                Some(source) => {
                    let parent = resource_path.parent().unwrap_or(Path::new(""));
                    format!(
                        "\\{}",
                        normalize_path(&relative_path(source, parent).to_string_lossy())
                    )
                }
                None => String::new(),
            };
            assets.asset_items.push(format!(
                "<CopyFileToFolders Include=\"$(ProjectRootDir)\\{}\">",
                asset_path
            ));
            assets.asset_items.push(format!(
                "  <DestinationFolders>$(OutDir)\\Bundle{}</DestinationFolders>",
                destination
            ));
            assets.asset_items.push("</CopyFileToFolders>".to_string());

            assets.asset_item_filters.push(format!(
                "<CopyFileToFolders Include=\"$(ProjectRootDir)\\{}\">",
                asset_path
            ));
            assets
                .asset_item_filters
                .push(format!("  <Filter>{}</Filter>", current_filter));
            assets
                .asset_item_filters
                .push("</CopyFileToFolders>".to_string());
        }
    }
}

/// Resolves the manifest's resource declarations into MSBuild fragments.
pub fn parse_resources(resources: Option<&Value>, project_path: &Path) -> Assets {
    let paths: Vec<PathBuf> = match resources {
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_str)
            .map(PathBuf::from)
            .collect(),
        Some(Value::Object(map)) => {
            return parse_resources(map.get("windows"), project_path);
        }
        _ => return Assets::default(),
    };

    let mut assets = AssetItems::default();
    generate_content_items(&paths, project_path, &mut assets, "Assets", None);

    Assets {
        asset_items: assets.asset_items.join("\n    "),
        asset_item_filters: assets.asset_item_filters.join("\n    "),
        asset_filters: assets.asset_filters.join("\n    "),
    }
}

/// Reads the manifest and resolves paths to bundle resources, falling back
/// to defaults when the manifest is missing or malformed.
pub fn get_bundle_resources(manifest_path: Option<&Path>) -> AppxBundle {
    if let Some(manifest_path) = manifest_path {
        match read_json_file(manifest_path) {
            Ok(manifest) => {
                let project_path = manifest_path.parent().unwrap_or(Path::new("")).to_path_buf();
                let windows = manifest.get("windows").cloned().unwrap_or(Value::Null);
                let appx_manifest = windows
                    .get("appxManifest")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_APPX_MANIFEST);
                return AppxBundle {
                    app_name: manifest
                        .get("name")
                        .and_then(Value::as_str)
                        .filter(|name| !name.is_empty())
                        .unwrap_or(DEFAULT_APP_NAME)
                        .to_string(),
                    single_app: manifest
                        .get("singleApp")
                        .and_then(Value::as_str)
                        .map(String::from),
                    appx_manifest: project_relative_path(
                        &project_path,
                        Path::new(appx_manifest),
                    ),
                    package_certificate: generate_certificate_items(&windows, &project_path),
                    assets: parse_resources(manifest.get("resources"), &project_path),
                };
            }
            Err(e) => {
                console::warn(&format!("Could not parse '{}':\n{}", APP_JSON, e));
            }
        }
    } else {
        console::warn(&format!("Could not find '{}' file.", APP_JSON));
    }

    AppxBundle {
        app_name: DEFAULT_APP_NAME.to_string(),
        single_app: None,
        appx_manifest: DEFAULT_APPX_MANIFEST.to_string(),
        package_certificate: String::new(),
        assets: Assets::default(),
    }
}

/// Returns the version of Hermes that should be installed.
pub fn get_hermes_version(rnw_path: &Path) -> Result<String> {
    let props_path = rnw_path.join("PropertySheets/JSEngine.props");
    let props = fs::read_to_string(&props_path)
        .with_context(|| format!("Failed to read {}", props_path.display()))?;
    Regex::new(r"<HermesVersion.*?>(.+?)</HermesVersion>")
        .expect("valid regex")
        .captures(&props)
        .map(|m| m[1].to_string())
        .ok_or_else(|| anyhow::anyhow!("Failed to determine Hermes version"))
}

/// Finds NuGet dependencies of linked native projects.
///
/// Visual Studio does not download transitive dependencies for us, so each
/// linked project's `PackageReference` entries are collected, deduplicated
/// case-insensitively by package id, minus the packages this toolkit
/// already manages through its own `packages.config`.
pub fn get_nuget_dependencies(
    dependency_projects: &[PathBuf],
    managed_packages_config: Option<&Path>,
) -> Vec<(String, String)> {
    let tag = Regex::new(r"(?is)<PackageReference\b[^>]*>").expect("valid regex");
    let include = Regex::new(r#"(?i)include\s*=\s*"([^"]+)""#).expect("valid regex");
    let version = Regex::new(r#"(?i)version\s*=\s*"([^"]+)""#).expect("valid regex");

    let mut package_refs: HashMap<String, (String, String)> = HashMap::new();
    for project in dependency_projects {
        let Ok(content) = fs::read_to_string(project) else {
            continue;
        };
        for reference in tag.find_iter(&content) {
            let reference = reference.as_str();
            let (Some(id), Some(ver)) = (
                include.captures(reference).map(|m| m[1].to_string()),
                version.captures(reference).map(|m| m[1].to_string()),
            ) else {
                continue;
            };
            package_refs.insert(id.to_lowercase(), (id, ver));
        }
    }

    if let Some(config) = managed_packages_config {
        if let Ok(content) = fs::read_to_string(config) {
            let managed = Regex::new(r#"package id="(.+?)""#).expect("valid regex");
            for m in managed.captures_iter(&content) {
                package_refs.remove(&m[1].to_lowercase());
            }
        }
    }

    let mut dependencies: Vec<_> = package_refs.into_values().collect();
    dependencies.sort();
    dependencies
}

/// Maps NuGet dependencies to `<Import>` elements.
pub fn import_targets(refs: &[(String, String)]) -> String {
    refs.iter()
        .map(|(id, version)| {
            format!(
                "<Import Project=\"$(SolutionDir)packages\\{0}.{1}\\build\\native\\{0}.targets\" Condition=\"Exists('$(SolutionDir)packages\\{0}.{1}\\build\\native\\{0}.targets')\" />",
                id, version
            )
        })
        .collect::<Vec<_>>()
        .join("\n    ")
}

/// Returns a `packages.config` entry for the given package.
pub fn nuget_package(id: &str, version: &str) -> String {
    format!(
        "<package id=\"{}\" version=\"{}\" targetFramework=\"native\"/>",
        id, version
    )
}

/// Computes the project feature set from the installed framework version.
pub fn project_info(
    options: &MsBuildProjectOptions,
    rnw_path: &Path,
    dest_path: &Path,
    dependency_projects: &[PathBuf],
) -> Result<ProjectInfo> {
    let version = read_json_file(&rnw_path.join("package.json"))?
        .get("version")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("Invalid `react-native-windows` package manifest"))?;
    let version_number = to_version_number(&version);
    let capabilities = Capabilities::for_version(version_number);

    let new_arch = options.use_fabric && capabilities.new_architecture;
    if options.use_fabric && !new_arch {
        console::warn("New Architecture requires `react-native-windows` 0.74+");
    }

    let use_hermes = new_arch || options.use_hermes.unwrap_or(capabilities.hermes_by_default);
    let hermes_version = if use_hermes {
        Some(get_hermes_version(rnw_path)?)
    } else {
        None
    };

    let managed_config = rnw_path.join("../react-native-test-app/windows/UWP/packages.config");
    Ok(ProjectInfo {
        version,
        version_number,
        bundle: get_bundle_resources(find_file(APP_JSON, dest_path).as_deref()),
        hermes_version,
        nuget_dependencies: get_nuget_dependencies(
            dependency_projects,
            managed_config.exists().then_some(managed_config.as_path()),
        ),
        use_experimental_nuget: !new_arch && options.use_nuget,
        use_fabric: new_arch,
        use_package_references: capabilities.package_references,
        xaml_version: capabilities.xaml_version,
    })
}

/// Queries the framework CLI for linked native project files.
pub async fn dependency_project_files(project_directory: &Path) -> Vec<PathBuf> {
    let output = match run_command(
        "npx",
        &["--yes", "react-native", "config"],
        Some(project_directory),
        DEFAULT_TOOL_TIMEOUT,
    )
    .await
    {
        Ok(output) if output.success() => output,
        _ => {
            console::warn("Unable to determine autolinked dependencies");
            return Vec::new();
        }
    };

    let Ok(config) = serde_json::from_str::<Value>(&output.stdout) else {
        console::warn("Unable to parse `react-native config` output");
        return Vec::new();
    };

    let Some(dependencies) = config.get("dependencies").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut projects = Vec::new();
    for dependency in dependencies.values() {
        let root = dependency.get("root").and_then(Value::as_str).unwrap_or("");
        let Some(windows) = dependency
            .get("platforms")
            .and_then(|platforms| platforms.get("windows"))
        else {
            continue;
        };
        let source_dir = windows.get("sourceDir").and_then(Value::as_str).unwrap_or(".");
        let Some(project_files) = windows.get("projects").and_then(Value::as_array) else {
            continue;
        };
        for project in project_files {
            if let Some(file) = project.get("projectFile").and_then(Value::as_str) {
                projects.push(Path::new(root).join(source_dir).join(file));
            }
        }
    }
    projects
}

/// Parameters for the Windows solution generator.
#[derive(Debug, Clone)]
pub struct SolutionParams {
    pub project_directory: PathBuf,
    pub test_app_path: PathBuf,
    pub options: MsBuildProjectOptions,
    pub autolink: bool,
}

fn apply_replacements(text: &str, replacements: &[(&str, String)]) -> String {
    let mut result = text.to_string();
    for (placeholder, value) in replacements {
        result = result.replace(placeholder, value);
    }
    result
}

const TEXT_TEMPLATE_EXTENSIONS: &[&str] = &[
    "sln", "vcxproj", "filters", "props", "targets", "config", "xml", "h", "cpp", "idl",
    "appxmanifest",
];

fn stage_project_files(
    template_dir: &Path,
    destination: &Path,
    replacements: &[(&str, String)],
) -> Result<()> {
    for entry in walkdir::WalkDir::new(template_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let relative = relative_path(template_dir, entry.path());
        let dest = destination.join(&relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
            continue;
        }

        let is_template = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEXT_TEMPLATE_EXTENSIONS.contains(&ext));
        if is_template {
            let content = fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            fs::write(&dest, apply_replacements(&content, replacements))
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        } else {
            fs::copy(entry.path(), &dest)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

/// Stages the Windows solution for the target project.
///
/// Returns the process exit code: 2 when a prerequisite directory is
/// missing, 0 on success.
pub async fn generate_windows_solution(params: &SolutionParams) -> Result<i32> {
    let project_directory = &params.project_directory;
    if !project_directory.is_dir() {
        console::error(&format!(
            "Directory not found: {}",
            project_directory.display()
        ));
        return Ok(2);
    }

    let Some(rnw_path) = find_file("node_modules/react-native-windows", project_directory) else {
        console::error("A supported version of `react-native-windows` was not found");
        return Ok(2);
    };

    let template_dir = params.test_app_path.join("windows/ReactTestApp");
    if !template_dir.is_dir() {
        anyhow::bail!("Failed to find the Windows project template");
    }

    let dependency_projects = dependency_project_files(project_directory).await;
    let info = project_info(&params.options, &rnw_path, project_directory, &dependency_projects)?;

    let node_modules = rnw_path.parent().unwrap_or(project_directory);
    let destination = node_modules.join(".generated/windows");
    fs::create_dir_all(&destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;

    let replacements: Vec<(&str, String)> = vec![
        ("$(ReactTestAppAppName)", info.bundle.app_name.clone()),
        ("$(ReactTestAppAppxManifest)", info.bundle.appx_manifest.clone()),
        (
            "$(ReactTestAppPackageCertificate)",
            info.bundle.package_certificate.clone(),
        ),
        ("$(ReactTestAppAssetItems)", info.bundle.assets.asset_items.clone()),
        (
            "$(ReactTestAppAssetItemFilters)",
            info.bundle.assets.asset_item_filters.clone(),
        ),
        ("$(ReactTestAppAssetFilters)", info.bundle.assets.asset_filters.clone()),
        ("$(ReactTestAppXamlVersion)", info.xaml_version.to_string()),
        (
            "$(ReactTestAppHermesVersion)",
            info.hermes_version.clone().unwrap_or_default(),
        ),
        (
            "$(ReactTestAppImportTargets)",
            import_targets(&info.nuget_dependencies),
        ),
        (
            "$(ReactTestAppUseFabric)",
            info.use_fabric.to_string(),
        ),
    ];
    stage_project_files(&template_dir, &destination, &replacements)?;

    if !info.use_package_references {
        let mut packages: Vec<String> =
            vec![nuget_package("Microsoft.UI.Xaml", info.xaml_version)];
        if let Some(hermes_version) = &info.hermes_version {
            packages.push(nuget_package("ReactNative.Hermes.Windows", hermes_version));
        }
        for (id, version) in &info.nuget_dependencies {
            packages.push(nuget_package(id, version));
        }
        let config = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<packages>\n  {}\n</packages>\n",
            packages.join("\n  ")
        );
        fs::write(destination.join("packages.config"), config)
            .with_context(|| "Failed to write packages.config")?;
    }

    if params.autolink {
        run_command_checked(
            "npx",
            &["--yes", "react-native", "autolink-windows", "--proj", "windows"],
            Some(project_directory),
            DEFAULT_TOOL_TIMEOUT,
        )
        .await?;
    }

    println!("{}", destination.display());
    Ok(0)
}

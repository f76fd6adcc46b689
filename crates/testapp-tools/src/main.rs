use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use testapp_core::codegen::embed::{embed, EmbedTarget};
use testapp_core::codegen::models::{generate_models, CppModels, KotlinModels, SwiftModels};
use testapp_core::config::platforms::default_platform_package_name;
use testapp_core::config::{package_version, TOOLKIT_PACKAGE_NAME};
use testapp_core::manifest::{
    docs, find_file, generate_schema, validate, ProjectContext, Schema, APP_JSON,
};
use testapp_core::platform::windows::{
    generate_windows_solution, MsBuildProjectOptions, SolutionParams,
};
use testapp_core::platform::{android, apple};
use testapp_core::version::to_version_number;
use testapp_core::{configure, console, get_app_name, ConfigureParams, Platform};

#[derive(Parser, Debug)]
#[command(name = "rn-test-app")]
#[command(about = "Configures native test-app projects from an app manifest")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure the test app in an existing package
    Configure(ConfigureArgs),
    /// Initialize a new project
    Init(ConfigureArgs),
    /// Validate the app manifest
    Validate(ValidateArgs),
    /// Write the manifest JSON Schema
    GenerateSchema(GenerateSchemaArgs),
    /// Write the native manifest data models
    GenerateModels(GenerateModelsArgs),
    /// Generate the embedded-manifest source for one platform
    EmbedManifest(EmbedManifestArgs),
    /// Emit the CocoaPods glue for an Apple platform
    Apple(AppleArgs),
    /// Emit the Gradle glue for Android
    Android(AndroidArgs),
    /// Generate the Windows solution
    Windows(WindowsArgs),
}

#[derive(Parser, Debug)]
struct ConfigureArgs {
    /// App name; defaults to the name in the app manifest
    name: Option<String>,

    /// Platforms to configure
    #[arg(short, long, value_delimiter = ',', value_parser = parse_platform)]
    platforms: Option<Vec<Platform>>,

    /// Flatten the directory structure (when only one platform is selected)
    #[arg(long)]
    flatten: bool,

    /// Allow destructive operations
    #[arg(short, long)]
    force: bool,

    /// Initialize a new project
    #[arg(long)]
    init: bool,

    /// Path of the package to modify (defaults to current directory)
    #[arg(long, default_value = ".")]
    package: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Directory to search for the app manifest (defaults to current directory)
    #[arg(long, default_value = ".")]
    package: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateSchemaArgs {
    /// Output path
    #[arg(short, long, default_value = "schema.json")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateModelsArgs {
    /// Directory to write `Manifest.kt`, `Manifest.swift`, and `Manifest.h`
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmbedPlatform {
    Android,
    Apple,
    Windows,
}

#[derive(Parser, Debug)]
struct EmbedManifestArgs {
    /// Target platform language
    #[arg(long, value_enum)]
    platform: EmbedPlatform,

    /// Project root to search for the app manifest
    #[arg(long, default_value = ".")]
    project_root: PathBuf,
}

#[derive(Parser, Debug)]
struct AppleArgs {
    /// Apple platform to set up
    #[arg(long, value_parser = parse_platform, default_value = "ios")]
    platform: Platform,

    /// Project root to search for the app manifest
    #[arg(long, default_value = ".")]
    project_root: PathBuf,
}

#[derive(Parser, Debug)]
struct AndroidArgs {
    /// Project root to search for the app manifest
    #[arg(long, default_value = ".")]
    project_root: PathBuf,
}

#[derive(Parser, Debug)]
struct WindowsArgs {
    /// Target project directory
    #[arg(long, default_value = ".")]
    project_directory: PathBuf,

    /// Enable the New Architecture (Fabric)
    #[arg(long)]
    use_fabric: bool,

    /// Use Hermes instead of the version default
    #[arg(long)]
    use_hermes: bool,

    /// Use the experimental NuGet dependency mode
    #[arg(long)]
    use_nuget: bool,

    /// Run autolinking after generating the solution
    #[arg(long)]
    autolink: bool,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse::<Platform>().map_err(|e| e.to_string())
}

/// Environment opt-in flags are read once at the point of decision.
fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name) {
        Ok(value) => Some(value == "1" || value.eq_ignore_ascii_case("true")),
        Err(_) => None,
    }
}

fn configure_params(args: &ConfigureArgs, init: bool) -> Result<ConfigureParams> {
    let package_path = args.package.clone();

    let Some(test_app_path) = find_file(
        &format!("node_modules/{}", TOOLKIT_PACKAGE_NAME),
        &package_path,
    ) else {
        anyhow::bail!(
            "Failed to find `{}` — make sure you've installed npm dependencies",
            TOOLKIT_PACKAGE_NAME
        );
    };

    let Some(target_version) = package_version("react-native", &package_path) else {
        anyhow::bail!("Failed to determine the installed `react-native` version");
    };

    let name = match &args.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => get_app_name(&mut ProjectContext::new(), &package_path),
    };

    Ok(ConfigureParams {
        name,
        package_path,
        test_app_path,
        template_path: None,
        target_version,
        platforms: args
            .platforms
            .clone()
            .unwrap_or_else(|| Platform::DEFAULT.to_vec()),
        flatten: args.flatten,
        force: args.force,
        init,
    })
}

fn load_schema() -> Schema {
    generate_schema(&docs())
}

async fn run(command: Command) -> Result<i32> {
    match command {
        Command::Configure(args) => {
            let params = configure_params(&args, args.init)?;
            configure(&params).await
        }
        Command::Init(args) => {
            let params = configure_params(&args, true)?;
            configure(&params).await
        }
        Command::Validate(args) => {
            let manifest_path = find_file(APP_JSON, &args.package);
            match validate(manifest_path.as_deref(), &load_schema()) {
                Ok(_) => Ok(0),
                Err(code) => Ok(code),
            }
        }
        Command::GenerateSchema(args) => {
            std::fs::write(&args.output, load_schema().to_json())?;
            println!("Wrote {}", args.output.display());
            Ok(0)
        }
        Command::GenerateModels(args) => {
            let schema = load_schema();
            let outputs = [
                ("Manifest.kt", generate_models(&schema, &KotlinModels)),
                ("Manifest.swift", generate_models(&schema, &SwiftModels)),
                ("Manifest.h", generate_models(&schema, &CppModels)),
            ];
            std::fs::create_dir_all(&args.output_dir)?;
            for (filename, code) in outputs {
                let dest = args.output_dir.join(filename);
                // Leave untouched files alone so build systems don't see
                // spurious changes.
                if std::fs::read_to_string(&dest).map(|c| c == code).unwrap_or(false) {
                    continue;
                }
                std::fs::write(&dest, code)?;
                println!("Wrote {}", dest.display());
            }
            Ok(0)
        }
        Command::EmbedManifest(args) => {
            let target = match args.platform {
                EmbedPlatform::Android => EmbedTarget::Android,
                EmbedPlatform::Apple => EmbedTarget::Apple,
                EmbedPlatform::Windows => EmbedTarget::Windows,
            };
            Ok(embed(target, &args.project_root, &load_schema()))
        }
        Command::Apple(args) => {
            if !matches!(
                args.platform,
                Platform::Ios | Platform::Macos | Platform::Visionos
            ) {
                anyhow::bail!("Not an Apple platform: {}", args.platform);
            }

            let react_native = apple::find_react_native(&args.project_root, args.platform)?;
            let package = default_platform_package_name(args.platform);
            let Some(version) = package_version(package, &args.project_root) else {
                anyhow::bail!("Failed to determine the installed `{}` version", package);
            };
            let shim = apple::react_native_pods(to_version_number(&version))?;

            println!("react-native={}", react_native.display());
            println!("include={}", shim);
            if let Some(pod_dir) = apple::resources_pod(&args.project_root, args.platform)? {
                println!("resources-pod={}", pod_dir.display());
            }

            let mut context = ProjectContext::new();
            if let Some(platform_config) = context
                .app_manifest(&args.project_root)
                .and_then(|manifest| manifest.get(args.platform.name()))
            {
                for (setting, value) in apple::build_settings(platform_config) {
                    println!("{}={}", setting, value);
                }
            }
            Ok(0)
        }
        Command::Android(args) => {
            let mut context = ProjectContext::new();
            let Some(manifest) = context.app_manifest(&args.project_root) else {
                console::error(&format!(
                    "Failed to find '{}'. Please make sure you're in the right directory.",
                    APP_JSON
                ));
                return Ok(1);
            };

            if let Some(android_config) = manifest.get("android") {
                if let Some(application_id) = android::application_id(android_config) {
                    println!("applicationId={}", application_id);
                }
                if let Some(version_code) = android::version_code(android_config) {
                    println!("versionCode={}", version_code);
                }
                if let Some(block) =
                    android::signing_configs_gradle(android_config, &args.project_root)
                {
                    println!("{}", block);
                }
            }
            Ok(0)
        }
        Command::Windows(args) => {
            let use_fabric =
                args.use_fabric || env_flag("RCT_NEW_ARCH_ENABLED").unwrap_or(false);
            let use_hermes = if args.use_hermes {
                Some(true)
            } else {
                env_flag("USE_HERMES")
            };

            let Some(test_app_path) = find_file(
                &format!("node_modules/{}", TOOLKIT_PACKAGE_NAME),
                &args.project_directory,
            ) else {
                console::error(&format!(
                    "Failed to find `{}` — make sure you've installed npm dependencies",
                    TOOLKIT_PACKAGE_NAME
                ));
                return Ok(2);
            };

            let params = SolutionParams {
                project_directory: args.project_directory,
                test_app_path,
                options: MsBuildProjectOptions {
                    use_fabric,
                    use_hermes,
                    use_nuget: args.use_nuget,
                },
                autolink: args.autolink,
            };
            generate_windows_solution(&params).await
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let code = match run(args.command).await {
        Ok(code) => code,
        Err(e) => {
            console::error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(code);
}

//! Literal project-file templates
//!
//! Generated files locate the toolkit's own installation at build time by
//! walking up from the project root, so the same content works regardless
//! of hoisting.

use serde_json::json;

/// Converts a JSON value to a pretty string with a trailing newline.
pub fn serialize(value: &serde_json::Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_default();
    text.push('\n');
    text
}

/// Default app manifest for newly initialized projects.
pub fn app_manifest(name: &str) -> String {
    serialize(&json!({
        "name": name,
        "displayName": name,
        "components": [
            {
                "appKey": name,
                "displayName": name,
            }
        ],
        "resources": {
            "android": ["dist/res", "dist/main.android.jsbundle"],
            "ios": ["dist/assets", "dist/main.ios.jsbundle"],
            "macos": ["dist/assets", "dist/main.macos.jsbundle"],
            "windows": ["dist/assets", "dist/main.windows.bundle"],
        },
    }))
}

pub fn build_gradle() -> String {
    [
        "buildscript {",
        "    apply(from: {",
        "        def searchDir = rootDir.toPath()",
        "        do {",
        "            def p = searchDir.resolve(\"node_modules/react-native-test-app/android/dependencies.gradle\")",
        "            if (p.toFile().exists()) {",
        "                return p.toRealPath().toString()",
        "            }",
        "        } while (searchDir = searchDir.getParent())",
        "        throw new GradleException(\"Could not find `react-native-test-app`\");",
        "    }())",
        "",
        "    repositories {",
        "        mavenCentral()",
        "        google()",
        "    }",
        "",
        "    dependencies {",
        "        getReactNativeDependencies().each { dependency ->",
        "            classpath(dependency)",
        "        }",
        "    }",
        "}",
        "",
        "allprojects {",
        "    repositories {",
        "        maven {",
        "            // All of React Native (JS, Obj-C sources, Android binaries) is installed from npm",
        "            url({",
        "                def searchDir = rootDir.toPath()",
        "                do {",
        "                    def p = searchDir.resolve(\"node_modules/react-native/android\")",
        "                    if (p.toFile().exists()) {",
        "                        return p.toRealPath().toString()",
        "                    }",
        "                } while (searchDir = searchDir.getParent())",
        "                throw new GradleException(\"Could not find `react-native`\");",
        "            }())",
        "        }",
        "        mavenCentral()",
        "        google()",
        "    }",
        "}",
        "",
    ]
    .join("\n")
}

/// Podfile for Apple platforms; `prefix` selects the platform-specific
/// entry script, e.g. `"macos/"`.
pub fn podfile(name: &str, prefix: &str) -> String {
    [
        "ws_dir = Pathname.new(__dir__)".to_string(),
        "ws_dir = ws_dir.parent until".to_string(),
        format!(
            "  File.exist?(\"#{{ws_dir}}/node_modules/react-native-test-app/{}test_app.rb\") ||",
            prefix
        ),
        "  ws_dir.expand_path.to_s == '/'".to_string(),
        format!(
            "require \"#{{ws_dir}}/node_modules/react-native-test-app/{}test_app.rb\"",
            prefix
        ),
        String::new(),
        format!("workspace '{}.xcworkspace'", name),
        String::new(),
        "use_test_app!".to_string(),
        String::new(),
    ]
    .join("\n")
}

pub fn settings_gradle(name: &str) -> String {
    [
        "pluginManagement {".to_string(),
        "    repositories {".to_string(),
        "        gradlePluginPortal()".to_string(),
        "        mavenCentral()".to_string(),
        "        google()".to_string(),
        "    }".to_string(),
        "}".to_string(),
        String::new(),
        format!("rootProject.name = \"{}\"", name),
        String::new(),
        "apply(from: {".to_string(),
        "    def searchDir = rootDir.toPath()".to_string(),
        "    do {".to_string(),
        "        def p = searchDir.resolve(\"node_modules/react-native-test-app/test-app.gradle\")"
            .to_string(),
        "        if (p.toFile().exists()) {".to_string(),
        "            return p.toRealPath().toString()".to_string(),
        "        }".to_string(),
        "    } while (searchDir = searchDir.getParent())".to_string(),
        "    throw new GradleException(\"Could not find `react-native-test-app`\");".to_string(),
        "}())".to_string(),
        "applyTestAppSettings(settings)".to_string(),
        String::new(),
    ]
    .join("\n")
}

fn react_native_config_flat(platform_block: &str) -> String {
    [
        "const project = (() => {",
        "  try {",
        "    const { configureProjects } = require(\"react-native-test-app\");",
        "    return configureProjects({",
        platform_block,
        "    });",
        "  } catch (_) {",
        "    return undefined;",
        "  }",
        "})();",
        "",
        "module.exports = {",
        "  ...(project ? { project } : undefined),",
        "};",
        "",
    ]
    .join("\n")
}

pub fn react_native_config_android_flat() -> String {
    react_native_config_flat("      android: {\n        sourceDir: \".\",\n      },")
}

pub fn react_native_config_apple_flat() -> String {
    react_native_config_flat("      ios: {\n        sourceDir: \".\",\n      },")
}

pub fn react_native_config_windows_flat(name: &str) -> String {
    [
        "const project = (() => {".to_string(),
        "  try {".to_string(),
        "    const { configureProjects } = require(\"react-native-test-app\");".to_string(),
        "    return configureProjects({".to_string(),
        "      windows: {".to_string(),
        "        sourceDir: \".\",".to_string(),
        format!("        solutionFile: \"{}.sln\",", name),
        "      },".to_string(),
        "    });".to_string(),
        "  } catch (_) {".to_string(),
        "    return undefined;".to_string(),
        "  }".to_string(),
        "})();".to_string(),
        String::new(),
        "module.exports = {".to_string(),
        "  ...(project ? { project } : undefined),".to_string(),
        "  reactNativePath: \"node_modules/react-native-windows\",".to_string(),
        "};".to_string(),
        String::new(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_podfile_references_test_app() {
        let content = podfile("Example", "");
        assert!(content.contains("use_test_app!"));
        assert!(content.contains("workspace 'Example.xcworkspace'"));
        assert!(content.contains("node_modules/react-native-test-app/test_app.rb"));

        let macos = podfile("Example", "macos/");
        assert!(macos.contains("node_modules/react-native-test-app/macos/test_app.rb"));
    }

    #[test]
    fn test_app_manifest_declares_platform_resources() {
        let manifest: serde_json::Value =
            serde_json::from_str(&app_manifest("Example")).unwrap();
        assert_eq!(manifest["name"], "Example");
        assert_eq!(manifest["displayName"], "Example");
        assert_eq!(manifest["components"][0]["appKey"], "Example");
        assert_eq!(
            manifest["resources"]["android"][1],
            "dist/main.android.jsbundle"
        );
    }

    #[test]
    fn test_settings_gradle_sets_project_name() {
        let content = settings_gradle("Example");
        assert!(content.contains("rootProject.name = \"Example\""));
        assert!(content.contains("applyTestAppSettings(settings)"));
    }

    #[test]
    fn test_windows_flat_config_names_solution() {
        let content = react_native_config_windows_flat("Example");
        assert!(content.contains("solutionFile: \"Example.sln\","));
        assert!(content.contains("reactNativePath: \"node_modules/react-native-windows\","));
    }
}

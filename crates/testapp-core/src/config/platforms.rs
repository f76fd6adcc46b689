//! Supported platforms and their npm packages

use crate::console;
use anyhow::Result;
use indexmap::IndexMap;
use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;

/// Platforms that can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
    Macos,
    Visionos,
    Windows,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[
        Platform::Android,
        Platform::Ios,
        Platform::Macos,
        Platform::Visionos,
        Platform::Windows,
    ];

    /// Default set offered by `configure` (visionOS is opt-in).
    pub const DEFAULT: &'static [Platform] = &[
        Platform::Android,
        Platform::Ios,
        Platform::Macos,
        Platform::Windows,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Macos => "macos",
            Platform::Visionos => "visionos",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "macos" => Ok(Platform::Macos),
            "visionos" => Ok(Platform::Visionos),
            "windows" => Ok(Platform::Windows),
            _ => Err(anyhow::anyhow!("Unknown platform: {}", s)),
        }
    }
}

/// Version ranges of the out-of-tree platform packages this toolkit
/// supports, keyed by package name. `react-native` itself is assumed to
/// already be a dependency of the target project.
const PEER_DEPENDENCIES: &[(&str, &str)] = &[
    (
        "react-native-macos",
        "^0.64.0 || ^0.66.0 || ^0.68.0 || ^0.71.0 || ^0.73.0",
    ),
    (
        "react-native-windows",
        "^0.64.0 || ^0.65.0 || ^0.66.0 || ^0.67.0 || ^0.68.0 || ^0.69.0 || ^0.70.0 || ^0.71.0 || ^0.72.0 || ^0.73.0 || ^0.74.0",
    ),
    ("@callstack/react-native-visionos", "^0.73.0 || ^0.74.0"),
];

/// Returns the default npm package name for the specified platform.
pub fn default_platform_package_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Android | Platform::Ios => "react-native",
        Platform::Macos => "react-native-macos",
        Platform::Visionos => "@callstack/react-native-visionos",
        Platform::Windows => "react-native-windows",
    }
}

/// Coerces a possibly partial version string, dropping prerelease and
/// build metadata, e.g. `"0.68"` becomes 0.68.0.
fn coerce(version: &str) -> Option<Version> {
    let core = version.split(['-', '+']).next()?;

    let mut components = [None::<u64>; 3];
    for (i, part) in core.split('.').take(3).enumerate() {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        components[i] = digits.parse().ok();
    }

    components[0].map(|major| {
        Version::new(
            major,
            components[1].unwrap_or(0),
            components[2].unwrap_or(0),
        )
    })
}

/// Returns whether a version satisfies a `||`-separated range union.
fn satisfies(version: &Version, range: &str) -> bool {
    range.split("||").any(|part| {
        VersionReq::parse(part.trim()).is_ok_and(|req| req.matches(version))
    })
}

/// Returns the platform package pinned to the target version, if the
/// version range is satisfiable.
///
/// Platforms served by `react-native` itself yield an empty map. An
/// unsatisfiable version emits a single warning and yields `None`; the
/// dependency is omitted rather than the run failing.
pub fn get_platform_package(
    platform: Platform,
    target_version: &str,
) -> Result<Option<IndexMap<String, String>>> {
    let package_name = default_platform_package_name(platform);
    if package_name == "react-native" {
        return Ok(Some(IndexMap::new()));
    }

    let Some(version) = coerce(target_version) else {
        anyhow::bail!("Invalid {} version: {}", package_name, target_version);
    };

    let version_range = PEER_DEPENDENCIES
        .iter()
        .find(|(name, _)| *name == package_name)
        .map(|(_, range)| *range)
        .unwrap_or_default();
    if !satisfies(&version, version_range) {
        console::warn(&format!(
            "{}@{}.{} cannot be added because it does not exist or is unsupported",
            package_name, version.major, version.minor
        ));
        return Ok(None);
    }

    let mut dependencies = IndexMap::new();
    dependencies.insert(
        package_name.to_string(),
        format!("^{}.{}.0", version.major, version.minor),
    );
    Ok(Some(dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_names() {
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("visionos".parse::<Platform>().unwrap(), Platform::Visionos);
        assert!("tvos".parse::<Platform>().is_err());
    }

    #[test]
    fn test_satisfiable_platform_package() {
        let package = get_platform_package(Platform::Macos, "0.68.2")
            .unwrap()
            .unwrap();
        assert_eq!(package.len(), 1);
        assert_eq!(package["react-native-macos"], "^0.68.0");
    }

    #[test]
    fn test_unsatisfiable_platform_package_is_omitted() {
        assert_eq!(get_platform_package(Platform::Macos, "0.59").unwrap(), None);
        assert_eq!(
            get_platform_package(Platform::Visionos, "0.68.0").unwrap(),
            None
        );
    }

    #[test]
    fn test_react_native_platforms_add_nothing() {
        let package = get_platform_package(Platform::Ios, "0.73.0")
            .unwrap()
            .unwrap();
        assert!(package.is_empty());
        let package = get_platform_package(Platform::Android, "bogus")
            .unwrap()
            .unwrap();
        assert!(package.is_empty());
    }

    #[test]
    fn test_invalid_version_is_an_error() {
        assert!(get_platform_package(Platform::Macos, "main").is_err());
    }

    #[test]
    fn test_coerce_handles_partial_and_prerelease_versions() {
        assert_eq!(coerce("0.68"), Some(Version::new(0, 68, 0)));
        assert_eq!(coerce("0.74.0-rc.1"), Some(Version::new(0, 74, 0)));
        assert_eq!(coerce("main"), None);
    }

    #[test]
    fn test_windows_package_follows_target_minor() {
        let package = get_platform_package(Platform::Windows, "0.73.5")
            .unwrap()
            .unwrap();
        assert_eq!(package["react-native-windows"], "^0.73.0");
    }
}

//! Version numbers and version-gated capabilities

/// Builds a comparable version number from its components.
pub const fn v(major: u32, minor: u32, patch: u32) -> u32 {
    major * 1_000_000 + minor * 1_000 + patch
}

/// Converts a version string to a comparable number.
///
/// Prerelease and build metadata are ignored, and missing components count
/// as zero, e.g. `"0.0.0-rc.1"` is 0 and `"0.73"` equals `"0.73.0"`.
pub fn to_version_number(version: &str) -> u32 {
    let core = version
        .split(['-', '+'])
        .next()
        .unwrap_or_default();

    let mut components = [0u32; 3];
    for (i, part) in core.split('.').take(3).enumerate() {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        components[i] = digits.parse().unwrap_or(0);
    }

    v(components[0], components[1], components[2])
}

/// Feature set unlocked by a given framework version.
///
/// All version-gated behavior is resolved through this one table instead of
/// inline threshold comparisons at each call site. Version number 0 denotes
/// a nightly/dev build and resolves to the newest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Lowest version number this row applies to
    pub min_version: u32,
    /// New Architecture (Fabric) can be enabled
    pub new_architecture: bool,
    /// Hermes is the default JS engine
    pub hermes_by_default: bool,
    /// Native dependencies use `PackageReference` instead of `packages.config`
    pub package_references: bool,
    /// Project templates come from the community template package
    pub community_template: bool,
    /// Gradle 8.x wrapper is supported
    pub modern_gradle: bool,
    /// XAML package version to reference
    pub xaml_version: &'static str,
}

/// Ordered newest-first; resolution picks the first applicable row.
const CAPABILITY_TABLE: &[Capabilities] = &[
    Capabilities {
        min_version: v(0, 75, 0),
        new_architecture: true,
        hermes_by_default: true,
        package_references: true,
        community_template: true,
        modern_gradle: true,
        xaml_version: "2.8.0",
    },
    Capabilities {
        min_version: v(0, 74, 0),
        new_architecture: true,
        hermes_by_default: true,
        package_references: true,
        community_template: false,
        modern_gradle: true,
        xaml_version: "2.8.0",
    },
    Capabilities {
        min_version: v(0, 73, 0),
        new_architecture: false,
        hermes_by_default: true,
        package_references: true,
        community_template: false,
        modern_gradle: true,
        xaml_version: "2.8.0",
    },
    Capabilities {
        min_version: v(0, 68, 0),
        new_architecture: false,
        hermes_by_default: false,
        package_references: true,
        community_template: false,
        modern_gradle: false,
        xaml_version: "2.7.0",
    },
    Capabilities {
        min_version: v(0, 67, 0),
        new_architecture: false,
        hermes_by_default: false,
        package_references: false,
        community_template: false,
        modern_gradle: false,
        xaml_version: "2.7.0",
    },
    Capabilities {
        min_version: 0,
        new_architecture: false,
        hermes_by_default: false,
        package_references: false,
        community_template: false,
        modern_gradle: false,
        xaml_version: "2.6.0",
    },
];

impl Capabilities {
    /// Resolves the capability row for a version number.
    pub fn for_version(version_number: u32) -> &'static Capabilities {
        if version_number == 0 {
            return &CAPABILITY_TABLE[0];
        }

        CAPABILITY_TABLE
            .iter()
            .find(|row| version_number >= row.min_version)
            .unwrap_or(&CAPABILITY_TABLE[CAPABILITY_TABLE.len() - 1])
    }
}

//! Test App Core - manifest-driven native project generation
//!
//! This library generates and keeps in sync native project files (Xcode
//! projects, Gradle projects, Visual Studio solutions) for Android, iOS,
//! macOS, Windows, and visionOS from one declarative app manifest
//! (`app.json`).
//!
//! # Architecture
//!
//! The pipeline runs in layers:
//!
//! - **Manifest** - discovery, schema generation, validation
//! - **Codegen** - embedded-manifest emitters and native data models
//! - **Config** - the per-platform file/script/dependency computation
//! - **Platform** - materializers that stage native project trees
//!
//! The CLI binary (`rn-test-app`) wires these together; everything here is
//! callable as a library.

pub mod codegen;
pub mod config;
pub mod console;
pub mod manifest;
pub mod platform;
pub mod tool;
pub mod version;

// Re-export main types for convenience
pub use config::{
    configure, gather_config, get_app_name, merge_config, Configuration, ConfigureParams,
    FileEntry, Platform,
};
pub use manifest::{find_file, generate_schema, ProjectContext, Schema, APP_JSON};
pub use version::{to_version_number, Capabilities};

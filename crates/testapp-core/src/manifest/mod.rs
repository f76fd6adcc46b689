//! App manifest handling: discovery, schema, validation

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::{find_file, read_json_file, ProjectContext, APP_JSON};
pub use schema::{docs, generate_schema, Schema, SchemaNode, SchemaType};
pub use validate::{strip_build_props, validate, validate_manifest, ValidationError};

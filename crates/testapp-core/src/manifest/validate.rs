//! App manifest validation
//!
//! Validates a manifest against the generated schema, collecting every
//! violation instead of stopping at the first. On success the manifest is
//! stripped of build-only keys so the object embedded into the native
//! binary excludes configuration-only data.

use super::loader::{read_json_file, APP_JSON};
use super::schema::{Schema, SchemaNode, SchemaType};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Top-level keys that only exist for build/configuration purposes and are
/// removed before the manifest is re-embedded.
const BUILD_PROPS: &[&str] = &[
    "$schema",
    "android",
    "ios",
    "macos",
    "windows",
    "plugins",
    "resources",
];

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("must be {0}")]
    Type(&'static str),
    #[error("must have required property '{0}'")]
    RequiredProperty(String),
    #[error("must be equal to one of the allowed values")]
    Enum,
    #[error("must NOT have duplicate items (items ## {0} and {1} are identical)")]
    DuplicateItems(usize, usize),
    #[error("must match exactly one schema in oneOf")]
    OneOf,
}

/// A violation anchored at a JSON pointer into the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub pointer: String,
    pub violation: Violation,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.pointer.is_empty() {
            "<root>"
        } else {
            &self.pointer
        };
        write!(f, "{} {}", location, self.violation)
    }
}

fn type_name(ty: SchemaType) -> &'static str {
    match ty {
        SchemaType::Object => "object",
        SchemaType::Array => "array",
        SchemaType::String => "string",
    }
}

fn type_matches(ty: SchemaType, value: &Value) -> bool {
    match ty {
        SchemaType::Object => value.is_object(),
        SchemaType::Array => value.is_array(),
        SchemaType::String => value.is_string(),
    }
}

fn check(
    schema: &Schema,
    node: &SchemaNode,
    value: &Value,
    pointer: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(reference) = &node.reference {
        if let Some(resolved) = schema.resolve(reference) {
            check(schema, resolved, value, pointer, errors);
        }
        return;
    }

    if let Some(ty) = node.ty {
        if !type_matches(ty, value) {
            errors.push(ValidationError {
                pointer: pointer.to_string(),
                violation: Violation::Type(type_name(ty)),
            });
            return;
        }
    }

    for subschema in &node.all_of {
        check(schema, subschema, value, pointer, errors);
    }

    if !node.one_of.is_empty() {
        let mut branch_errors = Vec::new();
        let mut matches = 0;
        for branch in &node.one_of {
            let mut scratch = Vec::new();
            check(schema, branch, value, pointer, &mut scratch);
            if scratch.is_empty() {
                matches += 1;
            } else {
                branch_errors.append(&mut scratch);
            }
        }
        if matches != 1 {
            errors.append(&mut branch_errors);
            errors.push(ValidationError {
                pointer: pointer.to_string(),
                violation: Violation::OneOf,
            });
        }
    }

    if !node.enum_values.is_empty() {
        let accepted = value
            .as_str()
            .is_some_and(|s| node.enum_values.iter().any(|allowed| allowed == s));
        if !accepted {
            errors.push(ValidationError {
                pointer: pointer.to_string(),
                violation: Violation::Enum,
            });
        }
    }

    if let Some(object) = value.as_object() {
        for name in &node.required {
            if !object.contains_key(name) {
                errors.push(ValidationError {
                    pointer: pointer.to_string(),
                    violation: Violation::RequiredProperty(name.clone()),
                });
            }
        }

        for (name, property) in &node.properties {
            if let Some(child) = object.get(name) {
                check(schema, property, child, &format!("{}/{}", pointer, name), errors);
            }
        }
    }

    if let Some(items) = value.as_array() {
        if let Some(item_schema) = &node.items {
            for (i, item) in items.iter().enumerate() {
                check(schema, item_schema, item, &format!("{}/{}", pointer, i), errors);
            }
        }

        if node.unique_items {
            'outer: for i in 0..items.len() {
                for j in (i + 1)..items.len() {
                    if items[i] == items[j] {
                        errors.push(ValidationError {
                            pointer: pointer.to_string(),
                            violation: Violation::DuplicateItems(i, j),
                        });
                        break 'outer;
                    }
                }
            }
        }
    }
}

/// Validates a manifest value against the schema, returning all violations.
pub fn validate_manifest(manifest: &Value, schema: &Schema) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !manifest.is_object() {
        errors.push(ValidationError {
            pointer: String::new(),
            violation: Violation::Type("object"),
        });
        return Err(errors);
    }

    for subschema in &schema.all_of {
        check(schema, subschema, manifest, "", &mut errors);
    }
    if let Some(object) = manifest.as_object() {
        for (name, property) in &schema.properties {
            if let Some(child) = object.get(name) {
                check(schema, property, child, &format!("/{}", name), &mut errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Removes build-only top-level keys. Idempotent.
pub fn strip_build_props(manifest: &mut Value) {
    if let Some(object) = manifest.as_object_mut() {
        for key in BUILD_PROPS {
            object.shift_remove(*key);
        }
    }
}

/// Loads and validates the manifest at `manifest_path`.
///
/// Returns the manifest stripped of build-only keys, or a process exit
/// code: 1 when the manifest is missing or unreadable, `1000 + N` when
/// validation produced N errors. Every violation is reported on stderr as
/// `app.json: error: <pointer> <message>`.
pub fn validate(manifest_path: Option<&Path>, schema: &Schema) -> Result<Value, i32> {
    let Some(path) = manifest_path else {
        eprintln!(
            "Failed to find '{}'. Please make sure you're in the right directory.",
            APP_JSON
        );
        return Err(1);
    };

    let mut manifest = match read_json_file(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("{}: error: {}", path.display(), e);
            return Err(1);
        }
    };

    if let Err(errors) = validate_manifest(&manifest, schema) {
        eprintln!(
            "{}: error: {} is not a valid app manifest",
            path.display(),
            APP_JSON
        );
        for error in &errors {
            eprintln!("{}: error: {}", path.display(), error);
        }
        return Err(1000 + errors.len() as i32);
    }

    strip_build_props(&mut manifest);
    Ok(manifest)
}

//! Kotlin embedded-manifest emitter

use super::{number_literal, INDENT};
use serde_json::{Map, Value};

fn str(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(s) => format!("\"{}\"", s),
        None => "null".to_string(),
    }
}

fn array(items: &[Value], level: usize) -> String {
    if items.is_empty() {
        return "arrayListOf()".to_string();
    }

    let inner_indent = INDENT.repeat(level + 1);

    let mut lines = Vec::new();
    for value in items {
        match value {
            Value::Bool(b) => lines.push(format!("{}{}", inner_indent, b)),
            Value::Number(n) => lines.push(format!("{}{}", inner_indent, number_literal(n))),
            Value::String(_) => lines.push(format!("{}{}", inner_indent, str(Some(value)))),
            Value::Array(nested) => {
                lines.push(format!("{}{}", inner_indent, array(nested, level + 1)))
            }
            Value::Object(_) => {
                lines.push(format!("{}{}", inner_indent, bundle(Some(value), level + 1)))
            }
            Value::Null => lines.push(format!("{}null", inner_indent)),
        }
    }
    format!(
        "arrayListOf(\n{}\n{})",
        lines.join(",\n"),
        INDENT.repeat(level)
    )
}

fn bundle(props: Option<&Value>, level: usize) -> String {
    let Some(entries) = props.and_then(Value::as_object) else {
        return "null".to_string();
    };
    if entries.is_empty() {
        return "Bundle()".to_string();
    }

    let inner_indent = INDENT.repeat(level + 1);

    let mut lines = vec!["Bundle().apply {".to_string()];
    for (key, value) in entries {
        let key = format!("\"{}\"", key);
        match value {
            Value::Bool(b) => lines.push(format!("{}putBoolean({}, {})", inner_indent, key, b)),
            Value::Number(n) => {
                let literal = number_literal(n);
                if literal.contains('.') {
                    lines.push(format!("{}putDouble({}, {})", inner_indent, key, literal));
                } else {
                    lines.push(format!("{}putInt({}, {})", inner_indent, key, literal));
                }
            }
            Value::String(_) => lines.push(format!(
                "{}putString({}, {})",
                inner_indent,
                key,
                str(Some(value))
            )),
            Value::Array(nested) => {
                lines.push(format!("{}putSerializable(", inner_indent));
                lines.push(format!("{}{}{},", inner_indent, INDENT, key));
                lines.push(format!(
                    "{}{}{}",
                    inner_indent,
                    INDENT,
                    array(nested, level + 2)
                ));
                lines.push(format!("{})", inner_indent));
            }
            Value::Object(_) => {
                lines.push(format!("{}putBundle(", inner_indent));
                lines.push(format!("{}{}{},", inner_indent, INDENT, key));
                lines.push(format!(
                    "{}{}{}",
                    inner_indent,
                    INDENT,
                    bundle(Some(value), level + 2)
                ));
                lines.push(format!("{})", inner_indent));
            }
            Value::Null => lines.push(format!("{}putString({}, null)", inner_indent, key)),
        }
    }
    lines.push(format!("{}}}", INDENT.repeat(level)));
    lines.join("\n")
}

fn components(components: Option<&Value>, level: usize) -> String {
    let Some(list) = components.and_then(Value::as_array).filter(|l| !l.is_empty()) else {
        return "arrayListOf()".to_string();
    };

    let outer_indent = INDENT.repeat(level + 1);
    let inner_indent = INDENT.repeat(level + 2);

    let mut lines = vec!["arrayListOf(".to_string()];
    for c in list {
        let display_name = c.get("displayName").filter(|v| v.is_string());
        lines.push(format!("{}Component(", outer_indent));
        lines.push(format!("{}{},", inner_indent, str(c.get("appKey"))));
        lines.push(format!(
            "{}{},",
            inner_indent,
            str(display_name.or(c.get("appKey")))
        ));
        lines.push(format!(
            "{}{},",
            inner_indent,
            bundle(c.get("initialProperties"), level + 2)
        ));
        lines.push(format!(
            "{}{},",
            inner_indent,
            str(c.get("presentationStyle"))
        ));
        lines.push(format!("{}{}", inner_indent, str(c.get("slug"))));
        lines.push(format!("{}),", outer_indent));
    }
    lines.push(format!("{})", INDENT.repeat(level)));
    lines.join("\n")
}

/// Renders the `ManifestProvider` Kotlin source for the given manifest.
pub fn generate(json: &Map<String, Value>, checksum: &str) -> String {
    let display_name = json.get("displayName").filter(|v| v.is_string());
    [
        "package com.microsoft.reacttestapp.manifest".to_string(),
        String::new(),
        "import android.os.Bundle".to_string(),
        String::new(),
        "class ManifestProvider {".to_string(),
        "    companion object {".to_string(),
        "        fun checksum(): String {".to_string(),
        format!("            return \"{}\"", checksum),
        "        }".to_string(),
        String::new(),
        "        fun manifest(): Manifest {".to_string(),
        "            return Manifest(".to_string(),
        format!("                {},", str(json.get("name"))),
        format!("                {},", str(display_name.or(json.get("name")))),
        format!("                {},", str(json.get("version"))),
        format!("                {},", str(json.get("bundleRoot"))),
        format!("                {},", str(json.get("singleApp"))),
        format!("                {}", components(json.get("components"), 4)),
        "            )".to_string(),
        "        }".to_string(),
        "    }".to_string(),
        "}".to_string(),
        String::new(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generate_with_zero_checksum(manifest: Value) -> String {
        generate(manifest.as_object().unwrap(), "0")
    }

    #[test]
    fn test_generates_all_properties() {
        let code = generate_with_zero_checksum(json!({
            "$schema": "https://example.com/schema.json",
            "name": "Example",
            "displayName": "Template",
            "version": "1.0",
            "bundleRoot": "main",
            "singleApp": "single",
            "components": [
                {
                    "appKey": "Example",
                    "displayName": "Template",
                    "initialProperties": {},
                    "presentationStyle": "modal",
                    "slug": "single"
                }
            ],
            "resources": ["dist/res", "dist/main.jsbundle"]
        }));
        assert_eq!(
            code,
            r#"package com.microsoft.reacttestapp.manifest

import android.os.Bundle

class ManifestProvider {
    companion object {
        fun checksum(): String {
            return "0"
        }

        fun manifest(): Manifest {
            return Manifest(
                "Example",
                "Template",
                "1.0",
                "main",
                "single",
                arrayListOf(
                    Component(
                        "Example",
                        "Template",
                        Bundle(),
                        "modal",
                        "single"
                    ),
                )
            )
        }
    }
}
"#
        );
    }

    #[test]
    fn test_handles_missing_properties() {
        let code = generate_with_zero_checksum(json!({ "name": "Example" }));
        assert_eq!(
            code,
            r#"package com.microsoft.reacttestapp.manifest

import android.os.Bundle

class ManifestProvider {
    companion object {
        fun checksum(): String {
            return "0"
        }

        fun manifest(): Manifest {
            return Manifest(
                "Example",
                "Example",
                null,
                null,
                null,
                arrayListOf()
            )
        }
    }
}
"#
        );
    }

    #[test]
    fn test_handles_valid_json_data_types() {
        let code = generate_with_zero_checksum(json!({
            "name": "Example",
            "components": [
                {
                    "appKey": "Example",
                    "initialProperties": {
                        "boolean": true,
                        "double": 1.1,
                        "int": 1,
                        "null": null,
                        "string": "string",
                        "array": [1, [], { "nested": "object" }],
                        "object": {}
                    }
                }
            ]
        }));
        assert_eq!(
            code,
            r#"package com.microsoft.reacttestapp.manifest

import android.os.Bundle

class ManifestProvider {
    companion object {
        fun checksum(): String {
            return "0"
        }

        fun manifest(): Manifest {
            return Manifest(
                "Example",
                "Example",
                null,
                null,
                null,
                arrayListOf(
                    Component(
                        "Example",
                        "Example",
                        Bundle().apply {
                            putBoolean("boolean", true)
                            putDouble("double", 1.1)
                            putInt("int", 1)
                            putString("null", null)
                            putString("string", "string")
                            putSerializable(
                                "array",
                                arrayListOf(
                                    1,
                                    arrayListOf(),
                                    Bundle().apply {
                                        putString("nested", "object")
                                    }
                                )
                            )
                            putBundle(
                                "object",
                                Bundle()
                            )
                        },
                        null,
                        null
                    ),
                )
            )
        }
    }
}
"#
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let manifest = json!({
            "name": "Example",
            "components": [{ "appKey": "Example", "initialProperties": { "b": 1, "a": 2 } }]
        });
        let lhs = generate(manifest.as_object().unwrap(), "c0ffee");
        let rhs = generate(manifest.as_object().unwrap(), "c0ffee");
        assert_eq!(lhs, rhs);
        // Key order follows the manifest, not lexicographic order.
        let b = lhs.find("putInt(\"b\", 1)").unwrap();
        let a = lhs.find("putInt(\"a\", 2)").unwrap();
        assert!(b < a);
    }
}

//! Swift embedded-manifest emitter

use super::{number_literal, INDENT};
use serde_json::{Map, Value};

fn str(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(s) => format!("\"{}\"", s),
        None => "nil".to_string(),
    }
}

// Swift array literals carry a trailing comma on the last element; the
// closing bracket is joined like an element.
fn array(items: &[Value], level: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
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
                lines.push(format!("{}{}", inner_indent, object(Some(value), level + 1)))
            }
            Value::Null => lines.push(format!("{}NSNull()", inner_indent)),
        }
    }
    lines.push(format!("{}]", INDENT.repeat(level)));
    format!("[\n{}", lines.join(",\n"))
}

fn object(props: Option<&Value>, level: usize) -> String {
    let Some(entries) = props.and_then(Value::as_object) else {
        return "nil".to_string();
    };
    if entries.is_empty() {
        return "[:]".to_string();
    }

    let inner_indent = INDENT.repeat(level + 1);

    let mut lines = vec!["[".to_string()];
    for (key, value) in entries {
        let key = format!("\"{}\"", key);
        match value {
            Value::Bool(b) => lines.push(format!("{}{}: {},", inner_indent, key, b)),
            Value::Number(n) => {
                lines.push(format!("{}{}: {},", inner_indent, key, number_literal(n)))
            }
            Value::String(_) => {
                lines.push(format!("{}{}: {},", inner_indent, key, str(Some(value))))
            }
            Value::Array(nested) => lines.push(format!(
                "{}{}: {},",
                inner_indent,
                key,
                array(nested, level + 1)
            )),
            Value::Object(_) => lines.push(format!(
                "{}{}: {},",
                inner_indent,
                key,
                object(Some(value), level + 1)
            )),
            Value::Null => lines.push(format!("{}{}: NSNull(),", inner_indent, key)),
        }
    }
    lines.push(format!("{}]", INDENT.repeat(level)));
    lines.join("\n")
}

fn components(components: Option<&Value>, level: usize) -> String {
    let Some(list) = components.and_then(Value::as_array).filter(|l| !l.is_empty()) else {
        return "[]".to_string();
    };

    let outer_indent = INDENT.repeat(level + 1);
    let inner_indent = INDENT.repeat(level + 2);

    let mut lines = vec!["[".to_string()];
    for c in list {
        let display_name = c.get("displayName").filter(|v| v.is_string());
        lines.push(format!("{}Component(", outer_indent));
        lines.push(format!("{}appKey: {},", inner_indent, str(c.get("appKey"))));
        lines.push(format!(
            "{}displayName: {},",
            inner_indent,
            str(display_name.or(c.get("appKey")))
        ));
        lines.push(format!(
            "{}initialProperties: {},",
            inner_indent,
            object(c.get("initialProperties"), level + 2)
        ));
        lines.push(format!(
            "{}presentationStyle: {},",
            inner_indent,
            str(c.get("presentationStyle"))
        ));
        lines.push(format!("{}slug: {}", inner_indent, str(c.get("slug"))));
        lines.push(format!("{}),", outer_indent));
    }
    lines.push(format!("{}]", INDENT.repeat(level)));
    lines.join("\n")
}

/// Renders the `Manifest` extension Swift source for the given manifest.
pub fn generate(json: &Map<String, Value>, checksum: &str) -> String {
    let display_name = json.get("displayName").filter(|v| v.is_string());
    [
        "import Foundation".to_string(),
        String::new(),
        "extension Manifest {".to_string(),
        "    static func checksum() -> String {".to_string(),
        format!("        \"{}\"", checksum),
        "    }".to_string(),
        String::new(),
        "    static func load() -> Self {".to_string(),
        "        Manifest(".to_string(),
        format!("            name: {},", str(json.get("name"))),
        format!(
            "            displayName: {},",
            str(display_name.or(json.get("name")))
        ),
        format!("            version: {},", str(json.get("version"))),
        format!("            bundleRoot: {},", str(json.get("bundleRoot"))),
        format!("            singleApp: {},", str(json.get("singleApp"))),
        format!(
            "            components: {}",
            components(json.get("components"), 3)
        ),
        "        )".to_string(),
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
                    "appKey": "Example"
                },
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
            r#"import Foundation

extension Manifest {
    static func checksum() -> String {
        "0"
    }

    static func load() -> Self {
        Manifest(
            name: "Example",
            displayName: "Template",
            version: "1.0",
            bundleRoot: "main",
            singleApp: "single",
            components: [
                Component(
                    appKey: "Example",
                    displayName: "Example",
                    initialProperties: nil,
                    presentationStyle: nil,
                    slug: nil
                ),
                Component(
                    appKey: "Example",
                    displayName: "Template",
                    initialProperties: [:],
                    presentationStyle: "modal",
                    slug: "single"
                ),
            ]
        )
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
            r#"import Foundation

extension Manifest {
    static func checksum() -> String {
        "0"
    }

    static func load() -> Self {
        Manifest(
            name: "Example",
            displayName: "Example",
            version: nil,
            bundleRoot: nil,
            singleApp: nil,
            components: []
        )
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
            r#"import Foundation

extension Manifest {
    static func checksum() -> String {
        "0"
    }

    static func load() -> Self {
        Manifest(
            name: "Example",
            displayName: "Example",
            version: nil,
            bundleRoot: nil,
            singleApp: nil,
            components: [
                Component(
                    appKey: "Example",
                    displayName: "Example",
                    initialProperties: [
                        "boolean": true,
                        "double": 1.1,
                        "int": 1,
                        "null": NSNull(),
                        "string": "string",
                        "array": [
                            1,
                            [],
                            [
                                "nested": "object",
                            ],
                        ],
                        "object": [:],
                    ],
                    presentationStyle: nil,
                    slug: nil
                ),
            ]
        )
    }
}
"#
        );
    }
}

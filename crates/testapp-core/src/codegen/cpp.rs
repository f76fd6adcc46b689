//! C++ embedded-manifest emitter
//!
//! Strings inside `JSONObject`/`std::vector` values carry the `sv` suffix;
//! the manifest can only do this because the data is embedded directly in
//! the binary, which guarantees the string lifetimes.

use super::{number_literal, INDENT};
use serde_json::{Map, Value};

fn str(value: Option<&Value>, literal: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(s) => format!("\"{}\"{}", s, literal),
        None => "std::nullopt".to_string(),
    }
}

fn num(n: &serde_json::Number) -> String {
    let value = number_literal(n);
    if value.contains('.') {
        value
    } else {
        format!("INT64_C({})", value)
    }
}

fn array(items: &[Value], level: usize) -> String {
    if items.is_empty() {
        return "std::vector<std::any>{}".to_string();
    }

    let inner_indent = INDENT.repeat(level + 1);

    let mut lines = Vec::new();
    for value in items {
        match value {
            Value::Bool(b) => lines.push(format!("{}{}", inner_indent, b)),
            Value::Number(n) => lines.push(format!("{}{}", inner_indent, num(n))),
            Value::String(_) => {
                lines.push(format!("{}{}", inner_indent, str(Some(value), "sv")))
            }
            Value::Array(nested) => {
                lines.push(format!("{}{}", inner_indent, array(nested, level + 1)))
            }
            Value::Object(_) => {
                lines.push(format!("{}{}", inner_indent, object(Some(value), level + 1)))
            }
            Value::Null => lines.push(format!("{}nullptr", inner_indent)),
        }
    }
    format!(
        "std::vector<std::any>{{\n{}\n{}}}",
        lines.join(",\n"),
        INDENT.repeat(level)
    )
}

fn object(props: Option<&Value>, level: usize) -> String {
    let Some(entries) = props.and_then(Value::as_object) else {
        return "std::nullopt".to_string();
    };
    if entries.is_empty() {
        return "JSONObject{}".to_string();
    }

    let inner_indent = INDENT.repeat(level + 1);

    let mut lines = vec!["JSONObject{".to_string()];
    for (key, value) in entries {
        let key = format!("\"{}\"", key);
        match value {
            Value::Bool(b) => lines.push(format!("{}{{{}, {}}},", inner_indent, key, b)),
            Value::Number(n) => lines.push(format!("{}{{{}, {}}},", inner_indent, key, num(n))),
            Value::String(_) => lines.push(format!(
                "{}{{{}, {}}},",
                inner_indent,
                key,
                str(Some(value), "sv")
            )),
            Value::Array(nested) => {
                lines.push(format!("{}{{", inner_indent));
                lines.push(format!("{}{}{},", inner_indent, INDENT, key));
                lines.push(format!(
                    "{}{}{}",
                    inner_indent,
                    INDENT,
                    array(nested, level + 2)
                ));
                lines.push(format!("{}}},", inner_indent));
            }
            Value::Object(_) => {
                lines.push(format!("{}{{", inner_indent));
                lines.push(format!("{}{}{},", inner_indent, INDENT, key));
                lines.push(format!(
                    "{}{}{}",
                    inner_indent,
                    INDENT,
                    object(Some(value), level + 2)
                ));
                lines.push(format!("{}}},", inner_indent));
            }
            Value::Null => lines.push(format!("{}{{{}, nullptr}},", inner_indent, key)),
        }
    }
    lines.push(format!("{}}}", INDENT.repeat(level)));
    lines.join("\n")
}

fn components(components: Option<&Value>, level: usize) -> String {
    let Some(list) = components.and_then(Value::as_array).filter(|l| !l.is_empty()) else {
        return "std::make_optional<std::vector<Component>>({})".to_string();
    };

    let outer_indent = INDENT.repeat(level + 1);
    let inner_indent = INDENT.repeat(level + 2);

    let mut lines = vec!["std::make_optional<std::vector<Component>>({".to_string()];
    for c in list {
        let display_name = c.get("displayName").filter(|v| v.is_string());
        lines.push(format!("{}Component{{", outer_indent));
        lines.push(format!("{}{},", inner_indent, str(c.get("appKey"), "")));
        lines.push(format!(
            "{}{},",
            inner_indent,
            str(display_name.or(c.get("appKey")), "")
        ));
        lines.push(format!(
            "{}{},",
            inner_indent,
            object(c.get("initialProperties"), level + 2)
        ));
        lines.push(format!(
            "{}{},",
            inner_indent,
            str(c.get("presentationStyle"), "")
        ));
        lines.push(format!("{}{}", inner_indent, str(c.get("slug"), "")));
        lines.push(format!("{}}},", outer_indent));
    }
    lines.push(format!("{}}})", INDENT.repeat(level)));
    lines.join("\n")
}

/// Renders the `GetManifest()` C++ source for the given manifest.
pub fn generate(json: &Map<String, Value>, checksum: &str) -> String {
    let display_name = json.get("displayName").filter(|v| v.is_string());
    [
        "// clang-format off".to_string(),
        "#include \"Manifest.h\"".to_string(),
        String::new(),
        "#include <cstdint>".to_string(),
        String::new(),
        "using ReactApp::Component;".to_string(),
        "using ReactApp::JSONObject;".to_string(),
        "using ReactApp::Manifest;".to_string(),
        String::new(),
        "Manifest ReactApp::GetManifest()".to_string(),
        "{".to_string(),
        "    using namespace std::literals::string_view_literals;".to_string(),
        String::new(),
        "    return Manifest{".to_string(),
        format!("        {},", str(json.get("name"), "")),
        format!("        {},", str(display_name.or(json.get("name")), "")),
        format!("        {},", str(json.get("version"), "")),
        format!("        {},", str(json.get("bundleRoot"), "")),
        format!("        {},", str(json.get("singleApp"), "")),
        format!("        {}", components(json.get("components"), 2)),
        "    };".to_string(),
        "}".to_string(),
        String::new(),
        "std::string_view ReactApp::GetManifestChecksum()".to_string(),
        "{".to_string(),
        format!("    return \"{}\";", checksum),
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
            r#"// clang-format off
#include "Manifest.h"

#include <cstdint>

using ReactApp::Component;
using ReactApp::JSONObject;
using ReactApp::Manifest;

Manifest ReactApp::GetManifest()
{
    using namespace std::literals::string_view_literals;

    return Manifest{
        "Example",
        "Template",
        "1.0",
        "main",
        "single",
        std::make_optional<std::vector<Component>>({
            Component{
                "Example",
                "Example",
                std::nullopt,
                std::nullopt,
                std::nullopt
            },
            Component{
                "Example",
                "Template",
                JSONObject{},
                "modal",
                "single"
            },
        })
    };
}

std::string_view ReactApp::GetManifestChecksum()
{
    return "0";
}
"#
        );
    }

    #[test]
    fn test_handles_missing_properties() {
        let code = generate_with_zero_checksum(json!({ "name": "Example" }));
        assert_eq!(
            code,
            r#"// clang-format off
#include "Manifest.h"

#include <cstdint>

using ReactApp::Component;
using ReactApp::JSONObject;
using ReactApp::Manifest;

Manifest ReactApp::GetManifest()
{
    using namespace std::literals::string_view_literals;

    return Manifest{
        "Example",
        "Example",
        std::nullopt,
        std::nullopt,
        std::nullopt,
        std::make_optional<std::vector<Component>>({})
    };
}

std::string_view ReactApp::GetManifestChecksum()
{
    return "0";
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
            r#"// clang-format off
#include "Manifest.h"

#include <cstdint>

using ReactApp::Component;
using ReactApp::JSONObject;
using ReactApp::Manifest;

Manifest ReactApp::GetManifest()
{
    using namespace std::literals::string_view_literals;

    return Manifest{
        "Example",
        "Example",
        std::nullopt,
        std::nullopt,
        std::nullopt,
        std::make_optional<std::vector<Component>>({
            Component{
                "Example",
                "Example",
                JSONObject{
                    {"boolean", true},
                    {"double", 1.1},
                    {"int", INT64_C(1)},
                    {"null", nullptr},
                    {"string", "string"sv},
                    {
                        "array",
                        std::vector<std::any>{
                            INT64_C(1),
                            std::vector<std::any>{},
                            JSONObject{
                                {"nested", "object"sv},
                            }
                        }
                    },
                    {
                        "object",
                        JSONObject{}
                    },
                },
                std::nullopt,
                std::nullopt
            },
        })
    };
}

std::string_view ReactApp::GetManifestChecksum()
{
    return "0";
}
"#
        );
    }
}

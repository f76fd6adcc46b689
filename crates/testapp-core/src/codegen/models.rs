//! Native data-model generation
//!
//! Renders the schema's `$defs` as type declarations in each platform
//! language. Definitions tagged `exclude-from-codegen` describe
//! validation-only shape and are skipped.

use crate::manifest::schema::{Schema, SchemaNode, SchemaType};

const INDENT: &str = "    ";

/// Per-language rendering of struct declarations.
pub trait ModelLanguage {
    /// Indentation level for struct declarations (e.g. inside a namespace)
    fn level(&self) -> usize {
        0
    }
    fn header(&self) -> Option<String> {
        None
    }
    fn footer(&self) -> Option<String> {
        None
    }
    fn array_property(&self, name: &str, item_type: &str, required: bool) -> String;
    fn object_property(&self, name: &str, required: bool) -> String;
    fn string_property(&self, name: &str, required: bool) -> String;
    fn struct_begin(&self, name: &str) -> String;
    fn struct_end(&self) -> &'static str;
}

/// Returns the struct name for a definition key or `$defs` reference.
fn typename(reference: &str) -> String {
    let name = reference.rsplit('/').next().unwrap_or(reference);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub struct KotlinModels;

impl ModelLanguage for KotlinModels {
    fn header(&self) -> Option<String> {
        Some(
            [
                "@file:Suppress(\"ktlint:standard:trailing-comma-on-declaration-site\")",
                "",
                "package com.microsoft.reacttestapp.manifest",
                "",
                "import android.os.Bundle",
                "",
            ]
            .join("\n"),
        )
    }

    fn array_property(&self, name: &str, item_type: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("val {}: List<{}>{},", name, item_type, nullable)
    }

    fn object_property(&self, name: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("val {}: Bundle{},", name, nullable)
    }

    fn string_property(&self, name: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("val {}: String{},", name, nullable)
    }

    fn struct_begin(&self, name: &str) -> String {
        format!("data class {}(", name)
    }

    fn struct_end(&self) -> &'static str {
        ")"
    }
}

pub struct SwiftModels;

impl ModelLanguage for SwiftModels {
    fn footer(&self) -> Option<String> {
        Some(
            [
                "extension Component {",
                "    init(appKey: String) {",
                "        self.init(",
                "            appKey: appKey,",
                "            displayName: nil,",
                "            initialProperties: nil,",
                "            presentationStyle: nil,",
                "            slug: nil",
                "        )",
                "    }",
                "}",
                "",
            ]
            .join("\n"),
        )
    }

    fn array_property(&self, name: &str, item_type: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("let {}: [{}]{}", name, item_type, nullable)
    }

    fn object_property(&self, name: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("let {}: [String: Any]{}", name, nullable)
    }

    fn string_property(&self, name: &str, required: bool) -> String {
        let nullable = if required { "" } else { "?" };
        format!("let {}: String{}", name, nullable)
    }

    fn struct_begin(&self, name: &str) -> String {
        format!("struct {} {{", name)
    }

    fn struct_end(&self) -> &'static str {
        "}"
    }
}

pub struct CppModels;

impl CppModels {
    fn nullable(ty: &str, required: bool) -> String {
        if required {
            ty.to_string()
        } else {
            format!("std::optional<{}>", ty)
        }
    }
}

impl ModelLanguage for CppModels {
    fn level(&self) -> usize {
        1
    }

    fn header(&self) -> Option<String> {
        Some(
            [
                "#pragma once",
                "",
                "#include <any>",
                "#include <map>",
                "#include <optional>",
                "#include <string_view>",
                "#include <vector>",
                "",
                "namespace ReactApp",
                "{",
                // `std::string_view` is only safe because the manifest is
                // embedded in the binary and string lifetimes are static.
                "    using JSONObject = std::map<std::string_view, std::any>;",
                "",
            ]
            .join("\n"),
        )
    }

    fn footer(&self) -> Option<String> {
        Some(
            [
                "    Manifest GetManifest();",
                "    std::string_view GetManifestChecksum();",
                "",
                "}  // namespace ReactApp",
                "",
            ]
            .join("\n"),
        )
    }

    fn array_property(&self, name: &str, item_type: &str, required: bool) -> String {
        let ty = Self::nullable(&format!("std::vector<{}>", item_type), required);
        format!("{} {};", ty, name)
    }

    fn object_property(&self, name: &str, required: bool) -> String {
        format!("{} {};", Self::nullable("JSONObject", required), name)
    }

    fn string_property(&self, name: &str, required: bool) -> String {
        format!("{} {};", Self::nullable("std::string_view", required), name)
    }

    fn struct_begin(&self, name: &str) -> String {
        format!("struct {} {{", name)
    }

    fn struct_end(&self) -> &'static str {
        "};"
    }
}

fn generate_type(name: &str, definition: &SchemaNode, lang: &dyn ModelLanguage) -> Vec<String> {
    let outer = INDENT.repeat(lang.level());
    let inner = INDENT.repeat(lang.level() + 1);

    let mut result = vec![format!("{}{}", outer, lang.struct_begin(name))];

    for (prop_name, prop) in &definition.properties {
        let required = definition.required.iter().any(|r| r == prop_name);
        let line = match prop.ty {
            Some(SchemaType::Array) => {
                let item_ref = prop
                    .items
                    .as_ref()
                    .and_then(|items| items.reference.as_deref())
                    .unwrap_or_default();
                lang.array_property(prop_name, &typename(item_ref), required)
            }
            Some(SchemaType::Object) => lang.object_property(prop_name, required),
            Some(SchemaType::String) => lang.string_property(prop_name, required),
            None => continue,
        };
        result.push(format!("{}{}", inner, line));
    }

    result.push(format!("{}{}", outer, lang.struct_end()));
    result
}

/// Generates the data-model source for all codegen-visible definitions.
pub fn generate_models(schema: &Schema, lang: &dyn ModelLanguage) -> String {
    let mut lines = vec![
        "// This file was generated by rn-test-app.".to_string(),
        "// DO NOT MODIFY. ALL CHANGES WILL BE OVERWRITTEN.".to_string(),
        String::new(),
    ];

    if let Some(header) = lang.header() {
        lines.push(header);
    }

    for (key, definition) in &schema.defs {
        if definition.exclude_from_codegen {
            continue;
        }
        lines.extend(generate_type(&typename(key), definition, lang));
        lines.push(String::new());
    }

    if let Some(footer) = lang.footer() {
        lines.push(footer);
    }

    lines.join("\n")
}

//! App manifest schema generation
//!
//! The schema is assembled from declarative definitions plus documentation
//! fragments, and serializes to a draft-compatible JSON Schema. Two
//! non-standard keywords are emitted: `markdownDescription` (full docs for
//! editor tooling) and `exclude-from-codegen` (definitions that exist only
//! for validation and must not be mirrored into generated native types).

use indexmap::IndexMap;
use serde::Serialize;

/// Documentation fragments keyed by dotted property path.
pub type Docs = IndexMap<&'static str, &'static str>;

/// JSON type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
}

/// One node in the schema tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        rename = "markdownDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub markdown_description: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,

    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,

    #[serde(
        rename = "exclude-from-codegen",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub exclude_from_codegen: bool,
}

impl SchemaNode {
    pub fn string() -> Self {
        Self {
            ty: Some(SchemaType::String),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self {
            ty: Some(SchemaType::Object),
            ..Self::default()
        }
    }

    pub fn string_array() -> Self {
        Self {
            ty: Some(SchemaType::Array),
            items: Some(Box::new(Self::string())),
            unique_items: true,
            ..Self::default()
        }
    }

    pub fn reference(def: &str) -> Self {
        Self {
            reference: Some(format!("#/$defs/{}", def)),
            ..Self::default()
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Attaches both the brief and the full markdown documentation.
    pub fn documented(mut self, docs: &Docs, key: &str) -> Self {
        let markdown = docs
            .get(key)
            .map(|md| md.trim())
            .unwrap_or_default();
        self.description = Some(extract_brief(markdown).to_string());
        self.markdown_description = Some(markdown.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, node: SchemaNode) -> Self {
        self.properties.insert(name.to_string(), node);
        self
    }

    pub fn with_required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The generated app manifest schema.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "$defs")]
    pub defs: IndexMap<String, SchemaNode>,

    #[serde(rename = "allOf")]
    pub all_of: Vec<SchemaNode>,

    #[serde(rename = "type")]
    pub ty: SchemaType,

    pub properties: IndexMap<String, SchemaNode>,
}

/// First paragraph of a markdown fragment.
fn extract_brief(content: &str) -> &str {
    match content.find("\n\n") {
        Some(end) if end > 0 => &content[..end],
        _ => content,
    }
}

/// Returns the bundled documentation fragments.
pub fn docs() -> Docs {
    let mut docs = Docs::new();
    docs.insert("bundleRoot", include_str!("../../docs/bundleRoot.md"));
    docs.insert("components", include_str!("../../docs/components.md"));
    docs.insert("resources", include_str!("../../docs/resources.md"));
    docs.insert("singleApp", include_str!("../../docs/singleApp.md"));
    docs.insert("version", include_str!("../../docs/version.md"));
    docs.insert(
        "android.signingConfigs",
        include_str!("../../docs/android.signingConfigs.md"),
    );
    docs.insert(
        "android.versionCode",
        include_str!("../../docs/android.versionCode.md"),
    );
    docs.insert(
        "ios.buildNumber",
        include_str!("../../docs/ios.buildNumber.md"),
    );
    docs.insert(
        "ios.codeSignEntitlements",
        include_str!("../../docs/ios.codeSignEntitlements.md"),
    );
    docs.insert(
        "ios.codeSignIdentity",
        include_str!("../../docs/ios.codeSignIdentity.md"),
    );
    docs.insert(
        "ios.developmentTeam",
        include_str!("../../docs/ios.developmentTeam.md"),
    );
    docs.insert(
        "windows.appxManifest",
        include_str!("../../docs/windows.appxManifest.md"),
    );
    docs.insert(
        "windows.certificateKeyFile",
        include_str!("../../docs/windows.certificateKeyFile.md"),
    );
    docs.insert(
        "windows.certificatePassword",
        include_str!("../../docs/windows.certificatePassword.md"),
    );
    docs.insert(
        "windows.certificateThumbprint",
        include_str!("../../docs/windows.certificateThumbprint.md"),
    );
    docs
}

fn component_def() -> SchemaNode {
    SchemaNode::object()
        .with_property(
            "appKey",
            SchemaNode::string()
                .described("The app key passed to `AppRegistry.registerComponent()`."),
        )
        .with_property(
            "displayName",
            SchemaNode::string().described("Name to be displayed on home screen."),
        )
        .with_property(
            "initialProperties",
            SchemaNode::object()
                .described("Properties that should be passed to your component."),
        )
        .with_property("presentationStyle", {
            let mut style = SchemaNode::string()
                .described("The style in which to present your component.");
            style.enum_values = vec!["default".to_string(), "modal".to_string()];
            style
        })
        .with_property(
            "slug",
            SchemaNode::string().described(
                "URL slug that uniquely identifies this component. Used for deep linking.",
            ),
        )
        .with_required(&["appKey"])
}

fn manifest_def(docs: &Docs) -> SchemaNode {
    SchemaNode::object()
        .with_property("name", SchemaNode::string())
        .with_property("displayName", SchemaNode::string())
        .with_property("version", SchemaNode::string().documented(docs, "version"))
        .with_property(
            "bundleRoot",
            SchemaNode::string().documented(docs, "bundleRoot"),
        )
        .with_property(
            "singleApp",
            SchemaNode::string().documented(docs, "singleApp"),
        )
        .with_property("components", {
            let mut components = SchemaNode {
                ty: Some(SchemaType::Array),
                items: Some(Box::new(SchemaNode::reference("component"))),
                ..SchemaNode::default()
            };
            components = components.documented(docs, "components");
            components
        })
        .with_required(&["name", "displayName"])
}

fn signing_config_def() -> SchemaNode {
    let mut def = SchemaNode::object()
        .with_property(
            "keyAlias",
            SchemaNode::string()
                .described("Use this property to specify the alias of key to use in the store"),
        )
        .with_property(
            "keyPassword",
            SchemaNode::string()
                .described("Use this property to specify the password of key in the store"),
        )
        .with_property(
            "storeFile",
            SchemaNode::string().described(
                "Use this property to specify the relative file path to the key store file",
            ),
        )
        .with_property(
            "storePassword",
            SchemaNode::string()
                .described("Use this property to specify the password of the key store"),
        )
        .with_required(&["storeFile"]);
    def.exclude_from_codegen = true;
    def
}

fn resources_prop(docs: &Docs) -> SchemaNode {
    let platform_map = SchemaNode::object()
        .with_property("android", SchemaNode::string_array())
        .with_property("ios", SchemaNode::string_array())
        .with_property("macos", SchemaNode::string_array())
        .with_property("windows", SchemaNode::string_array());

    let mut resources = SchemaNode::default().documented(docs, "resources");
    resources.one_of = vec![SchemaNode::string_array(), platform_map];
    resources
}

fn signing_configs_prop(docs: &Docs) -> SchemaNode {
    let debug_config = {
        let mut node = SchemaNode::object().described(
            "Use this property for the debug signing config for the app. \
             The value `storeFile` is required. Android defaults will be \
             provided for other properties.",
        );
        node.all_of = vec![SchemaNode::reference("signingConfig")];
        node
    };
    let release_config = {
        let mut node = SchemaNode::object().described(
            "Use this property for the release signing config for the app. \
             The value `storeFile` is required. Android defaults will be \
             provided for other properties.",
        );
        node.all_of = vec![SchemaNode::reference("signingConfig")];
        node
    };

    SchemaNode::object()
        .documented(docs, "android.signingConfigs")
        .with_property("debug", debug_config)
        .with_property("release", release_config)
}

fn apple_block(docs: &Docs, description: &str, react_native_path_doc: &str) -> SchemaNode {
    SchemaNode::object()
        .described(description)
        .with_property(
            "bundleIdentifier",
            SchemaNode::string().described(
                "Use this property to set the bundle identifier of the final app bundle. \
                 This is the same as setting `PRODUCT_BUNDLE_IDENTIFIER` in Xcode.",
            ),
        )
        .with_property(
            "buildNumber",
            SchemaNode::string().documented(docs, "ios.buildNumber"),
        )
        .with_property(
            "codeSignEntitlements",
            SchemaNode::string().documented(docs, "ios.codeSignEntitlements"),
        )
        .with_property(
            "codeSignIdentity",
            SchemaNode::string().documented(docs, "ios.codeSignIdentity"),
        )
        .with_property(
            "developmentTeam",
            SchemaNode::string().documented(docs, "ios.developmentTeam"),
        )
        .with_property(
            "reactNativePath",
            SchemaNode::string().described(react_native_path_doc),
        )
}

/// Generates the app manifest schema from documentation fragments.
///
/// Pure and deterministic: the same docs map always yields the same schema.
pub fn generate_schema(docs: &Docs) -> Schema {
    let mut defs = IndexMap::new();
    defs.insert("component".to_string(), component_def());
    defs.insert("manifest".to_string(), manifest_def(docs));
    defs.insert("signingConfig".to_string(), signing_config_def());

    let mut properties = IndexMap::new();
    properties.insert("resources".to_string(), resources_prop(docs));
    properties.insert(
        "android".to_string(),
        SchemaNode::object()
            .described("Android specific properties go here.")
            .with_property(
                "package",
                SchemaNode::string().described(
                    "Use this property to set the \
                     <a href='https://developer.android.com/studio/build/application-id'>application ID</a> \
                     of the APK. The value is set to `applicationId` in `build.gradle`.",
                ),
            )
            .with_property(
                "versionCode",
                SchemaNode::string().documented(docs, "android.versionCode"),
            )
            .with_property("signingConfigs", signing_configs_prop(docs)),
    );
    properties.insert(
        "ios".to_string(),
        apple_block(
            docs,
            "iOS specific properties go here.",
            "Sets a custom path to React Native. Useful for when \
             `require(\"react-native\")` does not return the desired path.",
        ),
    );
    properties.insert(
        "macos".to_string(),
        apple_block(
            docs,
            "macOS specific properties go here.",
            "Sets a custom path to React Native for macOS. Useful for when \
             `require(\"react-native-macos\")` does not return the desired path.",
        ),
    );
    properties.insert(
        "windows".to_string(),
        SchemaNode::object()
            .described("Windows specific properties go here.")
            .with_property(
                "appxManifest",
                SchemaNode::string().documented(docs, "windows.appxManifest"),
            )
            .with_property(
                "certificateKeyFile",
                SchemaNode::string().documented(docs, "windows.certificateKeyFile"),
            )
            .with_property(
                "certificatePassword",
                SchemaNode::string().documented(docs, "windows.certificatePassword"),
            )
            .with_property(
                "certificateThumbprint",
                SchemaNode::string().documented(docs, "windows.certificateThumbprint"),
            ),
    );

    Schema {
        defs,
        all_of: vec![SchemaNode::reference("manifest")],
        ty: SchemaType::Object,
        properties,
    }
}

impl Schema {
    /// Resolves a `#/$defs/<name>` reference within this schema.
    pub fn resolve<'a>(&'a self, reference: &str) -> Option<&'a SchemaNode> {
        let name = reference.rsplit('/').next()?;
        self.defs.get(name)
    }

    /// Serializes the schema as pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> String {
        let mut json = serde_json::to_string_pretty(self).unwrap_or_default();
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_deterministic() {
        let docs = docs();
        let lhs = generate_schema(&docs).to_json();
        let rhs = generate_schema(&docs).to_json();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_brief_is_first_paragraph() {
        assert_eq!(extract_brief("one paragraph only"), "one paragraph only");
        assert_eq!(extract_brief("brief.\n\nrest of the docs."), "brief.");
    }

    #[test]
    fn test_documented_nodes_carry_both_descriptions() {
        let docs = docs();
        let schema = generate_schema(&docs);
        let manifest = schema.defs.get("manifest").unwrap();
        let version = manifest.properties.get("version").unwrap();

        let markdown = version.markdown_description.as_deref().unwrap();
        let brief = version.description.as_deref().unwrap();
        assert!(markdown.starts_with(brief));
        assert!(!brief.contains("\n\n"));
    }

    #[test]
    fn test_validation_only_defs_are_tagged() {
        let schema = generate_schema(&docs());
        assert!(schema.defs.get("signingConfig").unwrap().exclude_from_codegen);
        assert!(!schema.defs.get("component").unwrap().exclude_from_codegen);

        let json = schema.to_json();
        assert!(json.contains("\"exclude-from-codegen\": true"));
        assert!(json.contains("\"markdownDescription\""));
    }

    #[test]
    fn test_root_requires_manifest_def() {
        let schema = generate_schema(&docs());
        assert_eq!(
            schema.all_of[0].reference.as_deref(),
            Some("#/$defs/manifest")
        );
        let manifest = schema.resolve("#/$defs/manifest").unwrap();
        assert_eq!(manifest.required, ["name", "displayName"]);
    }

    #[test]
    fn test_resources_accepts_list_or_platform_map() {
        let schema = generate_schema(&docs());
        let resources = schema.properties.get("resources").unwrap();
        assert_eq!(resources.one_of.len(), 2);
        assert_eq!(resources.one_of[0].ty, Some(SchemaType::Array));
        assert!(resources.one_of[0].unique_items);
        assert_eq!(resources.one_of[1].ty, Some(SchemaType::Object));
        for platform in ["android", "ios", "macos", "windows"] {
            assert!(resources.one_of[1].properties[platform].unique_items);
        }
    }
}

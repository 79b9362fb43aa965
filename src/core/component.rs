//! Output records: provenance components and build environment.

use serde::{Deserialize, Serialize};

/// Property name marking development-only npm packages.
pub const NPM_DEVELOPMENT_PROPERTY: &str = "cdx:npm:package:development";

/// A name/value property attached to a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Typed view over the properties this tool understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertySet {
    pub npm_development: bool,
}

impl PropertySet {
    /// Encode as properties. False flags are omitted.
    pub fn to_properties(self) -> Vec<Property> {
        let mut properties = Vec::new();
        if self.npm_development {
            properties.push(Property {
                name: NPM_DEVELOPMENT_PROPERTY.to_string(),
                value: "true".to_string(),
            });
        }
        properties
    }

    /// Decode from properties, ignoring unknown names.
    pub fn from_properties(properties: &[Property]) -> Self {
        PropertySet {
            npm_development: properties
                .iter()
                .any(|p| p.name == NPM_DEVELOPMENT_PROPERTY && p.value == "true"),
        }
    }
}

/// One fetched package as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub purl: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Component {
    /// Whether this component is a development-only dependency.
    pub fn is_dev(&self) -> bool {
        PropertySet::from_properties(&self.properties).npm_development
    }
}

/// Environment variable to set for the offline build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvironmentVariable {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build configuration for the offline build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub environment_variables: Vec<EnvironmentVariable>,
    /// Always empty; yarn classic needs no project file rewrites.
    pub project_files: Vec<String>,
}

/// Everything a request produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutput {
    pub components: Vec<Component>,
    pub build_config: BuildConfig,
}

impl RequestOutput {
    pub fn new(components: Vec<Component>, environment_variables: Vec<EnvironmentVariable>) -> Self {
        RequestOutput {
            components,
            build_config: BuildConfig {
                environment_variables,
                project_files: Vec::new(),
            },
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

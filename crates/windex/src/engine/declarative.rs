//! Plugins described by a data document on disk.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

use super::plugin::{Plugin, PluginApi};
use crate::config::ThemeValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityLayer {
    #[default]
    Utilities,
    Components,
}

/// One `[[utilities]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UtilityDefinition {
    pub base: String,

    #[serde(default)]
    pub layer: UtilityLayer,

    /// Inline values; flattened the same way theme values are
    #[serde(default)]
    pub values: Option<ThemeValue>,

    /// Theme key supplying the values when `values` is absent
    #[serde(default)]
    pub theme: Option<String>,

    #[serde(default)]
    pub supports_negative_values: bool,
}

/// One selector template, or several applied side by side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VariantFormat {
    One(String),
    Many(Vec<String>),
}

impl VariantFormat {
    pub fn formats(&self) -> &[String] {
        match self {
            Self::One(format) => std::slice::from_ref(format),
            Self::Many(formats) => formats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDefinition {
    pub name: String,
    pub format: VariantFormat,
}

/// A plugin document such as `node_modules/brand/plugin.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclarativePlugin {
    pub name: String,
    pub theme: IndexMap<String, ThemeValue>,
    pub utilities: Vec<UtilityDefinition>,
    pub variants: Vec<VariantDefinition>,
}

impl DeclarativePlugin {
    /// Load a plugin document; an unnamed plugin takes the file stem as its name
    pub fn load(path: &Path) -> Result<Self> {
        let mut plugin: Self = crate::loader::load_document(path)
            .with_context(|| format!("Failed to load plugin document {}", path.display()))?;
        if plugin.name.is_empty() {
            plugin.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        log::debug!(
            "Loaded plugin '{}' with {} utilities and {} variants",
            plugin.name,
            plugin.utilities.len(),
            plugin.variants.len()
        );
        Ok(plugin)
    }
}

impl Plugin for DeclarativePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn theme_defaults(&self) -> IndexMap<String, ThemeValue> {
        self.theme.clone()
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        for utility in &self.utilities {
            let values = match (&utility.values, &utility.theme) {
                (Some(values), _) => Some(values.flatten_values()),
                (None, Some(key)) => Some(api.theme_values(key)),
                (None, None) => None,
            };
            let base = [utility.base.as_str()];
            match (values, utility.layer) {
                (None, UtilityLayer::Utilities) => api.add_utilities(base),
                (None, UtilityLayer::Components) => api.add_components(base),
                (Some(values), UtilityLayer::Utilities) => {
                    api.match_utilities(base, &values, utility.supports_negative_values);
                }
                (Some(values), UtilityLayer::Components) => api.match_components(base, &values),
            }
        }
        for variant in &self.variants {
            for format in variant.format.formats() {
                api.add_variant(&variant.name, format);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_names_plugin_after_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("brand.toml");
        fs::write(
            &path,
            r##"
[[utilities]]
base = "shadow-brand"
values = { DEFAULT = "0 0 4px #FD4F00", lg = "0 0 8px #FD4F00" }

[[utilities]]
base = "tab"
layer = "components"
theme = "tabSize"

[[variants]]
name = "hocus"
format = "&:hover, &:focus"

[[variants]]
name = "phx-click-loading"
format = [".phx-click-loading&", ".phx-click-loading &"]
"##,
        )
        .unwrap();

        let plugin = DeclarativePlugin::load(&path).unwrap();
        assert_eq!(plugin.name(), "brand");
        assert_eq!(plugin.utilities[1].layer, UtilityLayer::Components);
        assert_eq!(plugin.utilities[1].theme.as_deref(), Some("tabSize"));
        assert_eq!(plugin.variants[0].name, "hocus");
        assert_eq!(plugin.variants[0].format.formats().len(), 1);
        assert_eq!(
            plugin.variants[1].format.formats(),
            [".phx-click-loading&", ".phx-click-loading &"]
        );
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typo.json");
        fs::write(&path, r#"{ "utilites": [] }"#).unwrap();
        assert!(DeclarativePlugin::load(&path).is_err());
    }
}

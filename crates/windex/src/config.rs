//! Data model of a framework configuration document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single value inside the `theme` section.
///
/// Besides plain data, a value may point at another theme key, at a key of a bundled or
/// on-disk module, or merge several tables together. References are resolved by the engine
/// while resolving the configuration; the loader keeps them as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeValue {
    /// Joined with `", "` when rendered; sequences never match the reference shapes below
    List(Vec<ThemeValue>),
    /// `{ theme = "colors.gray.200" }`: the resolved value of another theme key
    ThemeRef(ThemeRef),
    /// `{ require = "tailwindcss/colors", key = "sky" }`: a value exported by a module
    ModuleRef(ModuleRef),
    /// `{ merge = [...] }`: tables merged left to right, later keys overriding earlier ones
    Merge(MergeValues),
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Table(IndexMap<String, ThemeValue>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeRef {
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleRef {
    pub require: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeValues {
    pub merge: Vec<ThemeValue>,
}

impl ThemeValue {
    pub fn table() -> Self {
        Self::Table(IndexMap::new())
    }

    pub fn as_table(&self) -> Option<&IndexMap<String, ThemeValue>> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Follow a dotted path (`gray.200`) through nested tables
    pub fn lookup(&self, path: &str) -> Option<&ThemeValue> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |value, segment| value.as_table()?.get(segment))
    }

    /// Render a scalar or list as a CSS value; tables and unresolved references have none
    pub fn to_css_value(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::List(items) => {
                let parts: Option<Vec<String>> = items.iter().map(Self::to_css_value).collect();
                parts.map(|parts| parts.join(", "))
            }
            Self::Table(_) | Self::ThemeRef(_) | Self::ModuleRef(_) | Self::Merge(_) => None,
        }
    }

    /// Flatten nested tables into utility suffixes.
    ///
    /// `{ red = { DEFAULT = "#f00", 500 = "#e00" } }` becomes `red` and `red-500`. A top level
    /// `DEFAULT` is kept as is, since it stands for the bare base class. Anything that is not
    /// a table yields no values.
    pub fn flatten_values(&self) -> IndexMap<String, String> {
        let mut flat = IndexMap::new();
        if let Self::Table(table) = self {
            flatten_into(&mut flat, None, table);
        }
        flat
    }

    /// Deep merge `other` into `self`; tables merge key by key, anything else is replaced
    pub fn merge_from(&mut self, other: ThemeValue) {
        match (self, other) {
            (Self::Table(target), Self::Table(source)) => {
                for (key, value) in source {
                    match target.get_mut(&key) {
                        Some(existing) => existing.merge_from(value),
                        None => {
                            target.insert(key, value);
                        }
                    }
                }
            }
            (target, other) => *target = other,
        }
    }
}

fn flatten_into(
    flat: &mut IndexMap<String, String>,
    prefix: Option<&str>,
    table: &IndexMap<String, ThemeValue>,
) {
    for (key, value) in table {
        let name = match prefix {
            Some(prefix) if key == "DEFAULT" => prefix.to_owned(),
            Some(prefix) => format!("{prefix}-{key}"),
            None => key.clone(),
        };
        match value {
            ThemeValue::Table(nested) => flatten_into(flat, Some(&name), nested),
            other => match other.to_css_value() {
                Some(css) => {
                    flat.insert(name, css);
                }
                None => log::trace!("Skipping unresolved theme value at '{name}'"),
            },
        }
    }
}

/// The `theme` section: per-key replacements plus the `extend` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Values merged on top of the resolved keys
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extend: IndexMap<String, ThemeValue>,

    /// Keys replacing the default theme outright
    #[serde(flatten)]
    pub overrides: IndexMap<String, ThemeValue>,
}

/// A framework configuration document, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Globs of files the framework would scan for class names
    pub content: Vec<String>,

    /// Prefix prepended to every generated class
    pub prefix: String,

    /// Configurations merged beneath this one, by module identifier. Absent means the default
    /// configuration; an empty list means none at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presets: Option<Vec<String>>,

    /// Plugins to register after the core plugins, by module identifier
    pub plugins: Vec<String>,

    /// Core plugins switched on or off by name
    #[serde(alias = "corePlugins")]
    pub core_plugins: IndexMap<String, bool>,

    pub theme: ThemeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_references_deserialize_before_tables() {
        let config: UserConfig = toml::from_str(
            r##"
[theme.extend.colors]
brand = "#FD4F00"
sky = { require = "tailwindcss/colors", key = "sky" }
muted = { theme = "colors.gray.500" }
theme = { theme = "x", extra = 1 }
"##,
        )
        .unwrap();

        let colors = &config.theme.extend["colors"];
        assert_eq!(
            colors.lookup("brand"),
            Some(&ThemeValue::Text("#FD4F00".to_owned()))
        );
        assert_eq!(
            colors.lookup("sky"),
            Some(&ThemeValue::ModuleRef(ModuleRef {
                require: "tailwindcss/colors".to_owned(),
                key: Some("sky".to_owned()),
            }))
        );
        assert_eq!(
            colors.lookup("muted"),
            Some(&ThemeValue::ThemeRef(ThemeRef {
                theme: "colors.gray.500".to_owned()
            }))
        );
        // Extra keys make it an ordinary table
        assert!(matches!(colors.lookup("theme"), Some(ThemeValue::Table(_))));
    }

    #[test]
    fn test_overrides_exclude_extend() {
        let config: UserConfig = toml::from_str(
            r#"
[theme]
spacing = { "1" = "4px" }
[theme.extend]
opacity = { "15" = "0.15" }
"#,
        )
        .unwrap();
        assert_eq!(config.theme.overrides.keys().collect::<Vec<_>>(), ["spacing"]);
        assert_eq!(config.theme.extend.keys().collect::<Vec<_>>(), ["opacity"]);
    }

    #[test]
    fn test_flatten_values_nests_with_default() {
        let value: ThemeValue = toml::from_str(
            r##"
DEFAULT = "#e5e7eb"
inherit = "inherit"
red = { DEFAULT = "#f00", 500 = "#ef4444" }
sans = ["Inter", "sans-serif"]
"##,
        )
        .unwrap();

        let flat = value.flatten_values();
        assert_eq!(
            flat.into_iter().collect::<Vec<_>>(),
            vec![
                ("DEFAULT".to_owned(), "#e5e7eb".to_owned()),
                ("inherit".to_owned(), "inherit".to_owned()),
                ("red".to_owned(), "#f00".to_owned()),
                ("red-500".to_owned(), "#ef4444".to_owned()),
                ("sans".to_owned(), "Inter, sans-serif".to_owned()),
            ]
        );
    }

    #[test]
    fn test_short_lists_are_not_references() {
        let config: UserConfig = toml::from_str(
            r#"
[theme.extend.fontFamily]
display = ["Inter", "sans-serif"]
body = ["Inter"]
merged = { merge = [{ a = "1" }] }
"#,
        )
        .unwrap();

        let fonts = &config.theme.extend["fontFamily"];
        assert_eq!(
            fonts.lookup("display"),
            Some(&ThemeValue::List(vec![
                ThemeValue::Text("Inter".to_owned()),
                ThemeValue::Text("sans-serif".to_owned()),
            ]))
        );
        assert_eq!(
            fonts.lookup("body"),
            Some(&ThemeValue::List(vec![ThemeValue::Text("Inter".to_owned())]))
        );
        assert!(matches!(fonts.lookup("merged"), Some(ThemeValue::Merge(_))));
        assert_eq!(
            fonts.flatten_values().get("body").map(String::as_str),
            Some("Inter")
        );
    }

    #[test]
    fn test_short_lists_are_not_references_in_json() {
        let value: ThemeValue =
            serde_json::from_str(r#"{ "sans": ["Inter", "sans-serif"], "mono": ["Menlo"] }"#)
                .unwrap();
        let flat = value.flatten_values();
        assert_eq!(flat.get("sans").map(String::as_str), Some("Inter, sans-serif"));
        assert_eq!(flat.get("mono").map(String::as_str), Some("Menlo"));
    }

    #[test]
    fn test_presets_absent_differs_from_empty() {
        let absent: UserConfig = toml::from_str("prefix = \"tw-\"").unwrap();
        let empty: UserConfig = toml::from_str("presets = []").unwrap();
        assert_eq!(absent.presets, None);
        assert_eq!(empty.presets, Some(Vec::new()));
    }

    #[test]
    fn test_merge_from_is_deep() {
        let mut base: ThemeValue =
            toml::from_str(r##"gray = { 100 = "#f3f4f6", 200 = "#e5e7eb" }"##).unwrap();
        let extra: ThemeValue =
            toml::from_str(r##"gray = { 200 = "#eee", 250 = "#ddd" }"##).unwrap();
        base.merge_from(extra);

        assert_eq!(
            base.lookup("gray.200"),
            Some(&ThemeValue::Text("#eee".to_owned()))
        );
        assert_eq!(
            base.lookup("gray.100"),
            Some(&ThemeValue::Text("#f3f4f6".to_owned()))
        );
        assert_eq!(
            base.lookup("gray.250"),
            Some(&ThemeValue::Text("#ddd".to_owned()))
        );
    }
}

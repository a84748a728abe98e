use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::combine::Combine;
use crate::dirs::{project_settings_file, system_settings_file, user_settings_file};
use crate::enumerate::OrderingStrategy;

/// Output directory used when no layer sets one
pub const DEFAULT_OUT_DIR: &str = "_build";

/// Module directory searched for non-bundled plugins when no layer sets one
pub const DEFAULT_MODULE_DIR: &str = "node_modules";

/// Effective settings for one windex run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory receiving `classes.txt` and `variants.txt`
    pub out_dir: PathBuf,

    /// How the class list is ordered before writing
    pub ordering: OrderingStrategy,

    /// Serve the bundled framework modules instead of resolving them on disk
    pub standalone: bool,

    /// Directories searched for plugin and preset documents, relative to the config file
    pub module_dirs: Vec<PathBuf>,

    /// Also list `class/modifier` forms for rules that accept modifiers
    pub modifiers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            ordering: OrderingStrategy::default(),
            standalone: true,
            module_dirs: vec![PathBuf::from(DEFAULT_MODULE_DIR)],
            modifiers: false,
        }
    }
}

/// One layer of settings as written in a `windex.toml` file.
///
/// Every field is optional so that layers can be stacked; unset fields fall through to the
/// next layer and finally to [`Settings::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsLayer {
    pub out_dir: Option<PathBuf>,
    pub ordering: Option<OrderingStrategy>,
    pub standalone: Option<bool>,
    pub module_dirs: Option<Vec<PathBuf>>,
    pub modifiers: Option<bool>,
}

impl Combine for SettingsLayer {
    fn combine(self, other: Self) -> Self {
        Self {
            out_dir: self.out_dir.combine(other.out_dir),
            ordering: self.ordering.combine(other.ordering),
            standalone: self.standalone.combine(other.standalone),
            module_dirs: self.module_dirs.combine(other.module_dirs),
            modifiers: self.modifiers.combine(other.modifiers),
        }
    }
}

impl SettingsLayer {
    /// Read settings from `WINDEX_*` environment variables
    pub fn from_env() -> Self {
        let mut layer = Self::default();

        // WINDEX_OUT_DIR - output directory
        if let Ok(out_dir) = env::var("WINDEX_OUT_DIR") {
            if !out_dir.trim().is_empty() {
                layer.out_dir = Some(PathBuf::from(out_dir.trim()));
            }
        }

        // WINDEX_ORDERING - "simple" or "ordered"
        if let Ok(ordering) = env::var("WINDEX_ORDERING") {
            match ordering.parse::<OrderingStrategy>() {
                Ok(strategy) => layer.ordering = Some(strategy),
                Err(err) => log::warn!("Ignoring WINDEX_ORDERING: {err}"),
            }
        }

        // WINDEX_STANDALONE - boolean flag
        if let Ok(standalone) = env::var("WINDEX_STANDALONE") {
            layer.standalone = parse_bool(&standalone);
            if layer.standalone.is_none() {
                log::warn!("Ignoring WINDEX_STANDALONE: unrecognized boolean '{standalone}'");
            }
        }

        // WINDEX_MODIFIERS - boolean flag
        if let Ok(modifiers) = env::var("WINDEX_MODIFIERS") {
            layer.modifiers = parse_bool(&modifiers);
            if layer.modifiers.is_none() {
                log::warn!("Ignoring WINDEX_MODIFIERS: unrecognized boolean '{modifiers}'");
            }
        }

        // WINDEX_MODULE_DIRS - comma-separated list of directories
        if let Ok(module_dirs) = env::var("WINDEX_MODULE_DIRS") {
            let dirs: Vec<PathBuf> = module_dirs
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            if !dirs.is_empty() {
                layer.module_dirs = Some(dirs);
            }
        }

        layer
    }

    /// Load a single settings file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    fn try_load_and_combine(layer: &mut Self, path: &Path, context: &str) -> Result<()> {
        if path.exists() {
            log::debug!("Loading {} from: {:?}", context, path);
            let loaded = Self::load_from_file(path)
                .with_context(|| format!("Failed to load {} from {:?}", context, path))?;
            *layer = loaded.combine(std::mem::take(layer));
        }
        Ok(())
    }

    /// Fill every unset field from [`Settings::default`]
    pub fn into_settings(self) -> Settings {
        let defaults = Settings::default();
        Settings {
            out_dir: self.out_dir.unwrap_or(defaults.out_dir),
            ordering: self.ordering.unwrap_or(defaults.ordering),
            standalone: self.standalone.unwrap_or(defaults.standalone),
            module_dirs: self.module_dirs.unwrap_or(defaults.module_dirs),
            modifiers: self.modifiers.unwrap_or(defaults.modifiers),
        }
    }
}

/// Parse a boolean value from string, supporting various common formats
fn parse_bool(value: &str) -> Option<bool> {
    use cow_utils::CowUtils;
    match value.trim().cow_to_lowercase().as_ref() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Load settings with hierarchical precedence:
    /// 1. CLI arguments (highest precedence)
    /// 2. CLI-provided settings file
    /// 3. Environment variables (WINDEX_*)
    /// 4. Project settings (windex.toml in current directory)
    /// 5. User settings (~/.config/windex/windex.toml)
    /// 6. System settings (/etc/windex/windex.toml or equivalent)
    /// 7. Default values (lowest precedence)
    pub fn load(cli_settings_path: Option<&Path>, cli_overrides: SettingsLayer) -> Result<Self> {
        let mut layer = SettingsLayer::default();

        if let Some(system_path) = system_settings_file() {
            SettingsLayer::try_load_and_combine(&mut layer, &system_path, "system settings")?;
        }

        if let Some(user_path) = user_settings_file() {
            SettingsLayer::try_load_and_combine(&mut layer, &user_path, "user settings")?;
        }

        SettingsLayer::try_load_and_combine(
            &mut layer,
            &project_settings_file(),
            "project settings",
        )?;

        layer = SettingsLayer::from_env().combine(layer);

        if let Some(cli_path) = cli_settings_path {
            // An explicitly requested file must exist
            let loaded = SettingsLayer::load_from_file(cli_path)
                .with_context(|| format!("Failed to load CLI settings from {:?}", cli_path))?;
            layer = loaded.combine(layer);
        }

        Ok(cli_overrides.combine(layer).into_settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_into_settings_fills_defaults() {
        let layer = SettingsLayer {
            ordering: Some(OrderingStrategy::Simple),
            ..Default::default()
        };
        let settings = layer.into_settings();
        assert_eq!(settings.ordering, OrderingStrategy::Simple);
        assert_eq!(settings.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
        assert!(settings.standalone);
        assert_eq!(settings.module_dirs, vec![PathBuf::from(DEFAULT_MODULE_DIR)]);
        assert!(!settings.modifiers);
    }

    #[test]
    fn test_layer_parses_kebab_case_keys() {
        let layer: SettingsLayer = toml::from_str(
            r#"
out-dir = "build/windex"
ordering = "simple"
standalone = false
module-dirs = ["vendor"]
modifiers = true
"#,
        )
        .unwrap();
        assert_eq!(layer.out_dir, Some(PathBuf::from("build/windex")));
        assert_eq!(layer.ordering, Some(OrderingStrategy::Simple));
        assert_eq!(layer.standalone, Some(false));
        assert_eq!(layer.module_dirs, Some(vec![PathBuf::from("vendor")]));
        assert_eq!(layer.modifiers, Some(true));
    }

    #[test]
    fn test_layer_rejects_unknown_keys() {
        let result: Result<SettingsLayer, _> = toml::from_str("output = \"x\"");
        assert!(result.is_err());
    }
}

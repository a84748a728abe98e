//! Module identifiers and what they resolve to.
//!
//! Configurations name presets, plugins and theme values by module identifier. In standalone
//! mode a fixed set of framework identifiers is served from copies bundled into the binary;
//! every other identifier resolves to a document on disk.

use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ThemeValue, UserConfig};
use crate::engine::official::{AspectRatioPlugin, FormsPlugin, LineClampPlugin, TypographyPlugin};
use crate::engine::plugin::Plugin;
use crate::engine::theme;
use crate::settings::Settings;

/// Identifiers served from bundled copies in standalone mode
pub const BUNDLED_MODULES: &[&str] = &[
    "tailwindcss/colors",
    "tailwindcss/plugin",
    "tailwindcss/defaultConfig",
    "tailwindcss/defaultTheme",
    "@tailwindcss/forms",
    "@tailwindcss/typography",
    "@tailwindcss/aspect-ratio",
    "@tailwindcss/line-clamp",
];

/// File names tried, in order, for a bare identifier inside a module directory
const CANDIDATE_SUFFIXES: &[&str] = &[".toml", ".json", "/plugin.toml", "/plugin.json"];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot find module '{id}' (searched {})", display_paths(.searched))]
    ModuleNotFound { id: String, searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_owned();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a module identifier resolves to.
#[derive(Clone)]
pub enum Module {
    Palette(&'static ThemeValue),
    /// The plugin authoring helpers; neither a plugin nor a value
    PluginHelpers,
    DefaultConfig(&'static UserConfig),
    DefaultTheme(&'static IndexMap<String, ThemeValue>),
    Plugin(Arc<dyn Plugin>),
    /// A document found by normal resolution
    File(PathBuf),
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Palette(_) => f.write_str("Palette"),
            Self::PluginHelpers => f.write_str("PluginHelpers"),
            Self::DefaultConfig(_) => f.write_str("DefaultConfig"),
            Self::DefaultTheme(_) => f.write_str("DefaultTheme"),
            Self::Plugin(plugin) => f.debug_tuple("Plugin").field(&plugin.name()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Resolves module identifiers, substitutes first.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    substitutes: IndexMap<String, Module>,
    module_dirs: Vec<PathBuf>,
}

impl ModuleRegistry {
    /// A registry without substitutes; every identifier resolves on disk
    pub fn new(module_dirs: Vec<PathBuf>) -> Self {
        Self {
            substitutes: IndexMap::new(),
            module_dirs,
        }
    }

    /// A registry serving every bundled module
    pub fn bundled(module_dirs: Vec<PathBuf>) -> Self {
        let mut registry = Self::new(module_dirs);
        registry.substitute("tailwindcss/colors", Module::Palette(theme::palette()));
        registry.substitute("tailwindcss/plugin", Module::PluginHelpers);
        registry.substitute(
            "tailwindcss/defaultConfig",
            Module::DefaultConfig(theme::default_config()),
        );
        registry.substitute(
            "tailwindcss/defaultTheme",
            Module::DefaultTheme(theme::default_theme()),
        );
        registry.substitute("@tailwindcss/forms", Module::Plugin(Arc::new(FormsPlugin)));
        registry.substitute(
            "@tailwindcss/typography",
            Module::Plugin(Arc::new(TypographyPlugin)),
        );
        registry.substitute(
            "@tailwindcss/aspect-ratio",
            Module::Plugin(Arc::new(AspectRatioPlugin)),
        );
        registry.substitute(
            "@tailwindcss/line-clamp",
            Module::Plugin(Arc::new(LineClampPlugin)),
        );
        registry
    }

    pub fn from_settings(settings: &Settings) -> Self {
        if settings.standalone {
            Self::bundled(settings.module_dirs.clone())
        } else {
            log::debug!("Standalone mode off, bundled modules are not substituted");
            Self::new(settings.module_dirs.clone())
        }
    }

    /// Serve `id` from `module` instead of resolving it on disk
    pub fn substitute(&mut self, id: impl Into<String>, module: Module) {
        self.substitutes.insert(id.into(), module);
    }

    pub fn is_substituted(&self, id: &str) -> bool {
        self.substitutes.contains_key(id)
    }

    /// Resolve `id`, relative to `base_dir` when it is not substituted
    pub fn resolve(&self, id: &str, base_dir: &Path) -> Result<Module, RegistryError> {
        if let Some(module) = self.substitutes.get(id) {
            log::trace!("Module '{id}' served from bundled copy");
            return Ok(module.clone());
        }

        let searched = self.candidates(id, base_dir);
        match searched.iter().find(|path| path.is_file()) {
            Some(path) => {
                log::debug!("Module '{id}' resolved to {}", path.display());
                Ok(Module::File(path.clone()))
            }
            None => Err(RegistryError::ModuleNotFound {
                id: id.to_owned(),
                searched,
            }),
        }
    }

    fn candidates(&self, id: &str, base_dir: &Path) -> Vec<PathBuf> {
        if is_path_like(id) {
            return vec![base_dir.join(id)];
        }
        self.module_dirs
            .iter()
            .flat_map(|dir| {
                let dir = base_dir.join(dir);
                CANDIDATE_SUFFIXES
                    .iter()
                    .map(move |suffix| dir.join(format!("{id}{suffix}")))
            })
            .collect()
    }
}

/// Whether `id` names a file relative to the declaring document rather than a package
pub(crate) fn is_path_like(id: &str) -> bool {
    id.starts_with("./") || id.starts_with("../") || Path::new(id).is_absolute()
}

//! The bundled theme and variant engine.
//!
//! Resolution happens in two steps. [`Engine::resolve_config`] folds presets, plugin theme
//! defaults and the user configuration into a [`ResolvedConfig`]; [`Engine::create_context`]
//! then runs every plugin against the resolved theme and produces the [`Context`] the
//! enumerator reads.

use anyhow::{Context as _, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub mod context;
pub(crate) mod core_plugins;
pub mod declarative;
pub mod official;
pub mod plugin;
pub mod theme;
mod variants;

pub use context::{
    CATCH_ALL, CandidateRuleMap, Context, ContextBuilder, Layer, OrderKey, RuleDescriptor,
    RuleMeta, VariantApplicator, VariantMap,
};
pub use declarative::DeclarativePlugin;
pub use plugin::{Plugin, PluginApi};
pub use theme::ResolvedTheme;

use crate::config::{ThemeValue, UserConfig};
use crate::loader::{LoadedConfig, load_document};
use crate::registry::{Module, ModuleRegistry, is_path_like};
use core_plugins::{CORE_PLUGINS, is_core_plugin};
use theme::ThemeResolver;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("circular theme reference: {}", .chain.join(" -> "))]
    ThemeCycle { chain: Vec<String> },

    #[error("theme key '{key}' does not exist")]
    UnknownThemeKey { key: String },

    #[error("module '{id}' has no key '{key}'")]
    UnknownModuleKey { id: String, key: String },

    #[error("theme key '{key}' merges a value that is not a table")]
    MergeOfNonTable { key: String },

    #[error("module '{id}' is not a plugin")]
    NotAPlugin { id: String },

    #[error("module '{id}' is not a configuration preset")]
    NotAPreset { id: String },

    #[error("module '{id}' does not export a theme value")]
    NotAValue { id: String },
}

/// A configuration with presets applied, plugins resolved and the theme fully resolved.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: ResolvedTheme,
    /// User plugins, in registration order
    pub plugins: Vec<Arc<dyn Plugin>>,
    pub prefix: String,
    /// Core plugins switched on or off by name; absent names are enabled
    pub core_plugins: IndexMap<String, bool>,
}

impl ResolvedConfig {
    pub fn is_core_plugin_enabled(&self, name: &str) -> bool {
        self.core_plugins.get(name).copied().unwrap_or(true)
    }
}

/// Turns a loaded configuration into an enumerable context.
pub trait Engine {
    fn resolve_config(
        &self,
        loaded: &LoadedConfig,
        registry: &ModuleRegistry,
    ) -> Result<ResolvedConfig>;

    fn create_context(&self, resolved: &ResolvedConfig) -> Result<Context>;
}

/// The engine shipped with windex: the default theme, the core plugins and core variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEngine;

impl Engine for DefaultEngine {
    fn resolve_config(
        &self,
        loaded: &LoadedConfig,
        registry: &ModuleRegistry,
    ) -> Result<ResolvedConfig> {
        let config = &loaded.config;
        let base_dir = loaded.base_dir();

        if config.content.is_empty() {
            log::warn!(
                "No content globs configured in {}; the framework would generate nothing",
                loaded.path.display()
            );
        }

        // Lowest precedence first: presets in declaration order, then the config itself
        let mut layers = Vec::new();
        let mut visited = FxHashSet::default();
        collect_presets(config, registry, base_dir, &mut visited, &mut layers)?;
        layers.push(ConfigLayer::new(config.clone(), base_dir.to_path_buf()));

        let mut plugins = Vec::new();
        for ConfigLayer { config: layer, base_dir } in &layers {
            for id in &layer.plugins {
                let plugin = resolve_plugin(registry, base_dir, id)
                    .with_context(|| format!("Failed to resolve plugin '{id}'"))?;
                log::debug!("Resolved plugin '{}' from '{id}'", plugin.name());
                plugins.push(plugin);
            }
        }

        let mut sources: IndexMap<String, ThemeValue> = IndexMap::new();
        for plugin in &plugins {
            for (key, value) in plugin.theme_defaults() {
                sources.entry(key).or_insert(value);
            }
        }
        let mut extensions: IndexMap<String, Vec<ThemeValue>> = IndexMap::new();
        let mut prefix = String::new();
        let mut core_plugins = IndexMap::new();
        for ConfigLayer { config: layer, base_dir } in &layers {
            for (key, value) in &layer.theme.overrides {
                sources.insert(key.clone(), rebased(value, base_dir));
            }
            for (key, value) in &layer.theme.extend {
                extensions
                    .entry(key.clone())
                    .or_default()
                    .push(rebased(value, base_dir));
            }
            if !layer.prefix.is_empty() {
                prefix.clone_from(&layer.prefix);
            }
            core_plugins.extend(layer.core_plugins.iter().map(|(k, v)| (k.clone(), *v)));
        }

        for name in core_plugins.keys() {
            if !is_core_plugin(name) {
                log::warn!("Unknown core plugin '{name}' in core_plugins");
            }
        }

        let theme = ThemeResolver::new(sources, extensions, registry, base_dir)
            .resolve()
            .context("Failed to resolve theme")?;
        log::info!(
            "Resolved theme with {} keys and {} plugins",
            theme.keys().count(),
            plugins.len()
        );

        Ok(ResolvedConfig {
            theme,
            plugins,
            prefix,
            core_plugins,
        })
    }

    fn create_context(&self, resolved: &ResolvedConfig) -> Result<Context> {
        let mut builder = ContextBuilder::new();

        for core_plugin in CORE_PLUGINS {
            if !resolved.is_core_plugin_enabled(core_plugin.name) {
                log::debug!("Core plugin '{}' disabled", core_plugin.name);
                continue;
            }
            builder.begin_plugin(core_plugin.name);
            core_plugin.register(&mut PluginApi::new(
                &mut builder,
                &resolved.theme,
                &resolved.prefix,
            ))?;
        }

        variants::register_core_variants(&mut builder, &resolved.theme);

        for plugin in &resolved.plugins {
            builder.begin_plugin(plugin.name());
            plugin
                .register(&mut PluginApi::new(
                    &mut builder,
                    &resolved.theme,
                    &resolved.prefix,
                ))
                .with_context(|| format!("Plugin '{}' failed to register", plugin.name()))?;
        }

        let context = builder.build();
        log::debug!(
            "Context has {} candidate bases and {} variants",
            context.candidate_rule_map().len(),
            context.variant_map().len()
        );
        Ok(context)
    }
}

/// Identity of the default configuration among applied presets
const DEFAULT_CONFIG_PRESET: &str = "tailwindcss/defaultConfig";

/// A configuration together with the directory its module identifiers resolve against
struct ConfigLayer {
    config: UserConfig,
    base_dir: PathBuf,
}

impl ConfigLayer {
    fn new(config: UserConfig, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }
}

/// Collect preset configurations, nested presets before the preset declaring them.
///
/// A configuration without a `presets` key sits on the default configuration; `presets = []`
/// opts out of it. Each preset document resolves its own identifiers against its directory.
fn collect_presets(
    config: &UserConfig,
    registry: &ModuleRegistry,
    base_dir: &Path,
    visited: &mut FxHashSet<String>,
    layers: &mut Vec<ConfigLayer>,
) -> Result<()> {
    let Some(presets) = &config.presets else {
        if visited.insert(DEFAULT_CONFIG_PRESET.to_owned()) {
            log::debug!("No presets declared, using the default configuration");
            layers.push(ConfigLayer::new(
                theme::default_config().clone(),
                base_dir.to_path_buf(),
            ));
        }
        return Ok(());
    };

    for id in presets {
        let (identity, preset, preset_dir) = match registry.resolve(id, base_dir)? {
            Module::DefaultConfig(config) => (
                DEFAULT_CONFIG_PRESET.to_owned(),
                config.clone(),
                base_dir.to_path_buf(),
            ),
            Module::File(path) => {
                let preset = load_document::<UserConfig>(&path)
                    .with_context(|| format!("Failed to load preset '{id}'"))?;
                let preset_dir = path.parent().unwrap_or(base_dir).to_path_buf();
                (path.display().to_string(), preset, preset_dir)
            }
            _ => return Err(EngineError::NotAPreset { id: id.clone() }.into()),
        };
        if !visited.insert(identity) {
            log::debug!("Preset '{id}' already applied");
            continue;
        }
        collect_presets(&preset, registry, &preset_dir, visited, layers)?;
        layers.push(ConfigLayer::new(preset, preset_dir));
    }
    Ok(())
}

/// `value` with relative module paths made absolute against `base_dir`
fn rebased(value: &ThemeValue, base_dir: &Path) -> ThemeValue {
    let mut value = value.clone();
    rebase_module_refs(&mut value, base_dir);
    value
}

fn rebase_module_refs(value: &mut ThemeValue, base_dir: &Path) {
    match value {
        ThemeValue::ModuleRef(reference) if is_path_like(&reference.require) => {
            reference.require = base_dir
                .join(&reference.require)
                .to_string_lossy()
                .into_owned();
        }
        ThemeValue::Merge(merge) => {
            for part in &mut merge.merge {
                rebase_module_refs(part, base_dir);
            }
        }
        ThemeValue::List(items) => {
            for item in items {
                rebase_module_refs(item, base_dir);
            }
        }
        ThemeValue::Table(table) => {
            for nested in table.values_mut() {
                rebase_module_refs(nested, base_dir);
            }
        }
        _ => {}
    }
}

fn resolve_plugin(registry: &ModuleRegistry, base_dir: &Path, id: &str) -> Result<Arc<dyn Plugin>> {
    match registry.resolve(id, base_dir)? {
        Module::Plugin(plugin) => Ok(plugin),
        Module::File(path) => Ok(Arc::new(DeclarativePlugin::load(&path)?)),
        _ => Err(EngineError::NotAPlugin { id: id.to_owned() }.into()),
    }
}

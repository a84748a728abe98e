//! Default theme data and theme resolution.

use anyhow::Result;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::path::Path;

use super::EngineError;
use crate::config::{ThemeConfig, ThemeValue, UserConfig};
use crate::registry::{Module, ModuleRegistry};

static PALETTE: Lazy<ThemeValue> = Lazy::new(|| {
    toml::from_str(include_str!("palette.toml")).expect("bundled palette.toml must parse")
});

static DEFAULT_THEME: Lazy<IndexMap<String, ThemeValue>> = Lazy::new(|| {
    let mut theme: IndexMap<String, ThemeValue> = toml::from_str(include_str!("default_theme.toml"))
        .expect("bundled default_theme.toml must parse");
    theme.insert("colors".to_owned(), PALETTE.clone());
    theme
});

static DEFAULT_CONFIG: Lazy<UserConfig> = Lazy::new(|| UserConfig {
    theme: ThemeConfig {
        overrides: DEFAULT_THEME.clone(),
        ..ThemeConfig::default()
    },
    presets: Some(Vec::new()),
    ..UserConfig::default()
});

/// The default color palette
pub fn palette() -> &'static ThemeValue {
    &PALETTE
}

/// The default theme, references unresolved
pub fn default_theme() -> &'static IndexMap<String, ThemeValue> {
    &DEFAULT_THEME
}

/// A configuration holding nothing but the default theme
pub fn default_config() -> &'static UserConfig {
    &DEFAULT_CONFIG
}

/// A theme with every reference, merge and extension applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTheme {
    values: IndexMap<String, ThemeValue>,
}

impl ResolvedTheme {
    /// Look up a key or dotted path (`colors.red.500`)
    pub fn get(&self, path: &str) -> Option<&ThemeValue> {
        let (key, rest) = match path.split_once('.') {
            Some((key, rest)) => (key, Some(rest)),
            None => (path, None),
        };
        let value = self.values.get(key)?;
        match rest {
            Some(rest) => value.lookup(rest),
            None => Some(value),
        }
    }

    /// Flattened utility values for `key`; empty when the key is absent
    pub fn values(&self, key: &str) -> IndexMap<String, String> {
        self.get(key)
            .map(ThemeValue::flatten_values)
            .unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn to_value(&self) -> ThemeValue {
        ThemeValue::Table(self.values.clone())
    }
}

/// Resolves theme keys on demand, memoizing each key once its extensions are applied.
pub(crate) struct ThemeResolver<'a> {
    sources: IndexMap<String, ThemeValue>,
    extensions: IndexMap<String, Vec<ThemeValue>>,
    registry: &'a ModuleRegistry,
    base_dir: &'a Path,
    resolved: IndexMap<String, ThemeValue>,
    /// Keys whose own value is resolved while their extensions are still pending
    partial: IndexMap<String, ThemeValue>,
    /// Lowest stack depth whose partial value has been read; frames above it are not memoized
    partial_read_depth: Option<usize>,
    stack: Vec<String>,
}

impl<'a> ThemeResolver<'a> {
    pub(crate) fn new(
        sources: IndexMap<String, ThemeValue>,
        extensions: IndexMap<String, Vec<ThemeValue>>,
        registry: &'a ModuleRegistry,
        base_dir: &'a Path,
    ) -> Self {
        Self {
            sources,
            extensions,
            registry,
            base_dir,
            resolved: IndexMap::new(),
            partial: IndexMap::new(),
            partial_read_depth: None,
            stack: Vec::new(),
        }
    }

    pub(crate) fn resolve(mut self) -> Result<ResolvedTheme> {
        let keys: Vec<String> = self
            .sources
            .keys()
            .chain(
                self.extensions
                    .keys()
                    .filter(|key| !self.sources.contains_key(*key)),
            )
            .cloned()
            .collect();

        let mut values = IndexMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.resolve_key(&key)? {
                values.insert(key, value);
            }
        }
        Ok(ResolvedTheme { values })
    }

    fn resolve_key(&mut self, key: &str) -> Result<Option<ThemeValue>> {
        if let Some(value) = self.resolved.get(key) {
            return Ok(Some(value.clone()));
        }
        if let Some(start) = self.stack.iter().position(|pending| pending == key) {
            // An extension may read the value it extends (`colors.gray.500` inside
            // `extend.colors`)
            if let Some(value) = self.partial.get(key) {
                self.partial_read_depth = Some(
                    self.partial_read_depth
                        .map_or(start, |depth| depth.min(start)),
                );
                return Ok(Some(value.clone()));
            }
            let mut chain = self.stack[start..].to_vec();
            chain.push(key.to_owned());
            return Err(EngineError::ThemeCycle { chain }.into());
        }

        let source = self.sources.get(key).cloned();
        let extensions = self.extensions.get(key).cloned().unwrap_or_default();
        if source.is_none() && extensions.is_empty() {
            return Ok(None);
        }

        let depth = self.stack.len();
        self.stack.push(key.to_owned());
        let result = self.resolve_entry(key, source, &extensions);
        self.stack.pop();
        self.partial.shift_remove(key);

        let value = result?;
        match self.partial_read_depth {
            // Built from a value whose extensions were still pending; resolve it again later
            Some(read_depth) if read_depth < depth => {
                log::trace!("Theme key '{key}' read a partial value, not memoized");
                return Ok(Some(value));
            }
            Some(_) => self.partial_read_depth = None,
            None => {}
        }
        log::trace!("Resolved theme key '{key}'");
        self.resolved.insert(key.to_owned(), value.clone());
        Ok(Some(value))
    }

    fn resolve_entry(
        &mut self,
        key: &str,
        source: Option<ThemeValue>,
        extensions: &[ThemeValue],
    ) -> Result<ThemeValue> {
        let mut value = match source {
            Some(source) => self.resolve_value(&source)?,
            None => ThemeValue::table(),
        };
        if !extensions.is_empty() {
            self.partial.insert(key.to_owned(), value.clone());
        }
        for extension in extensions {
            let extension = self.resolve_value(extension)?;
            value.merge_from(extension);
        }
        Ok(value)
    }

    fn resolve_value(&mut self, value: &ThemeValue) -> Result<ThemeValue> {
        match value {
            ThemeValue::ThemeRef(reference) => {
                let (key, path) = match reference.theme.split_once('.') {
                    Some((key, path)) => (key, Some(path)),
                    None => (reference.theme.as_str(), None),
                };
                let unknown = || EngineError::UnknownThemeKey {
                    key: reference.theme.clone(),
                };
                let resolved = self.resolve_key(key)?.ok_or_else(unknown)?;
                match path {
                    Some(path) => resolved.lookup(path).cloned().ok_or_else(|| unknown().into()),
                    None => Ok(resolved),
                }
            }
            ThemeValue::ModuleRef(reference) => {
                let exported = module_value(self.registry, self.base_dir, &reference.require)?;
                let selected = match &reference.key {
                    Some(key) => exported.lookup(key).cloned().ok_or_else(|| {
                        EngineError::UnknownModuleKey {
                            id: reference.require.clone(),
                            key: key.clone(),
                        }
                    })?,
                    None => exported,
                };
                self.resolve_value(&selected)
            }
            ThemeValue::Merge(merge) => {
                let mut merged = IndexMap::new();
                for part in &merge.merge {
                    match self.resolve_value(part)? {
                        ThemeValue::Table(table) => merged.extend(table),
                        _ => {
                            return Err(EngineError::MergeOfNonTable {
                                key: self.stack.last().cloned().unwrap_or_default(),
                            }
                            .into());
                        }
                    }
                }
                Ok(ThemeValue::Table(merged))
            }
            ThemeValue::Table(table) => {
                let mut resolved = IndexMap::with_capacity(table.len());
                for (key, nested) in table {
                    resolved.insert(key.clone(), self.resolve_value(nested)?);
                }
                Ok(ThemeValue::Table(resolved))
            }
            ThemeValue::List(items) => Ok(ThemeValue::List(
                items
                    .iter()
                    .map(|item| self.resolve_value(item))
                    .collect::<Result<_>>()?,
            )),
            ThemeValue::Text(_)
            | ThemeValue::Integer(_)
            | ThemeValue::Float(_)
            | ThemeValue::Bool(_) => Ok(value.clone()),
        }
    }
}

/// Resolve the default theme on its own, without any user configuration
pub fn resolve_default_theme(registry: &ModuleRegistry, base_dir: &Path) -> Result<ResolvedTheme> {
    resolve_standalone_theme(default_theme(), registry, base_dir)
}

/// Resolve a theme table that has no extensions of its own
fn resolve_standalone_theme(
    theme: &IndexMap<String, ThemeValue>,
    registry: &ModuleRegistry,
    base_dir: &Path,
) -> Result<ResolvedTheme> {
    ThemeResolver::new(theme.clone(), IndexMap::new(), registry, base_dir).resolve()
}

/// The value a module exports when referenced from a theme
pub(crate) fn module_value(
    registry: &ModuleRegistry,
    base_dir: &Path,
    id: &str,
) -> Result<ThemeValue> {
    match registry.resolve(id, base_dir)? {
        Module::Palette(palette) => Ok(palette.clone()),
        Module::DefaultTheme(theme) => {
            Ok(resolve_standalone_theme(theme, registry, base_dir)?.to_value())
        }
        Module::DefaultConfig(config) => {
            let theme = resolve_standalone_theme(&config.theme.overrides, registry, base_dir)?
                .to_value();
            Ok(ThemeValue::Table(IndexMap::from([(
                "theme".to_owned(),
                theme,
            )])))
        }
        Module::File(path) => crate::loader::load_document(&path),
        Module::PluginHelpers | Module::Plugin(_) => Err(EngineError::NotAValue {
            id: id.to_owned(),
        }
        .into()),
    }
}

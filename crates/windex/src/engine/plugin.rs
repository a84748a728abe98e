use anyhow::Result;
use indexmap::IndexMap;

use super::context::{ContextBuilder, Layer, RuleDescriptor};
use super::theme::ResolvedTheme;
use crate::config::ThemeValue;

/// A contributor of utilities and variants.
///
/// Core plugins, the bundled first-party plugins and plugin documents found on disk all
/// register through the same [`PluginApi`].
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Name used in logs and in rule metadata
    fn name(&self) -> &str;

    /// Theme keys this plugin provides defaults for; user configuration takes precedence
    fn theme_defaults(&self) -> IndexMap<String, ThemeValue> {
        IndexMap::new()
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()>;
}

/// The view of context creation handed to a plugin while it registers.
pub struct PluginApi<'a> {
    builder: &'a mut ContextBuilder,
    theme: &'a ResolvedTheme,
    prefix: &'a str,
}

impl<'a> PluginApi<'a> {
    pub(crate) fn new(
        builder: &'a mut ContextBuilder,
        theme: &'a ResolvedTheme,
        prefix: &'a str,
    ) -> Self {
        Self {
            builder,
            theme,
            prefix,
        }
    }

    pub fn theme(&self) -> &ResolvedTheme {
        self.theme
    }

    /// Flattened values of a theme key
    pub fn theme_values(&self, key: &str) -> IndexMap<String, String> {
        self.theme.values(key)
    }

    fn prefixed(&self, class: &str) -> String {
        format!("{}{}", self.prefix, class)
    }

    fn add_static<I>(&mut self, layer: Layer, classes: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for class in classes {
            let base = self.prefixed(class.as_ref());
            self.builder.add_rule(base, layer, RuleDescriptor::plain());
        }
    }

    fn add_matched<I>(&mut self, layer: Layer, bases: I, rule: &RuleDescriptor)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for base in bases {
            let base = self.prefixed(base.as_ref());
            self.builder.add_rule(base, layer, rule.clone());
        }
    }

    /// Classes that take no value, in the utilities layer
    pub fn add_utilities<I>(&mut self, classes: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.add_static(Layer::Utilities, classes);
    }

    /// Classes that take no value, in the components layer
    pub fn add_components<I>(&mut self, classes: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.add_static(Layer::Components, classes);
    }

    /// Utilities expanding over `values`, one rule per base
    pub fn match_utilities<I>(
        &mut self,
        bases: I,
        values: &IndexMap<String, String>,
        supports_negative_values: bool,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let rule = RuleDescriptor::with_values(values.clone(), supports_negative_values);
        self.add_matched(Layer::Utilities, bases, &rule);
    }

    /// Utilities expanding over `values` that also accept a `/{modifier}`, as colors do
    pub fn match_utilities_with_modifiers<I>(
        &mut self,
        bases: I,
        values: &IndexMap<String, String>,
        modifiers: &IndexMap<String, String>,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let rule =
            RuleDescriptor::with_values(values.clone(), false).with_modifiers(modifiers.clone());
        self.add_matched(Layer::Utilities, bases, &rule);
    }

    /// Components expanding over `values`, one rule per base
    pub fn match_components<I>(&mut self, bases: I, values: &IndexMap<String, String>)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let rule = RuleDescriptor::with_values(values.clone(), false);
        self.add_matched(Layer::Components, bases, &rule);
    }

    pub fn add_variant(&mut self, name: &str, format: &str) {
        self.builder.add_variant(name, format);
    }
}

impl std::fmt::Debug for PluginApi<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginApi")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

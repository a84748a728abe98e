//! The enumerable context built from a resolved configuration.
//!
//! A [`Context`] exposes two ordered maps: the candidate rule map, keyed by base class name, and
//! the variant map, keyed by variant name. Both are read-only once built; plugins contribute to
//! them through [`ContextBuilder`] during context creation.

use indexmap::IndexMap;

/// Base class key of the catch-all entry that always opens the candidate rule map
pub const CATCH_ALL: &str = "*";

/// Bits reserved below the layer in a class order key
const LAYER_SHIFT: u32 = 96;

/// Bits reserved below the plugin offset in a class order key
const PLUGIN_SHIFT: u32 = 32;

/// Opaque, comparable ordering value attached to rules and variants.
///
/// Keys are signed so that externally built contexts may use negative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey(pub i128);

impl OrderKey {
    /// Key of a rule registered by the plugin at `plugin_offset` in `layer`
    pub fn for_rule(layer: Layer, plugin_offset: u32) -> Self {
        Self(((layer as i128) << LAYER_SHIFT) | (i128::from(plugin_offset) << PLUGIN_SHIFT))
    }
}

/// Cascade layer a rule is emitted into; later layers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Defaults = 0,
    Base = 1,
    Components = 2,
    Utilities = 3,
}

/// Describes how a base class expands into concrete class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Suffix to value mapping; `None` for a class that takes no value
    pub values: Option<IndexMap<String, String>>,

    /// Whether `-{class}` forms are generated for this rule
    pub supports_negative_values: bool,

    /// Modifiers accepted after a `/`, such as the opacity in `bg-red-500/50`
    pub modifiers: Option<IndexMap<String, String>>,
}

impl RuleDescriptor {
    /// A rule for a single class that takes no value
    pub fn plain() -> Self {
        Self::default()
    }

    /// A rule expanding over `values`
    pub fn with_values(values: IndexMap<String, String>, supports_negative_values: bool) -> Self {
        Self {
            values: Some(values),
            supports_negative_values,
            modifiers: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: IndexMap<String, String>) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    fn accepts_modifier(&self, modifier: &str) -> bool {
        self.modifiers
            .as_ref()
            .is_some_and(|modifiers| modifiers.contains_key(modifier))
    }

    /// Whether this rule generates `base` (no suffix) or `base-{suffix}`
    fn generates(&self, suffix: Option<&str>, negative: bool) -> bool {
        if negative && !self.supports_negative_values {
            return false;
        }
        match (suffix, &self.values) {
            (None, None) => true,
            (None, Some(values)) => values.contains_key("DEFAULT"),
            (Some(_), None) => false,
            (Some(suffix), Some(values)) => suffix != "DEFAULT" && values.contains_key(suffix),
        }
    }
}

/// Bookkeeping attached to every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    pub layer: Layer,
    pub sort: OrderKey,
    /// Name of the plugin that registered the rule
    pub plugin: String,
}

/// One way of applying a variant; only the first applicator's sort is used when ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantApplicator {
    pub sort: Option<OrderKey>,
    /// Selector or at-rule template, `&` standing for the class selector
    pub format: String,
}

pub type CandidateRuleMap = IndexMap<String, Vec<(RuleDescriptor, RuleMeta)>>;
pub type VariantMap = IndexMap<String, Vec<VariantApplicator>>;

#[derive(Debug, Clone, Default)]
pub struct Context {
    candidate_rule_map: CandidateRuleMap,
    variant_map: VariantMap,
}

impl Context {
    pub fn new(candidate_rule_map: CandidateRuleMap, variant_map: VariantMap) -> Self {
        Self {
            candidate_rule_map,
            variant_map,
        }
    }

    pub fn candidate_rule_map(&self) -> &CandidateRuleMap {
        &self.candidate_rule_map
    }

    pub fn variant_map(&self) -> &VariantMap {
        &self.variant_map
    }

    /// Pair every class with the order key of the rule generating it.
    ///
    /// Classes no rule generates are paired with `None`. When several rules generate the same
    /// class the latest one wins, since that is the rule whose declarations take effect.
    pub fn class_order(&self, classes: &[String]) -> Vec<(String, Option<OrderKey>)> {
        classes
            .iter()
            .map(|class| (class.clone(), self.order_of(class)))
            .collect()
    }

    fn order_of(&self, class: &str) -> Option<OrderKey> {
        let (negative, body) = match class.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, class),
        };

        // Values may contain a slash themselves (`w-1/2`), so only fall back to reading one as
        // a modifier when the whole body matches nothing
        self.body_order(body, negative, None).or_else(|| {
            let (body, modifier) = body.rsplit_once('/')?;
            self.body_order(body, negative, Some(modifier))
        })
    }

    fn body_order(&self, body: &str, negative: bool, modifier: Option<&str>) -> Option<OrderKey> {
        if let Some(key) = self.rule_order(body, None, negative, modifier) {
            return Some(key);
        }

        // Longest base first: `border-x-2` tries `border-x` before `border`
        body.rmatch_indices('-').find_map(|(idx, _)| {
            self.rule_order(&body[..idx], Some(&body[idx + 1..]), negative, modifier)
        })
    }

    fn rule_order(
        &self,
        base: &str,
        suffix: Option<&str>,
        negative: bool,
        modifier: Option<&str>,
    ) -> Option<OrderKey> {
        self.candidate_rule_map
            .get(base)?
            .iter()
            .filter(|(rule, _)| rule.generates(suffix, negative))
            .filter(|(rule, _)| modifier.is_none_or(|modifier| rule.accepts_modifier(modifier)))
            .map(|(_, meta)| meta.sort)
            .max()
    }
}

/// Accumulates rules and variants plugin by plugin.
#[derive(Debug)]
pub struct ContextBuilder {
    candidate_rule_map: CandidateRuleMap,
    variant_map: VariantMap,
    current_plugin: String,
    plugin_offset: u32,
    variant_offset: i128,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Start a context whose first candidate entry is the catch-all `*` rule
    pub fn new() -> Self {
        let mut candidate_rule_map = CandidateRuleMap::new();
        candidate_rule_map.insert(
            CATCH_ALL.to_owned(),
            vec![(
                RuleDescriptor::plain(),
                RuleMeta {
                    layer: Layer::Defaults,
                    sort: OrderKey::for_rule(Layer::Defaults, 0),
                    plugin: "defaults".to_owned(),
                },
            )],
        );

        Self {
            candidate_rule_map,
            variant_map: VariantMap::new(),
            current_plugin: "defaults".to_owned(),
            plugin_offset: 0,
            variant_offset: 0,
        }
    }

    /// Rules added from now on belong to `name` and sort after every earlier plugin
    pub fn begin_plugin(&mut self, name: &str) {
        self.plugin_offset += 1;
        name.clone_into(&mut self.current_plugin);
    }

    pub fn add_rule(&mut self, base: impl Into<String>, layer: Layer, rule: RuleDescriptor) {
        let meta = RuleMeta {
            layer,
            sort: OrderKey::for_rule(layer, self.plugin_offset),
            plugin: self.current_plugin.clone(),
        };
        self.candidate_rule_map
            .entry(base.into())
            .or_default()
            .push((rule, meta));
    }

    /// Register a variant; re-registering a name appends another applicator
    pub fn add_variant(&mut self, name: impl Into<String>, format: impl Into<String>) {
        let sort = OrderKey(self.variant_offset);
        self.variant_offset += 1;
        self.variant_map
            .entry(name.into())
            .or_default()
            .push(VariantApplicator {
                sort: Some(sort),
                format: format.into(),
            });
    }

    pub fn build(self) -> Context {
        Context::new(self.candidate_rule_map, self.variant_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(keys: &[&str]) -> IndexMap<String, String> {
        keys.iter()
            .map(|k| ((*k).to_owned(), format!("value-{k}")))
            .collect()
    }

    #[test]
    fn test_builder_starts_with_catch_all() {
        let context = ContextBuilder::new().build();
        assert_eq!(
            context.candidate_rule_map().keys().next().map(String::as_str),
            Some(CATCH_ALL)
        );
    }

    #[test]
    fn test_class_order_prefers_longest_base() {
        let mut builder = ContextBuilder::new();
        builder.begin_plugin("borderWidth");
        builder.add_rule(
            "border",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["DEFAULT", "2"]), false),
        );
        builder.begin_plugin("borderWidthX");
        builder.add_rule(
            "border-x",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["DEFAULT", "2"]), false),
        );
        let context = builder.build();

        let order = context.class_order(&["border-x-2".to_owned(), "border".to_owned()]);
        assert_eq!(order[0].1, Some(OrderKey::for_rule(Layer::Utilities, 2)));
        assert_eq!(order[1].1, Some(OrderKey::for_rule(Layer::Utilities, 1)));
    }

    #[test]
    fn test_class_order_negative_requires_support() {
        let mut builder = ContextBuilder::new();
        builder.begin_plugin("margin");
        builder.add_rule(
            "m",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["4"]), true),
        );
        builder.begin_plugin("padding");
        builder.add_rule(
            "p",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["4"]), false),
        );
        let context = builder.build();

        let order = context.class_order(&[
            "-m-4".to_owned(),
            "-p-4".to_owned(),
            "m-DEFAULT".to_owned(),
        ]);
        assert!(order[0].1.is_some());
        assert_eq!(order[1].1, None);
        assert_eq!(order[2].1, None);
    }

    #[test]
    fn test_class_order_reads_modifiers() {
        let mut builder = ContextBuilder::new();
        builder.begin_plugin("width");
        builder.add_rule(
            "w",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["1/2"]), false),
        );
        builder.begin_plugin("backgroundColor");
        builder.add_rule(
            "bg",
            Layer::Utilities,
            RuleDescriptor::with_values(values(&["red-500"]), false)
                .with_modifiers(values(&["50"])),
        );
        let context = builder.build();

        let order = context.class_order(&[
            "w-1/2".to_owned(),
            "bg-red-500/50".to_owned(),
            "bg-red-500/15".to_owned(),
        ]);
        assert_eq!(order[0].1, Some(OrderKey::for_rule(Layer::Utilities, 1)));
        assert_eq!(order[1].1, Some(OrderKey::for_rule(Layer::Utilities, 2)));
        assert_eq!(order[2].1, None);
    }

    #[test]
    fn test_layers_dominate_plugin_offsets() {
        assert!(
            OrderKey::for_rule(Layer::Components, 500) < OrderKey::for_rule(Layer::Utilities, 1)
        );
    }
}

//! Flattening a context into class and variant name lists.

use clap::ValueEnum;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::engine::{Context, OrderKey, RuleDescriptor};

/// How the class list is ordered before it is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderingStrategy {
    /// Order of first occurrence in the candidate rule map
    Simple,
    /// The order the generated CSS would cascade in
    #[default]
    Ordered,
}

impl OrderingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Ordered => "ordered",
        }
    }
}

impl fmt::Display for OrderingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "simple" => Ok(Self::Simple),
            "ordered" => Ok(Self::Ordered),
            other => Err(format!(
                "unknown ordering '{other}', expected 'simple' or 'ordered'"
            )),
        }
    }
}

/// Three-way comparison of order keys; a missing key sorts first.
///
/// Keys compare by the sign of their difference, so equal keys tie and a stable sort keeps
/// their relative order.
pub fn compare_order_keys(a: Option<&OrderKey>, b: Option<&OrderKey>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// Stable sort of `(name, key)` pairs, projected to the names
fn sort_by_order_key(mut entries: Vec<(String, Option<OrderKey>)>) -> Vec<String> {
    entries.sort_by(|(_, a), (_, b)| compare_order_keys(a.as_ref(), b.as_ref()));
    entries.into_iter().map(|(name, _)| name).collect()
}

/// Variant names ordered by the key of each variant's first applicator
pub fn extract_variants(context: &Context) -> Vec<String> {
    let entries = context
        .variant_map()
        .iter()
        .map(|(name, applicators)| {
            let key = applicators.first().and_then(|applicator| applicator.sort);
            (name.clone(), key)
        })
        .collect();
    sort_by_order_key(entries)
}

/// Every class name a single rule generates for `base`, duplicates included.
///
/// `DEFAULT` stands for the bare base. Rules supporting negative values add `-{class}` after
/// each class, except for classes mentioning `auto`. With `include_modifiers`, each class is
/// directly followed by its `/{modifier}` forms.
pub fn expand_candidates(
    base: &str,
    rule: &RuleDescriptor,
    include_modifiers: bool,
) -> Vec<String> {
    let Some(values) = &rule.values else {
        return vec![base.to_owned()];
    };

    let modifiers = rule.modifiers.as_ref().filter(|_| include_modifiers);
    let mut candidates = Vec::with_capacity(values.len());
    for suffix in values.keys() {
        let candidate = if suffix == "DEFAULT" {
            base.to_owned()
        } else {
            format!("{base}-{suffix}")
        };

        let negative = (rule.supports_negative_values && !candidate.contains("auto"))
            .then(|| format!("-{candidate}"));
        let with_modifiers: Vec<String> = modifiers
            .into_iter()
            .flat_map(|modifiers| modifiers.keys())
            .filter(|modifier| *modifier != "DEFAULT")
            .map(|modifier| format!("{candidate}/{modifier}"))
            .collect();
        candidates.push(candidate);
        candidates.extend(with_modifiers);
        candidates.extend(negative);
    }
    candidates
}

/// Keep the first occurrence of every name
pub fn dedupe(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Class names generated by every rule after the leading catch-all entry
pub fn extract_classes(
    context: &Context,
    strategy: OrderingStrategy,
    include_modifiers: bool,
) -> Vec<String> {
    let candidates = context
        .candidate_rule_map()
        .iter()
        .skip(1)
        .flat_map(|(base, rules)| {
            rules
                .iter()
                .flat_map(move |(rule, _)| expand_candidates(base, rule, include_modifiers))
        });
    let classes = dedupe(candidates);

    match strategy {
        OrderingStrategy::Simple => classes,
        OrderingStrategy::Ordered => sort_by_order_key(context.class_order(&classes)),
    }
}

/// The class and variant lists of one context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub classes: Vec<String>,
    pub variants: Vec<String>,
}

impl Enumeration {
    pub fn from_context(
        context: &Context,
        strategy: OrderingStrategy,
        include_modifiers: bool,
    ) -> Self {
        let enumeration = Self {
            classes: extract_classes(context, strategy, include_modifiers),
            variants: extract_variants(context),
        };
        log::info!(
            "Enumerated {} classes and {} variants ({strategy} ordering)",
            enumeration.classes.len(),
            enumeration.variants.len()
        );
        enumeration
    }

    pub fn classes_text(&self) -> String {
        self.classes.join("\n")
    }

    pub fn variants_text(&self) -> String {
        self.variants.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn values(keys: &[&str]) -> IndexMap<String, String> {
        keys.iter().map(|k| ((*k).to_owned(), String::new())).collect()
    }

    #[test]
    fn test_null_keys_sort_first_and_ties_stay_stable() {
        let entries = vec![
            ("a".to_owned(), None),
            ("b".to_owned(), Some(OrderKey(5))),
            ("c".to_owned(), Some(OrderKey(-3))),
            ("d".to_owned(), Some(OrderKey(5))),
        ];
        assert_eq!(sort_by_order_key(entries), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_expand_default_and_negatives() {
        let rule = RuleDescriptor::with_values(values(&["DEFAULT", "4", "auto"]), true);
        assert_eq!(
            expand_candidates("m", &rule, false),
            ["m", "-m", "m-4", "-m-4", "m-auto"]
        );
    }

    #[test]
    fn test_expand_plain_rule() {
        assert_eq!(
            expand_candidates("flex", &RuleDescriptor::plain(), true),
            ["flex"]
        );
    }

    #[test]
    fn test_modifiers_only_when_requested() {
        let rule = RuleDescriptor::with_values(values(&["red-500"]), false)
            .with_modifiers(values(&["50", "75"]));
        assert_eq!(expand_candidates("bg", &rule, false), ["bg-red-500"]);
        assert_eq!(
            expand_candidates("bg", &rule, true),
            ["bg-red-500", "bg-red-500/50", "bg-red-500/75"]
        );
    }

    #[test]
    fn test_ordering_strategy_parses() {
        assert_eq!("simple".parse::<OrderingStrategy>(), Ok(OrderingStrategy::Simple));
        assert_eq!(" ordered ".parse::<OrderingStrategy>(), Ok(OrderingStrategy::Ordered));
        assert!("random".parse::<OrderingStrategy>().is_err());
        assert_eq!(OrderingStrategy::default().to_string(), "ordered");
    }
}

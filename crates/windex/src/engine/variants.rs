use super::context::ContextBuilder;
use super::theme::ResolvedTheme;

const PSEUDO_ELEMENTS: &[(&str, &str)] = &[
    ("first-letter", "&::first-letter"),
    ("first-line", "&::first-line"),
    ("marker", "& *::marker, &::marker"),
    ("selection", "& *::selection, &::selection"),
    ("file", "&::file-selector-button"),
    ("placeholder", "&::placeholder"),
    ("backdrop", "&::backdrop"),
    ("before", "&::before"),
    ("after", "&::after"),
];

const PSEUDO_CLASSES: &[(&str, &str)] = &[
    ("first", "&:first-child"),
    ("last", "&:last-child"),
    ("only", "&:only-child"),
    ("odd", "&:nth-child(odd)"),
    ("even", "&:nth-child(even)"),
    ("first-of-type", "&:first-of-type"),
    ("last-of-type", "&:last-of-type"),
    ("only-of-type", "&:only-of-type"),
    ("visited", "&:visited"),
    ("target", "&:target"),
    ("open", "&[open]"),
    ("default", "&:default"),
    ("checked", "&:checked"),
    ("indeterminate", "&:indeterminate"),
    ("placeholder-shown", "&:placeholder-shown"),
    ("autofill", "&:autofill"),
    ("optional", "&:optional"),
    ("required", "&:required"),
    ("valid", "&:valid"),
    ("invalid", "&:invalid"),
    ("in-range", "&:in-range"),
    ("out-of-range", "&:out-of-range"),
    ("read-only", "&:read-only"),
    ("empty", "&:empty"),
    ("focus-within", "&:focus-within"),
    ("hover", "&:hover"),
    ("focus", "&:focus"),
    ("focus-visible", "&:focus-visible"),
    ("active", "&:active"),
    ("enabled", "&:enabled"),
    ("disabled", "&:disabled"),
];

/// Pseudo classes that also get `group-*` and `peer-*` forms
const RELATIONAL: &[&str] = &[
    "first",
    "last",
    "odd",
    "even",
    "visited",
    "checked",
    "focus-within",
    "hover",
    "focus",
    "focus-visible",
    "active",
    "disabled",
];

const MEDIA: &[(&str, &str)] = &[
    ("ltr", "&:where([dir=\"ltr\"], [dir=\"ltr\"] *)"),
    ("rtl", "&:where([dir=\"rtl\"], [dir=\"rtl\"] *)"),
    ("motion-safe", "@media (prefers-reduced-motion: no-preference)"),
    ("motion-reduce", "@media (prefers-reduced-motion: reduce)"),
    ("dark", "@media (prefers-color-scheme: dark)"),
    ("print", "@media print"),
];

const ORIENTATION: &[(&str, &str)] = &[
    ("portrait", "@media (orientation: portrait)"),
    ("landscape", "@media (orientation: landscape)"),
];

/// Register the core variants in cascade order; responsive variants follow `theme.screens`
pub(crate) fn register_core_variants(builder: &mut ContextBuilder, theme: &ResolvedTheme) {
    for (name, format) in PSEUDO_ELEMENTS.iter().chain(PSEUDO_CLASSES) {
        builder.add_variant(*name, *format);
    }

    for name in RELATIONAL {
        let selector = pseudo_class_selector(name);
        builder.add_variant(
            format!("group-{name}"),
            format!(":merge(.group){selector} &"),
        );
    }
    for name in RELATIONAL {
        let selector = pseudo_class_selector(name);
        builder.add_variant(format!("peer-{name}"), format!(":merge(.peer){selector} ~ &"));
    }

    for (name, format) in MEDIA {
        builder.add_variant(*name, *format);
    }

    for (screen, min_width) in theme.values("screens") {
        builder.add_variant(screen, format!("@media (min-width: {min_width})"));
    }

    for (name, format) in ORIENTATION {
        builder.add_variant(*name, *format);
    }
}

fn pseudo_class_selector(name: &str) -> &'static str {
    PSEUDO_CLASSES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map_or("", |&(_, format)| format.trim_start_matches('&'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleRegistry;
    use std::path::Path;

    #[test]
    fn test_screens_become_variants_after_pseudo_classes() {
        let registry = ModuleRegistry::bundled(Vec::new());
        let theme = crate::engine::theme::resolve_default_theme(&registry, Path::new("."))
            .unwrap();
        let mut builder = ContextBuilder::new();
        register_core_variants(&mut builder, &theme);
        let context = builder.build();

        let names: Vec<&str> = context.variant_map().keys().map(String::as_str).collect();
        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert!(position("hover") < position("focus"));
        assert!(position("focus") < position("sm"));
        assert!(position("sm") < position("2xl"));
        assert!(names.contains(&"group-hover"));
        assert!(names.contains(&"peer-checked"));
        assert_eq!(
            context.variant_map()["md"][0].format,
            "@media (min-width: 768px)"
        );
        assert_eq!(
            context.variant_map()["group-hover"][0].format,
            ":merge(.group):hover &"
        );
    }
}

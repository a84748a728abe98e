//! First-party plugins shipped with the binary and served through the module registry.

use anyhow::Result;
use indexmap::IndexMap;

use super::plugin::{Plugin, PluginApi};
use crate::config::ThemeValue;

/// `@tailwindcss/forms` with the `class` strategy: one component per form control.
#[derive(Debug, Default)]
pub struct FormsPlugin;

impl Plugin for FormsPlugin {
    fn name(&self) -> &str {
        "@tailwindcss/forms"
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        api.add_components([
            "form-input",
            "form-textarea",
            "form-select",
            "form-multiselect",
            "form-checkbox",
            "form-radio",
        ]);
        Ok(())
    }
}

/// `@tailwindcss/typography`: the `prose` component, its sizes and gray themes, plus
/// element variants for styling prose content.
#[derive(Debug, Default)]
pub struct TypographyPlugin;

const PROSE_GRAYS: &[&str] = &["slate", "gray", "zinc", "neutral", "stone"];

const PROSE_ELEMENTS: &[(&str, &str)] = &[
    ("headings", "h1, h2, h3, h4, h5, h6, th"),
    ("h1", "h1"),
    ("h2", "h2"),
    ("h3", "h3"),
    ("h4", "h4"),
    ("p", "p"),
    ("a", "a"),
    ("blockquote", "blockquote"),
    ("strong", "strong"),
    ("em", "em"),
    ("code", "code"),
    ("pre", "pre"),
    ("ol", "ol"),
    ("ul", "ul"),
    ("li", "li"),
    ("table", "table"),
    ("th", "th"),
    ("td", "td"),
    ("img", "img"),
    ("hr", "hr"),
];

impl Plugin for TypographyPlugin {
    fn name(&self) -> &str {
        "@tailwindcss/typography"
    }

    fn theme_defaults(&self) -> IndexMap<String, ThemeValue> {
        let sizes = ["DEFAULT", "sm", "base", "lg", "xl", "2xl"]
            .into_iter()
            .map(|size| (size.to_owned(), ThemeValue::Text(size.to_owned())))
            .collect();
        IndexMap::from([("typography".to_owned(), ThemeValue::Table(sizes))])
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        let sizes = api.theme_values("typography");
        api.match_components(["prose"], &sizes);

        let grays: IndexMap<String, String> = PROSE_GRAYS
            .iter()
            .map(|gray| ((*gray).to_owned(), (*gray).to_owned()))
            .collect();
        api.match_components(["prose"], &grays);
        api.add_components(["prose-invert", "not-prose"]);

        for (element, selector) in PROSE_ELEMENTS {
            api.add_variant(
                &format!("prose-{element}"),
                &format!("& :is(:where({selector}):not(:where(.not-prose *)))"),
            );
        }
        Ok(())
    }
}

/// `@tailwindcss/aspect-ratio`: padding-based `aspect-w-*` and `aspect-h-*` utilities.
#[derive(Debug, Default)]
pub struct AspectRatioPlugin;

impl Plugin for AspectRatioPlugin {
    fn name(&self) -> &str {
        "@tailwindcss/aspect-ratio"
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        let ratios: IndexMap<String, String> =
            (1..=16).map(|n| (n.to_string(), n.to_string())).collect();
        api.match_components(["aspect-w", "aspect-h"], &ratios);
        api.add_components(["aspect-none"]);
        Ok(())
    }
}

/// `@tailwindcss/line-clamp`: `line-clamp-*` over the `lineClamp` theme key.
#[derive(Debug, Default)]
pub struct LineClampPlugin;

impl Plugin for LineClampPlugin {
    fn name(&self) -> &str {
        "@tailwindcss/line-clamp"
    }

    fn theme_defaults(&self) -> IndexMap<String, ThemeValue> {
        let clamps = (1..=6)
            .map(|n| (n.to_string(), ThemeValue::Text(n.to_string())))
            .collect();
        IndexMap::from([("lineClamp".to_owned(), ThemeValue::Table(clamps))])
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        let clamps = api.theme_values("lineClamp");
        api.match_utilities(["line-clamp"], &clamps, false);
        api.add_utilities(["line-clamp-none"]);
        Ok(())
    }
}

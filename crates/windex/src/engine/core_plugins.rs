//! Built-in utility plugins, registered in cascade order before any user plugin.

use anyhow::Result;

use super::plugin::{Plugin, PluginApi};

#[derive(Debug)]
pub(crate) enum CoreRule {
    /// Classes that take no value
    Static(&'static [&'static str]),
    /// Bases expanding over the flattened values of a theme key
    Themed {
        bases: &'static [&'static str],
        theme: &'static str,
        negative: bool,
        /// Theme key whose values are accepted after a `/`
        modifiers: Option<&'static str>,
    },
}

#[derive(Debug)]
pub(crate) struct CorePlugin {
    pub(crate) name: &'static str,
    rules: &'static [CoreRule],
}

impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<()> {
        for rule in self.rules {
            match rule {
                CoreRule::Static(classes) => api.add_utilities(classes.iter()),
                CoreRule::Themed {
                    bases,
                    theme,
                    negative,
                    modifiers,
                } => {
                    let values = api.theme_values(theme);
                    if values.is_empty() {
                        log::debug!("Core plugin '{}' has no '{}' values", self.name, theme);
                        continue;
                    }
                    match modifiers {
                        Some(key) => {
                            let modifiers = api.theme_values(key);
                            api.match_utilities_with_modifiers(bases.iter(), &values, &modifiers);
                        }
                        None => api.match_utilities(bases.iter(), &values, *negative),
                    }
                }
            }
        }
        Ok(())
    }
}

macro_rules! themed {
    ($theme:literal => [$($base:literal),+ $(,)?]) => {
        CoreRule::Themed { bases: &[$($base),+], theme: $theme, negative: false, modifiers: None }
    };
    ($theme:literal => [$($base:literal),+ $(,)?], negative) => {
        CoreRule::Themed { bases: &[$($base),+], theme: $theme, negative: true, modifiers: None }
    };
    ($theme:literal => [$($base:literal),+ $(,)?], modifiers = $modifiers:literal) => {
        CoreRule::Themed {
            bases: &[$($base),+],
            theme: $theme,
            negative: false,
            modifiers: Some($modifiers),
        }
    };
}

macro_rules! plain {
    ($($class:literal),+ $(,)?) => {
        CoreRule::Static(&[$($class),+])
    };
}

/// Every core plugin, in the order its rules cascade
pub(crate) static CORE_PLUGINS: &[CorePlugin] = &[
    CorePlugin {
        name: "container",
        rules: &[plain!("container")],
    },
    CorePlugin {
        name: "accessibility",
        rules: &[plain!("sr-only", "not-sr-only")],
    },
    CorePlugin {
        name: "pointerEvents",
        rules: &[plain!("pointer-events-none", "pointer-events-auto")],
    },
    CorePlugin {
        name: "visibility",
        rules: &[plain!("visible", "invisible", "collapse")],
    },
    CorePlugin {
        name: "position",
        rules: &[plain!("static", "fixed", "absolute", "relative", "sticky")],
    },
    CorePlugin {
        name: "inset",
        rules: &[themed!("inset" => ["inset", "inset-x", "inset-y", "top", "right", "bottom", "left"], negative)],
    },
    CorePlugin {
        name: "isolation",
        rules: &[plain!("isolate", "isolation-auto")],
    },
    CorePlugin {
        name: "zIndex",
        rules: &[themed!("zIndex" => ["z"], negative)],
    },
    CorePlugin {
        name: "order",
        rules: &[themed!("order" => ["order"], negative)],
    },
    CorePlugin {
        name: "float",
        rules: &[plain!("float-right", "float-left", "float-none")],
    },
    CorePlugin {
        name: "clear",
        rules: &[plain!("clear-left", "clear-right", "clear-both", "clear-none")],
    },
    CorePlugin {
        name: "margin",
        rules: &[themed!("margin" => ["m", "mx", "my", "mt", "mr", "mb", "ml"], negative)],
    },
    CorePlugin {
        name: "boxSizing",
        rules: &[plain!("box-border", "box-content")],
    },
    CorePlugin {
        name: "display",
        rules: &[plain!(
            "block",
            "inline-block",
            "inline",
            "flex",
            "inline-flex",
            "table",
            "table-row",
            "table-cell",
            "grid",
            "inline-grid",
            "contents",
            "list-item",
            "hidden",
        )],
    },
    CorePlugin {
        name: "aspectRatio",
        rules: &[themed!("aspectRatio" => ["aspect"])],
    },
    CorePlugin {
        name: "height",
        rules: &[themed!("height" => ["h"])],
    },
    CorePlugin {
        name: "maxHeight",
        rules: &[themed!("maxHeight" => ["max-h"])],
    },
    CorePlugin {
        name: "minHeight",
        rules: &[themed!("minHeight" => ["min-h"])],
    },
    CorePlugin {
        name: "width",
        rules: &[themed!("width" => ["w"])],
    },
    CorePlugin {
        name: "minWidth",
        rules: &[themed!("minWidth" => ["min-w"])],
    },
    CorePlugin {
        name: "maxWidth",
        rules: &[themed!("maxWidth" => ["max-w"])],
    },
    CorePlugin {
        name: "flex",
        rules: &[themed!("flex" => ["flex"])],
    },
    CorePlugin {
        name: "flexShrink",
        rules: &[themed!("flexShrink" => ["shrink"])],
    },
    CorePlugin {
        name: "flexGrow",
        rules: &[themed!("flexGrow" => ["grow"])],
    },
    CorePlugin {
        name: "flexBasis",
        rules: &[themed!("flexBasis" => ["basis"])],
    },
    CorePlugin {
        name: "rotate",
        rules: &[themed!("rotate" => ["rotate"], negative)],
    },
    CorePlugin {
        name: "scale",
        rules: &[themed!("scale" => ["scale", "scale-x", "scale-y"])],
    },
    CorePlugin {
        name: "translate",
        rules: &[themed!("translate" => ["translate-x", "translate-y"], negative)],
    },
    CorePlugin {
        name: "cursor",
        rules: &[themed!("cursor" => ["cursor"])],
    },
    CorePlugin {
        name: "gridTemplateColumns",
        rules: &[themed!("gridTemplateColumns" => ["grid-cols"])],
    },
    CorePlugin {
        name: "flexDirection",
        rules: &[plain!("flex-row", "flex-row-reverse", "flex-col", "flex-col-reverse")],
    },
    CorePlugin {
        name: "flexWrap",
        rules: &[plain!("flex-wrap", "flex-wrap-reverse", "flex-nowrap")],
    },
    CorePlugin {
        name: "alignItems",
        rules: &[plain!(
            "items-start",
            "items-end",
            "items-center",
            "items-baseline",
            "items-stretch",
        )],
    },
    CorePlugin {
        name: "justifyContent",
        rules: &[plain!(
            "justify-normal",
            "justify-start",
            "justify-end",
            "justify-center",
            "justify-between",
            "justify-around",
            "justify-evenly",
            "justify-stretch",
        )],
    },
    CorePlugin {
        name: "gap",
        rules: &[themed!("gap" => ["gap", "gap-x", "gap-y"])],
    },
    CorePlugin {
        name: "space",
        rules: &[
            themed!("space" => ["space-x", "space-y"], negative),
            plain!("space-x-reverse", "space-y-reverse"),
        ],
    },
    CorePlugin {
        name: "overflow",
        rules: &[plain!(
            "overflow-auto",
            "overflow-hidden",
            "overflow-clip",
            "overflow-visible",
            "overflow-scroll",
            "overflow-x-auto",
            "overflow-y-auto",
            "overflow-x-hidden",
            "overflow-y-hidden",
        )],
    },
    CorePlugin {
        name: "whitespace",
        rules: &[plain!(
            "whitespace-normal",
            "whitespace-nowrap",
            "whitespace-pre",
            "whitespace-pre-line",
            "whitespace-pre-wrap",
        )],
    },
    CorePlugin {
        name: "borderRadius",
        rules: &[themed!("borderRadius" => [
            "rounded", "rounded-t", "rounded-r", "rounded-b", "rounded-l",
            "rounded-tl", "rounded-tr", "rounded-br", "rounded-bl",
        ])],
    },
    CorePlugin {
        name: "borderWidth",
        rules: &[themed!("borderWidth" => [
            "border", "border-x", "border-y", "border-t", "border-r", "border-b", "border-l",
        ])],
    },
    CorePlugin {
        name: "borderStyle",
        rules: &[plain!(
            "border-solid",
            "border-dashed",
            "border-dotted",
            "border-double",
            "border-hidden",
            "border-none",
        )],
    },
    CorePlugin {
        name: "borderColor",
        rules: &[themed!("borderColor" => [
            "border", "border-x", "border-y", "border-t", "border-r", "border-b", "border-l",
        ], modifiers = "opacity")],
    },
    CorePlugin {
        name: "backgroundColor",
        rules: &[themed!("backgroundColor" => ["bg"], modifiers = "opacity")],
    },
    CorePlugin {
        name: "backgroundOpacity",
        rules: &[themed!("backgroundOpacity" => ["bg-opacity"])],
    },
    CorePlugin {
        name: "fill",
        rules: &[themed!("fill" => ["fill"], modifiers = "opacity")],
    },
    CorePlugin {
        name: "stroke",
        rules: &[themed!("stroke" => ["stroke"], modifiers = "opacity")],
    },
    CorePlugin {
        name: "padding",
        rules: &[themed!("padding" => ["p", "px", "py", "pt", "pr", "pb", "pl"])],
    },
    CorePlugin {
        name: "textAlign",
        rules: &[plain!(
            "text-left",
            "text-center",
            "text-right",
            "text-justify",
            "text-start",
            "text-end",
        )],
    },
    CorePlugin {
        name: "fontFamily",
        rules: &[themed!("fontFamily" => ["font"])],
    },
    CorePlugin {
        name: "fontSize",
        rules: &[themed!("fontSize" => ["text"])],
    },
    CorePlugin {
        name: "fontWeight",
        rules: &[themed!("fontWeight" => ["font"])],
    },
    CorePlugin {
        name: "lineHeight",
        rules: &[themed!("lineHeight" => ["leading"])],
    },
    CorePlugin {
        name: "letterSpacing",
        rules: &[themed!("letterSpacing" => ["tracking"], negative)],
    },
    CorePlugin {
        name: "textColor",
        rules: &[themed!("textColor" => ["text"], modifiers = "opacity")],
    },
    CorePlugin {
        name: "textDecoration",
        rules: &[plain!("underline", "overline", "line-through", "no-underline")],
    },
    CorePlugin {
        name: "opacity",
        rules: &[themed!("opacity" => ["opacity"])],
    },
    CorePlugin {
        name: "boxShadow",
        rules: &[themed!("boxShadow" => ["shadow"])],
    },
    CorePlugin {
        name: "ringWidth",
        rules: &[
            themed!("ringWidth" => ["ring"]),
            plain!("ring-inset"),
        ],
    },
    CorePlugin {
        name: "ringColor",
        rules: &[themed!("ringColor" => ["ring"], modifiers = "opacity")],
    },
    CorePlugin {
        name: "transitionProperty",
        rules: &[themed!("transitionProperty" => ["transition"])],
    },
    CorePlugin {
        name: "transitionDuration",
        rules: &[themed!("transitionDuration" => ["duration"])],
    },
    CorePlugin {
        name: "transitionTimingFunction",
        rules: &[themed!("transitionTimingFunction" => ["ease"])],
    },
];

/// Whether `name` is one of the core plugins
pub(crate) fn is_core_plugin(name: &str) -> bool {
    CORE_PLUGINS.iter().any(|plugin| plugin.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_core_plugin_names_are_unique() {
        let mut seen = FxHashSet::default();
        for plugin in CORE_PLUGINS {
            assert!(seen.insert(plugin.name), "duplicate core plugin {}", plugin.name);
        }
    }

    #[test]
    fn test_is_core_plugin() {
        assert!(is_core_plugin("backgroundColor"));
        assert!(!is_core_plugin("typography"));
    }
}

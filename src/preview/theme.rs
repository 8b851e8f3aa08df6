//! Theme variables and palettes.
//!
//! Preview nodes refer to themed colors symbolically; a [`Theme`] resolves
//! them to concrete colors right before rasterizing.

use std::collections::HashMap;

use serde::Serialize;

use crate::color::Color;

/// Symbolic color reference resolved by a [`Theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeVar {
    /// Slot background.
    Surface,
    /// Dashed outline of an empty slot.
    EmptyBorder,
    /// Placeholder overlay tint.
    Placeholder,
    /// Browser frame header strip.
    BrowserChrome,
    /// Browser frame outline.
    BrowserBorder,
    /// Add-slot and delete affordances.
    Control,
}

/// A fill or stroke: either concrete or a theme variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paint {
    Solid(Color),
    Var(ThemeVar),
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Paint::Solid(c)
    }
}

impl From<ThemeVar> for Paint {
    fn from(v: ThemeVar) -> Self {
        Paint::Var(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    vars: HashMap<ThemeVar, Color>,
}

impl Theme {
    pub fn light() -> Self {
        Self::from_pairs(
            "light",
            &[
                (ThemeVar::Surface, Color::rgb(0xf5, 0xf5, 0xf7)),
                (ThemeVar::EmptyBorder, Color::rgb(0xd1, 0xd5, 0xdb)),
                (ThemeVar::Placeholder, Color::rgba(0x00, 0x00, 0x00, 0x08)),
                (ThemeVar::BrowserChrome, Color::rgb(0xf3, 0xf4, 0xf6)),
                (ThemeVar::BrowserBorder, Color::rgb(0xe5, 0xe7, 0xeb)),
                (ThemeVar::Control, Color::rgba(0x00, 0x00, 0x00, 0x99)),
            ],
        )
    }

    pub fn dark() -> Self {
        Self::from_pairs(
            "dark",
            &[
                (ThemeVar::Surface, Color::rgb(0x2c, 0x2c, 0x2e)),
                (ThemeVar::EmptyBorder, Color::rgb(0x4b, 0x55, 0x63)),
                (ThemeVar::Placeholder, Color::rgba(0xff, 0xff, 0xff, 0x0d)),
                (ThemeVar::BrowserChrome, Color::rgb(0x37, 0x41, 0x51)),
                (ThemeVar::BrowserBorder, Color::rgb(0x4b, 0x55, 0x63)),
                (ThemeVar::Control, Color::rgba(0xff, 0xff, 0xff, 0x99)),
            ],
        )
    }

    fn from_pairs(name: &str, pairs: &[(ThemeVar, Color)]) -> Self {
        Self {
            name: name.to_string(),
            vars: pairs.iter().copied().collect(),
        }
    }

    pub fn var(&self, var: ThemeVar) -> Option<Color> {
        self.vars.get(&var).copied()
    }

    /// Resolves `paint` to a concrete color; `None` for an undefined var.
    pub fn resolve(&self, paint: Paint) -> Option<Color> {
        match paint {
            Paint::Solid(c) => Some(c),
            Paint::Var(v) => self.var(v),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_surface() {
        assert_eq!(
            Theme::light().resolve(Paint::Var(ThemeVar::Surface)),
            Some(Color::rgb(0xf5, 0xf5, 0xf7))
        );
    }

    #[test]
    fn test_solid_passes_through() {
        let c = Color::rgb(1, 2, 3);
        assert_eq!(Theme::dark().resolve(c.into()), Some(c));
    }

    #[test]
    fn test_every_var_defined_in_both_palettes() {
        let vars = [
            ThemeVar::Surface,
            ThemeVar::EmptyBorder,
            ThemeVar::Placeholder,
            ThemeVar::BrowserChrome,
            ThemeVar::BrowserBorder,
            ThemeVar::Control,
        ];
        for theme in [Theme::light(), Theme::dark()] {
            for v in vars {
                assert!(theme.var(v).is_some(), "{} misses {:?}", theme.name, v);
            }
        }
    }
}

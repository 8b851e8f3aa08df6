//! RGBA colors and the canvas background setting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(input: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(input.to_string());
        let hex = input.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Color::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Color::rgba(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }

    /// Converts to the pixel type used by the raster pipeline.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Error type for parsing colors and backgrounds from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid color: {} (expected #rrggbb, #rrggbbaa or transparent)",
            self.0
        )
    }
}

impl std::error::Error for ParseColorError {}

/// Canvas background: a solid color or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    Transparent,
    Color(Color),
}

impl Background {
    /// The fill color, or `None` when transparent.
    pub fn fill(&self) -> Option<Color> {
        match self {
            Background::Transparent => None,
            Background::Color(c) => Some(*c),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Color::WHITE)
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Transparent => write!(f, "transparent"),
            Background::Color(c) => write!(f, "{}", c),
        }
    }
}

impl FromStr for Background {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("transparent") {
            Ok(Background::Transparent)
        } else {
            Color::from_hex(s).map(Background::Color)
        }
    }
}

impl TryFrom<String> for Background {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Background> for String {
    fn from(bg: Background) -> Self {
        bg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit_hex() {
        let c = Color::from_hex("#fef8e0").expect("valid hex");
        assert_eq!(c, Color::rgb(0xfe, 0xf8, 0xe0));
        assert!(c.is_opaque());
    }

    #[test]
    fn test_parse_short_and_alpha_hex() {
        assert_eq!(Color::from_hex("#fff"), Ok(Color::WHITE));
        assert_eq!(
            Color::from_hex("#00000080"),
            Ok(Color::rgba(0, 0, 0, 0x80))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::from_hex("ffffff").is_err());
        assert!(Color::from_hex("#ggg").is_err());
        assert!(Color::from_hex("#12345").is_err());
    }

    #[test]
    fn test_display_drops_opaque_alpha() {
        assert_eq!(Color::rgb(0x1a, 0x1a, 0x1a).to_string(), "#1a1a1a");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_background_parse() {
        assert_eq!(
            "transparent".parse::<Background>(),
            Ok(Background::Transparent)
        );
        assert_eq!(
            "#ffffff".parse::<Background>(),
            Ok(Background::Color(Color::WHITE))
        );
        assert!("white".parse::<Background>().is_err());
    }

    #[test]
    fn test_background_default_is_white() {
        assert_eq!(Background::default().fill(), Some(Color::WHITE));
        assert_eq!(Background::Transparent.fill(), None);
    }

    #[test]
    fn test_parse_error_display() {
        let err = Color::from_hex("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}

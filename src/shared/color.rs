//! RGB-Farben mit Hex-Serialisierung.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Farbe konnte nicht gelesen werden.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ungültige Farbe '{0}', erwartet '#rrggbb'")]
pub struct ColorParseError(pub String);

/// RGB-Farbe, serialisiert als `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Erstellt eine Farbe aus RGB-Komponenten.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Liest `#rrggbb` oder `#rgb`.
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(text.to_string());
        let hex = text.trim().strip_prefix('#').ok_or_else(err)?;
        let component = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());

        match hex.len() {
            6 => Ok(Self::rgb(
                component(&hex[0..2])?,
                component(&hex[2..4])?,
                component(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| component(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }

    /// Hex-Darstellung `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Lineare Interpolation, `t` in [0, 1].
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

//! Farbtabellen (Colormaps) für lineare Farbkodierung.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Color;

/// Gleichmäßig verteilte Farbstützstellen von 0 bis 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTable {
    /// Stützstellen, mindestens eine
    pub stops: Vec<Color>,
}

impl ColorTable {
    /// Erstellt eine Tabelle aus Hex-Stützstellen. Ungültige Einträge werden ignoriert.
    fn from_hex(stops: &[&str]) -> Self {
        Self {
            stops: stops
                .iter()
                .filter_map(|hex| Color::from_hex(hex).ok())
                .collect(),
        }
    }

    /// Graustufen von Schwarz nach Weiß.
    pub fn grayscale() -> Self {
        Self::from_hex(&["#000000", "#ffffff"])
    }

    /// Farbe an Position `t` in [0, 1]. `None` für nicht-endliche Werte.
    pub fn sample(&self, t: f64) -> Option<Color> {
        if !t.is_finite() {
            return None;
        }
        let t = t.clamp(0.0, 1.0);
        match self.stops.as_slice() {
            [] => None,
            [only] => Some(*only),
            stops => {
                let scaled = t * (stops.len() - 1) as f64;
                let lower = (scaled.floor() as usize).min(stops.len() - 2);
                Some(stops[lower].lerp(stops[lower + 1], scaled - lower as f64))
            }
        }
    }

    /// Stützstellen mit Position, z.B. als Heatmap-Gradient.
    pub fn gradient(&self) -> Vec<(f64, Color)> {
        let last = self.stops.len().saturating_sub(1).max(1) as f64;
        self.stops
            .iter()
            .enumerate()
            .map(|(i, &color)| (i as f64 / last, color))
            .collect()
    }
}

/// Eingebaute Farbtabellen.
pub fn builtin_color_tables() -> IndexMap<String, ColorTable> {
    let mut tables = IndexMap::new();
    tables.insert(
        "viridis".to_string(),
        ColorTable::from_hex(&["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"]),
    );
    tables.insert(
        "magma".to_string(),
        ColorTable::from_hex(&["#000004", "#51127c", "#b73779", "#fc8961", "#fcfdbf"]),
    );
    tables.insert(
        "reds".to_string(),
        ColorTable::from_hex(&["#fff5f0", "#fcbba1", "#fb6a4a", "#cb181d", "#67000d"]),
    );
    tables.insert(
        "blues".to_string(),
        ColorTable::from_hex(&["#f7fbff", "#c6dbef", "#6baed6", "#2171b5", "#08306b"]),
    );
    tables.insert(
        "purples".to_string(),
        ColorTable::from_hex(&["#fcfbfd", "#dadaeb", "#9e9ac8", "#6a51a3", "#3f007d"]),
    );
    tables.insert("gray".to_string(), ColorTable::grayscale());
    tables
}

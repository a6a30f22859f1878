//! Zentrale Konfiguration der Kartenansicht.
//!
//! `ViewerOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::color_table::builtin_color_tables;
use super::{Color, ColorTable};
use crate::core::LatLon;

// ── Layer-Darstellung ───────────────────────────────────────────────

/// Ab dieser Zeilenanzahl starten Punkt-Layer in der Dichte-Darstellung.
pub const LARGE_DATA_SIZE: usize = 1000;
/// Standard-Deckkraft neuer Layer.
pub const DEFAULT_ALPHA: f64 = 0.7;
/// Standard-Markerradius (Pixel).
pub const DEFAULT_MARKER_RADIUS: f64 = 4.0;
/// Kleinster Markerradius bei linearer Größenkodierung.
pub const MARKER_RADIUS_MIN: f64 = 2.0;
/// Größter Markerradius bei linearer Größenkodierung.
pub const MARKER_RADIUS_MAX: f64 = 12.0;
/// Heatmap-Radius (Pixel).
pub const HEATMAP_RADIUS: f64 = 2.0;
/// Heatmap-Weichzeichnung.
pub const HEATMAP_BLUR: f64 = 1.0;
/// Umrissbreite von Daten-Regionen.
pub const REGION_WEIGHT: f64 = 0.5;
/// Umrissbreite von Subset-Regionen.
pub const SUBSET_REGION_WEIGHT: f64 = 3.0;
/// Füll-Deckkraft beim Hover über einer Region.
pub const REGION_HOVER_FILL_OPACITY: f64 = 0.95;
/// Standardfarbe von Daten-Layern.
pub const DATA_COLOR: Color = Color::rgb(0x59, 0x59, 0x59);
/// Standard-Farbtabelle.
pub const DEFAULT_COLOR_TABLE: &str = "viridis";

// ── Werkzeuge ───────────────────────────────────────────────────────

/// Farbe der Gesten-Overlays.
pub const INTERACT_COLOR: Color = Color::rgb(0xff, 0xff, 0x00);
/// Schließ-Toleranz des Polygon-Werkzeugs als Anteil der Umrissgröße.
pub const POLYGON_CLOSE_TOLERANCE: f64 = 0.02;

// ── Ansicht ─────────────────────────────────────────────────────────

/// Startzoom.
pub const DEFAULT_ZOOM: f64 = 4.0;
/// Kleinster Zoom für `reset_limits`.
pub const ZOOM_MIN: f64 = 1.0;
/// Größter Zoom für `reset_limits`.
pub const ZOOM_MAX: f64 = 18.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Viewer-Optionen.
/// Wird als `region_map_viewer.toml` gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerOptions {
    // ── Layer ───────────────────────────────────────────────────
    /// Ab dieser Zeilenanzahl starten Punkt-Layer als Heatmap
    pub large_data_size: usize,
    /// Standard-Deckkraft neuer Layer
    pub default_alpha: f64,
    /// Standardfarbe von Daten-Layern
    pub data_color: Color,
    /// Farben neuer Subsets, zyklisch vergeben
    pub subset_palette: Vec<Color>,
    /// Name der Standard-Farbtabelle
    pub default_color_table: String,

    // ── Marker / Heatmap ────────────────────────────────────────
    /// Standard-Markerradius
    pub default_marker_radius: f64,
    /// Kleinster Radius bei linearer Größenkodierung
    pub marker_radius_min: f64,
    /// Größter Radius bei linearer Größenkodierung
    pub marker_radius_max: f64,
    /// Heatmap-Radius
    pub heatmap_radius: f64,
    /// Heatmap-Weichzeichnung
    pub heatmap_blur: f64,

    // ── Regionen ────────────────────────────────────────────────
    /// Umrissbreite von Daten-Regionen
    pub region_weight: f64,
    /// Umrissbreite von Subset-Regionen
    pub subset_region_weight: f64,
    /// Füll-Deckkraft beim Hover
    pub region_hover_fill_opacity: f64,

    // ── Werkzeuge ───────────────────────────────────────────────
    /// Farbe der Gesten-Overlays
    pub interact_color: Color,
    /// Schließ-Toleranz des Polygon-Werkzeugs (Anteil der Umrissgröße)
    #[serde(default = "default_polygon_close_tolerance")]
    pub polygon_close_tolerance: f64,

    // ── Ansicht ─────────────────────────────────────────────────
    /// Startzoom
    pub default_zoom: f64,
    /// Startzentrum
    pub default_center: LatLon,

    // ── Farbtabellen ────────────────────────────────────────────
    /// Registrierte Farbtabellen
    #[serde(default = "builtin_color_tables")]
    pub color_tables: IndexMap<String, ColorTable>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            large_data_size: LARGE_DATA_SIZE,
            default_alpha: DEFAULT_ALPHA,
            data_color: DATA_COLOR,
            subset_palette: vec![
                Color::rgb(0xe3, 0x1a, 0x1c),
                Color::rgb(0x1f, 0x78, 0xb4),
                Color::rgb(0x33, 0xa0, 0x2c),
                Color::rgb(0xff, 0x7f, 0x00),
                Color::rgb(0x6a, 0x3d, 0x9a),
                Color::rgb(0xb1, 0x59, 0x28),
            ],
            default_color_table: DEFAULT_COLOR_TABLE.to_string(),

            default_marker_radius: DEFAULT_MARKER_RADIUS,
            marker_radius_min: MARKER_RADIUS_MIN,
            marker_radius_max: MARKER_RADIUS_MAX,
            heatmap_radius: HEATMAP_RADIUS,
            heatmap_blur: HEATMAP_BLUR,

            region_weight: REGION_WEIGHT,
            subset_region_weight: SUBSET_REGION_WEIGHT,
            region_hover_fill_opacity: REGION_HOVER_FILL_OPACITY,

            interact_color: INTERACT_COLOR,
            polygon_close_tolerance: POLYGON_CLOSE_TOLERANCE,

            default_zoom: DEFAULT_ZOOM,
            default_center: LatLon::new(0.0, 0.0),

            color_tables: builtin_color_tables(),
        }
    }
}

/// Serde-Default für `polygon_close_tolerance` (Abwärtskompatibilität).
fn default_polygon_close_tolerance() -> f64 {
    POLYGON_CLOSE_TOLERANCE
}

impl ViewerOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen in eine TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Farbtabelle per Name. Unbekannte Namen fallen auf die Standardtabelle
    /// und zuletzt auf Graustufen zurück.
    pub fn color_table(&self, name: &str) -> Cow<'_, ColorTable> {
        if let Some(table) = self.color_tables.get(name) {
            return Cow::Borrowed(table);
        }
        log::warn!("Unbekannte Farbtabelle '{}', verwende Standard", name);
        self.color_tables
            .get(&self.default_color_table)
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(ColorTable::grayscale()))
    }

    /// Farbe des n-ten Subsets.
    pub fn subset_color(&self, index: usize) -> Color {
        if self.subset_palette.is_empty() {
            return INTERACT_COLOR;
        }
        self.subset_palette[index % self.subset_palette.len()]
    }
}

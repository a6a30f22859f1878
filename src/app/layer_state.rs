//! Darstellungszustand eines Layers und Feld-Diff gegen den letzten Stand.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::{GeometryKind, LayerSource};
use crate::shared::{Color, ViewerOptions};

/// Farbkodierung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Eine Farbe für alle Features
    #[default]
    Fixed,
    /// Farbe aus Attributwert über Farbtabelle
    Linear,
}

/// Größenkodierung (Punkt-Layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeMode {
    #[default]
    Fixed,
    Linear,
}

/// Darstellung von Punkt-Layern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Einzelne Marker
    #[default]
    Discrete,
    /// Dichte (Heatmap)
    Density,
}

/// Vom Benutzer änderbare Darstellungsfelder eines Layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualLayerState {
    pub visible: bool,
    pub color: Color,
    /// Deckkraft in [0, 1]
    pub alpha: f64,
    /// Flächen füllen (nur Regionen)
    pub fill: bool,
    pub color_mode: ColorMode,
    pub color_attribute: Option<String>,
    pub color_min: f64,
    pub color_max: f64,
    /// Name der Farbtabelle
    pub color_table: String,
    /// Markerradius bzw. Heatmap-Radius
    pub size: f64,
    pub size_mode: SizeMode,
    pub size_attribute: Option<String>,
    pub size_min: f64,
    pub size_max: f64,
    pub size_scaling: f64,
    pub display_mode: DisplayMode,
}

impl VisualLayerState {
    /// Startzustand für eine Datenquelle.
    ///
    /// Punkt-Layer mit vielen Zeilen starten als Heatmap. Raster starten mit
    /// linearer Farbkodierung über das erste normale numerische Attribut.
    pub fn for_source(source: &LayerSource, options: &ViewerOptions, color: Color) -> Self {
        let data = source.collection();
        let display_mode = if data.kind().is_point() && data.row_count() >= options.large_data_size
        {
            DisplayMode::Density
        } else {
            DisplayMode::Discrete
        };

        let (color_mode, color_attribute) = if data.kind() == GeometryKind::Raster {
            let first_plain = data
                .attributes()
                .find(|attr| !attr.is_centroid() && attr.column.is_numeric())
                .map(|attr| attr.name.clone());
            match first_plain {
                Some(name) => (ColorMode::Linear, Some(name)),
                None => (ColorMode::Fixed, None),
            }
        } else {
            (ColorMode::Fixed, None)
        };

        Self {
            visible: true,
            color,
            alpha: options.default_alpha,
            fill: true,
            color_mode,
            color_attribute,
            color_min: 0.0,
            color_max: 1.0,
            color_table: options.default_color_table.clone(),
            size: if display_mode == DisplayMode::Density {
                options.heatmap_radius
            } else {
                options.default_marker_radius
            },
            size_mode: SizeMode::Fixed,
            size_attribute: None,
            size_min: 0.0,
            size_max: 1.0,
            size_scaling: 1.0,
            display_mode,
        }
    }

    /// Vertauscht Farb-Minimum und -Maximum.
    pub fn flip_color_limits(&mut self) {
        std::mem::swap(&mut self.color_min, &mut self.color_max);
    }

    /// Vertauscht Größen-Minimum und -Maximum.
    pub fn flip_size_limits(&mut self) {
        std::mem::swap(&mut self.size_min, &mut self.size_max);
    }

    /// Felder, in denen sich `self` von `previous` unterscheidet.
    pub fn changed_fields(&self, previous: &VisualLayerState) -> BTreeSet<LayerField> {
        let mut changed = BTreeSet::new();
        let mut check = |differs: bool, field: LayerField| {
            if differs {
                changed.insert(field);
            }
        };

        check(self.visible != previous.visible, LayerField::Visible);
        check(self.color != previous.color, LayerField::Color);
        check(self.alpha != previous.alpha, LayerField::Alpha);
        check(self.fill != previous.fill, LayerField::Fill);
        check(self.color_mode != previous.color_mode, LayerField::ColorMode);
        check(
            self.color_attribute != previous.color_attribute,
            LayerField::ColorAttribute,
        );
        check(self.color_min != previous.color_min, LayerField::ColorMin);
        check(self.color_max != previous.color_max, LayerField::ColorMax);
        check(self.color_table != previous.color_table, LayerField::ColorTable);
        check(self.size != previous.size, LayerField::Size);
        check(self.size_mode != previous.size_mode, LayerField::SizeMode);
        check(
            self.size_attribute != previous.size_attribute,
            LayerField::SizeAttribute,
        );
        check(self.size_min != previous.size_min, LayerField::SizeMin);
        check(self.size_max != previous.size_max, LayerField::SizeMax);
        check(self.size_scaling != previous.size_scaling, LayerField::SizeScaling);
        check(self.display_mode != previous.display_mode, LayerField::DisplayMode);
        changed
    }
}

/// Ein beobachtetes Feld des Layer-Zustands (inklusive Viewer-Achsen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerField {
    LatAttribute,
    LonAttribute,
    Visible,
    Color,
    Alpha,
    Fill,
    ColorMode,
    ColorAttribute,
    ColorMin,
    ColorMax,
    ColorTable,
    Size,
    SizeMode,
    SizeAttribute,
    SizeMin,
    SizeMax,
    SizeScaling,
    DisplayMode,
}

impl LayerField {
    /// Felder, die eine Neuberechnung der Attributwerte erfordern.
    pub fn selects_data(self) -> bool {
        matches!(
            self,
            LayerField::LatAttribute
                | LayerField::LonAttribute
                | LayerField::ColorMode
                | LayerField::ColorAttribute
                | LayerField::SizeMode
                | LayerField::SizeAttribute
                | LayerField::DisplayMode
        )
    }
}

/// Zwischenspeicher der zuletzt genutzten Wertebereiche je Attribut.
#[derive(Debug, Clone, Default)]
pub struct LimitsCache {
    color: HashMap<String, (f64, f64)>,
    size: HashMap<String, (f64, f64)>,
}

impl LimitsCache {
    /// Merkt sich die aktuellen Farbgrenzen für `attribute`.
    pub fn store_color(&mut self, attribute: &str, limits: (f64, f64)) {
        self.color.insert(attribute.to_string(), limits);
    }

    /// Gemerkte Farbgrenzen für `attribute`.
    pub fn color(&self, attribute: &str) -> Option<(f64, f64)> {
        self.color.get(attribute).copied()
    }

    /// Merkt sich die aktuellen Größengrenzen für `attribute`.
    pub fn store_size(&mut self, attribute: &str, limits: (f64, f64)) {
        self.size.insert(attribute.to_string(), limits);
    }

    /// Gemerkte Größengrenzen für `attribute`.
    pub fn size(&self, attribute: &str) -> Option<(f64, f64)> {
        self.size.get(attribute).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{Column, RegionCollection, Table};

    fn point_source(rows: usize) -> LayerSource {
        let mut table = Table::new();
        table.insert("lat".into(), Column::Float(vec![0.0; rows]));
        table.insert("lon".into(), Column::Float(vec![0.0; rows]));
        LayerSource::Collection(Arc::new(
            RegionCollection::from_table("pts", table).expect("Tabelle erwartet"),
        ))
    }

    #[test]
    fn large_point_data_starts_as_density() {
        let options = ViewerOptions::default();
        let small = VisualLayerState::for_source(&point_source(10), &options, options.data_color);
        let large = VisualLayerState::for_source(
            &point_source(options.large_data_size),
            &options,
            options.data_color,
        );

        assert_eq!(small.display_mode, DisplayMode::Discrete);
        assert_eq!(large.display_mode, DisplayMode::Density);
    }

    #[test]
    fn changed_fields_lists_only_differences() {
        let options = ViewerOptions::default();
        let before = VisualLayerState::for_source(&point_source(1), &options, options.data_color);
        let mut after = before.clone();
        after.alpha = 0.2;
        after.flip_color_limits();

        let changed: Vec<LayerField> = after.changed_fields(&before).into_iter().collect();
        assert_eq!(
            changed,
            vec![LayerField::Alpha, LayerField::ColorMin, LayerField::ColorMax]
        );
    }

    #[test]
    fn limits_cache_remembers_per_attribute() {
        let mut cache = LimitsCache::default();
        cache.store_color("a", (1.0, 2.0));

        assert_eq!(cache.color("a"), Some((1.0, 2.0)));
        assert_eq!(cache.color("b"), None);
        assert_eq!(cache.size("a"), None);
    }
}

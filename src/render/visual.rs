//! Visual Objects: darstellbare Objekte der Kartenoberfläche.
//!
//! Jedes Objekt ist reine Daten. Der Layer-Controller baut ein Zielobjekt und
//! überträgt einzelne Eigenschaften per `copy_property` in das bestehende
//! Objekt, sofern die Oberfläche die Eigenschaft reaktiv ändern kann.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::core::LatLon;
use crate::shared::Color;

/// Handle eines Objekts auf der Oberfläche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u64);

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visual#{}", self.0)
    }
}

/// Art eines Visual Objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// GeoJSON-Feature-Sammlung mit Stil-Callback
    Regions,
    /// Gruppe einzelner Kreismarker
    Markers,
    /// Dichte-Darstellung
    Heatmap,
    /// Bild-Overlay (Raster)
    Image,
    /// Rechteck/Polygon/Linie der Selektions-Gesten
    Shape,
}

/// Einzeln änderbare Eigenschaft eines Visual Objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualProperty {
    Visible,
    Opacity,
    Color,
    Fill,
    Weight,
    Radius,
    Blur,
    Gradient,
    FeatureColors,
    Data,
    Bounds,
}

impl VisualProperty {
    /// Alle Eigenschaften.
    pub const ALL: [VisualProperty; 11] = [
        VisualProperty::Visible,
        VisualProperty::Opacity,
        VisualProperty::Color,
        VisualProperty::Fill,
        VisualProperty::Weight,
        VisualProperty::Radius,
        VisualProperty::Blur,
        VisualProperty::Gradient,
        VisualProperty::FeatureColors,
        VisualProperty::Data,
        VisualProperty::Bounds,
    ];
}

// ── Regionen ────────────────────────────────────────────────────────

/// Gemeinsamer Stil aller Features eines Region-Layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStyle {
    /// Umrissfarbe
    pub color: Color,
    /// Füllfarbe (ohne Feature-Eintrag)
    pub fill_color: Color,
    /// Umrissbreite
    pub weight: f64,
    /// Umriss-Deckkraft
    pub opacity: f64,
    /// Füll-Deckkraft
    pub fill_opacity: f64,
    /// Strichmuster, z.B. "5, 5"
    pub dash_array: String,
}

/// Ein Objekt für alle Features eines Layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayer {
    pub name: String,
    /// GeoJSON-FeatureCollection
    pub features: Value,
    pub style: RegionStyle,
    pub hover_fill_opacity: f64,
    /// Füllfarbe je Feature-ID (Stil-Callback)
    pub feature_colors: IndexMap<String, Color>,
    pub visible: bool,
}

impl RegionLayer {
    /// Stil-Callback: Stil eines Features anhand seiner ID.
    pub fn style_for(&self, feature_id: &str) -> RegionStyle {
        let mut style = self.style.clone();
        if let Some(color) = self.feature_colors.get(feature_id) {
            style.fill_color = *color;
        }
        style
    }

    /// Anzahl der Features.
    pub fn feature_count(&self) -> usize {
        self.features["features"].as_array().map_or(0, Vec::len)
    }

    fn same(&self, other: &Self, property: VisualProperty) -> bool {
        match property {
            VisualProperty::Visible => self.visible == other.visible,
            VisualProperty::Opacity => {
                self.style.opacity == other.style.opacity
                    && self.style.fill_opacity == other.style.fill_opacity
            }
            VisualProperty::Fill => self.style.fill_opacity == other.style.fill_opacity,
            VisualProperty::Color => {
                self.style.color == other.style.color
                    && self.style.fill_color == other.style.fill_color
            }
            VisualProperty::Weight => {
                self.style.weight == other.style.weight
                    && self.style.dash_array == other.style.dash_array
            }
            VisualProperty::FeatureColors => self.feature_colors == other.feature_colors,
            VisualProperty::Data => self.features == other.features,
            _ => true,
        }
    }

    fn copy(&mut self, other: &Self, property: VisualProperty) {
        match property {
            VisualProperty::Visible => self.visible = other.visible,
            VisualProperty::Opacity => {
                self.style.opacity = other.style.opacity;
                self.style.fill_opacity = other.style.fill_opacity;
            }
            VisualProperty::Fill => self.style.fill_opacity = other.style.fill_opacity,
            VisualProperty::Color => {
                self.style.color = other.style.color;
                self.style.fill_color = other.style.fill_color;
            }
            VisualProperty::Weight => {
                self.style.weight = other.style.weight;
                self.style.dash_array = other.style.dash_array.clone();
            }
            VisualProperty::FeatureColors => self.feature_colors = other.feature_colors.clone(),
            VisualProperty::Data => self.features = other.features.clone(),
            _ => {}
        }
    }
}

// ── Marker ──────────────────────────────────────────────────────────

/// Einzelner Kreismarker.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    /// Eltern-Zeile
    pub row: usize,
    pub location: LatLon,
    pub radius: f64,
    pub fill_color: Color,
    pub fill_opacity: f64,
    pub stroke: bool,
}

/// Gruppe von Kreismarkern eines Layers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    pub name: String,
    pub markers: Vec<CircleMarker>,
    pub visible: bool,
}

impl MarkerGroup {
    fn same(&self, other: &Self, property: VisualProperty) -> bool {
        let zip_all = |f: &dyn Fn(&CircleMarker, &CircleMarker) -> bool| {
            self.markers.len() == other.markers.len()
                && self.markers.iter().zip(&other.markers).all(|(a, b)| f(a, b))
        };
        match property {
            VisualProperty::Visible => self.visible == other.visible,
            VisualProperty::Opacity => zip_all(&|a, b| a.fill_opacity == b.fill_opacity),
            VisualProperty::Color => zip_all(&|a, b| a.fill_color == b.fill_color),
            VisualProperty::Radius => zip_all(&|a, b| a.radius == b.radius),
            VisualProperty::Data => zip_all(&|a, b| a.row == b.row && a.location == b.location),
            _ => true,
        }
    }

    fn copy(&mut self, other: &Self, property: VisualProperty) {
        if property == VisualProperty::Visible {
            self.visible = other.visible;
            return;
        }
        // Andere Markeranzahl: Eigenschaften lassen sich nicht einzeln übertragen
        if property == VisualProperty::Data || self.markers.len() != other.markers.len() {
            self.markers = other.markers.clone();
            return;
        }
        for (marker, source) in self.markers.iter_mut().zip(&other.markers) {
            match property {
                VisualProperty::Opacity => marker.fill_opacity = source.fill_opacity,
                VisualProperty::Color => marker.fill_color = source.fill_color,
                VisualProperty::Radius => marker.radius = source.radius,
                _ => {}
            }
        }
    }
}

// ── Heatmap ─────────────────────────────────────────────────────────

/// Punkt einer Heatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    pub location: LatLon,
    /// Intensität in [0, 1]
    pub intensity: f64,
}

/// Dichte-Darstellung eines Punkt-Layers.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub name: String,
    pub points: Vec<HeatPoint>,
    pub radius: f64,
    pub blur: f64,
    pub min_opacity: f64,
    /// Farbverlauf (Position, Farbe)
    pub gradient: Vec<(f64, Color)>,
    pub visible: bool,
}

impl HeatmapLayer {
    fn same(&self, other: &Self, property: VisualProperty) -> bool {
        match property {
            VisualProperty::Visible => self.visible == other.visible,
            VisualProperty::Data => self.points == other.points,
            VisualProperty::Radius => self.radius == other.radius,
            VisualProperty::Blur => self.blur == other.blur,
            VisualProperty::Opacity => self.min_opacity == other.min_opacity,
            VisualProperty::Gradient | VisualProperty::Color => self.gradient == other.gradient,
            _ => true,
        }
    }

    fn copy(&mut self, other: &Self, property: VisualProperty) {
        match property {
            VisualProperty::Visible => self.visible = other.visible,
            VisualProperty::Data => self.points = other.points.clone(),
            VisualProperty::Radius => self.radius = other.radius,
            VisualProperty::Blur => self.blur = other.blur,
            VisualProperty::Opacity => self.min_opacity = other.min_opacity,
            VisualProperty::Gradient | VisualProperty::Color => {
                self.gradient = other.gradient.clone()
            }
            _ => {}
        }
    }
}

// ── Bild ────────────────────────────────────────────────────────────

/// Raster als RGBA-Bild über einem geografischen Rechteck.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOverlay {
    pub name: String,
    pub south_west: LatLon,
    pub north_east: LatLon,
    pub width: usize,
    pub height: usize,
    /// Pixel zeilenweise von Nord nach Süd
    pub pixels: Vec<[u8; 4]>,
    pub opacity: f64,
    pub visible: bool,
}

impl ImageOverlay {
    fn same(&self, other: &Self, property: VisualProperty) -> bool {
        match property {
            VisualProperty::Visible => self.visible == other.visible,
            VisualProperty::Opacity => self.opacity == other.opacity,
            VisualProperty::Data | VisualProperty::Color => {
                self.pixels == other.pixels
                    && self.width == other.width
                    && self.height == other.height
                    && self.south_west == other.south_west
                    && self.north_east == other.north_east
            }
            _ => true,
        }
    }

    fn copy(&mut self, other: &Self, property: VisualProperty) {
        match property {
            VisualProperty::Visible => self.visible = other.visible,
            VisualProperty::Opacity => self.opacity = other.opacity,
            VisualProperty::Data | VisualProperty::Color => {
                self.pixels = other.pixels.clone();
                self.width = other.width;
                self.height = other.height;
                self.south_west = other.south_west;
                self.north_east = other.north_east;
            }
            _ => {}
        }
    }
}

// ── Gesten-Overlays ─────────────────────────────────────────────────

/// Form eines Gesten-Overlays.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle { corners: [LatLon; 2] },
    Polygon(Vec<LatLon>),
    Polyline(Vec<LatLon>),
}

/// Stil eines Gesten-Overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub color: Color,
    pub fill_color: Color,
    pub weight: f64,
    pub fill_opacity: f64,
    pub dash_array: String,
}

/// Provisorisches Overlay einer Selektions-Geste.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOverlay {
    pub shape: Shape,
    pub style: ShapeStyle,
    pub visible: bool,
}

impl ShapeOverlay {
    fn same(&self, other: &Self, property: VisualProperty) -> bool {
        match property {
            VisualProperty::Visible => self.visible == other.visible,
            VisualProperty::Color => {
                self.style.color == other.style.color
                    && self.style.fill_color == other.style.fill_color
            }
            VisualProperty::Opacity => self.style.fill_opacity == other.style.fill_opacity,
            VisualProperty::Weight => self.style.weight == other.style.weight,
            VisualProperty::Bounds => self.shape == other.shape,
            _ => true,
        }
    }

    fn copy(&mut self, other: &Self, property: VisualProperty) {
        match property {
            VisualProperty::Visible => self.visible = other.visible,
            VisualProperty::Color => {
                self.style.color = other.style.color;
                self.style.fill_color = other.style.fill_color;
            }
            VisualProperty::Opacity => self.style.fill_opacity = other.style.fill_opacity,
            VisualProperty::Weight => self.style.weight = other.style.weight,
            VisualProperty::Bounds => self.shape = other.shape.clone(),
            _ => {}
        }
    }
}

// ── VisualObject ────────────────────────────────────────────────────

/// Ein Objekt auf der Kartenoberfläche.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualObject {
    Regions(RegionLayer),
    Markers(MarkerGroup),
    Heatmap(HeatmapLayer),
    Image(ImageOverlay),
    Shape(ShapeOverlay),
}

impl VisualObject {
    /// Art des Objekts.
    pub fn kind(&self) -> VisualKind {
        match self {
            VisualObject::Regions(_) => VisualKind::Regions,
            VisualObject::Markers(_) => VisualKind::Markers,
            VisualObject::Heatmap(_) => VisualKind::Heatmap,
            VisualObject::Image(_) => VisualKind::Image,
            VisualObject::Shape(_) => VisualKind::Shape,
        }
    }

    /// Sichtbarkeit.
    pub fn is_visible(&self) -> bool {
        match self {
            VisualObject::Regions(o) => o.visible,
            VisualObject::Markers(o) => o.visible,
            VisualObject::Heatmap(o) => o.visible,
            VisualObject::Image(o) => o.visible,
            VisualObject::Shape(o) => o.visible,
        }
    }

    /// Vergleicht eine Eigenschaft. Objekte verschiedener Art sind nie gleich.
    pub fn same_property(&self, other: &VisualObject, property: VisualProperty) -> bool {
        match (self, other) {
            (VisualObject::Regions(a), VisualObject::Regions(b)) => a.same(b, property),
            (VisualObject::Markers(a), VisualObject::Markers(b)) => a.same(b, property),
            (VisualObject::Heatmap(a), VisualObject::Heatmap(b)) => a.same(b, property),
            (VisualObject::Image(a), VisualObject::Image(b)) => a.same(b, property),
            (VisualObject::Shape(a), VisualObject::Shape(b)) => a.same(b, property),
            _ => false,
        }
    }

    /// Übernimmt eine Eigenschaft aus `other`. Bei verschiedener Art ohne Wirkung.
    pub fn copy_property(&mut self, other: &VisualObject, property: VisualProperty) {
        match (self, other) {
            (VisualObject::Regions(a), VisualObject::Regions(b)) => a.copy(b, property),
            (VisualObject::Markers(a), VisualObject::Markers(b)) => a.copy(b, property),
            (VisualObject::Heatmap(a), VisualObject::Heatmap(b)) => a.copy(b, property),
            (VisualObject::Image(a), VisualObject::Image(b)) => a.copy(b, property),
            (VisualObject::Shape(a), VisualObject::Shape(b)) => a.copy(b, property),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(colors: &[Color]) -> VisualObject {
        VisualObject::Markers(MarkerGroup {
            name: "pts".into(),
            markers: colors
                .iter()
                .enumerate()
                .map(|(row, &fill_color)| CircleMarker {
                    row,
                    location: LatLon::new(row as f64, 0.0),
                    radius: 4.0,
                    fill_color,
                    fill_opacity: 0.7,
                    stroke: false,
                })
                .collect(),
            visible: true,
        })
    }

    #[test]
    fn copy_color_keeps_locations() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let mut current = markers(&[red, red]);
        let target = markers(&[blue, blue]);

        assert!(!current.same_property(&target, VisualProperty::Color));
        assert!(current.same_property(&target, VisualProperty::Data));

        current.copy_property(&target, VisualProperty::Color);
        assert_eq!(current, target);
    }

    #[test]
    fn different_kinds_never_match() {
        let marker = markers(&[]);
        let heat = VisualObject::Heatmap(HeatmapLayer {
            name: "pts".into(),
            points: Vec::new(),
            radius: 2.0,
            blur: 1.0,
            min_opacity: 0.5,
            gradient: Vec::new(),
            visible: true,
        });
        assert!(!marker.same_property(&heat, VisualProperty::Visible));
    }

    #[test]
    fn style_callback_overrides_fill_color() {
        let style = RegionStyle {
            color: Color::rgb(0, 0, 0),
            fill_color: Color::rgb(1, 1, 1),
            weight: 0.5,
            opacity: 1.0,
            fill_opacity: 0.5,
            dash_array: "5, 5".into(),
        };
        let mut feature_colors = IndexMap::new();
        feature_colors.insert("3".to_string(), Color::rgb(9, 9, 9));
        let layer = RegionLayer {
            name: "r".into(),
            features: serde_json::json!({"type": "FeatureCollection", "features": []}),
            style,
            hover_fill_opacity: 0.95,
            feature_colors,
            visible: true,
        };

        assert_eq!(layer.style_for("3").fill_color, Color::rgb(9, 9, 9));
        assert_eq!(layer.style_for("4").fill_color, Color::rgb(1, 1, 1));
        assert_eq!(layer.feature_count(), 0);
    }
}

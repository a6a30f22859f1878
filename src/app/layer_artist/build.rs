//! Datenabruf und Aufbau der Visual Objects eines Layers.
//!
//! Beides sind reine Funktionen über Quelle, Zustand und Optionen. Der
//! Controller entscheidet danach, wie das Ergebnis auf die Oberfläche kommt.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::app::layer_state::{ColorMode, DisplayMode, SizeMode, VisualLayerState};
use crate::app::MapViewerState;
use crate::core::{GeometryKind, LatLon, LayerSource, RegionCollection};
use crate::geodata::{layer_features, TranslateError};
use crate::render::{
    CircleMarker, HeatPoint, HeatmapLayer, ImageOverlay, MarkerGroup, RegionLayer, RegionStyle,
    VisualObject,
};
use crate::shared::{Color, ColorTable, ViewerOptions};

/// Aus den Attributen abgeleitete Werte der dargestellten Zeilen.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct LayerValues {
    /// Eltern-Zeilen, parallel zu allen weiteren Vektoren
    pub rows: Vec<usize>,
    /// Positionen (nur Punkt-Layer)
    pub positions: Vec<LatLon>,
    pub color_values: Option<Vec<f64>>,
    pub size_values: Option<Vec<f64>>,
    /// GeoJSON (nur Regionen und Linien)
    pub features: Option<Value>,
}

fn pick(values: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter()
        .map(|&row| values.get(row).copied().unwrap_or(f64::NAN))
        .collect()
}

fn encoding_values(
    data: &RegionCollection,
    linear: bool,
    attribute: Option<&str>,
) -> Result<Option<Vec<f64>>, TranslateError> {
    match (linear, attribute) {
        (true, Some(name)) => Ok(Some(data.numeric_values(name)?)),
        _ => Ok(None),
    }
}

/// Holt die Werte für die aktuelle Darstellung.
///
/// `Ok(None)` bedeutet: Voraussetzungen fehlen (Punkt-Layer ohne Achsen-Attribute).
pub(super) fn collect_values(
    source: &LayerSource,
    kind: GeometryKind,
    state: &VisualLayerState,
    viewer: &MapViewerState,
) -> Result<Option<LayerValues>, TranslateError> {
    let data = source.collection();
    let mut rows = source.rows()?;

    let color_all = encoding_values(
        data,
        state.color_mode == ColorMode::Linear,
        state.color_attribute.as_deref(),
    )?;
    let size_all = encoding_values(
        data,
        state.size_mode == SizeMode::Linear,
        state.size_attribute.as_deref(),
    )?;

    let mut values = LayerValues::default();
    match kind {
        GeometryKind::Point => {
            let Some((lon_att, lat_att)) = viewer.axes() else {
                return Ok(None);
            };
            let lats = data.numeric_values(lat_att)?;
            let lons = data.numeric_values(lon_att)?;

            // Zeilen ohne gültige Position werden nicht gezeichnet
            rows.retain(|&row| {
                lats.get(row).is_some_and(|v| v.is_finite())
                    && lons.get(row).is_some_and(|v| v.is_finite())
            });
            values.positions = rows
                .iter()
                .map(|&row| LatLon::new(lats[row], lons[row]))
                .collect();
        }
        GeometryKind::Line | GeometryKind::Region => {
            values.features = Some(layer_features(source)?);
        }
        GeometryKind::Raster => {}
    }

    values.color_values = color_all.map(|all| pick(&all, &rows));
    values.size_values = size_all.map(|all| pick(&all, &rows));
    values.rows = rows;
    Ok(Some(values))
}

/// Normiert `value` auf [0, 1] bezüglich `[min, max]`. Vertauschte Grenzen
/// kehren die Skala um.
pub(super) fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

struct Encoder<'a> {
    state: &'a VisualLayerState,
    table: &'a ColorTable,
    options: &'a ViewerOptions,
}

impl Encoder<'_> {
    fn color(&self, value: Option<f64>) -> Color {
        match value {
            Some(v) if v.is_finite() => self
                .table
                .sample(normalize(v, self.state.color_min, self.state.color_max))
                .unwrap_or(self.state.color),
            _ => self.state.color,
        }
    }

    fn radius(&self, value: Option<f64>) -> f64 {
        let base = match value {
            Some(v) if v.is_finite() => {
                let t = normalize(v, self.state.size_min, self.state.size_max);
                self.options.marker_radius_min
                    + t * (self.options.marker_radius_max - self.options.marker_radius_min)
            }
            Some(_) => self.options.marker_radius_min,
            None => self.state.size,
        };
        base * self.state.size_scaling
    }
}

fn value_at(values: &Option<Vec<f64>>, i: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v.get(i).copied())
}

/// Baut das Ziel-Objekt für den aktuellen Zustand.
pub(super) fn build_visual(
    source: &LayerSource,
    kind: GeometryKind,
    state: &VisualLayerState,
    values: &LayerValues,
    options: &ViewerOptions,
) -> VisualObject {
    let table = options.color_table(&state.color_table);
    let encoder = Encoder {
        state,
        table: &table,
        options,
    };
    let name = source.label();

    match kind {
        GeometryKind::Point if state.display_mode == DisplayMode::Density => {
            let points = values
                .positions
                .iter()
                .enumerate()
                .map(|(i, &location)| HeatPoint {
                    location,
                    intensity: match value_at(&values.color_values, i) {
                        Some(v) if v.is_finite() => normalize(v, state.color_min, state.color_max),
                        Some(_) => 0.0,
                        None => 1.0,
                    },
                })
                .collect();
            let gradient = if values.color_values.is_some() {
                table.gradient()
            } else {
                vec![(0.0, state.color), (1.0, state.color)]
            };
            VisualObject::Heatmap(HeatmapLayer {
                name,
                points,
                radius: state.size * state.size_scaling,
                blur: options.heatmap_blur,
                min_opacity: state.alpha,
                gradient,
                visible: state.visible,
            })
        }
        GeometryKind::Point => {
            let markers = values
                .positions
                .iter()
                .zip(&values.rows)
                .enumerate()
                .map(|(i, (&location, &row))| CircleMarker {
                    row,
                    location,
                    radius: encoder.radius(value_at(&values.size_values, i)),
                    fill_color: encoder.color(value_at(&values.color_values, i)),
                    fill_opacity: state.alpha,
                    stroke: false,
                })
                .collect();
            VisualObject::Markers(MarkerGroup {
                name,
                markers,
                visible: state.visible,
            })
        }
        GeometryKind::Line | GeometryKind::Region => {
            let is_line = kind == GeometryKind::Line;
            let mut feature_colors = IndexMap::new();
            if values.color_values.is_some() {
                for (i, &row) in values.rows.iter().enumerate() {
                    if let Some(v) = value_at(&values.color_values, i).filter(|v| v.is_finite()) {
                        feature_colors.insert(RegionCollection::feature_id(row), encoder.color(Some(v)));
                    }
                }
            }
            let subset = source.is_subset();
            VisualObject::Regions(RegionLayer {
                name,
                features: values
                    .features
                    .clone()
                    .unwrap_or_else(|| json!({"type": "FeatureCollection", "features": []})),
                style: RegionStyle {
                    color: state.color,
                    fill_color: state.color,
                    weight: if subset {
                        options.subset_region_weight
                    } else {
                        options.region_weight
                    },
                    opacity: if is_line { state.alpha } else { 1.0 },
                    fill_opacity: if is_line || !state.fill {
                        0.0
                    } else {
                        state.alpha
                    },
                    dash_array: if subset { "0" } else { "5, 5" }.to_string(),
                },
                hover_fill_opacity: options.region_hover_fill_opacity,
                feature_colors,
                visible: state.visible,
            })
        }
        GeometryKind::Raster => build_image(source, state, values, &encoder, name),
    }
}

fn build_image(
    source: &LayerSource,
    state: &VisualLayerState,
    values: &LayerValues,
    encoder: &Encoder<'_>,
    name: String,
) -> VisualObject {
    let data = source.collection();
    let (width, height, south_west, north_east) = match data.grid() {
        Some(grid) => (
            grid.nx,
            grid.ny,
            LatLon::new(grid.bounds.min().y, grid.bounds.min().x),
            LatLon::new(grid.bounds.max().y, grid.bounds.max().x),
        ),
        None => (0, 0, LatLon::default(), LatLon::default()),
    };

    // Nicht dargestellte Zellen bleiben transparent
    let mut pixels = vec![[0u8; 4]; width * height];
    for (i, &row) in values.rows.iter().enumerate() {
        if width == 0 {
            break;
        }
        let (cx, cy) = (row % width, row / width);
        if cy >= height {
            continue;
        }
        let color = encoder.color(value_at(&values.color_values, i));
        // Bildzeilen laufen von Nord nach Süd
        pixels[(height - 1 - cy) * width + cx] = [color.r, color.g, color.b, 255];
    }

    VisualObject::Image(ImageOverlay {
        name,
        south_west,
        north_east,
        width,
        height,
        pixels,
        opacity: state.alpha,
        visible: state.visible,
    })
}

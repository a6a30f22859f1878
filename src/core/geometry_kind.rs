//! Erkennung der Geometrie-Art einer Collection.

use geo::Geometry;
use serde::{Deserialize, Serialize};

/// Art der dargestellten Geometrie. Bestimmt die Layer-Darstellung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Punktdaten (Marker oder Heatmap)
    Point,
    /// Linien
    Line,
    /// Flächen
    Region,
    /// Regelmäßiges Raster (Bild-Overlay)
    Raster,
}

impl GeometryKind {
    /// Leitet die Art aus den Geometrien ab.
    ///
    /// Die "höchste" vorkommende Dimension gewinnt: eine Fläche macht die
    /// Collection zu `Region`, sonst eine Linie zu `Line`. Ohne Geometrie
    /// gilt `Point`.
    pub fn detect(geometries: Option<&[Geometry<f64>]>) -> Self {
        let Some(geometries) = geometries else {
            return GeometryKind::Point;
        };

        let mut kind = GeometryKind::Point;
        for geometry in geometries {
            match dimension_of(geometry) {
                GeometryKind::Region => return GeometryKind::Region,
                GeometryKind::Line => kind = GeometryKind::Line,
                _ => {}
            }
        }
        kind
    }

    /// `true` für Punktdaten.
    pub fn is_point(self) -> bool {
        self == GeometryKind::Point
    }

    /// `true` für Darstellungen als GeoJSON-Feature-Sammlung.
    pub fn uses_features(self) -> bool {
        matches!(self, GeometryKind::Line | GeometryKind::Region)
    }
}

fn dimension_of(geometry: &Geometry<f64>) -> GeometryKind {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            GeometryKind::Line
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => GeometryKind::Region,
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .map(dimension_of)
            .max_by_key(|kind| match kind {
                GeometryKind::Region | GeometryKind::Raster => 2,
                GeometryKind::Line => 1,
                GeometryKind::Point => 0,
            })
            .unwrap_or(GeometryKind::Point),
    }
}

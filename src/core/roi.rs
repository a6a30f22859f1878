//! Regions of Interest: Rechteck, Polygon oder Kategorie-Auswahl.

use std::collections::BTreeSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Auswahlbereich im Koordinatenraum zweier Achsen-Attribute (x, y) oder
/// eine Menge akzeptierter Kategorien.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Roi {
    /// Achsenparalleles Rechteck, `xmin <= xmax` und `ymin <= ymax`
    Rectangle {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },
    /// Geschlossenes Polygon (letzter Punkt wird implizit mit dem ersten verbunden)
    Polygon { vertices: Vec<DVec2> },
    /// Kategorie-Auswahl über ein Attribut
    Category {
        attribute: String,
        categories: BTreeSet<String>,
    },
}

impl Roi {
    /// Rechteck aus zwei beliebigen Eckpunkten (sortiert die Grenzen).
    pub fn rectangle(a: DVec2, b: DVec2) -> Self {
        let (min, max) = rect_min_max(a, b);
        Roi::Rectangle {
            xmin: min.x,
            xmax: max.x,
            ymin: min.y,
            ymax: max.y,
        }
    }

    /// Polygon aus Eckpunkten.
    pub fn polygon(vertices: Vec<DVec2>) -> Self {
        Roi::Polygon { vertices }
    }

    /// Kategorie-Auswahl.
    pub fn category<I, S>(attribute: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roi::Category {
            attribute: attribute.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// `true`, wenn die ROI keine Fläche bzw. keine Kategorie umfasst.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Roi::Rectangle {
                xmin,
                xmax,
                ymin,
                ymax,
            } => !(xmin < xmax && ymin < ymax),
            Roi::Polygon { vertices } => vertices.len() < 3,
            Roi::Category { categories, .. } => categories.is_empty(),
        }
    }

    /// Umschließendes Rechteck räumlicher ROIs.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        match self {
            Roi::Rectangle {
                xmin,
                xmax,
                ymin,
                ymax,
            } => Some((DVec2::new(*xmin, *ymin), DVec2::new(*xmax, *ymax))),
            Roi::Polygon { vertices } => {
                let first = *vertices.first()?;
                Some(
                    vertices
                        .iter()
                        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
                )
            }
            Roi::Category { .. } => None,
        }
    }

    /// Prüft, ob ein Punkt in der räumlichen ROI liegt (Rand inklusive).
    ///
    /// Kategorie-ROIs enthalten keine Punkte.
    pub fn contains(&self, point: DVec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        match self {
            Roi::Rectangle {
                xmin,
                xmax,
                ymin,
                ymax,
            } => point.x >= *xmin && point.x <= *xmax && point.y >= *ymin && point.y <= *ymax,
            Roi::Polygon { vertices } => point_in_polygon(point, vertices),
            Roi::Category { .. } => false,
        }
    }
}

/// Normalisiert zwei Eckpunkte zu (min, max).
pub fn rect_min_max(a: DVec2, b: DVec2) -> (DVec2, DVec2) {
    (a.min(b), a.max(b))
}

fn point_on_segment(point: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let ap = point - a;
    let cross = ab.perp_dot(ap);
    let tolerance = 1e-9 * ab.length().max(1.0);
    if cross.abs() > tolerance {
        return false;
    }
    let dot = ap.dot(ab);
    dot >= -tolerance && dot <= ab.length_squared() + tolerance
}

/// Ray-Casting-Test gegen ein Polygon, Punkte auf dem Rand zählen als innen.
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = last;

    for &current in polygon {
        if point_on_segment(point, previous, current) {
            return true;
        }

        let dy = previous.y - current.y;
        let intersect = ((current.y > point.y) != (previous.y > point.y))
            && (point.x < (previous.x - current.x) * (point.y - current.y) / dy + current.x);

        if intersect {
            inside = !inside;
        }

        previous = current;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_sorts_corners() {
        let roi = Roi::rectangle(DVec2::new(5.0, -1.0), DVec2::new(1.0, 3.0));
        assert_eq!(
            roi,
            Roi::Rectangle {
                xmin: 1.0,
                xmax: 5.0,
                ymin: -1.0,
                ymax: 3.0
            }
        );
    }

    #[test]
    fn polygon_contains_boundary_and_interior() {
        let roi = Roi::polygon(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(0.0, 4.0),
        ]);

        assert!(roi.contains(DVec2::new(2.0, 2.0)));
        assert!(roi.contains(DVec2::new(4.0, 1.0)));
        assert!(!roi.contains(DVec2::new(5.0, 1.0)));
        assert!(!roi.contains(DVec2::new(f64::NAN, 1.0)));
    }

    #[test]
    fn concave_polygon_excludes_notch() {
        let roi = Roi::polygon(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 4.0),
        ]);

        assert!(!roi.contains(DVec2::new(2.0, 3.0)));
        assert!(roi.contains(DVec2::new(1.0, 0.5)));
    }

    #[test]
    fn too_few_vertices_are_degenerate() {
        let roi = Roi::polygon(vec![DVec2::ZERO, DVec2::ONE]);
        assert!(roi.is_degenerate());
        assert!(!roi.contains(DVec2::new(0.5, 0.5)));
    }
}

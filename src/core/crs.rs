//! Koordinaten-Referenzsystem (CRS) einer Region Collection.

use serde::{Deserialize, Serialize};

/// Richtung einer CRS-Achse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisDirection {
    North,
    South,
    East,
    West,
}

impl AxisDirection {
    /// Nord/Süd-Achsen liefern die y-Komponente.
    pub fn is_vertical(self) -> bool {
        matches!(self, AxisDirection::North | AxisDirection::South)
    }
}

/// Eine Achse des CRS, z.B. "Geodetic latitude" (Nord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsAxis {
    /// Anzeigename der Achse, Basis für die Centroid-Attributnamen
    pub name: String,
    /// Richtung der Achse
    pub direction: AxisDirection,
}

impl CrsAxis {
    /// Erstellt eine neue Achse.
    pub fn new(name: impl Into<String>, direction: AxisDirection) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }
}

/// Koordinaten-Referenzsystem mit Kennung und Achsenbeschreibung in CRS-Reihenfolge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// Kennung, z.B. "EPSG:4326"
    pub code: String,
    /// Achsen in der Reihenfolge, die das CRS definiert
    pub axes: [CrsAxis; 2],
}

impl Crs {
    /// Erstellt ein CRS aus Kennung und Achsen.
    pub fn new(code: impl Into<String>, axes: [CrsAxis; 2]) -> Self {
        Self {
            code: code.into(),
            axes,
        }
    }

    /// WGS 84 mit Breite vor Länge (EPSG-Achsenreihenfolge).
    pub fn wgs84() -> Self {
        Self::new(
            "EPSG:4326",
            [
                CrsAxis::new("Geodetic latitude", AxisDirection::North),
                CrsAxis::new("Geodetic longitude", AxisDirection::East),
            ],
        )
    }

    /// Indizes der x- und y-Achse in `axes`.
    ///
    /// Genau eine Nord/Süd-Achse liefert y, die andere x. Haben beide Achsen
    /// dieselbe Ausrichtung, gilt die Reihenfolge (x, y) = (0, 1).
    pub fn axis_indices(&self) -> (usize, usize) {
        match (
            self.axes[0].direction.is_vertical(),
            self.axes[1].direction.is_vertical(),
        ) {
            (true, false) => (1, 0),
            (false, true) => (0, 1),
            _ => {
                log::warn!(
                    "CRS {}: Achsen ohne eindeutige Ausrichtung, nutze Achsenreihenfolge",
                    self.code
                );
                (0, 1)
            }
        }
    }

    /// Achse, die der x-Komponente der Geometrie entspricht.
    pub fn x_axis(&self) -> &CrsAxis {
        &self.axes[self.axis_indices().0]
    }

    /// Achse, die der y-Komponente der Geometrie entspricht.
    pub fn y_axis(&self) -> &CrsAxis {
        &self.axes[self.axis_indices().1]
    }
}

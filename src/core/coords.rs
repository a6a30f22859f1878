//! Geografische Koordinaten für Pointer-Events und Kartenansicht.

use serde::{Deserialize, Serialize};

/// Geografische Position in Grad (Breite, Länge).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    /// Breitengrad (Nord positiv)
    pub lat: f64,
    /// Längengrad (Ost positiv)
    pub lon: f64,
}

impl LatLon {
    /// Erstellt eine neue Position.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true`, wenn beide Komponenten endlich sind.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

//! Viewer-bezogener Zustand: Ansicht und Achsen-Attribute.

use crate::core::{finite_range, LatLon, RegionCollection};
use crate::shared::options::{ZOOM_MAX, ZOOM_MIN};
use crate::shared::ViewerOptions;

/// Zustand der Kartenansicht
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewerState {
    /// Kartenzentrum
    pub center: LatLon,
    /// Zoomstufe
    pub zoom_level: f64,
    /// Attribut für die Breite (y)
    pub lat_att: Option<String>,
    /// Attribut für die Länge (x)
    pub lon_att: Option<String>,
    /// Kategoriales Attribut für Punkt-Auswahl (leer = räumliche Auswahl)
    pub select_att: Option<String>,
}

impl MapViewerState {
    /// Startzustand aus den Optionen.
    pub fn new(options: &ViewerOptions) -> Self {
        Self {
            center: options.default_center,
            zoom_level: options.default_zoom,
            lat_att: None,
            lon_att: None,
            select_att: None,
        }
    }

    /// Achsen-Attribute als `(lon, lat)` = `(x, y)`, wenn beide gesetzt sind.
    pub fn axes(&self) -> Option<(&str, &str)> {
        Some((self.lon_att.as_deref()?, self.lat_att.as_deref()?))
    }

    /// Belegt ungesetzte Achsen-Attribute anhand einer neuen Collection.
    ///
    /// Bevorzugt die Centroid-Attribute, sonst Attribute mit "lat"/"lon" im
    /// Namen, zuletzt die letzten beiden numerischen Attribute.
    pub fn guess_axes(&mut self, data: &RegionCollection) {
        if self.lat_att.is_some() && self.lon_att.is_some() {
            return;
        }

        let (lon, lat) = match data.centroid_attributes() {
            Some((x, y)) => (Some(x.to_string()), Some(y.to_string())),
            None => {
                let numeric = data.numeric_attributes();
                let find = |needles: &[&str]| {
                    numeric
                        .iter()
                        .find(|name| {
                            let lower = name.to_lowercase();
                            needles.iter().any(|n| lower.contains(n))
                        })
                        .map(|name| name.to_string())
                };
                let lat = find(&["lat"]).or_else(|| {
                    numeric
                        .len()
                        .checked_sub(2)
                        .map(|i| numeric[i].to_string())
                });
                let lon = find(&["lon", "lng"]).or_else(|| numeric.last().map(|n| n.to_string()));
                (lon, lat)
            }
        };

        if self.lon_att.is_none() {
            self.lon_att = lon;
        }
        if self.lat_att.is_none() {
            self.lat_att = lat;
        }
        log::debug!(
            "Achsen nach '{}': lat={:?}, lon={:?}",
            data.label(),
            self.lat_att,
            self.lon_att
        );
    }

    /// Setzt Zentrum und Zoom so, dass alle Daten sichtbar sind.
    ///
    /// Ausdehnung aus den Geometrien, sonst aus den Achsen-Attributen. Ohne
    /// auswertbare Daten gelten die Startwerte der Optionen.
    pub fn reset_limits<'a>(
        &mut self,
        collections: impl IntoIterator<Item = &'a RegionCollection>,
        options: &ViewerOptions,
    ) {
        let mut extent: Option<(LatLon, LatLon)> = None;
        let mut extend = |min: LatLon, max: LatLon| {
            extent = Some(match extent {
                None => (min, max),
                Some((lo, hi)) => (
                    LatLon::new(lo.lat.min(min.lat), lo.lon.min(min.lon)),
                    LatLon::new(hi.lat.max(max.lat), hi.lon.max(max.lon)),
                ),
            });
        };

        for data in collections {
            if let Some(bounds) = data.bounds() {
                extend(
                    LatLon::new(bounds.min().y, bounds.min().x),
                    LatLon::new(bounds.max().y, bounds.max().x),
                );
                continue;
            }
            let Some((lon_att, lat_att)) = self.axes() else {
                continue;
            };
            let lats = data.numeric_values(lat_att).ok();
            let lons = data.numeric_values(lon_att).ok();
            if let (Some((lat0, lat1)), Some((lon0, lon1))) = (
                lats.as_deref().and_then(finite_range),
                lons.as_deref().and_then(finite_range),
            ) {
                extend(LatLon::new(lat0, lon0), LatLon::new(lat1, lon1));
            }
        }

        match extent {
            Some((min, max)) => {
                self.center = LatLon::new((min.lat + max.lat) * 0.5, (min.lon + max.lon) * 0.5);
                // Eine Kachel deckt bei Zoom 0 360° Länge bzw. 180° Breite ab
                let span = (max.lon - min.lon).max((max.lat - min.lat) * 2.0).max(1e-6);
                self.zoom_level = (360.0 / span).log2().floor().clamp(ZOOM_MIN, ZOOM_MAX);
            }
            None => {
                self.center = options.default_center;
                self.zoom_level = options.default_zoom;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, Table};

    fn stations() -> RegionCollection {
        let mut table = Table::new();
        table.insert("name".into(), Column::Text(vec!["a".into(), "b".into()]));
        table.insert("Latitude".into(), Column::Float(vec![10.0, 20.0]));
        table.insert("Longitude".into(), Column::Float(vec![-40.0, 0.0]));
        RegionCollection::from_table("stations", table).expect("Tabelle erwartet")
    }

    #[test]
    fn guess_axes_uses_names() {
        let mut state = MapViewerState::new(&ViewerOptions::default());
        state.guess_axes(&stations());

        assert_eq!(state.lat_att.as_deref(), Some("Latitude"));
        assert_eq!(state.lon_att.as_deref(), Some("Longitude"));
        assert_eq!(state.axes(), Some(("Longitude", "Latitude")));
    }

    #[test]
    fn reset_limits_centers_on_data() {
        let options = ViewerOptions::default();
        let mut state = MapViewerState::new(&options);
        let data = stations();
        state.guess_axes(&data);

        state.reset_limits([&data], &options);

        assert_eq!(state.center, LatLon::new(15.0, -20.0));
        assert_eq!(state.zoom_level, 3.0);
    }

    #[test]
    fn reset_limits_without_data_uses_defaults() {
        let options = ViewerOptions::default();
        let mut state = MapViewerState::new(&options);
        state.center = LatLon::new(1.0, 1.0);

        state.reset_limits(std::iter::empty(), &options);

        assert_eq!(state.center, options.default_center);
        assert_eq!(state.zoom_level, options.default_zoom);
    }
}

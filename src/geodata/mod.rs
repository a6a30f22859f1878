//! Übersetzung zwischen nativen Geometrie-Tabellen und Region Collections
//! sowie GeoJSON-Ausgabe für die Kartendarstellung.

pub mod geojson;
pub mod translator;

pub use geojson::{feature_collection, geometry_to_geojson, layer_features};
pub use translator::{GeoFrameTranslator, GeometryTranslator, TranslateError};

//! Geometry Translator: `GeoFrame` <-> `RegionCollection`.

use geo::Geometry;
use thiserror::Error;
use wkt::TryFromWkt;

use crate::core::{
    AttributeError, Column, GeoFrame, IngestInput, InvalidGeometryInput, LayerSource,
    RegionCollection,
};

/// Fehler beim Export in die native Darstellung.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// Die Collection hat kein Geometrie-Attribut
    #[error("Collection '{label}' hat keine Geometrie-Spalte")]
    MissingGeometry { label: String },
    /// Ein WKT-Eintrag konnte nicht dekodiert werden
    #[error("Ungültiges WKT in Spalte '{attribute}', Zeile {row}: {message}")]
    InvalidWkt {
        attribute: String,
        row: usize,
        message: String,
    },
    /// Subset-Auswertung schlug fehl
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    /// Zieltabelle ließ die Geometrie-Spalte nicht zu
    #[error(transparent)]
    Geometry(#[from] InvalidGeometryInput),
}

/// Registrierbare Konvertierung zwischen einem nativen Typ und Region Collections.
pub trait GeometryTranslator {
    /// Nativer Geometrie-Sammlungstyp
    type Native;

    /// Nimmt einen nativen Wert als Collection auf.
    fn to_collection(
        &self,
        label: &str,
        native: Self::Native,
    ) -> Result<RegionCollection, InvalidGeometryInput>;

    /// Exportiert eine Collection oder ein Subset in den nativen Typ.
    fn to_native(&self, source: &LayerSource) -> Result<Self::Native, TranslateError>;
}

/// Translator für `GeoFrame`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoFrameTranslator;

impl GeometryTranslator for GeoFrameTranslator {
    type Native = GeoFrame;

    fn to_collection(
        &self,
        label: &str,
        native: GeoFrame,
    ) -> Result<RegionCollection, InvalidGeometryInput> {
        RegionCollection::from_input(label, IngestInput::Frame(native))
    }

    /// Abgeleitete Centroid-Attribute werden ausgelassen, Geometrie-Attribute
    /// aus WKT dekodiert. Subsets liefern nur die ausgewählten Zeilen in
    /// Eltern-Reihenfolge.
    fn to_native(&self, source: &LayerSource) -> Result<GeoFrame, TranslateError> {
        let data = source.collection();
        let geometry_name = data
            .geometry_attribute()
            .ok_or_else(|| TranslateError::MissingGeometry {
                label: data.label().to_string(),
            })?
            .to_string();
        let rows = source.rows()?;

        let mut frame = GeoFrame::new();
        for attr in data.attributes() {
            if attr.is_centroid() {
                continue;
            }
            match attr.column.take(&rows) {
                Column::Geometry(wkts) => {
                    let geometries = decode_wkt(&attr.name, &wkts, &rows)?;
                    frame.insert_geometry_column(attr.name.clone(), geometries);
                }
                values => {
                    frame.insert_column(attr.name.clone(), values);
                }
            }
        }

        frame.set_geometry(&geometry_name)?;
        frame.set_crs(data.crs().cloned());

        log::debug!(
            "Export '{}': {} Zeilen, Spalten {:?}",
            source.label(),
            rows.len(),
            frame.column_names()
        );
        Ok(frame)
    }
}

/// Dekodiert WKT-Einträge. `rows` liefert die Eltern-Zeilen für Fehlermeldungen.
fn decode_wkt(
    attribute: &str,
    wkts: &[String],
    rows: &[usize],
) -> Result<Vec<Geometry<f64>>, TranslateError> {
    wkts.iter()
        .zip(rows)
        .map(|(text, &row)| {
            Geometry::<f64>::try_from_wkt_str(text).map_err(|e| TranslateError::InvalidWkt {
                attribute: attribute.to_string(),
                row,
                message: e.to_string(),
            })
        })
        .collect()
}

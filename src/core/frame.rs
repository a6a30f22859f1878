//! Native Eingabe- und Ausgabetypen: Geometrie-Tabellen, Geometrie-Reihen,
//! einfache Tabellen und Raster.
//!
//! `GeoFrame` ist das Gegenstück zu einer Geometrie-Tabelle mit genau einer
//! aktiven Geometrie-Spalte, `GeoSeries` eine reine Geometrie-Reihe.

use geo::{Geometry, Rect};
use indexmap::IndexMap;

use super::{Column, Crs, InvalidGeometryInput};

/// Spalte eines `GeoFrame`.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameColumn {
    /// Normale Werte
    Values(Column),
    /// Dekodierte Geometrien
    Geometry(Vec<Geometry<f64>>),
}

impl FrameColumn {
    /// Anzahl der Zeilen.
    pub fn len(&self) -> usize {
        match self {
            FrameColumn::Values(column) => column.len(),
            FrameColumn::Geometry(geometries) => geometries.len(),
        }
    }

    /// `true`, wenn die Spalte leer ist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Geometrie-Tabelle: benannte Spalten, eine aktive Geometrie-Spalte, ein CRS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoFrame {
    columns: IndexMap<String, FrameColumn>,
    active_geometry: Option<String>,
    crs: Option<Crs>,
}

impl GeoFrame {
    /// Leere Tabelle ohne Geometrie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tabelle mit einer aktiven Geometrie-Spalte `name`.
    pub fn with_geometry(name: impl Into<String>, geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        let name = name.into();
        let mut columns = IndexMap::new();
        columns.insert(name.clone(), FrameColumn::Geometry(geometries));
        Self {
            columns,
            active_geometry: Some(name),
            crs: Some(crs),
        }
    }

    /// Fügt eine Wertespalte hinzu (ersetzt gleichnamige Spalten an ihrer Position).
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> &mut Self {
        self.columns.insert(name.into(), FrameColumn::Values(column));
        self
    }

    /// Fügt eine Geometrie-Spalte hinzu, ohne sie zu aktivieren.
    pub fn insert_geometry_column(
        &mut self,
        name: impl Into<String>,
        geometries: Vec<Geometry<f64>>,
    ) -> &mut Self {
        self.columns
            .insert(name.into(), FrameColumn::Geometry(geometries));
        self
    }

    /// Aktiviert eine vorhandene Geometrie-Spalte.
    pub fn set_geometry(&mut self, name: &str) -> Result<(), InvalidGeometryInput> {
        match self.columns.get(name) {
            Some(FrameColumn::Geometry(_)) => {
                self.active_geometry = Some(name.to_string());
                Ok(())
            }
            Some(FrameColumn::Values(_)) => Err(InvalidGeometryInput::new(format!(
                "Spalte '{name}' enthält keine Geometrie"
            ))),
            None => Err(InvalidGeometryInput::new(format!(
                "Spalte '{name}' existiert nicht"
            ))),
        }
    }

    /// Setzt das CRS.
    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    /// CRS der Tabelle.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Name der aktiven Geometrie-Spalte.
    pub fn geometry_name(&self) -> Option<&str> {
        self.active_geometry.as_deref()
    }

    /// Geometrien der aktiven Geometrie-Spalte.
    pub fn geometry(&self) -> Option<&[Geometry<f64>]> {
        match self.columns.get(self.active_geometry.as_deref()?)? {
            FrameColumn::Geometry(geometries) => Some(geometries),
            FrameColumn::Values(_) => None,
        }
    }

    /// Spalte per Name.
    pub fn column(&self, name: &str) -> Option<&FrameColumn> {
        self.columns.get(name)
    }

    /// Alle Spalten in Einfügereihenfolge.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &FrameColumn)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    /// Spaltennamen in Einfügereihenfolge.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Zeilenanzahl (aus der aktiven Geometrie, sonst der ersten Spalte).
    pub fn row_count(&self) -> usize {
        self.geometry()
            .map(<[_]>::len)
            .or_else(|| self.columns.values().next().map(FrameColumn::len))
            .unwrap_or(0)
    }
}

/// Reine Geometrie-Reihe mit CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSeries {
    /// Name der Reihe (wird zum Geometrie-Attributnamen)
    pub name: String,
    /// Geometrien
    pub geometries: Vec<Geometry<f64>>,
    /// CRS
    pub crs: Option<Crs>,
}

impl GeoSeries {
    /// Reihe mit dem Standardnamen "geometry".
    pub fn new(geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        Self {
            name: DEFAULT_GEOMETRY_NAME.to_string(),
            geometries,
            crs: Some(crs),
        }
    }
}

/// Standardname der Geometrie-Spalte.
pub const DEFAULT_GEOMETRY_NAME: &str = "geometry";

/// Einfache Tabelle ohne Geometrie (Punktdaten mit Koordinatenspalten).
pub type Table = IndexMap<String, Column>;

/// Regelmäßiges Raster mit einem oder mehreren Wertelayern.
///
/// Zellen sind zeilenweise von Süd nach Nord, innerhalb einer Zeile von West
/// nach Ost angeordnet.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Ausdehnung des Rasters im CRS
    pub bounds: Rect<f64>,
    /// Spaltenanzahl (x)
    pub nx: usize,
    /// Zeilenanzahl (y)
    pub ny: usize,
    /// Wertelayer, je `nx * ny` Werte
    pub layers: IndexMap<String, Vec<f64>>,
    /// CRS
    pub crs: Crs,
}

/// Eingaben, die eine Region Collection annehmen kann.
#[derive(Debug, Clone)]
pub enum IngestInput {
    Frame(GeoFrame),
    Series(GeoSeries),
    Table(Table),
    Grid(Grid),
    /// Nackte Zahlenreihe ohne Geometrie-Semantik, wird abgelehnt
    Array(Vec<f64>),
}

impl IngestInput {
    /// Kurzbezeichnung des Eingabetyps für Fehlermeldungen.
    pub fn type_name(&self) -> &'static str {
        match self {
            IngestInput::Frame(_) => "GeoFrame",
            IngestInput::Series(_) => "GeoSeries",
            IngestInput::Table(_) => "Table",
            IngestInput::Grid(_) => "Grid",
            IngestInput::Array(_) => "Array",
        }
    }
}

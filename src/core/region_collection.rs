//! Region Collection: geometrie-bewusste Tabelle mit abgeleiteten Centroid-Attributen.
//!
//! Eine Collection besteht aus benannten Attribut-Spalten gleicher Länge.
//! Bei Geometrie-Eingaben kommen zwei Centroid-Attribute (eines pro CRS-Achse)
//! sowie ein Geometrie-Attribut in WKT-Form hinzu. Die dekodierten Geometrien
//! bleiben zusätzlich für Darstellung und Export erhalten.

use geo::{BoundingRect, Coord, Geometry, InteriorPoint, Rect};
use indexmap::IndexMap;
use wkt::ToWkt;

use super::frame::{GeoFrame, GeoSeries, Grid, IngestInput, Table, DEFAULT_GEOMETRY_NAME};
use super::{
    AttributeError, Column, Crs, FrameColumn, GeometryKind, InvalidGeometryInput, SpatialIndex,
};

/// Suffix der abgeleiteten Centroid-Attribute, z.B. "Geodetic latitude (Centroid)".
pub const CENTROID_SUFFIX: &str = " (Centroid)";

/// Rolle eines Attributs innerhalb der Collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRole {
    /// Normales Attribut aus der Eingabe
    Plain,
    /// Abgeleitete Centroid-Komponente (x oder y)
    Centroid(CentroidAxis),
    /// Geometrie in WKT-Form
    Geometry,
}

/// Komponente eines Centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentroidAxis {
    X,
    Y,
}

/// Benannte Spalte mit Rolle.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attributname
    pub name: String,
    /// Rolle
    pub role: AttributeRole,
    /// Werte
    pub column: Column,
}

impl Attribute {
    /// `true` für abgeleitete Centroid-Attribute.
    pub fn is_centroid(&self) -> bool {
        matches!(self.role, AttributeRole::Centroid(_))
    }

    /// `true` für Geometrie-Attribute.
    pub fn is_geometry(&self) -> bool {
        self.role == AttributeRole::Geometry
    }
}

/// Geometrie eines Rasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Ausdehnung
    pub bounds: Rect<f64>,
    /// Spalten
    pub nx: usize,
    /// Zeilen
    pub ny: usize,
}

/// Geometrie-bewusste Datensammlung.
#[derive(Debug, Clone)]
pub struct RegionCollection {
    label: String,
    attributes: IndexMap<String, Attribute>,
    row_count: usize,
    geometries: Option<Vec<Geometry<f64>>>,
    geometry_attribute: Option<String>,
    centroid_attributes: Option<(String, String)>,
    crs: Option<Crs>,
    kind: GeometryKind,
    grid: Option<GridSpec>,
    centroid_index: Option<SpatialIndex>,
}

impl RegionCollection {
    /// Erstellt eine Collection aus einer beliebigen unterstützten Eingabe.
    ///
    /// Nackte Zahlenreihen ohne Geometrie-Semantik werden abgelehnt.
    pub fn from_input(
        label: impl Into<String>,
        input: IngestInput,
    ) -> Result<Self, InvalidGeometryInput> {
        match input {
            IngestInput::Frame(frame) => Self::from_frame(label, &frame),
            IngestInput::Series(series) => Self::from_series(label, &series),
            IngestInput::Table(table) => Self::from_table(label, table),
            IngestInput::Grid(grid) => Self::from_grid(label, &grid),
            other => Err(InvalidGeometryInput::new(format!(
                "{} ist kein Geometrie-Sammlungstyp",
                other.type_name()
            ))),
        }
    }

    /// Erstellt eine Collection aus einer Geometrie-Tabelle.
    ///
    /// Alle Spalten werden übernommen, Geometrie-Spalten als WKT. Davor stehen
    /// die beiden Centroid-Attribute in CRS-Achsenreihenfolge.
    pub fn from_frame(label: impl Into<String>, frame: &GeoFrame) -> Result<Self, InvalidGeometryInput> {
        let label = label.into();
        let crs = frame
            .crs()
            .cloned()
            .ok_or_else(|| InvalidGeometryInput::new("Geometrie-Tabelle ohne CRS"))?;
        let geometry_name = frame
            .geometry_name()
            .ok_or_else(|| InvalidGeometryInput::new("keine aktive Geometrie-Spalte"))?
            .to_string();
        let geometries = frame
            .geometry()
            .ok_or_else(|| {
                InvalidGeometryInput::new(format!("Spalte '{geometry_name}' enthält keine Geometrie"))
            })?
            .to_vec();

        let mut builder = Builder::with_centroids(label, &geometries, crs)?;
        for (name, column) in frame.columns() {
            match column {
                FrameColumn::Values(values) => {
                    builder.push(name, AttributeRole::Plain, values.clone())?
                }
                FrameColumn::Geometry(items) => {
                    builder.push(name, AttributeRole::Geometry, encode_wkt(items))?
                }
            }
        }

        Ok(builder.finish(Some(geometries), Some(geometry_name), None))
    }

    /// Erstellt eine Collection aus einer reinen Geometrie-Reihe.
    pub fn from_series(label: impl Into<String>, series: &GeoSeries) -> Result<Self, InvalidGeometryInput> {
        let crs = series
            .crs
            .clone()
            .ok_or_else(|| InvalidGeometryInput::new("Geometrie-Reihe ohne CRS"))?;

        let mut builder = Builder::with_centroids(label.into(), &series.geometries, crs)?;
        builder.push(
            &series.name,
            AttributeRole::Geometry,
            encode_wkt(&series.geometries),
        )?;

        Ok(builder.finish(
            Some(series.geometries.clone()),
            Some(series.name.clone()),
            None,
        ))
    }

    /// Erstellt eine Collection aus einer Tabelle ohne Geometrie (Punktdaten).
    pub fn from_table(label: impl Into<String>, table: Table) -> Result<Self, InvalidGeometryInput> {
        let row_count = table.values().next().map(Column::len).unwrap_or(0);
        let mut builder = Builder::new(label.into(), row_count, None);

        for (name, column) in table {
            if matches!(column, Column::Geometry(_)) {
                return Err(InvalidGeometryInput::new(format!(
                    "Tabellenspalte '{name}' enthält Geometrie, erwartet wird eine Geometrie-Tabelle"
                )));
            }
            builder.push(&name, AttributeRole::Plain, column)?;
        }

        Ok(builder.finish(None, None, None))
    }

    /// Erstellt eine Collection aus einem Raster. Jede Zelle wird zu einer Zeile
    /// mit Rechteck-Geometrie.
    pub fn from_grid(label: impl Into<String>, grid: &Grid) -> Result<Self, InvalidGeometryInput> {
        if grid.nx == 0 || grid.ny == 0 {
            return Err(InvalidGeometryInput::new("Raster ohne Zellen"));
        }

        let min = grid.bounds.min();
        let cell_w = grid.bounds.width() / grid.nx as f64;
        let cell_h = grid.bounds.height() / grid.ny as f64;

        let mut cells = Vec::with_capacity(grid.nx * grid.ny);
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let x0 = min.x + i as f64 * cell_w;
                let y0 = min.y + j as f64 * cell_h;
                let cell = Rect::new(
                    Coord { x: x0, y: y0 },
                    Coord {
                        x: x0 + cell_w,
                        y: y0 + cell_h,
                    },
                );
                cells.push(Geometry::Polygon(cell.to_polygon()));
            }
        }

        let mut builder = Builder::with_centroids(label.into(), &cells, grid.crs.clone())?;
        for (name, values) in &grid.layers {
            builder.push(name, AttributeRole::Plain, Column::Float(values.clone()))?;
        }
        builder.push(
            DEFAULT_GEOMETRY_NAME,
            AttributeRole::Geometry,
            encode_wkt(&cells),
        )?;

        let spec = GridSpec {
            bounds: grid.bounds,
            nx: grid.nx,
            ny: grid.ny,
        };
        Ok(builder.finish(Some(cells), Some(DEFAULT_GEOMETRY_NAME.to_string()), Some(spec)))
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    /// Anzeigename der Collection.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Anzahl der Zeilen.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Geometrie-Art (bestimmt die Darstellung).
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// CRS, falls die Eingabe Geometrie hatte.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Raster-Geometrie, falls die Collection aus einem Raster stammt.
    pub fn grid(&self) -> Option<&GridSpec> {
        self.grid.as_ref()
    }

    /// Alle Attribute in Reihenfolge.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Alle Attributnamen in Reihenfolge.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    /// Metadaten eines Attributs.
    pub fn attribute_info(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Werte eines Attributs.
    pub fn attribute(&self, name: &str) -> Result<&Column, AttributeError> {
        self.attributes
            .get(name)
            .map(|attr| &attr.column)
            .ok_or_else(|| AttributeError::UnknownAttribute {
                name: name.to_string(),
            })
    }

    /// Numerische Werte eines Attributs als `f64`.
    ///
    /// Geometrie- und Textattribute liefern `NotNumeric`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, AttributeError> {
        self.attribute(name)?
            .to_f64()
            .ok_or_else(|| AttributeError::NotNumeric {
                name: name.to_string(),
            })
    }

    /// Namen aller numerischen Attribute (inklusive Centroids).
    pub fn numeric_attributes(&self) -> Vec<&str> {
        self.attributes
            .values()
            .filter(|attr| attr.column.is_numeric())
            .map(|attr| attr.name.as_str())
            .collect()
    }

    /// Namen aller kategorialen Attribute.
    pub fn categorical_attributes(&self) -> Vec<&str> {
        self.attributes
            .values()
            .filter(|attr| attr.column.is_categorical())
            .map(|attr| attr.name.as_str())
            .collect()
    }

    /// Name des ausgezeichneten Geometrie-Attributs.
    pub fn geometry_attribute(&self) -> Option<&str> {
        self.geometry_attribute.as_deref()
    }

    /// Alle dekodierten Geometrien.
    pub fn geometries(&self) -> Option<&[Geometry<f64>]> {
        self.geometries.as_deref()
    }

    /// Geometrien der angegebenen Zeilen. Ohne Geometrie ist das Ergebnis leer.
    pub fn geometry_of(&self, rows: &[usize]) -> Vec<&Geometry<f64>> {
        let Some(geometries) = self.geometries.as_deref() else {
            return Vec::new();
        };
        rows.iter().filter_map(|&row| geometries.get(row)).collect()
    }

    /// Namen der Centroid-Attribute als `(x, y)`.
    pub fn centroid_attributes(&self) -> Option<(&str, &str)> {
        self.centroid_attributes
            .as_ref()
            .map(|(x, y)| (x.as_str(), y.as_str()))
    }

    /// Spatial-Index, wenn `x_att`/`y_att` die Centroid-Attribute sind.
    pub fn spatial_index(&self, x_att: &str, y_att: &str) -> Option<&SpatialIndex> {
        let (cx, cy) = self.centroid_attributes()?;
        if cx == x_att && cy == y_att {
            self.centroid_index.as_ref()
        } else {
            None
        }
    }

    /// Feature-ID einer Zeile in GeoJSON-Ausgaben.
    pub fn feature_id(row: usize) -> String {
        row.to_string()
    }

    /// Zeile zu einer Feature-ID.
    pub fn row_for_feature_id(&self, feature_id: &str) -> Option<usize> {
        feature_id
            .parse::<usize>()
            .ok()
            .filter(|&row| row < self.row_count)
    }

    /// Umschließendes Rechteck aller Geometrien.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometries
            .as_deref()?
            .iter()
            .filter_map(|geometry| geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

// ── Aufbau ─────────────────────────────────────────────────────────

/// Sammelt Attribute und prüft Längen und Namenskonflikte.
struct Builder {
    label: String,
    row_count: usize,
    crs: Option<Crs>,
    attributes: IndexMap<String, Attribute>,
    centroids: Option<(String, String)>,
    centroid_index: Option<SpatialIndex>,
}

impl Builder {
    fn new(label: String, row_count: usize, crs: Option<Crs>) -> Self {
        Self {
            label,
            row_count,
            crs,
            attributes: IndexMap::new(),
            centroids: None,
            centroid_index: None,
        }
    }

    /// Legt die Centroid-Attribute an. Der Centroid ist ein garantiert
    /// innenliegender Repräsentationspunkt, nicht der Schwerpunkt.
    fn with_centroids(
        label: String,
        geometries: &[Geometry<f64>],
        crs: Crs,
    ) -> Result<Self, InvalidGeometryInput> {
        let mut xs = Vec::with_capacity(geometries.len());
        let mut ys = Vec::with_capacity(geometries.len());
        for (row, geometry) in geometries.iter().enumerate() {
            match geometry.interior_point() {
                Some(point) => {
                    xs.push(point.x());
                    ys.push(point.y());
                }
                None => {
                    log::warn!("Leere Geometrie in Zeile {row}, Centroid bleibt undefiniert");
                    xs.push(f64::NAN);
                    ys.push(f64::NAN);
                }
            }
        }

        let (x_index, y_index) = crs.axis_indices();
        let x_name = format!("{}{}", crs.axes[x_index].name, CENTROID_SUFFIX);
        let y_name = format!("{}{}", crs.axes[y_index].name, CENTROID_SUFFIX);
        let index = SpatialIndex::from_columns(&xs, &ys);

        // Spalten in CRS-Reihenfolge, Zuordnung über die Achsenrollen
        let mut builder = Self::new(label, geometries.len(), None);
        for (i, axis) in crs.axes.iter().enumerate() {
            let name = format!("{}{}", axis.name, CENTROID_SUFFIX);
            let (role, values) = if i == x_index {
                (CentroidAxis::X, xs.clone())
            } else {
                (CentroidAxis::Y, ys.clone())
            };
            builder.push(&name, AttributeRole::Centroid(role), Column::Float(values))?;
        }
        builder.crs = Some(crs);
        builder.centroids = Some((x_name, y_name));
        builder.centroid_index = Some(index);
        Ok(builder)
    }

    fn push(
        &mut self,
        name: &str,
        role: AttributeRole,
        column: Column,
    ) -> Result<(), InvalidGeometryInput> {
        if column.len() != self.row_count {
            return Err(InvalidGeometryInput::new(format!(
                "Spalte '{name}' hat {} Zeilen, erwartet {}",
                column.len(),
                self.row_count
            )));
        }
        if self.attributes.contains_key(name) {
            return Err(InvalidGeometryInput::new(format!(
                "Attributname '{name}' ist doppelt vergeben"
            )));
        }
        self.attributes.insert(
            name.to_string(),
            Attribute {
                name: name.to_string(),
                role,
                column,
            },
        );
        Ok(())
    }

    fn finish(
        self,
        geometries: Option<Vec<Geometry<f64>>>,
        geometry_attribute: Option<String>,
        grid: Option<GridSpec>,
    ) -> RegionCollection {
        let kind = if grid.is_some() {
            GeometryKind::Raster
        } else {
            GeometryKind::detect(geometries.as_deref())
        };
        log::debug!(
            "Collection '{}' aufgebaut: {} Zeilen, {} Attribute, {:?}",
            self.label,
            self.row_count,
            self.attributes.len(),
            kind
        );

        RegionCollection {
            label: self.label,
            attributes: self.attributes,
            row_count: self.row_count,
            geometries,
            geometry_attribute,
            centroid_attributes: self.centroids,
            crs: self.crs,
            kind,
            grid,
            centroid_index: self.centroid_index,
        }
    }
}

fn encode_wkt(geometries: &[Geometry<f64>]) -> Column {
    Column::Geometry(geometries.iter().map(|g| g.wkt_string()).collect())
}

//! GeoJSON-Ausgabe für Region- und Linien-Layer.
//!
//! Feature-IDs sind die Zeilenindizes der Eltern-Collection, damit
//! Stil-Lookups und Klick-Auswertung Subset-Zeilen zuordnen können.

use geo::{Coord, Geometry, LineString, Polygon};
use serde_json::{json, Map, Value};

use super::translator::{GeoFrameTranslator, GeometryTranslator, TranslateError};
use crate::core::{CellValue, Column, FrameColumn, GeoFrame, LayerSource, RegionCollection};

/// Baut eine FeatureCollection. `ids[i]` ist die Eltern-Zeile von Zeile `i`.
pub fn feature_collection(frame: &GeoFrame, ids: &[usize]) -> Value {
    let geometries = frame.geometry().unwrap_or(&[]);
    let properties: Vec<(&str, &Column)> = frame
        .columns()
        .filter_map(|(name, column)| match column {
            FrameColumn::Values(values) => Some((name, values)),
            FrameColumn::Geometry(_) => None,
        })
        .collect();

    let features: Vec<Value> = geometries
        .iter()
        .zip(ids)
        .enumerate()
        .map(|(i, (geometry, &row))| {
            let mut props = Map::new();
            for (name, column) in &properties {
                props.insert((*name).to_string(), cell_to_json(column.value(i)));
            }
            json!({
                "type": "Feature",
                "id": RegionCollection::feature_id(row),
                "geometry": geometry_to_geojson(geometry),
                "properties": Value::Object(props),
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// FeatureCollection der dargestellten Zeilen eines Layers.
pub fn layer_features(source: &LayerSource) -> Result<Value, TranslateError> {
    let rows = source.rows()?;
    let frame = GeoFrameTranslator.to_native(source)?;
    Ok(feature_collection(&frame, &rows))
}

fn cell_to_json(value: Option<CellValue<'_>>) -> Value {
    match value {
        Some(CellValue::Float(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(CellValue::Int(i)) => json!(i),
        Some(CellValue::Text(s)) => json!(s),
        None => Value::Null,
    }
}

fn coord(c: &Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn ring(line: &LineString<f64>) -> Value {
    Value::Array(line.coords().map(coord).collect())
}

fn polygon_rings(polygon: &Polygon<f64>) -> Value {
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    Value::Array(rings)
}

/// Wandelt eine Geometrie in ein GeoJSON-Geometrieobjekt.
pub fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": coord(&p.0) }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.iter().map(|p| coord(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [coord(&line.start), coord(&line.end)],
        }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": ring(ls) }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.iter().map(ring).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(polygon) => json!({ "type": "Polygon", "coordinates": polygon_rings(polygon) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.iter().map(polygon_rings).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": polygon_rings(&rect.to_polygon()) }),
        Geometry::Triangle(tri) => json!({ "type": "Polygon", "coordinates": polygon_rings(&tri.to_polygon()) }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
    }
}

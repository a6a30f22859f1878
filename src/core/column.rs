//! Attribut-Spalten einer Region Collection.

use serde::{Deserialize, Serialize};

/// Werte einer Attribut-Spalte, ein Eintrag pro Zeile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Gleitkommawerte (NaN = fehlender Wert)
    Float(Vec<f64>),
    /// Ganzzahlen
    Int(Vec<i64>),
    /// Text / Kategorien
    Text(Vec<String>),
    /// Geometrie als WKT-Text. Weder numerisch noch kategorial auswertbar.
    Geometry(Vec<String>),
}

/// Einzelwert einer Zelle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Float(f64),
    Int(i64),
    Text(&'a str),
}

impl Column {
    /// Anzahl der Zeilen.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) | Column::Geometry(v) => v.len(),
        }
    }

    /// `true`, wenn die Spalte keine Zeilen enthält.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numerische Spalten können für Farb-/Größenkodierung und Region-Tests genutzt werden.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Float(_) | Column::Int(_))
    }

    /// `true` für Text- und Ganzzahl-Spalten (kategoriale Auswahl).
    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Text(_) | Column::Int(_))
    }

    /// Gibt die Werte als `f64` zurück, `None` für nicht-numerische Spalten.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(v) => Some(v.clone()),
            Column::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            Column::Text(_) | Column::Geometry(_) => None,
        }
    }

    /// Liefert den Wert einer Zeile.
    pub fn value(&self, row: usize) -> Option<CellValue<'_>> {
        match self {
            Column::Float(v) => v.get(row).map(|&f| CellValue::Float(f)),
            Column::Int(v) => v.get(row).map(|&i| CellValue::Int(i)),
            Column::Text(v) | Column::Geometry(v) => {
                v.get(row).map(|s| CellValue::Text(s.as_str()))
            }
        }
    }

    /// Kategorie-Label einer Zeile (nur Text- und Ganzzahl-Spalten).
    pub fn category(&self, row: usize) -> Option<String> {
        match self {
            Column::Text(v) => v.get(row).cloned(),
            Column::Int(v) => v.get(row).map(|i| i.to_string()),
            Column::Float(_) | Column::Geometry(_) => None,
        }
    }

    /// Neue Spalte mit den angegebenen Zeilen in deren Reihenfolge.
    ///
    /// Indizes außerhalb des Bereichs werden übersprungen.
    pub fn take(&self, rows: &[usize]) -> Column {
        fn pick<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().filter_map(|&r| values.get(r).cloned()).collect()
        }

        match self {
            Column::Float(v) => Column::Float(pick(v, rows)),
            Column::Int(v) => Column::Int(pick(v, rows)),
            Column::Text(v) => Column::Text(pick(v, rows)),
            Column::Geometry(v) => Column::Geometry(pick(v, rows)),
        }
    }
}

/// Minimum und Maximum aller endlichen Werte, `None` wenn keine vorhanden.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_keeps_requested_order() {
        let column = Column::Text(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(
            column.take(&[2, 0, 9]),
            Column::Text(vec!["c".into(), "a".into()])
        );
    }

    #[test]
    fn geometry_column_is_neither_numeric_nor_categorical() {
        let column = Column::Geometry(vec!["POINT (1 2)".into()]);
        assert!(!column.is_numeric());
        assert!(!column.is_categorical());
        assert!(column.to_f64().is_none());
        assert!(column.category(0).is_none());
    }

    #[test]
    fn finite_range_ignores_nan() {
        assert_eq!(finite_range(&[f64::NAN, 3.0, -1.0]), Some((-1.0, 3.0)));
        assert_eq!(finite_range(&[f64::NAN]), None);
    }
}

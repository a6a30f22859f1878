//! Spatial-Index (KD-Tree) über Zeilenpositionen für Region-Abfragen.

use std::collections::HashMap;

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// Zeilenindex in der Collection
    pub row: usize,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über den Positionen einer Collection.
///
/// Zeilen mit nicht-endlichen Koordinaten werden nicht indexiert.
/// Der Baum hält jede Koordinate genau einmal; deckungsgleiche Zeilen
/// teilen sich einen Eintrag (ein KD-Tree-Blatt nimmt nur begrenzt viele
/// identische Punkte auf).
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    /// Zeilen je eindeutiger Position, aufsteigend
    rows: Vec<Vec<usize>>,
    positions: Vec<DVec2>,
    row_count: usize,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            rows: Vec::new(),
            positions: Vec::new(),
            row_count: 0,
        }
    }

    /// Baut einen Index aus parallelen x/y-Spalten.
    pub fn from_columns(xs: &[f64], ys: &[f64]) -> Self {
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut positions = Vec::new();
        let mut slots: HashMap<(u64, u64), usize> = HashMap::new();
        let mut row_count = 0;

        for (row, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            // -0.0 und 0.0 auf denselben Schlüssel abbilden
            let (x, y) = (x + 0.0, y + 0.0);
            let slot = *slots.entry((x.to_bits(), y.to_bits())).or_insert_with(|| {
                positions.push(DVec2::new(x, y));
                rows.push(Vec::new());
                positions.len() - 1
            });
            rows[slot].push(row);
            row_count += 1;
        }

        let entries: Vec<[f64; 2]> = positions.iter().map(|p| [p.x, p.y]).collect();
        let tree: KdTree<f64, 2> = (&entries).into();

        if positions.len() < row_count {
            log::debug!(
                "Spatial-Index: {} Zeilen auf {} eindeutigen Positionen",
                row_count,
                positions.len()
            );
        }

        Self {
            tree,
            rows,
            positions,
            row_count,
        }
    }

    /// Gibt die Anzahl indexierter Zeilen zurück.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Gibt `true` zurück, wenn keine Zeilen im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Findet die nächste Zeile zur gegebenen Position.
    ///
    /// Bei deckungsgleichen Zeilen gewinnt die kleinste Zeilennummer.
    pub fn nearest(&self, query: DVec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let row = *self.rows.get(result.item as usize)?.first()?;

        Some(SpatialMatch {
            row,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Zeilen innerhalb eines axis-aligned Rechtecks (Rand inklusive).
    ///
    /// Nutzt den KD-Tree mit einer umschließenden Kreisabfrage + Nachfilterung.
    /// Ergebnis ist aufsteigend nach Zeile sortiert.
    pub fn within_rect(&self, min: DVec2, max: DVec2) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }

        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        // Radius des umschließenden Kreises (Diagonale / 2), minimal aufgerundet
        // damit Eckpunkte trotz Rundung im Vorfilter landen
        let radius_sq = half.length_squared() * (1.0 + 1e-9) + f64::EPSILON;

        let mut rows: Vec<usize> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[center.x, center.y], radius_sq)
            .into_iter()
            .filter_map(|entry| {
                let index = entry.item as usize;
                let pos = self.positions.get(index)?;
                // Exakte Rechteck-Prüfung nach dem KD-Tree-Vorfilter
                if pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y {
                    self.rows.get(index)
                } else {
                    None
                }
            })
            .flatten()
            .copied()
            .collect();

        rows.sort_unstable();
        rows
    }
}

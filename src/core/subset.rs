//! Subset-Zustände, Kombinationsmodi und Subsets als Sicht auf eine Collection.
//!
//! Ein Subset kopiert keine Zeilendaten: es hält den Eltern-Datensatz und einen
//! `SubsetState`, der bei Bedarf zu einer Zeilenmaske ausgewertet wird.

use std::collections::BTreeSet;
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{AttributeError, RegionCollection, Roi};
use crate::shared::Color;

/// Logische Beschreibung einer Zeilenauswahl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubsetState {
    /// Explizite Zeilenindizes
    Element(Vec<usize>),
    /// Räumliche ROI über zwei Achsen-Attribute
    Roi {
        x_att: String,
        y_att: String,
        roi: Roi,
    },
    /// Kategorie-Auswahl
    Category {
        attribute: String,
        categories: BTreeSet<String>,
    },
    /// Vereinigung
    Or(Vec<SubsetState>),
    /// Schnittmenge
    And(Vec<SubsetState>),
    /// Symmetrische Differenz
    Xor(Box<SubsetState>, Box<SubsetState>),
    /// Komplement
    Not(Box<SubsetState>),
}

impl SubsetState {
    /// Wertet den Zustand gegen eine Collection zu einer Zeilenmaske aus.
    pub fn to_mask(&self, data: &RegionCollection) -> Result<Vec<bool>, AttributeError> {
        let n = data.row_count();
        match self {
            SubsetState::Element(rows) => {
                let mut mask = vec![false; n];
                for &row in rows {
                    if let Some(slot) = mask.get_mut(row) {
                        *slot = true;
                    }
                }
                Ok(mask)
            }
            SubsetState::Roi { x_att, y_att, roi } => roi_mask(data, x_att, y_att, roi),
            SubsetState::Category {
                attribute,
                categories,
            } => {
                let column = data.attribute(attribute)?;
                if !column.is_categorical() {
                    return Err(AttributeError::NotCategorical {
                        name: attribute.clone(),
                    });
                }
                Ok((0..n)
                    .map(|row| {
                        column
                            .category(row)
                            .is_some_and(|value| categories.contains(&value))
                    })
                    .collect())
            }
            SubsetState::Or(states) => {
                let mut mask = vec![false; n];
                for state in states {
                    for (acc, hit) in mask.iter_mut().zip(state.to_mask(data)?) {
                        *acc |= hit;
                    }
                }
                Ok(mask)
            }
            SubsetState::And(states) => {
                let mut mask = vec![true; n];
                for state in states {
                    for (acc, hit) in mask.iter_mut().zip(state.to_mask(data)?) {
                        *acc &= hit;
                    }
                }
                Ok(mask)
            }
            SubsetState::Xor(a, b) => Ok(a
                .to_mask(data)?
                .into_iter()
                .zip(b.to_mask(data)?)
                .map(|(x, y)| x ^ y)
                .collect()),
            SubsetState::Not(inner) => Ok(inner.to_mask(data)?.into_iter().map(|x| !x).collect()),
        }
    }
}

fn roi_mask(
    data: &RegionCollection,
    x_att: &str,
    y_att: &str,
    roi: &Roi,
) -> Result<Vec<bool>, AttributeError> {
    if let Roi::Category {
        attribute,
        categories,
    } = roi
    {
        return SubsetState::Category {
            attribute: attribute.clone(),
            categories: categories.clone(),
        }
        .to_mask(data);
    }

    let xs = data.numeric_values(x_att)?;
    let ys = data.numeric_values(y_att)?;
    let mut mask = vec![false; data.row_count()];

    // Centroid-Achsen haben einen KD-Tree: nur Kandidaten im ROI-Rechteck prüfen
    if let (Some(index), Some((min, max))) = (data.spatial_index(x_att, y_att), roi.bounds()) {
        for row in index.within_rect(min, max) {
            mask[row] = roi.contains(DVec2::new(xs[row], ys[row]));
        }
        return Ok(mask);
    }

    for (row, slot) in mask.iter_mut().enumerate() {
        *slot = roi.contains(DVec2::new(xs[row], ys[row]));
    }
    Ok(mask)
}

/// Wie eine neue Auswahl mit dem bearbeiteten Subset kombiniert wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Neue Auswahl ersetzt die alte
    #[default]
    Replace,
    /// Vereinigung
    Or,
    /// Schnittmenge
    And,
    /// Symmetrische Differenz
    Xor,
    /// Alte Auswahl ohne die neue
    AndNot,
}

impl SelectionMode {
    /// Kombiniert den bisherigen Zustand mit einer neuen Auswahl.
    pub fn combine(self, previous: Option<SubsetState>, new: SubsetState) -> SubsetState {
        let Some(previous) = previous else {
            return new;
        };
        match self {
            SelectionMode::Replace => new,
            SelectionMode::Or => SubsetState::Or(vec![previous, new]),
            SelectionMode::And => SubsetState::And(vec![previous, new]),
            SelectionMode::Xor => SubsetState::Xor(Box::new(previous), Box::new(new)),
            SelectionMode::AndNot => {
                SubsetState::And(vec![previous, SubsetState::Not(Box::new(new))])
            }
        }
    }
}

/// Benannte Auswahl auf einer Eltern-Collection.
#[derive(Debug, Clone)]
pub struct Subset {
    /// Anzeigename
    pub label: String,
    /// Auswahlzustand
    pub state: SubsetState,
    /// Darstellungsfarbe
    pub color: Color,
    parent: Arc<RegionCollection>,
}

impl Subset {
    /// Erstellt ein Subset auf `parent`.
    pub fn new(
        label: impl Into<String>,
        parent: Arc<RegionCollection>,
        state: SubsetState,
        color: Color,
    ) -> Self {
        Self {
            label: label.into(),
            state,
            color,
            parent,
        }
    }

    /// Eltern-Collection.
    pub fn parent(&self) -> &Arc<RegionCollection> {
        &self.parent
    }

    /// Zeilenmaske über die Eltern-Collection.
    pub fn to_mask(&self) -> Result<Vec<bool>, AttributeError> {
        self.state.to_mask(&self.parent)
    }

    /// Ausgewählte Zeilen in Eltern-Reihenfolge.
    pub fn selected_rows(&self) -> Result<Vec<usize>, AttributeError> {
        Ok(self
            .to_mask()?
            .into_iter()
            .enumerate()
            .filter_map(|(row, hit)| hit.then_some(row))
            .collect())
    }
}

/// Datenquelle eines Layers: ganze Collection oder Subset.
#[derive(Debug, Clone)]
pub enum LayerSource {
    Collection(Arc<RegionCollection>),
    Subset(Subset),
}

impl LayerSource {
    /// Zugrunde liegende Collection (bei Subsets die Eltern-Collection).
    pub fn collection(&self) -> &RegionCollection {
        match self {
            LayerSource::Collection(data) => data,
            LayerSource::Subset(subset) => subset.parent(),
        }
    }

    /// Geteilter Zeiger auf die zugrunde liegende Collection.
    pub fn collection_arc(&self) -> &Arc<RegionCollection> {
        match self {
            LayerSource::Collection(data) => data,
            LayerSource::Subset(subset) => subset.parent(),
        }
    }

    /// `true` für Subsets.
    pub fn is_subset(&self) -> bool {
        matches!(self, LayerSource::Subset(_))
    }

    /// Anzeigename.
    pub fn label(&self) -> String {
        match self {
            LayerSource::Collection(data) => data.label().to_string(),
            LayerSource::Subset(subset) => {
                format!("{} ({})", subset.label, subset.parent().label())
            }
        }
    }

    /// Dargestellte Zeilen: alle Zeilen oder die Subset-Auswahl.
    pub fn rows(&self) -> Result<Vec<usize>, AttributeError> {
        match self {
            LayerSource::Collection(data) => Ok((0..data.row_count()).collect()),
            LayerSource::Subset(subset) => subset.selected_rows(),
        }
    }
}

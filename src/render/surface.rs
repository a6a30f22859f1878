//! Kartenoberfläche: geordnete Sammlung von Visual Objects plus Ansichtszustand.
//!
//! Alle Mutationen sind einzeln abgesichert: Zugriffe auf nicht vorhandene
//! Objekte liefern `SurfaceError::LayerNotPresent`, das Aufrufer an der
//! Mutationsstelle abfangen. Ein Journal zeichnet jede Mutation auf; der Einbettende leert es mit
//! `drain_ops` und spielt die Mutationen auf das echte Karten-Widget ein.
//! Wird es nie geleert, verwirft es die ältesten Einträge ab
//! [`JOURNAL_CAPACITY`].

use std::collections::VecDeque;

use indexmap::IndexMap;
use thiserror::Error;

use super::{VisualId, VisualObject, VisualProperty};
use crate::core::LatLon;

/// Maximale Anzahl ungeleerter Journal-Einträge.
pub const JOURNAL_CAPACITY: usize = 4096;

/// Fehler einer Oberflächen-Mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Objekt ist (nicht mehr) auf der Oberfläche
    #[error("{0} ist nicht auf der Karte")]
    LayerNotPresent(VisualId),
}

/// Aufgezeichnete Mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Add(VisualId),
    Remove(VisualId),
    /// Altes Objekt entfernt, neues an derselben Position eingefügt
    Substitute { old: VisualId, new: VisualId },
    Update { id: VisualId, property: VisualProperty },
    SetDragging(bool),
    SetView { center: LatLon, zoom: f64 },
}

/// Kartenoberfläche.
#[derive(Debug, Clone)]
pub struct MapSurface {
    layers: IndexMap<VisualId, VisualObject>,
    next_id: u64,
    dragging: bool,
    center: LatLon,
    zoom: f64,
    journal: VecDeque<SurfaceOp>,
}

impl Default for MapSurface {
    fn default() -> Self {
        Self::new(LatLon::default(), 1.0)
    }
}

impl MapSurface {
    /// Leere Oberfläche mit Startansicht; Kartenverschiebung ist aktiv.
    pub fn new(center: LatLon, zoom: f64) -> Self {
        Self {
            layers: IndexMap::new(),
            next_id: 1,
            dragging: true,
            center,
            zoom,
            journal: VecDeque::new(),
        }
    }

    fn allocate_id(&mut self) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fügt ein Objekt oben auf der Oberfläche hinzu.
    pub fn add_layer(&mut self, object: VisualObject) -> VisualId {
        let id = self.allocate_id();
        self.layers.insert(id, object);
        self.record(SurfaceOp::Add(id));
        id
    }

    /// Entfernt ein Objekt.
    pub fn remove_layer(&mut self, id: VisualId) -> Result<VisualObject, SurfaceError> {
        let object = self
            .layers
            .shift_remove(&id)
            .ok_or(SurfaceError::LayerNotPresent(id))?;
        self.record(SurfaceOp::Remove(id));
        Ok(object)
    }

    /// Tauscht ein Objekt aus: erst entfernen, dann hinzufügen, an derselben
    /// Zeichenposition. Fehlt das alte Objekt, wird das neue oben angefügt.
    pub fn substitute_layer(&mut self, old: VisualId, object: VisualObject) -> VisualId {
        let new = self.allocate_id();
        match self.layers.get_index_of(&old) {
            Some(position) => {
                self.layers.shift_remove_index(position);
                self.layers.shift_insert(position, new, object);
            }
            None => {
                log::debug!("Austausch: {} nicht vorhanden, füge {} neu hinzu", old, new);
                self.layers.insert(new, object);
            }
        }
        self.record(SurfaceOp::Substitute { old, new });
        new
    }

    /// Übernimmt eine Eigenschaft aus `source` in das bestehende Objekt.
    pub fn update_property(
        &mut self,
        id: VisualId,
        source: &VisualObject,
        property: VisualProperty,
    ) -> Result<(), SurfaceError> {
        let object = self
            .layers
            .get_mut(&id)
            .ok_or(SurfaceError::LayerNotPresent(id))?;
        object.copy_property(source, property);
        self.record(SurfaceOp::Update { id, property });
        Ok(())
    }

    /// Objekt per Handle.
    pub fn layer(&self, id: VisualId) -> Option<&VisualObject> {
        self.layers.get(&id)
    }

    /// `true`, wenn das Objekt auf der Oberfläche liegt.
    pub fn contains(&self, id: VisualId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Alle Objekte in Zeichenreihenfolge (unten zuerst).
    pub fn layers(&self) -> impl Iterator<Item = (VisualId, &VisualObject)> {
        self.layers.iter().map(|(id, object)| (*id, object))
    }

    /// Anzahl der Objekte.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Ob die Karte per Ziehen verschoben werden kann.
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Schaltet die Kartenverschiebung.
    pub fn set_dragging(&mut self, enabled: bool) {
        if self.dragging != enabled {
            self.dragging = enabled;
            self.record(SurfaceOp::SetDragging(enabled));
        }
    }

    /// Aktuelles Zentrum.
    pub fn center(&self) -> LatLon {
        self.center
    }

    /// Aktueller Zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Setzt Zentrum und Zoom.
    pub fn set_view(&mut self, center: LatLon, zoom: f64) {
        if self.center != center || self.zoom != zoom {
            self.center = center;
            self.zoom = zoom;
            self.record(SurfaceOp::SetView { center, zoom });
        }
    }

    /// Anzahl aufgezeichneter, noch nicht abgeholter Mutationen.
    pub fn pending_ops(&self) -> usize {
        self.journal.len()
    }

    /// Holt alle aufgezeichneten Mutationen ab.
    pub fn drain_ops(&mut self) -> Vec<SurfaceOp> {
        self.journal.drain(..).collect()
    }

    fn record(&mut self, op: SurfaceOp) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
            log::debug!("Oberflächen-Journal voll, ältester Eintrag verworfen");
        }
        self.journal.push_back(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{MarkerGroup, VisualKind};

    fn group(name: &str) -> VisualObject {
        VisualObject::Markers(MarkerGroup {
            name: name.into(),
            markers: Vec::new(),
            visible: true,
        })
    }

    #[test]
    fn substitute_keeps_draw_position() {
        let mut surface = MapSurface::default();
        let a = surface.add_layer(group("a"));
        let b = surface.add_layer(group("b"));

        let c = surface.substitute_layer(a, group("c"));

        let order: Vec<VisualId> = surface.layers().map(|(id, _)| id).collect();
        assert_eq!(order, vec![c, b]);
        assert!(!surface.contains(a));
    }

    #[test]
    fn removing_missing_layer_is_reported_not_fatal() {
        let mut surface = MapSurface::default();
        let a = surface.add_layer(group("a"));
        surface.remove_layer(a).expect("Entfernen erwartet");

        assert_eq!(surface.remove_layer(a), Err(SurfaceError::LayerNotPresent(a)));
        assert_eq!(surface.drain_ops(), vec![SurfaceOp::Add(a), SurfaceOp::Remove(a)]);
    }

    #[test]
    fn substitute_of_missing_layer_still_adds() {
        let mut surface = MapSurface::default();
        let new = surface.substitute_layer(VisualId(99), group("x"));

        assert_eq!(
            surface.layer(new).map(VisualObject::kind),
            Some(VisualKind::Markers)
        );
    }

    #[test]
    fn unchanged_dragging_is_not_recorded() {
        let mut surface = MapSurface::default();
        surface.set_dragging(true);
        assert_eq!(surface.pending_ops(), 0);

        surface.set_dragging(false);
        assert_eq!(surface.drain_ops(), vec![SurfaceOp::SetDragging(false)]);
    }

    #[test]
    fn journal_keeps_only_the_newest_entries() {
        let mut surface = MapSurface::default();
        for i in 0..JOURNAL_CAPACITY + 10 {
            surface.set_dragging(i % 2 == 0);
        }

        assert_eq!(surface.pending_ops(), JOURNAL_CAPACITY);
        let ops = surface.drain_ops();
        assert_eq!(ops.last(), Some(&SurfaceOp::SetDragging(false)));
        assert_eq!(surface.pending_ops(), 0);
    }
}

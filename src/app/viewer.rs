//! Kartenviewer: besitzt Oberfläche, Layer-Controller, Werkzeuge und
//! Subset-Gruppen und verbindet Gesten mit der Auswahl.

use std::sync::Arc;

use anyhow::Context;

use super::layer_artist::{LayerArtist, LayerId, SyncContext, SyncOutcome};
use super::layer_state::VisualLayerState;
use super::selection::roi_to_subset;
use super::tools::{PointerEvent, ToolContext, ToolManager, ToolOutput};
use super::MapViewerState;
use crate::core::{
    GeoFrame, IngestInput, LayerSource, RegionCollection, Roi, SelectionMode, Subset, SubsetState,
};
use crate::geodata::{GeoFrameTranslator, GeometryTranslator, TranslateError};
use crate::render::MapSurface;
use crate::shared::{Color, ViewerOptions};

/// Eine Auswahl, die auf allen Daten-Layern als Subset-Layer erscheint.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetGroup {
    pub label: String,
    pub state: SubsetState,
    pub color: Color,
}

/// Verknüpfung eines Subset-Layers mit Daten-Layer und Gruppe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsetLink {
    parent: LayerId,
    group: usize,
    layer: LayerId,
}

/// Kartenviewer.
pub struct MapViewer {
    options: ViewerOptions,
    state: MapViewerState,
    surface: MapSurface,
    layers: Vec<LayerArtist>,
    links: Vec<SubsetLink>,
    tools: ToolManager,
    subset_groups: Vec<SubsetGroup>,
    edit_subset: Option<usize>,
    selection_mode: SelectionMode,
    next_layer_id: u64,
}

impl Default for MapViewer {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}

impl MapViewer {
    pub fn new(options: ViewerOptions) -> Self {
        let state = MapViewerState::new(&options);
        let surface = MapSurface::new(state.center, state.zoom_level);
        Self {
            options,
            state,
            surface,
            layers: Vec::new(),
            links: Vec::new(),
            tools: ToolManager::new(),
            subset_groups: Vec::new(),
            edit_subset: None,
            selection_mode: SelectionMode::default(),
            next_layer_id: 1,
        }
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn state(&self) -> &MapViewerState {
        &self.state
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    /// Oberfläche zum Abholen des Mutations-Journals.
    pub fn surface_mut(&mut self) -> &mut MapSurface {
        &mut self.surface
    }

    /// Alle Layer in Zeichenreihenfolge der Erstellung.
    pub fn layers(&self) -> &[LayerArtist] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerArtist> {
        self.layers.iter().find(|artist| artist.id() == id)
    }

    /// Subset-Layer einer Gruppe auf einem Daten-Layer.
    pub fn subset_layer(&self, parent: LayerId, group: usize) -> Option<&LayerArtist> {
        let link = self
            .links
            .iter()
            .find(|link| link.parent == parent && link.group == group)?;
        self.layer(link.layer)
    }

    pub fn subset_groups(&self) -> &[SubsetGroup] {
        &self.subset_groups
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    /// Kombinationsmodus für die nächste Auswahl.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
    }

    /// Gruppe, die die nächste Auswahl verändert (`None` = neue Gruppe).
    pub fn edit_subset(&self) -> Option<usize> {
        self.edit_subset
    }

    pub fn set_edit_subset(&mut self, group: Option<usize>) {
        self.edit_subset = group.filter(|&i| i < self.subset_groups.len());
    }

    // ── Layer ───────────────────────────────────────────────────────

    /// Baut eine Collection aus einer Eingabe und fügt sie als Daten-Layer hinzu.
    pub fn add_input(&mut self, label: &str, input: IngestInput) -> anyhow::Result<LayerId> {
        let kind = input.type_name();
        let data = RegionCollection::from_input(label, input)
            .with_context(|| format!("'{}' ({}) kann nicht geladen werden", label, kind))?;
        Ok(self.add_data(Arc::new(data)))
    }

    /// Fügt einen Daten-Layer hinzu und zeichnet ihn.
    ///
    /// Ungesetzte Achsen-Attribute werden aus den Daten geraten. Bestehende
    /// Subset-Gruppen erscheinen sofort auch auf dem neuen Layer.
    pub fn add_data(&mut self, data: Arc<RegionCollection>) -> LayerId {
        let axes_before = self.state.axes().map(|(x, y)| (x.to_string(), y.to_string()));
        self.state.guess_axes(&data);
        let first = self.data_layers().next().is_none();

        let id = self.allocate_layer_id();
        let artist = LayerArtist::new(
            id,
            LayerSource::Collection(data),
            &self.options,
            self.options.data_color,
        );
        self.push_layer(artist);
        log::info!(
            "Daten-Layer {:?} hinzugefügt ({} Layer)",
            id,
            self.layers.len()
        );

        let axes_after = self.state.axes().map(|(x, y)| (x.to_string(), y.to_string()));
        if axes_before != axes_after {
            self.refresh_all(false);
        }
        for group in 0..self.subset_groups.len() {
            self.sync_subset_group(group);
        }
        if first {
            self.reset_limits();
        }
        id
    }

    /// Entfernt einen Layer. Bei Daten-Layern verschwinden auch deren
    /// Subset-Layer.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(position) = self.layers.iter().position(|artist| artist.id() == id) else {
            return false;
        };
        let mut artist = self.layers.remove(position);
        artist.remove(&mut self.surface);

        let children: Vec<LayerId> = self
            .links
            .iter()
            .filter(|link| link.parent == id)
            .map(|link| link.layer)
            .collect();
        self.links
            .retain(|link| link.parent != id && link.layer != id);
        for child in children {
            self.remove_layer(child);
        }
        true
    }

    /// Ändert den Darstellungszustand eines Layers und gleicht ab.
    pub fn update_layer_state(
        &mut self,
        id: LayerId,
        change: impl FnOnce(&mut VisualLayerState),
    ) -> Option<SyncOutcome> {
        let artist = self.layers.iter_mut().find(|artist| artist.id() == id)?;
        change(artist.state_mut());
        let mut ctx = SyncContext {
            viewer: &self.state,
            options: &self.options,
            surface: &mut self.surface,
        };
        Some(artist.update(&mut ctx, false))
    }

    /// Gleicht alle Layer ab. `force` liest die Daten neu.
    pub fn refresh_all(&mut self, force: bool) -> Vec<(LayerId, SyncOutcome)> {
        let mut ctx = SyncContext {
            viewer: &self.state,
            options: &self.options,
            surface: &mut self.surface,
        };
        self.layers
            .iter_mut()
            .map(|artist| (artist.id(), artist.update(&mut ctx, force)))
            .collect()
    }

    // ── Achsen ──────────────────────────────────────────────────────

    pub fn set_lat_att(&mut self, attribute: Option<String>) {
        self.state.lat_att = attribute;
        self.refresh_all(false);
    }

    pub fn set_lon_att(&mut self, attribute: Option<String>) {
        self.state.lon_att = attribute;
        self.refresh_all(false);
    }

    /// Kategoriales Attribut für die Punkt-Auswahl.
    pub fn set_select_att(&mut self, attribute: Option<String>) {
        self.state.select_att = attribute;
    }

    /// Setzt Zentrum und Zoom auf den Umfang aller Daten-Layer.
    pub fn reset_limits(&mut self) {
        let collections: Vec<Arc<RegionCollection>> = self
            .data_layers()
            .map(|artist| Arc::clone(artist.source().collection_arc()))
            .collect();
        self.state
            .reset_limits(collections.iter().map(Arc::as_ref), &self.options);
        self.surface.set_view(self.state.center, self.state.zoom_level);
    }

    // ── Werkzeuge ───────────────────────────────────────────────────

    /// Aktiviert ein Werkzeug per Kennung.
    ///
    /// Gibt den Index der geänderten Subset-Gruppe zurück, falls das
    /// Werkzeug beim Aktivieren eine Auswahl erzeugt.
    pub fn activate_tool(&mut self, id: &str) -> Option<usize> {
        let Some(index) = self.tools.index_of(id) else {
            log::warn!("Unbekanntes Werkzeug: {}", id);
            return None;
        };
        let mut ctx = ToolContext {
            surface: &mut self.surface,
            viewer: &self.state,
            options: &self.options,
            layers: &self.layers,
        };
        let output = self.tools.activate(index, &mut ctx)?;
        self.apply_output(output)
    }

    /// Deaktiviert das aktive Werkzeug.
    pub fn deactivate_tool(&mut self) {
        let mut ctx = ToolContext {
            surface: &mut self.surface,
            viewer: &self.state,
            options: &self.options,
            layers: &self.layers,
        };
        self.tools.deactivate_active(&mut ctx);
    }

    /// Leitet ein Zeiger-Ereignis an das aktive Werkzeug weiter und wendet
    /// eine entstandene Auswahl an.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<usize> {
        let mut ctx = ToolContext {
            surface: &mut self.surface,
            viewer: &self.state,
            options: &self.options,
            layers: &self.layers,
        };
        let output = self.tools.dispatch(event, &mut ctx)?;
        self.apply_output(output)
    }

    fn apply_output(&mut self, output: ToolOutput) -> Option<usize> {
        match output {
            ToolOutput::Roi(roi) => self.apply_roi(&roi),
            ToolOutput::Subset(state) => Some(self.apply_subset_state(state)),
            ToolOutput::ResetView => {
                self.reset_limits();
                None
            }
        }
    }

    // ── Auswahl ─────────────────────────────────────────────────────

    /// Wendet eine ROI über den aktuellen Achsen an. Ohne Achsen bleibt eine
    /// räumliche ROI wirkungslos.
    pub fn apply_roi(&mut self, roi: &Roi) -> Option<usize> {
        let Some(state) = roi_to_subset(roi, self.state.axes()) else {
            log::debug!("Keine Achsen-Attribute gesetzt, Auswahl ignoriert");
            return None;
        };
        Some(self.apply_subset_state(state))
    }

    /// Wendet einen Subset-Zustand im aktuellen Modus an und gibt den Index
    /// der betroffenen Gruppe zurück.
    pub fn apply_subset_state(&mut self, new: SubsetState) -> usize {
        let index = match self.edit_subset {
            Some(i) if i < self.subset_groups.len() => {
                let group = &mut self.subset_groups[i];
                let previous = std::mem::replace(&mut group.state, SubsetState::Element(Vec::new()));
                group.state = self.selection_mode.combine(Some(previous), new);
                i
            }
            _ => {
                let i = self.subset_groups.len();
                self.subset_groups.push(SubsetGroup {
                    label: format!("Subset {}", i + 1),
                    state: new,
                    color: self.options.subset_color(i),
                });
                self.edit_subset = Some(i);
                log::info!("Neue Subset-Gruppe {}", i + 1);
                i
            }
        };
        self.sync_subset_group(index);
        index
    }

    /// Exportiert einen Layer als GeoFrame (Subsets mit ihren Zeilen).
    pub fn export_layer(&self, id: LayerId) -> Result<Option<GeoFrame>, TranslateError> {
        match self.layer(id) {
            Some(artist) => GeoFrameTranslator.to_native(artist.source()).map(Some),
            None => Ok(None),
        }
    }

    // ── intern ──────────────────────────────────────────────────────

    fn allocate_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        id
    }

    /// Daten-Layer (keine Subset-Layer).
    fn data_layers(&self) -> impl Iterator<Item = &LayerArtist> {
        self.layers.iter().filter(|artist| !artist.source().is_subset())
    }

    fn push_layer(&mut self, mut artist: LayerArtist) {
        let mut ctx = SyncContext {
            viewer: &self.state,
            options: &self.options,
            surface: &mut self.surface,
        };
        artist.attach(&mut ctx);
        artist.update(&mut ctx, true);
        self.layers.push(artist);
    }

    /// Bringt alle Subset-Layer einer Gruppe auf den Gruppenzustand und legt
    /// fehlende an.
    fn sync_subset_group(&mut self, group: usize) {
        let Some(entry) = self.subset_groups.get(group).cloned() else {
            return;
        };
        let parents: Vec<(LayerId, Arc<RegionCollection>)> = self
            .data_layers()
            .map(|artist| (artist.id(), Arc::clone(artist.source().collection_arc())))
            .collect();

        for (parent, data) in parents {
            let existing = self
                .links
                .iter()
                .find(|link| link.parent == parent && link.group == group)
                .map(|link| link.layer);

            match existing.and_then(|id| self.layers.iter_mut().find(|a| a.id() == id)) {
                Some(artist) => {
                    artist.set_subset_state(entry.state.clone());
                    let mut ctx = SyncContext {
                        viewer: &self.state,
                        options: &self.options,
                        surface: &mut self.surface,
                    };
                    artist.update(&mut ctx, true);
                }
                None => {
                    let id = self.allocate_layer_id();
                    let subset = Subset::new(entry.label.clone(), data, entry.state.clone(), entry.color);
                    let artist =
                        LayerArtist::new(id, LayerSource::Subset(subset), &self.options, entry.color);
                    self.push_layer(artist);
                    self.links.push(SubsetLink {
                        parent,
                        group,
                        layer: id,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, LatLon, Table};
    use crate::render::{SurfaceOp, VisualObject};

    fn points() -> Arc<RegionCollection> {
        let mut table = Table::new();
        table.insert("lat".into(), Column::Float(vec![10.0, 20.0, 30.0]));
        table.insert("lon".into(), Column::Float(vec![-10.0, 0.0, 10.0]));
        Arc::new(RegionCollection::from_table("cities", table).expect("Collection erwartet"))
    }

    fn marker_count(viewer: &MapViewer, id: LayerId) -> usize {
        let visual = viewer
            .layer(id)
            .and_then(LayerArtist::visual_id)
            .expect("Visual erwartet");
        match viewer.surface().layer(visual) {
            Some(VisualObject::Markers(group)) => group.markers.len(),
            other => panic!("Marker erwartet, war {:?}", other.map(VisualObject::kind)),
        }
    }

    fn drag(viewer: &mut MapViewer, from: LatLon, to: LatLon) -> Option<usize> {
        viewer.handle_pointer(&PointerEvent::Press(from));
        viewer.handle_pointer(&PointerEvent::Move(to));
        viewer.handle_pointer(&PointerEvent::Release(to))
    }

    #[test]
    fn add_data_guesses_axes_and_frames_view() {
        let mut viewer = MapViewer::default();
        let id = viewer.add_data(points());

        assert_eq!(viewer.state().axes(), Some(("lon", "lat")));
        assert_eq!(marker_count(&viewer, id), 3);
        assert_eq!(viewer.surface().center(), LatLon::new(20.0, 0.0));
    }

    #[test]
    fn rectangle_gesture_creates_subset_layer() {
        let mut viewer = MapViewer::default();
        let data = viewer.add_data(points());
        viewer.activate_tool("rectangle");

        let group = drag(&mut viewer, LatLon::new(25.0, 5.0), LatLon::new(5.0, -15.0));

        assert_eq!(group, Some(0));
        assert_eq!(viewer.subset_groups().len(), 1);
        let subset = viewer.subset_layer(data, 0).expect("Subset-Layer erwartet");
        assert_eq!(marker_count(&viewer, subset.id()), 2);
    }

    #[test]
    fn second_gesture_edits_the_same_group() {
        let mut viewer = MapViewer::default();
        let data = viewer.add_data(points());
        viewer.activate_tool("rectangle");
        drag(&mut viewer, LatLon::new(15.0, -15.0), LatLon::new(5.0, -5.0));

        viewer.set_selection_mode(SelectionMode::Or);
        drag(&mut viewer, LatLon::new(35.0, 5.0), LatLon::new(25.0, 15.0));

        assert_eq!(viewer.subset_groups().len(), 1);
        let subset = viewer.subset_layer(data, 0).expect("Subset-Layer erwartet");
        assert_eq!(marker_count(&viewer, subset.id()), 2);
    }

    #[test]
    fn selection_without_axes_is_noop() {
        let mut viewer = MapViewer::default();
        viewer.add_data(points());
        viewer.set_lat_att(None);
        viewer.surface_mut().drain_ops();

        let roi = Roi::rectangle(glam::DVec2::new(-20.0, 0.0), glam::DVec2::new(20.0, 40.0));
        assert!(viewer.apply_roi(&roi).is_none());
        assert!(viewer.subset_groups().is_empty());
    }

    #[test]
    fn home_tool_resets_view() {
        let mut viewer = MapViewer::default();
        viewer.add_data(points());
        viewer.surface_mut().set_view(LatLon::new(0.0, 0.0), 12.0);
        viewer.surface_mut().drain_ops();

        assert!(viewer.activate_tool("home").is_none());

        let ops = viewer.surface_mut().drain_ops();
        assert!(matches!(ops.as_slice(), [SurfaceOp::SetView { .. }]));
        assert_eq!(viewer.surface().center(), LatLon::new(20.0, 0.0));
    }

    #[test]
    fn removing_data_removes_its_subset_layers() {
        let mut viewer = MapViewer::default();
        let data = viewer.add_data(points());
        viewer.apply_subset_state(SubsetState::Element(vec![0]));
        assert_eq!(viewer.layers().len(), 2);

        assert!(viewer.remove_layer(data));

        assert!(viewer.layers().is_empty());
        assert_eq!(viewer.surface().layer_count(), 0);
        assert!(!viewer.remove_layer(data));
    }

    #[test]
    fn add_input_rejects_plain_arrays() {
        let mut viewer = MapViewer::default();
        let err = viewer
            .add_input("zahlen", IngestInput::Array(vec![1.0, 2.0]))
            .expect_err("Fehler erwartet");
        assert!(err.to_string().contains("zahlen"));
        assert!(viewer.layers().is_empty());
    }

    #[test]
    fn export_of_tabular_layer_reports_missing_geometry() {
        let mut viewer = MapViewer::default();
        let data = viewer.add_data(points());
        assert!(matches!(
            viewer.export_layer(data),
            Err(TranslateError::MissingGeometry { .. })
        ));
        assert!(matches!(viewer.export_layer(LayerId(99)), Ok(None)));
    }
}

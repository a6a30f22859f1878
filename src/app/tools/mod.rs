//! Trait-basiertes Werkzeug-System für Selektions-Gesten auf der Karte.
//!
//! Jedes Werkzeug implementiert den `MapTool`-Trait und wird beim
//! `ToolManager` registriert. Werkzeuge erzeugen reine Daten (`ToolOutput`),
//! die Auswahl wendet der Viewer zentral an.

/// Gemeinsame Hilfen: Overlay-Handle, Drag-Sperre, Stile.
pub mod common;
/// Home-Werkzeug: setzt die Ansicht zurück.
pub mod home;
/// Lasso-Auswahl per gedrückter Bewegung.
pub mod lasso;
/// MapTool-Trait: Schnittstelle für alle Werkzeuge.
mod map_tool;
/// Punkt-Auswahl per Klick auf ein Feature.
pub mod point_select;
/// Polygon-Auswahl per Klick-Folge.
pub mod polygon_select;
/// Rechteck-Auswahl per Ziehen.
pub mod rect_select;

pub use map_tool::MapTool;

use geo::Geometry;

use super::layer_artist::LayerArtist;
use super::MapViewerState;
use crate::core::{LatLon, Roi, SubsetState};
use crate::render::{MapSurface, VisualId};
use crate::shared::ViewerOptions;

// ── Typen ────────────────────────────────────────────────────────

/// Zeiger-Ereignis auf der Kartenoberfläche.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Taste gedrückt
    Press(LatLon),
    /// Zeiger bewegt (gedrückt oder nicht)
    Move(LatLon),
    /// Taste losgelassen
    Release(LatLon),
    /// Klick auf die Karte
    Click(LatLon),
    /// Zeiger hat die Karte verlassen
    Leave,
    /// Klick auf ein gezeichnetes Feature eines Region-Layers
    FeatureClick {
        visual: VisualId,
        feature_id: String,
        geometry: Geometry<f64>,
    },
}

/// Ergebnis eines Werkzeugs: reine Daten, keine Mutation der Auswahl.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// ROI über den Anzeigeachsen (bzw. Kategorie-Auswahl)
    Roi(Roi),
    /// Fertiger Subset-Zustand
    Subset(SubsetState),
    /// Ansicht auf die Daten zurücksetzen
    ResetView,
}

/// Alles, was ein Werkzeug von außen braucht.
pub struct ToolContext<'a> {
    pub surface: &'a mut MapSurface,
    pub viewer: &'a MapViewerState,
    pub options: &'a ViewerOptions,
    pub layers: &'a [LayerArtist],
}

// ── ToolManager ──────────────────────────────────────────────────

/// Verwaltet registrierte Werkzeuge und den aktiven Werkzeug-Index.
pub struct ToolManager {
    tools: Vec<Box<dyn MapTool>>,
    active_index: Option<usize>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    /// Erstellt einen neuen ToolManager mit vorregistrierten Standard-Werkzeugen.
    pub fn new() -> Self {
        let mut manager = Self {
            tools: Vec::new(),
            active_index: None,
        };
        manager.register(Box::new(home::HomeTool));
        manager.register(Box::new(point_select::PointSelectTool::new()));
        manager.register(Box::new(rect_select::RectSelectTool::new()));
        manager.register(Box::new(polygon_select::PolygonSelectTool::new()));
        manager.register(Box::new(lasso::LassoTool::new()));
        manager
    }

    /// Registriert ein neues Werkzeug.
    pub fn register(&mut self, tool: Box<dyn MapTool>) {
        self.tools.push(tool);
    }

    /// Gibt die Anzahl registrierter Werkzeuge zurück.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Gibt Index, Kennung und Name aller registrierten Werkzeuge zurück.
    pub fn tool_entries(&self) -> Vec<(usize, &str, &str)> {
        self.tools
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.id(), t.name()))
            .collect()
    }

    /// Index eines Werkzeugs per Kennung.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tools.iter().position(|t| t.id() == id)
    }

    /// Aktiviert ein Werkzeug per Index.
    ///
    /// Nicht aktivierbare Werkzeuge laufen nur einmal durch `activate`, das
    /// aktive Werkzeug bleibt bestehen. Sonst wird das bisherige Werkzeug
    /// vorher deaktiviert.
    pub fn activate(&mut self, index: usize, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        let tool = self.tools.get_mut(index)?;
        if !tool.is_checkable() {
            return tool.activate(ctx);
        }
        if self.active_index == Some(index) {
            return None;
        }
        self.deactivate_active(ctx);
        log::debug!("Werkzeug aktiviert: {}", self.tools[index].id());
        self.active_index = Some(index);
        self.tools[index].activate(ctx)
    }

    /// Deaktiviert das aktive Werkzeug (bricht angefangene Gesten ab).
    pub fn deactivate_active(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(old) = self.active_index.take() {
            self.tools[old].deactivate(ctx);
            log::debug!("Werkzeug deaktiviert: {}", self.tools[old].id());
        }
    }

    /// Gibt den Index des aktiven Werkzeugs zurück.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Gibt eine Referenz auf das aktive Werkzeug zurück.
    pub fn active_tool(&self) -> Option<&dyn MapTool> {
        self.active_index.map(|i| self.tools[i].as_ref())
    }

    /// Leitet ein Zeiger-Ereignis an das aktive Werkzeug weiter.
    pub fn dispatch(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> Option<ToolOutput> {
        let i = self.active_index?;
        self.tools[i].on_pointer(event, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        surface: MapSurface,
        viewer: MapViewerState,
        options: ViewerOptions,
    }

    impl Fixture {
        fn new() -> Self {
            let options = ViewerOptions::default();
            let mut viewer = MapViewerState::new(&options);
            viewer.lat_att = Some("lat".into());
            viewer.lon_att = Some("lon".into());
            Self {
                surface: MapSurface::default(),
                viewer,
                options,
            }
        }

        fn ctx(&mut self) -> ToolContext<'_> {
            ToolContext {
                surface: &mut self.surface,
                viewer: &self.viewer,
                options: &self.options,
                layers: &[],
            }
        }
    }

    #[test]
    fn default_tools_are_registered() {
        let manager = ToolManager::new();
        assert_eq!(manager.tool_count(), 5);
        assert_eq!(manager.index_of("home"), Some(0));
        assert!(manager.index_of("lasso").is_some());
        assert_eq!(manager.tool_entries()[2], (2, "rectangle", "Rechteck"));
        assert!(manager.active_index().is_none());
    }

    #[test]
    fn home_does_not_become_active() {
        let mut fx = Fixture::new();
        let mut manager = ToolManager::new();
        let rect = manager.index_of("rectangle").expect("Rechteck-Werkzeug erwartet");
        manager.activate(rect, &mut fx.ctx());

        let home = manager.index_of("home").expect("Home-Werkzeug erwartet");
        let output = manager.activate(home, &mut fx.ctx());

        assert_eq!(output, Some(ToolOutput::ResetView));
        assert_eq!(manager.active_index(), Some(rect));
    }

    #[test]
    fn switching_tools_cancels_gesture_and_restores_dragging() {
        let mut fx = Fixture::new();
        let mut manager = ToolManager::new();
        let rect = manager.index_of("rectangle").expect("Rechteck-Werkzeug erwartet");
        manager.activate(rect, &mut fx.ctx());
        assert!(!fx.surface.dragging());

        manager.dispatch(&PointerEvent::Press(LatLon::new(1.0, 1.0)), &mut fx.ctx());
        assert_eq!(fx.surface.layer_count(), 1);
        assert!(manager.active_tool().is_some_and(|t| t.has_pending_input()));

        let point = manager.index_of("point").expect("Punkt-Werkzeug erwartet");
        manager.activate(point, &mut fx.ctx());

        assert_eq!(fx.surface.layer_count(), 0);
        assert!(fx.surface.dragging());
        assert_eq!(manager.active_index(), Some(point));
    }

    #[test]
    fn dispatch_without_active_tool_is_noop() {
        let mut fx = Fixture::new();
        let mut manager = ToolManager::new();
        let output = manager.dispatch(&PointerEvent::Click(LatLon::new(0.0, 0.0)), &mut fx.ctx());
        assert!(output.is_none());
        assert_eq!(fx.surface.pending_ops(), 0);
    }
}

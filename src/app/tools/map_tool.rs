//! MapTool-Trait: Schnittstelle für alle Karten-Werkzeuge.

use super::{PointerEvent, ToolContext, ToolOutput};

/// Schnittstelle für alle Karten-Werkzeuge (Punkt, Rechteck, Lasso, …).
///
/// Werkzeuge sind kleine Zustandsautomaten über Zeiger-Ereignissen. Sie
/// erzeugen reine Daten (`ToolOutput`); die Auswahl selbst wendet der Viewer an.
pub trait MapTool {
    /// Stabile Kennung (z.B. für Toolbar-Zustand)
    fn id(&self) -> &str;

    /// Anzeigename für die Toolbar
    fn name(&self) -> &str;

    /// Kurzbeschreibung / Tooltip
    fn description(&self) -> &str {
        ""
    }

    /// Bleibt das Werkzeug nach dem Aktivieren aktiv?
    ///
    /// Nicht aktivierbare Werkzeuge führen nur `activate` aus.
    fn is_checkable(&self) -> bool {
        true
    }

    /// Wird beim Aktivieren aufgerufen.
    fn activate(&mut self, _ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        None
    }

    /// Wird beim Deaktivieren aufgerufen. Bricht angefangene Gesten ab,
    /// entfernt Overlays und stellt Oberflächen-Einstellungen wieder her.
    fn deactivate(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Zeiger-Ereignis verarbeiten.
    fn on_pointer(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>)
        -> Option<ToolOutput>;

    /// Hat das Werkzeug eine angefangene Geste?
    fn has_pending_input(&self) -> bool {
        false
    }
}

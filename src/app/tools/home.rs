//! Home-Werkzeug: setzt Zentrum und Zoom auf die Daten zurück.

use super::{MapTool, PointerEvent, ToolContext, ToolOutput};

/// Zustandsloses Werkzeug, das nur eine Ansichts-Rücksetzung anfordert.
#[derive(Debug, Default)]
pub struct HomeTool;

impl MapTool for HomeTool {
    fn id(&self) -> &str {
        "home"
    }

    fn name(&self) -> &str {
        "Home"
    }

    fn description(&self) -> &str {
        "Ansicht auf alle Daten zurücksetzen"
    }

    fn is_checkable(&self) -> bool {
        false
    }

    fn activate(&mut self, _ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        Some(ToolOutput::ResetView)
    }

    fn on_pointer(
        &mut self,
        _event: &PointerEvent,
        _ctx: &mut ToolContext<'_>,
    ) -> Option<ToolOutput> {
        None
    }
}

//! Rechteck-Auswahl: Drücken setzt den Anker, Ziehen zeigt das Rechteck,
//! Loslassen erzeugt die ROI.

use super::common::{display_point, provisional_style, selection_style, DragGuard, OverlayHandle};
use super::{MapTool, PointerEvent, ToolContext, ToolOutput};
use crate::core::{LatLon, Roi};
use crate::render::Shape;

/// Rechteck-Werkzeug. Sperrt die Kartenverschiebung, solange es aktiv ist.
#[derive(Debug, Default)]
pub struct RectSelectTool {
    anchor: Option<LatLon>,
    overlay: OverlayHandle,
    drag: DragGuard,
}

impl RectSelectTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapTool for RectSelectTool {
    fn id(&self) -> &str {
        "rectangle"
    }

    fn name(&self) -> &str {
        "Rechteck"
    }

    fn description(&self) -> &str {
        "Auswahl per aufgezogenem Rechteck"
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        self.drag.suspend(ctx.surface);
        None
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.anchor = None;
        self.overlay.clear(ctx.surface);
        self.drag.restore(ctx.surface);
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        match *event {
            PointerEvent::Press(pos) => {
                self.overlay.clear(ctx.surface);
                self.anchor = Some(pos);
                self.overlay.show(
                    ctx.surface,
                    Shape::Rectangle {
                        corners: [pos, pos],
                    },
                    provisional_style(ctx.options),
                );
                None
            }
            PointerEvent::Move(pos) => {
                let anchor = self.anchor?;
                self.overlay.show(
                    ctx.surface,
                    Shape::Rectangle {
                        corners: [anchor, pos],
                    },
                    provisional_style(ctx.options),
                );
                None
            }
            PointerEvent::Release(pos) => {
                let anchor = self.anchor.take()?;
                let roi = Roi::rectangle(display_point(anchor), display_point(pos));
                if roi.is_degenerate() {
                    log::debug!("Rechteck ohne Fläche, keine Auswahl");
                    self.overlay.clear(ctx.surface);
                    return None;
                }
                self.overlay.show(
                    ctx.surface,
                    Shape::Rectangle {
                        corners: [anchor, pos],
                    },
                    selection_style(ctx.options),
                );
                Some(ToolOutput::Roi(roi))
            }
            _ => None,
        }
    }

    fn has_pending_input(&self) -> bool {
        self.anchor.is_some()
    }
}

//! Lasso-Auswahl: Bewegung bei gedrückter Taste sammelt Eckpunkte,
//! Loslassen oder Verlassen der Karte schließt den Ring.

use super::common::{display_point, trail_style, DragGuard, OverlayHandle};
use super::polygon_select::MIN_VERTICES;
use super::{MapTool, PointerEvent, ToolContext, ToolOutput};
use crate::core::{LatLon, Roi};
use crate::render::Shape;

/// Lasso-Werkzeug. Sperrt die Kartenverschiebung, solange es aktiv ist.
#[derive(Debug, Default)]
pub struct LassoTool {
    pressed: bool,
    vertices: Vec<LatLon>,
    overlay: OverlayHandle,
    drag: DragGuard,
}

impl LassoTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        self.pressed = false;
        self.overlay.clear(ctx.surface);
        let vertices = std::mem::take(&mut self.vertices);
        if vertices.len() < MIN_VERTICES {
            log::debug!("Lasso mit {} Punkten verworfen", vertices.len());
            return None;
        }
        let roi = Roi::polygon(vertices.into_iter().map(display_point).collect());
        Some(ToolOutput::Roi(roi))
    }
}

impl MapTool for LassoTool {
    fn id(&self) -> &str {
        "lasso"
    }

    fn name(&self) -> &str {
        "Lasso"
    }

    fn description(&self) -> &str {
        "Auswahl per Freihand-Umriss"
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        self.drag.suspend(ctx.surface);
        None
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.pressed = false;
        self.vertices.clear();
        self.overlay.clear(ctx.surface);
        self.drag.restore(ctx.surface);
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        match *event {
            PointerEvent::Press(pos) => {
                self.overlay.clear(ctx.surface);
                self.pressed = true;
                self.vertices = vec![pos];
                None
            }
            PointerEvent::Move(pos) if self.pressed => {
                self.vertices.push(pos);
                self.overlay.show(
                    ctx.surface,
                    Shape::Polygon(self.vertices.clone()),
                    trail_style(ctx.options),
                );
                None
            }
            PointerEvent::Release(pos) if self.pressed => {
                if self.vertices.last() != Some(&pos) {
                    self.vertices.push(pos);
                }
                self.finish(ctx)
            }
            PointerEvent::Leave if self.pressed => self.finish(ctx),
            _ => None,
        }
    }

    fn has_pending_input(&self) -> bool {
        self.pressed
    }
}

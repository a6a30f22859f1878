//! Polygon-Auswahl: jeder Klick setzt einen Eckpunkt. Ein Klick nahe dem
//! Startpunkt oder das Verlassen der Karte schließt den Ring.

use super::common::{close_tolerance, display_point, trail_style, DragGuard, OverlayHandle};
use super::{MapTool, PointerEvent, ToolContext, ToolOutput};
use crate::core::{LatLon, Roi};
use crate::render::Shape;

/// Mindestanzahl Eckpunkte für eine Auswahl.
pub(crate) const MIN_VERTICES: usize = 3;

/// Polygon-Werkzeug.
#[derive(Debug, Default)]
pub struct PolygonSelectTool {
    vertices: Vec<LatLon>,
    overlay: OverlayHandle,
    drag: DragGuard,
}

impl PolygonSelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl bisher gesetzter Eckpunkte.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn closes_ring(&self, pos: LatLon, fraction: f64) -> bool {
        if self.vertices.len() < MIN_VERTICES {
            return false;
        }
        let Some(&start) = self.vertices.first() else {
            return false;
        };
        let tolerance = close_tolerance(&self.vertices, fraction);
        display_point(pos).distance(display_point(start)) <= tolerance
    }

    fn draw(&mut self, ctx: &mut ToolContext<'_>, cursor: Option<LatLon>) {
        let mut trail = self.vertices.clone();
        trail.extend(cursor);
        self.overlay
            .show(ctx.surface, Shape::Polyline(trail), trail_style(ctx.options));
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        self.overlay.clear(ctx.surface);
        let vertices = std::mem::take(&mut self.vertices);
        if vertices.len() < MIN_VERTICES {
            log::debug!("Polygon mit {} Eckpunkten verworfen", vertices.len());
            return None;
        }
        let roi = Roi::polygon(vertices.into_iter().map(display_point).collect());
        Some(ToolOutput::Roi(roi))
    }
}

impl MapTool for PolygonSelectTool {
    fn id(&self) -> &str {
        "polygon"
    }

    fn name(&self) -> &str {
        "Polygon"
    }

    fn description(&self) -> &str {
        "Auswahl per Eckpunkten, Klick auf den Startpunkt schließt"
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        self.drag.suspend(ctx.surface);
        None
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.vertices.clear();
        self.overlay.clear(ctx.surface);
        self.drag.restore(ctx.surface);
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        match *event {
            PointerEvent::Click(pos) => {
                if self.closes_ring(pos, ctx.options.polygon_close_tolerance) {
                    return self.finish(ctx);
                }
                self.vertices.push(pos);
                self.draw(ctx, None);
                None
            }
            PointerEvent::Move(pos) if !self.vertices.is_empty() => {
                self.draw(ctx, Some(pos));
                None
            }
            PointerEvent::Leave if !self.vertices.is_empty() => self.finish(ctx),
            _ => None,
        }
    }

    fn has_pending_input(&self) -> bool {
        !self.vertices.is_empty()
    }
}

//! Gemeinsame Hilfen für Karten-Werkzeuge.

use glam::DVec2;

use crate::core::LatLon;
use crate::render::{MapSurface, Shape, ShapeOverlay, ShapeStyle, VisualId, VisualObject};
use crate::shared::ViewerOptions;

/// Besitz genau eines provisorischen Overlays auf der Oberfläche.
///
/// Overlay-Grenzen sind nicht reaktiv: jede Änderung tauscht das Objekt aus.
#[derive(Debug, Default)]
pub(crate) struct OverlayHandle {
    visual: Option<VisualId>,
}

impl OverlayHandle {
    /// Zeigt das Overlay an oder ersetzt das bisherige.
    pub fn show(&mut self, surface: &mut MapSurface, shape: Shape, style: ShapeStyle) -> VisualId {
        let object = VisualObject::Shape(ShapeOverlay {
            shape,
            style,
            visible: true,
        });
        let id = match self.visual {
            Some(old) => surface.substitute_layer(old, object),
            None => surface.add_layer(object),
        };
        self.visual = Some(id);
        id
    }

    /// Entfernt das Overlay. Ein bereits verschwundenes Objekt ist unschädlich.
    pub fn clear(&mut self, surface: &mut MapSurface) {
        if let Some(id) = self.visual.take() {
            if let Err(e) = surface.remove_layer(id) {
                log::debug!("Overlay entfernen: {}", e);
            }
        }
    }

    pub fn is_shown(&self) -> bool {
        self.visual.is_some()
    }
}

/// Sperrt die Kartenverschiebung und merkt sich den vorherigen Zustand.
#[derive(Debug, Default)]
pub(crate) struct DragGuard {
    previous: Option<bool>,
}

impl DragGuard {
    pub fn suspend(&mut self, surface: &mut MapSurface) {
        if self.previous.is_none() {
            self.previous = Some(surface.dragging());
        }
        surface.set_dragging(false);
    }

    pub fn restore(&mut self, surface: &mut MapSurface) {
        if let Some(previous) = self.previous.take() {
            surface.set_dragging(previous);
        }
    }
}

// ── Stile ────────────────────────────────────────────────────────

/// Während des Ziehens: dünner Umriss, kaum gefüllt.
pub(crate) fn provisional_style(options: &ViewerOptions) -> ShapeStyle {
    ShapeStyle {
        color: options.interact_color,
        fill_color: options.interact_color,
        weight: 1.0,
        fill_opacity: 0.1,
        dash_array: String::new(),
    }
}

/// Abgeschlossene Auswahl als Rückmeldung.
pub(crate) fn selection_style(options: &ViewerOptions) -> ShapeStyle {
    ShapeStyle {
        fill_opacity: 0.5,
        ..provisional_style(options)
    }
}

/// Gestrichelte Spur von Polygon und Lasso.
pub(crate) fn trail_style(options: &ViewerOptions) -> ShapeStyle {
    ShapeStyle {
        fill_opacity: 0.5,
        dash_array: "5, 5".to_string(),
        ..provisional_style(options)
    }
}

// ── Geometrie ────────────────────────────────────────────────────

/// Kartenposition in Anzeigeachsen: x = Länge, y = Breite.
pub(crate) fn display_point(pos: LatLon) -> DVec2 {
    DVec2::new(pos.lon, pos.lat)
}

/// Schließ-Toleranz als Anteil der größeren Seite des Umrisses aller Punkte.
pub(crate) fn close_tolerance(vertices: &[LatLon], fraction: f64) -> f64 {
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for &v in vertices {
        let p = display_point(v);
        min = min.min(p);
        max = max.max(p);
    }
    if vertices.is_empty() {
        return 0.0;
    }
    let size = max - min;
    fraction * size.x.max(size.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_show_twice_substitutes() {
        let options = ViewerOptions::default();
        let mut surface = MapSurface::default();
        let mut overlay = OverlayHandle::default();
        let shape = |lat| Shape::Polyline(vec![LatLon::new(0.0, 0.0), LatLon::new(lat, 1.0)]);

        let first = overlay.show(&mut surface, shape(1.0), provisional_style(&options));
        let second = overlay.show(&mut surface, shape(2.0), provisional_style(&options));

        assert_ne!(first, second);
        assert_eq!(surface.layer_count(), 1);
        assert!(!surface.contains(first));

        overlay.clear(&mut surface);
        overlay.clear(&mut surface);
        assert_eq!(surface.layer_count(), 0);
        assert!(!overlay.is_shown());
    }

    #[test]
    fn overlay_clear_tolerates_missing_object() {
        let options = ViewerOptions::default();
        let mut surface = MapSurface::default();
        let mut overlay = OverlayHandle::default();
        let id = overlay.show(
            &mut surface,
            Shape::Polygon(vec![LatLon::new(0.0, 0.0)]),
            trail_style(&options),
        );
        surface.remove_layer(id).expect("Overlay erwartet");

        overlay.clear(&mut surface);
        assert!(!overlay.is_shown());
    }

    #[test]
    fn drag_guard_restores_previous_state() {
        let mut surface = MapSurface::default();
        surface.set_dragging(false);
        let mut guard = DragGuard::default();

        guard.suspend(&mut surface);
        guard.suspend(&mut surface);
        guard.restore(&mut surface);

        assert!(!surface.dragging());
    }

    #[test]
    fn tolerance_scales_with_extent() {
        let vertices = [
            LatLon::new(0.0, 0.0),
            LatLon::new(10.0, 0.0),
            LatLon::new(10.0, 50.0),
        ];
        assert!((close_tolerance(&vertices, 0.02) - 1.0).abs() < 1e-12);
        assert_eq!(close_tolerance(&[], 0.02), 0.0);
    }
}

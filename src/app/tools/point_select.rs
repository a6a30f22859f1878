//! Punkt-Auswahl: Klick auf ein Feature wählt dessen Fläche aus.

use geo::{Geometry, Polygon};
use glam::DVec2;

use super::{MapTool, PointerEvent, ToolContext, ToolOutput};
use crate::app::selection::rois_to_subset;
use crate::core::Roi;
use crate::render::VisualId;

/// Punkt-Werkzeug.
///
/// Ist am Viewer ein Auswahl-Attribut gesetzt, wird die Kategorie des
/// angeklickten Features gewählt, sonst eine Polygon-ROI je Teilfläche.
#[derive(Debug, Default)]
pub struct PointSelectTool;

impl PointSelectTool {
    pub fn new() -> Self {
        Self
    }

    fn select_category(
        ctx: &ToolContext<'_>,
        attribute: &str,
        visual: VisualId,
        feature_id: &str,
    ) -> Option<ToolOutput> {
        let artist = ctx
            .layers
            .iter()
            .find(|artist| artist.visual_id() == Some(visual))?;
        let data = artist.source().collection();
        let row = data.row_for_feature_id(feature_id)?;
        let category = match data.attribute(attribute) {
            Ok(column) => column.category(row)?,
            Err(e) => {
                log::debug!("Punkt-Auswahl: {}", e);
                return None;
            }
        };
        Some(ToolOutput::Roi(Roi::category(attribute, [category])))
    }

    fn select_parts(ctx: &ToolContext<'_>, geometry: &Geometry<f64>) -> Option<ToolOutput> {
        let axes = ctx.viewer.axes()?;
        let rois: Vec<Roi> = polygon_parts(geometry)
            .iter()
            .map(|polygon| {
                let ring = polygon.exterior();
                let mut vertices: Vec<_> = ring
                    .coords()
                    .map(|c| DVec2::new(c.x, c.y))
                    .collect();
                if ring.is_closed() && vertices.len() > 1 {
                    vertices.pop();
                }
                Roi::polygon(vertices)
            })
            .filter(|roi| !roi.is_degenerate())
            .collect();
        rois_to_subset(&rois, Some(axes)).map(ToolOutput::Subset)
    }
}

/// Flächen-Teile einer Geometrie. Punkte und Linien haben keine.
fn polygon_parts(geometry: &Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p.clone()],
        Geometry::MultiPolygon(mp) => mp.0.clone(),
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(polygon_parts).collect(),
        _ => Vec::new(),
    }
}

impl MapTool for PointSelectTool {
    fn id(&self) -> &str {
        "point"
    }

    fn name(&self) -> &str {
        "Punkt"
    }

    fn description(&self) -> &str {
        "Auswahl per Klick auf eine Region"
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) -> Option<ToolOutput> {
        let PointerEvent::FeatureClick {
            visual,
            feature_id,
            geometry,
        } = event
        else {
            return None;
        };
        match ctx.viewer.select_att.as_deref() {
            Some(attribute) => Self::select_category(ctx, attribute, *visual, feature_id),
            None => Self::select_parts(ctx, geometry),
        }
    }
}

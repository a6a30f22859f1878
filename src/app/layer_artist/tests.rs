use std::sync::Arc;

use geo::{polygon, Geometry};

use super::*;
use crate::app::layer_state::{ColorMode, DisplayMode};
use crate::core::{Column, Crs, GeoFrame, RegionCollection, Subset, Table};
use crate::render::{SurfaceOp, VisualKind};

fn point_data() -> Arc<RegionCollection> {
    let mut table = Table::new();
    table.insert("lat".into(), Column::Float(vec![50.0, 51.0, 52.0, f64::NAN]));
    table.insert("lon".into(), Column::Float(vec![8.0, 9.0, 10.0, 11.0]));
    table.insert("score".into(), Column::Float(vec![1.0, 2.0, 3.0, 4.0]));
    table.insert(
        "kind".into(),
        Column::Text(vec!["a".into(), "b".into(), "a".into(), "b".into()]),
    );
    Arc::new(RegionCollection::from_table("stations", table).expect("Tabelle erwartet"))
}

fn region_data() -> Arc<RegionCollection> {
    let geometries: Vec<Geometry<f64>> = (0..3)
        .map(|i| {
            let x = i as f64 * 2.0;
            polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
                .into()
        })
        .collect();
    let mut frame = GeoFrame::with_geometry("geometry", geometries, Crs::wgs84());
    frame.insert_column("population", Column::Float(vec![10.0, 20.0, 30.0]));
    Arc::new(RegionCollection::from_frame("districts", &frame).expect("Collection erwartet"))
}

struct Fixture {
    viewer: MapViewerState,
    options: ViewerOptions,
    surface: MapSurface,
}

impl Fixture {
    fn new() -> Self {
        let options = ViewerOptions::default();
        let mut viewer = MapViewerState::new(&options);
        viewer.lat_att = Some("lat".into());
        viewer.lon_att = Some("lon".into());
        Self {
            viewer,
            options,
            surface: MapSurface::default(),
        }
    }

    fn ctx(&mut self) -> SyncContext<'_> {
        SyncContext {
            viewer: &self.viewer,
            options: &self.options,
            surface: &mut self.surface,
        }
    }

    /// Artist anhängen, initial abgleichen und das Journal leeren.
    fn attached(&mut self, source: LayerSource) -> LayerArtist {
        let color = self.options.data_color;
        let mut artist = LayerArtist::new(LayerId(1), source, &self.options, color);
        artist.attach(&mut self.ctx());
        artist.update(&mut self.ctx(), true);
        self.surface.drain_ops();
        artist
    }

    fn visual<'a>(&'a self, artist: &LayerArtist) -> &'a VisualObject {
        artist
            .visual_id()
            .and_then(|id| self.surface.layer(id))
            .expect("Objekt auf der Oberfläche erwartet")
    }
}

#[test]
fn repeated_update_without_changes_does_not_mutate() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));

    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Unchanged);
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Unchanged);
    assert_eq!(fx.surface.pending_ops(), 0);
}

#[test]
fn initial_sync_draws_markers_with_valid_positions() {
    let mut fx = Fixture::new();
    let artist = fx.attached(LayerSource::Collection(point_data()));

    match fx.visual(&artist) {
        VisualObject::Markers(group) => {
            let rows: Vec<usize> = group.markers.iter().map(|m| m.row).collect();
            assert_eq!(rows, vec![0, 1, 2]);
            assert_eq!(group.markers[1].location, crate::core::LatLon::new(51.0, 9.0));
        }
        other => panic!("Marker erwartet, war {:?}", other.kind()),
    }
}

#[test]
fn alpha_change_on_markers_updates_in_place() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));
    let before = artist.visual_id();

    artist.state_mut().alpha = 0.3;
    let outcome = artist.update(&mut fx.ctx(), false);

    assert_eq!(outcome, SyncOutcome::Updated(vec![VisualProperty::Opacity]));
    assert_eq!(artist.visual_id(), before);
    let ops = fx.surface.drain_ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        ops[0],
        SurfaceOp::Update {
            property: VisualProperty::Opacity,
            ..
        }
    ));
}

#[test]
fn display_mode_switch_substitutes_once_and_keeps_style() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));
    artist.state_mut().color = Color::rgb(10, 20, 30);
    artist.state_mut().alpha = 0.4;
    artist.update(&mut fx.ctx(), false);
    fx.surface.drain_ops();

    artist.state_mut().display_mode = DisplayMode::Density;
    let outcome = artist.update(&mut fx.ctx(), false);

    assert_eq!(outcome, SyncOutcome::Substituted);
    let ops = fx.surface.drain_ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], SurfaceOp::Substitute { .. }));
    assert_eq!(fx.surface.layer_count(), 1);

    match fx.visual(&artist) {
        VisualObject::Heatmap(heat) => {
            assert_eq!(heat.points.len(), 3);
            assert_eq!(heat.min_opacity, 0.4);
            assert_eq!(
                heat.gradient,
                vec![(0.0, Color::rgb(10, 20, 30)), (1.0, Color::rgb(10, 20, 30))]
            );
            assert_eq!(heat.radius, artist.state().size);
        }
        other => panic!("Heatmap erwartet, war {:?}", other.kind()),
    }
}

#[test]
fn heatmap_opacity_change_requires_substitution() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));
    artist.state_mut().display_mode = DisplayMode::Density;
    artist.update(&mut fx.ctx(), false);
    fx.surface.drain_ops();

    artist.state_mut().alpha = 0.9;

    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Substituted);
    assert_eq!(
        fx.surface.layer(artist.visual_id().expect("Handle")).map(VisualObject::kind),
        Some(VisualKind::Heatmap)
    );
}

#[test]
fn unknown_attribute_disables_until_attribute_changes() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));

    artist.state_mut().color_mode = ColorMode::Linear;
    artist.state_mut().color_attribute = Some("missing".into());
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Disabled);
    assert_eq!(artist.phase(), ArtistPhase::Disabled);
    assert_eq!(fx.surface.layer_count(), 0);

    // Kosmetische Änderungen lassen den Layer deaktiviert
    artist.state_mut().alpha = 0.1;
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Inactive);

    artist.state_mut().color_attribute = Some("score".into());
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Added);
    assert_eq!(artist.phase(), ArtistPhase::Idle);
    assert_eq!(fx.surface.layer_count(), 1);
}

#[test]
fn unset_axes_remove_placeholder_once() {
    let mut fx = Fixture::new();
    fx.viewer.lat_att = None;
    let mut artist = LayerArtist::new(
        LayerId(7),
        LayerSource::Collection(point_data()),
        &fx.options,
        fx.options.data_color,
    );
    artist.attach(&mut fx.ctx());
    fx.surface.drain_ops();

    assert_eq!(artist.update(&mut fx.ctx(), true), SyncOutcome::NotReady);
    assert!(matches!(
        fx.surface.drain_ops().as_slice(),
        [SurfaceOp::Remove(_)]
    ));
    assert!(artist.visual_id().is_none());

    assert_eq!(artist.update(&mut fx.ctx(), true), SyncOutcome::NotReady);
    assert_eq!(fx.surface.pending_ops(), 0);
}

#[test]
fn cosmetic_change_after_clearing_axis_does_not_draw_stale_positions() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));
    assert_eq!(fx.surface.layer_count(), 1);

    fx.viewer.lat_att = None;
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::NotReady);
    assert_eq!(fx.surface.layer_count(), 0);

    artist.state_mut().alpha = 0.1;
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::NotReady);
    assert_eq!(fx.surface.layer_count(), 0);

    fx.viewer.lat_att = Some("lat".into());
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Added);
    match fx.visual(&artist) {
        VisualObject::Markers(markers) => {
            assert_eq!(markers.markers.len(), 3);
            assert!(markers.markers.iter().all(|m| (m.fill_opacity - 0.1).abs() < 1e-12));
        }
        other => panic!("Marker erwartet, war {:?}", other.kind()),
    }
}

#[test]
fn attribute_change_initialises_range_but_data_change_keeps_it() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));

    artist.state_mut().color_mode = ColorMode::Linear;
    artist.state_mut().color_attribute = Some("score".into());
    artist.update(&mut fx.ctx(), false);
    assert_eq!((artist.state().color_min, artist.state().color_max), (1.0, 4.0));

    artist.state_mut().color_min = 2.0;
    artist.update(&mut fx.ctx(), false);
    artist.update(&mut fx.ctx(), true);
    assert_eq!((artist.state().color_min, artist.state().color_max), (2.0, 4.0));
}

#[test]
fn switching_back_restores_cached_limits() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));
    artist.state_mut().color_mode = ColorMode::Linear;
    artist.state_mut().color_attribute = Some("score".into());
    artist.update(&mut fx.ctx(), false);
    artist.state_mut().flip_color_limits();
    artist.update(&mut fx.ctx(), false);

    artist.state_mut().color_attribute = Some("lat".into());
    artist.update(&mut fx.ctx(), false);
    assert_eq!((artist.state().color_min, artist.state().color_max), (50.0, 52.0));

    artist.state_mut().color_attribute = Some("score".into());
    artist.update(&mut fx.ctx(), false);
    assert_eq!((artist.state().color_min, artist.state().color_max), (4.0, 1.0));
}

#[test]
fn region_color_table_change_substitutes() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(region_data()));
    artist.state_mut().color_mode = ColorMode::Linear;
    artist.state_mut().color_attribute = Some("population".into());
    artist.update(&mut fx.ctx(), false);

    match fx.visual(&artist) {
        VisualObject::Regions(layer) => {
            assert_eq!(layer.feature_count(), 3);
            assert_eq!(layer.feature_colors.len(), 3);
            assert_eq!(
                layer.style_for("0").fill_color,
                fx.options.color_tables["viridis"].stops[0]
            );
        }
        other => panic!("Regionen erwartet, war {:?}", other.kind()),
    }
    fx.surface.drain_ops();

    artist.state_mut().color_table = "magma".into();
    assert_eq!(artist.update(&mut fx.ctx(), false), SyncOutcome::Substituted);

    // Deckkraft bleibt reaktiv
    artist.state_mut().alpha = 0.2;
    assert!(matches!(
        artist.update(&mut fx.ctx(), false),
        SyncOutcome::Updated(_)
    ));
}

#[test]
fn subset_change_updates_marker_data_in_place() {
    let mut fx = Fixture::new();
    let subset = Subset::new(
        "sel",
        point_data(),
        SubsetState::Element(vec![0]),
        Color::rgb(255, 0, 0),
    );
    let mut artist = fx.attached(LayerSource::Subset(subset));

    assert!(artist.set_subset_state(SubsetState::Element(vec![0, 2])));
    let outcome = artist.update(&mut fx.ctx(), true);

    assert!(matches!(outcome, SyncOutcome::Updated(ref p) if p.contains(&VisualProperty::Data)));
    match fx.visual(&artist) {
        VisualObject::Markers(group) => assert_eq!(group.markers.len(), 2),
        other => panic!("Marker erwartet, war {:?}", other.kind()),
    }
}

#[test]
fn removed_artist_ignores_updates() {
    let mut fx = Fixture::new();
    let mut artist = fx.attached(LayerSource::Collection(point_data()));

    artist.remove(&mut fx.surface);
    artist.remove(&mut fx.surface);
    artist.state_mut().alpha = 0.5;

    assert_eq!(artist.update(&mut fx.ctx(), true), SyncOutcome::Inactive);
    assert_eq!(fx.surface.layer_count(), 0);
}

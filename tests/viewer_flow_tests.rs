use std::sync::Arc;

use geo::{polygon, Geometry};
use region_map_viewer::app::{DisplayMode, LayerId};
use region_map_viewer::core::{Column, LatLon, Table};
use region_map_viewer::render::SurfaceOp;
use region_map_viewer::{
    Crs, GeoFrame, MapViewer, PointerEvent, RegionCollection, SubsetState, SyncOutcome,
    VisualObject,
};

fn cities() -> Arc<RegionCollection> {
    let mut table = Table::new();
    table.insert("name".into(), Column::Text(vec!["A".into(), "B".into(), "C".into(), "D".into()]));
    table.insert("lat".into(), Column::Float(vec![48.1, 52.5, 53.6, 50.9]));
    table.insert("lon".into(), Column::Float(vec![11.6, 13.4, 10.0, 6.9]));
    Arc::new(RegionCollection::from_table("cities", table).expect("Collection sollte entstehen"))
}

fn states() -> Arc<RegionCollection> {
    let geometries: Vec<Geometry<f64>> = (0..3)
        .map(|i| {
            let x = i as f64 * 2.0;
            polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
                .into()
        })
        .collect();
    let mut frame = GeoFrame::with_geometry("geometry", geometries, Crs::wgs84());
    frame.insert_column("state", Column::Text(vec!["TX".into(), "OK".into(), "TX".into()]));
    Arc::new(RegionCollection::from_frame("states", &frame).expect("Collection sollte entstehen"))
}

fn visual(viewer: &MapViewer, id: LayerId) -> &VisualObject {
    let visual_id = viewer
        .layer(id)
        .and_then(|artist| artist.visual_id())
        .expect("Layer sollte ein Visual besitzen");
    viewer
        .surface()
        .layer(visual_id)
        .expect("Visual sollte auf der Oberfläche liegen")
}

fn click_feature(viewer: &mut MapViewer, layer: LayerId, row: usize) -> Option<usize> {
    let data = states();
    let geometry = data.geometries().expect("Geometrie erwartet")[row].clone();
    let visual = viewer
        .layer(layer)
        .and_then(|artist| artist.visual_id())
        .expect("Visual erwartet");
    viewer.handle_pointer(&PointerEvent::FeatureClick {
        visual,
        feature_id: RegionCollection::feature_id(row),
        geometry,
    })
}

#[test]
fn test_repeated_refresh_without_changes_does_not_touch_surface() {
    let mut viewer = MapViewer::default();
    viewer.add_data(cities());
    viewer.surface_mut().drain_ops();

    let outcomes = viewer.refresh_all(false);

    assert!(outcomes
        .iter()
        .all(|(_, outcome)| *outcome == SyncOutcome::Unchanged));
    assert_eq!(viewer.surface().pending_ops(), 0);
}

#[test]
fn test_display_mode_switch_substitutes_exactly_once() {
    let mut viewer = MapViewer::default();
    let id = viewer.add_data(cities());
    viewer.surface_mut().drain_ops();

    let outcome = viewer.update_layer_state(id, |state| state.display_mode = DisplayMode::Density);

    assert_eq!(outcome, Some(SyncOutcome::Substituted));
    let ops = viewer.surface_mut().drain_ops();
    assert!(matches!(ops.as_slice(), [SurfaceOp::Substitute { .. }]));
    match visual(&viewer, id) {
        VisualObject::Heatmap(heatmap) => assert_eq!(heatmap.points.len(), 4),
        other => panic!("Heatmap erwartet, war {:?}", other.kind()),
    }

    let outcome = viewer.update_layer_state(id, |state| state.display_mode = DisplayMode::Discrete);
    assert_eq!(outcome, Some(SyncOutcome::Substituted));
    assert!(matches!(visual(&viewer, id), VisualObject::Markers(_)));
}

#[test]
fn test_reverse_rectangle_drag_selects_same_rows_as_forward_drag() {
    let mut forward = MapViewer::default();
    let mut reverse = MapViewer::default();
    let a = forward.add_data(cities());
    let b = reverse.add_data(cities());
    forward.activate_tool("rectangle");
    reverse.activate_tool("rectangle");

    let south_west = LatLon::new(49.0, 9.0);
    let north_east = LatLon::new(54.0, 14.0);
    for (viewer, from, to) in [
        (&mut forward, south_west, north_east),
        (&mut reverse, north_east, south_west),
    ] {
        viewer.handle_pointer(&PointerEvent::Press(from));
        viewer.handle_pointer(&PointerEvent::Move(to));
        viewer.handle_pointer(&PointerEvent::Release(to));
    }

    let count = |viewer: &MapViewer, parent| {
        let subset = viewer.subset_layer(parent, 0).expect("Subset-Layer erwartet");
        subset
            .source()
            .rows()
            .expect("Zeilen erwartet")
    };
    assert_eq!(count(&forward, a), vec![1, 2]);
    assert_eq!(count(&reverse, b), vec![1, 2]);
}

#[test]
fn test_point_select_on_region_uses_centroid_axes() {
    let mut viewer = MapViewer::default();
    let layer = viewer.add_data(states());
    viewer.activate_tool("point");

    let group = click_feature(&mut viewer, layer, 1);

    assert_eq!(group, Some(0));
    let subset = viewer.subset_layer(layer, 0).expect("Subset-Layer erwartet");
    assert_eq!(subset.source().rows().expect("Zeilen erwartet"), vec![1]);
    match visual(&viewer, subset.id()) {
        VisualObject::Regions(regions) => assert_eq!(regions.feature_count(), 1),
        other => panic!("Regionen erwartet, war {:?}", other.kind()),
    }
}

#[test]
fn test_point_select_with_select_attribute_picks_category() {
    let mut viewer = MapViewer::default();
    let layer = viewer.add_data(states());
    viewer.set_select_att(Some("state".into()));
    viewer.activate_tool("point");

    click_feature(&mut viewer, layer, 0);

    let group = &viewer.subset_groups()[0];
    assert!(matches!(group.state, SubsetState::Category { .. }));
    let subset = viewer.subset_layer(layer, 0).expect("Subset-Layer erwartet");
    assert_eq!(subset.source().rows().expect("Zeilen erwartet"), vec![0, 2]);
}

#[test]
fn test_switching_tools_mid_drag_cancels_without_selection() {
    let mut viewer = MapViewer::default();
    viewer.add_data(cities());
    viewer.activate_tool("lasso");
    viewer.handle_pointer(&PointerEvent::Press(LatLon::new(50.0, 10.0)));
    viewer.handle_pointer(&PointerEvent::Move(LatLon::new(51.0, 11.0)));
    assert!(!viewer.surface().dragging());

    viewer.activate_tool("rectangle");
    viewer.deactivate_tool();

    assert!(viewer.subset_groups().is_empty());
    assert!(viewer.surface().dragging());
    assert_eq!(viewer.surface().layer_count(), 1);
}

//! Region Map Viewer Library.
//! Geometrie-Datenmodell, Layer-Abgleich und Selektions-Gesten einer
//! Kartenansicht, als Library exportiert für Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod geodata;
pub mod render;
pub mod shared;

pub use app::{LayerArtist, LayerId, MapViewer, MapViewerState, PointerEvent, SyncOutcome};
pub use core::{
    Crs, GeoFrame, GeoSeries, GeometryKind, IngestInput, LayerSource, RegionCollection, Roi,
    SelectionMode, SpatialIndex, SpatialMatch, Subset, SubsetState,
};
pub use geodata::{GeoFrameTranslator, GeometryTranslator, TranslateError};
pub use render::{MapSurface, SurfaceOp, VisualObject};
pub use shared::ViewerOptions;

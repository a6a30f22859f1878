//! Kartenoberfläche und Visual Objects.
//!
//! Die Oberfläche ist der Vertrag zwischen Layer-Controllern bzw. Werkzeugen
//! und der eigentlichen Kartendarstellung.

mod capability;
mod surface;
mod visual;

pub use capability::{capability, Capability};
pub use surface::{MapSurface, SurfaceError, SurfaceOp, JOURNAL_CAPACITY};
pub use visual::{
    CircleMarker, HeatPoint, HeatmapLayer, ImageOverlay, MarkerGroup, RegionLayer, RegionStyle,
    Shape, ShapeOverlay, ShapeStyle, VisualId, VisualKind, VisualObject, VisualProperty,
};

//! Core-Domänentypen: Region Collection, Attribute, CRS, ROIs, Subsets, Spatial-Index.

pub mod column;
pub mod coords;
pub mod crs;
pub mod error;
pub mod frame;
pub mod geometry_kind;
pub mod region_collection;
pub mod roi;
pub mod spatial;
pub mod subset;

pub use column::{finite_range, CellValue, Column};
pub use coords::LatLon;
pub use crs::{AxisDirection, Crs, CrsAxis};
pub use error::{AttributeError, InvalidGeometryInput};
pub use frame::{FrameColumn, GeoFrame, GeoSeries, Grid, IngestInput, Table, DEFAULT_GEOMETRY_NAME};
pub use geometry_kind::GeometryKind;
pub use region_collection::{
    Attribute, AttributeRole, CentroidAxis, GridSpec, RegionCollection, CENTROID_SUFFIX,
};
pub use roi::{point_in_polygon, rect_min_max, Roi};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use subset::{LayerSource, SelectionMode, Subset, SubsetState};

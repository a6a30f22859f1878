//! Application-Layer: Viewer, Layer-Controller, Zustand und Werkzeuge.

/// Layer-Controller: Abgleich Zustand → Oberfläche
pub mod layer_artist;
pub mod layer_state;
pub mod selection;
pub mod tools;
pub mod viewer;
pub mod viewer_state;

pub use layer_artist::{ArtistPhase, LayerArtist, LayerId, SyncContext, SyncOutcome};
pub use layer_state::{ColorMode, DisplayMode, LayerField, SizeMode, VisualLayerState};
pub use selection::{roi_to_subset, rois_to_subset};
pub use tools::{MapTool, PointerEvent, ToolContext, ToolManager, ToolOutput};
pub use viewer::{MapViewer, SubsetGroup};
pub use viewer_state::MapViewerState;

//! Geteilte Typen: Farben, Farbtabellen und Viewer-Optionen.

pub mod color;
pub mod color_table;
pub mod options;

pub use color::{Color, ColorParseError};
pub use color_table::{builtin_color_tables, ColorTable};
pub use options::ViewerOptions;

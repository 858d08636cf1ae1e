//! cardlabel - Citizen-card image annotation tool
//!
//! The annotation geometry engine and interactive drawing state machine:
//! pointer input is normalized to unit-square coordinates, built into
//! bounding boxes or polygons by the [`editor::Editor`], rendered
//! deterministically onto raster images, and serialized to the line-oriented
//! label-file format the sample service persists.

pub mod client;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod geometry;
pub mod model;
pub mod render;

pub use editor::{Editor, EditorError, EditorState};
pub use model::{AnnotationSet, Label, LabelCatalog, LabelRef, Point, Shape, ShapeKind};
pub use render::Renderer;

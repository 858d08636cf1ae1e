//! Data models for the annotation editor.

mod annotation;
mod label;

pub use annotation::{
    AnnotationSet, LabelRef, Point, Shape, ShapeKind, MIN_POLYGON_VERTICES,
};
pub use label::{default_catalog, Label, LabelCatalog};

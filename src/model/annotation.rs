//! Annotation shape model.
//!
//! Shapes live in unit-square coordinates (each axis in `[0, 1]`, relative to
//! image dimensions) so they survive surface resizes unchanged. A committed
//! shape is a closed path: its last vertex repeats its first. Bounding boxes
//! commit with exactly 5 vertices (4 corners + closing vertex), polygons with
//! at least 4 (3 distinct + closing vertex).
//!
//! All shape transformations here are pure: they return new shape values and
//! leave the input untouched. The editor owns replacing state.

use serde::{Deserialize, Serialize};

/// Minimum number of distinct vertices required to close a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A 2D point in unit-square coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The kind of an annotation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Axis-aligned rectangle drawn in one continuous drag.
    #[default]
    BoundingBox,
    /// Free polygon built click by click.
    Polygon,
}

impl ShapeKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::BoundingBox => "BBox",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// Reference to a label, by catalog position.
///
/// Shapes never own label data. A `Known` reference indexes the catalog; an
/// `Unknown` reference carries a class id that was outside the catalog at
/// load time. Unknown shapes are retained and rendered with a fallback color
/// rather than dropped, but they cannot be serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelRef {
    /// Class index into the label catalog.
    Known(usize),
    /// Class id with no catalog entry.
    Unknown(u32),
}

/// A single annotation: a labeled shape with an ordered vertex list.
///
/// Vertex order is significant: it defines the stroke path, and the first
/// vertex anchors the label text when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Shape kind discriminant.
    pub kind: ShapeKind,
    /// Label reference for this shape.
    pub label: LabelRef,
    /// Ordered vertices in unit-square coordinates.
    pub vertices: Vec<Point>,
}

impl Shape {
    /// Start an in-progress bounding box at `p0`.
    ///
    /// The anchor corner is duplicated so the shape is drawable immediately;
    /// pointer motion replaces everything but the anchor.
    pub fn start_bounding_box(label: LabelRef, p0: Point) -> Self {
        Self {
            kind: ShapeKind::BoundingBox,
            label,
            vertices: vec![p0, p0],
        }
    }

    /// Re-derive the box path from the fixed anchor and a new free corner.
    ///
    /// The result is always the full 5-vertex closed rectangle. Recomputing
    /// from the anchor on every pointer move avoids incremental drift.
    pub fn with_box_corner(&self, corner: Point) -> Self {
        debug_assert_eq!(self.kind, ShapeKind::BoundingBox);
        let anchor = self.vertices[0];
        Self {
            kind: ShapeKind::BoundingBox,
            label: self.label,
            vertices: vec![
                anchor,
                Point::new(corner.x, anchor.y),
                corner,
                Point::new(anchor.x, corner.y),
                anchor,
            ],
        }
    }

    /// Start an in-progress polygon at `p0`.
    pub fn start_polygon(label: LabelRef, p0: Point) -> Self {
        Self {
            kind: ShapeKind::Polygon,
            label,
            vertices: vec![p0],
        }
    }

    /// Append a vertex, returning the grown shape.
    pub fn with_vertex(&self, p: Point) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.push(p);
        Self {
            kind: self.kind,
            label: self.label,
            vertices,
        }
    }

    /// Close the path by appending a copy of the first vertex.
    ///
    /// Returns `None` when fewer than [`MIN_POLYGON_VERTICES`] distinct
    /// vertices exist; the in-progress shape is left unchanged in that case.
    pub fn close(&self) -> Option<Self> {
        if self.distinct_vertex_count() < MIN_POLYGON_VERTICES {
            return None;
        }
        let first = *self.vertices.first()?;
        Some(self.with_vertex(first))
    }

    /// Count vertices that differ from every earlier vertex.
    pub fn distinct_vertex_count(&self) -> usize {
        let mut count = 0;
        for (i, v) in self.vertices.iter().enumerate() {
            if !self.vertices[..i].contains(v) {
                count += 1;
            }
        }
        count
    }

    /// Check whether the vertex path is closed (last vertex repeats the
    /// first). Committed shapes always satisfy this.
    pub fn is_closed_path(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() > 1 => first == last,
            _ => false,
        }
    }

    /// Check whether the closed path traces an axis-aligned rectangle.
    ///
    /// Used to recover the shape kind when hydrating from persisted records,
    /// which do not store it.
    pub fn is_axis_aligned_rect(&self) -> bool {
        if self.vertices.len() != 5 || !self.is_closed_path() {
            return false;
        }
        let v = &self.vertices;
        v[1].y == v[0].y && v[1].x == v[2].x && v[3].y == v[2].y && v[3].x == v[0].x
    }
}

/// Ordered collection of committed shapes for one image.
///
/// Mutated only by the editor (and wholesale replacement on sample load);
/// read by the renderer and the serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    shapes: Vec<Shape>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a set from already-committed shapes.
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Append a committed shape.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Remove a shape by position, preserving the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Shape> {
        if index < self.shapes.len() {
            Some(self.shapes.remove(index))
        } else {
            None
        }
    }

    /// Remove all shapes.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Get a shape by position.
    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Iterate over shapes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Number of committed shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if there are no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_bounding_box_duplicates_anchor() {
        let shape = Shape::start_bounding_box(LabelRef::Known(0), Point::new(0.1, 0.2));
        assert_eq!(
            shape.vertices,
            vec![Point::new(0.1, 0.2), Point::new(0.1, 0.2)]
        );
    }

    #[test]
    fn test_box_corner_update_derives_closed_rect() {
        let shape = Shape::start_bounding_box(LabelRef::Known(0), Point::new(0.1, 0.1));
        let updated = shape.with_box_corner(Point::new(0.4, 0.4));

        assert_eq!(
            updated.vertices,
            vec![
                Point::new(0.1, 0.1),
                Point::new(0.4, 0.1),
                Point::new(0.4, 0.4),
                Point::new(0.1, 0.4),
                Point::new(0.1, 0.1),
            ]
        );
        assert!(updated.is_closed_path());
    }

    #[test]
    fn test_box_corner_update_is_idempotent() {
        let shape = Shape::start_bounding_box(LabelRef::Known(1), Point::new(0.2, 0.3));
        let once = shape.with_box_corner(Point::new(0.7, 0.8));
        let twice = once.with_box_corner(Point::new(0.7, 0.8));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_close_polygon_too_few_distinct_vertices() {
        let shape = Shape::start_polygon(LabelRef::Known(0), Point::new(0.2, 0.2))
            .with_vertex(Point::new(0.5, 0.2))
            // Duplicate of the first vertex does not count as distinct
            .with_vertex(Point::new(0.2, 0.2));
        assert_eq!(shape.distinct_vertex_count(), 2);
        assert!(shape.close().is_none());
        assert_eq!(shape.vertices.len(), 3);
    }

    #[test]
    fn test_close_polygon_appends_first_vertex() {
        // Click three vertices, then finish
        let shape = Shape::start_polygon(LabelRef::Known(0), Point::new(0.2, 0.2))
            .with_vertex(Point::new(0.5, 0.2))
            .with_vertex(Point::new(0.35, 0.5));

        let closed = shape.close().unwrap();
        assert_eq!(closed.vertices.len(), 4);
        assert_eq!(closed.vertices.first(), closed.vertices.last());
        // Original is untouched
        assert_eq!(shape.vertices.len(), 3);
    }

    #[test]
    fn test_axis_aligned_rect_detection() {
        let rect = Shape::start_bounding_box(LabelRef::Known(0), Point::new(0.0, 0.0))
            .with_box_corner(Point::new(1.0, 1.0));
        assert!(rect.is_axis_aligned_rect());

        let poly = Shape::start_polygon(LabelRef::Known(0), Point::new(0.2, 0.2))
            .with_vertex(Point::new(0.5, 0.2))
            .with_vertex(Point::new(0.35, 0.5))
            .close()
            .unwrap();
        assert!(!poly.is_axis_aligned_rect());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mk = |x: f32| {
            Shape::start_bounding_box(LabelRef::Known(0), Point::new(x, x))
                .with_box_corner(Point::new(x + 0.1, x + 0.1))
        };
        let mut set = AnnotationSet::from_shapes(vec![mk(0.1), mk(0.2), mk(0.3)]);

        let removed = set.remove(1).unwrap();
        assert_eq!(removed.vertices[0], Point::new(0.2, 0.2));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().vertices[0], Point::new(0.1, 0.1));
        assert_eq!(set.get(1).unwrap().vertices[0], Point::new(0.3, 0.3));
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let mut set = AnnotationSet::new();
        assert!(set.remove(0).is_none());
    }
}

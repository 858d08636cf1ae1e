//! Label-file serialization.
//!
//! The persisted format is line-oriented text, one record per committed
//! shape:
//!
//! ```text
//! <class_index> x0 y0 x1 y1 ... xn yn
//! ```
//!
//! All coordinates are unit-square values in `[0, 1]`, and each record's
//! first and last point are identical (closed path). The class index is the
//! label's position in the catalog, which makes catalog order part of the
//! wire contract.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::model::{AnnotationSet, LabelCatalog, LabelRef, Point, Shape, ShapeKind};

/// One persisted label record, as returned by `GET /samples/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Positional class index into the label catalog
    pub class_id: u32,
    /// Closed vertex path in unit-square coordinates
    pub polygon: Vec<[f32; 2]>,
}

/// Serialize an annotation set to label-file text.
///
/// Vertex sequences are emitted verbatim, closing vertex included. A shape
/// whose label cannot be resolved against the catalog fails the whole save;
/// see [`FormatError::UnresolvedLabel`].
pub fn serialize(set: &AnnotationSet, catalog: &LabelCatalog) -> Result<String, FormatError> {
    let mut lines = Vec::with_capacity(set.len());
    for shape in set.iter() {
        let class_index = match shape.label {
            LabelRef::Known(index) if index < catalog.len() => index as u32,
            LabelRef::Known(index) => {
                return Err(FormatError::UnresolvedLabel {
                    class_id: index as u32,
                })
            }
            LabelRef::Unknown(class_id) => return Err(FormatError::UnresolvedLabel { class_id }),
        };

        let mut line = class_index.to_string();
        for v in &shape.vertices {
            line.push_str(&format!(" {} {}", v.x, v.y));
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Parse label-file text into committed shapes.
///
/// Malformed lines are skipped with a warning, matching the forgiving reads
/// of the backing service. Class ids outside the catalog produce shapes with
/// an [`LabelRef::Unknown`] reference; they are retained, not dropped.
pub fn parse(text: &str, catalog: &LabelCatalog) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_label_line(line) {
            Some((class_id, vertices)) => {
                shapes.push(shape_from_parts(class_id, vertices, catalog));
            }
            None => log::warn!("Skipping malformed label record on line {}", line_no + 1),
        }
    }
    shapes
}

/// Hydrate shapes from API label records.
pub fn shapes_from_records(records: &[LabelRecord], catalog: &LabelCatalog) -> Vec<Shape> {
    records
        .iter()
        .map(|record| {
            let vertices = record
                .polygon
                .iter()
                .map(|&[x, y]| Point::new(x, y))
                .collect();
            shape_from_parts(record.class_id, vertices, catalog)
        })
        .collect()
}

/// Write an annotation set to a label file.
pub fn write_label_file(
    path: &Path,
    set: &AnnotationSet,
    catalog: &LabelCatalog,
) -> Result<(), FormatError> {
    let text = serialize(set, catalog)?;
    std::fs::write(path, text)?;
    log::info!("Wrote {} label records to {:?}", set.len(), path);
    Ok(())
}

/// Read committed shapes from a label file.
pub fn read_label_file(path: &Path, catalog: &LabelCatalog) -> Result<Vec<Shape>, FormatError> {
    let text = std::fs::read_to_string(path)?;
    let shapes = parse(&text, catalog);
    log::info!("Read {} label records from {:?}", shapes.len(), path);
    Ok(shapes)
}

/// Parse a single label record line. Returns `None` when the line is not a
/// class id followed by an even, non-empty run of coordinates.
fn parse_label_line(line: &str) -> Option<(u32, Vec<Point>)> {
    let mut parts = line.split_whitespace();
    let class_id: u32 = parts.next()?.parse().ok()?;

    let coords: Vec<f32> = parts.map(|p| p.parse().ok()).collect::<Option<_>>()?;
    if coords.is_empty() || coords.len() % 2 != 0 {
        return None;
    }

    let vertices = coords.chunks(2).map(|c| Point::new(c[0], c[1])).collect();
    Some((class_id, vertices))
}

/// Build a shape from a parsed class id and vertex path.
///
/// The wire format carries no shape kind, so it is recovered from the path:
/// a closed 5-vertex axis-aligned path is a bounding box, anything else a
/// polygon.
fn shape_from_parts(class_id: u32, vertices: Vec<Point>, catalog: &LabelCatalog) -> Shape {
    let label = if (class_id as usize) < catalog.len() {
        LabelRef::Known(class_id as usize)
    } else {
        log::warn!("Unknown class id {} (catalog has {} labels)", class_id, catalog.len());
        LabelRef::Unknown(class_id)
    };

    let mut shape = Shape {
        kind: ShapeKind::Polygon,
        label,
        vertices,
    };
    if shape.is_axis_aligned_rect() {
        shape.kind = ShapeKind::BoundingBox;
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    fn two_label_catalog() -> LabelCatalog {
        LabelCatalog::new(vec![
            Label::new("card", "#6C5CE7"),
            Label::new("id", "#FF8A5B"),
        ])
    }

    #[test]
    fn test_serialize_bbox_line() {
        // Bbox with label "id" (class 1) from (0.1, 0.1) to (0.4, 0.4)
        let catalog = two_label_catalog();
        let shape = Shape::start_bounding_box(LabelRef::Known(1), Point::new(0.1, 0.1))
            .with_box_corner(Point::new(0.4, 0.4));
        let set = AnnotationSet::from_shapes(vec![shape]);

        let text = serialize(&set, &catalog).unwrap();
        assert_eq!(text, "1 0.1 0.1 0.4 0.1 0.4 0.4 0.1 0.4 0.1 0.1");
    }

    #[test]
    fn test_serialize_joins_records_with_newline() {
        let catalog = two_label_catalog();
        let bbox = Shape::start_bounding_box(LabelRef::Known(0), Point::new(0.0, 0.0))
            .with_box_corner(Point::new(0.5, 0.5));
        let poly = Shape::start_polygon(LabelRef::Known(1), Point::new(0.2, 0.2))
            .with_vertex(Point::new(0.5, 0.2))
            .with_vertex(Point::new(0.35, 0.5))
            .close()
            .unwrap();
        let set = AnnotationSet::from_shapes(vec![bbox, poly]);

        let text = serialize(&set, &catalog).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0 "));
        assert!(lines[1].starts_with("1 "));
    }

    #[test]
    fn test_serialize_rejects_unresolved_label() {
        let catalog = two_label_catalog();
        let shape = Shape::start_bounding_box(LabelRef::Unknown(7), Point::new(0.1, 0.1))
            .with_box_corner(Point::new(0.2, 0.2));
        let set = AnnotationSet::from_shapes(vec![shape]);

        let err = serialize(&set, &catalog).unwrap_err();
        assert!(matches!(err, FormatError::UnresolvedLabel { class_id: 7 }));
    }

    #[test]
    fn test_round_trip_preserves_vertices_and_labels() {
        let catalog = two_label_catalog();
        let bbox = Shape::start_bounding_box(LabelRef::Known(1), Point::new(0.1, 0.1))
            .with_box_corner(Point::new(0.4, 0.4));
        let poly = Shape::start_polygon(LabelRef::Known(0), Point::new(0.2, 0.2))
            .with_vertex(Point::new(0.5, 0.2))
            .with_vertex(Point::new(0.35, 0.5))
            .close()
            .unwrap();
        let set = AnnotationSet::from_shapes(vec![bbox.clone(), poly.clone()]);

        let text = serialize(&set, &catalog).unwrap();
        let shapes = parse(&text, &catalog);

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].vertices, bbox.vertices);
        assert_eq!(shapes[0].label, bbox.label);
        assert_eq!(shapes[0].kind, ShapeKind::BoundingBox);
        assert_eq!(shapes[1].vertices, poly.vertices);
        assert_eq!(shapes[1].label, poly.label);
        assert_eq!(shapes[1].kind, ShapeKind::Polygon);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let catalog = two_label_catalog();
        let text = "1 0.1 0.1 0.4 0.1 0.4 0.4 0.1 0.4 0.1 0.1\nnot a record\n0 0.5 0.5 0.6\n";
        let shapes = parse(text, &catalog);
        assert_eq!(shapes.len(), 1);
    }

    #[test]
    fn test_records_with_unknown_class_id_are_retained() {
        // class_id 5 against a 2-entry catalog
        let catalog = two_label_catalog();
        let records = vec![LabelRecord {
            class_id: 5,
            polygon: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        }];

        let shapes = shapes_from_records(&records, &catalog);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].label, LabelRef::Unknown(5));
        assert_eq!(shapes[0].vertices.len(), 5);
    }

    #[test]
    fn test_record_kind_recovery() {
        let catalog = two_label_catalog();
        let records = vec![
            LabelRecord {
                class_id: 0,
                polygon: vec![[0.1, 0.1], [0.4, 0.1], [0.4, 0.4], [0.1, 0.4], [0.1, 0.1]],
            },
            LabelRecord {
                class_id: 1,
                polygon: vec![[0.2, 0.2], [0.5, 0.2], [0.35, 0.5], [0.2, 0.2]],
            },
        ];

        let shapes = shapes_from_records(&records, &catalog);
        assert_eq!(shapes[0].kind, ShapeKind::BoundingBox);
        assert_eq!(shapes[1].kind, ShapeKind::Polygon);
    }

    #[test]
    fn test_label_file_round_trip() {
        let catalog = two_label_catalog();
        let shape = Shape::start_bounding_box(LabelRef::Known(0), Point::new(0.25, 0.25))
            .with_box_corner(Point::new(0.75, 0.5));
        let set = AnnotationSet::from_shapes(vec![shape.clone()]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        write_label_file(&path, &set, &catalog).unwrap();

        let shapes = read_label_file(&path, &catalog).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].vertices, shape.vertices);
    }
}

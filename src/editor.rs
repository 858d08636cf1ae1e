//! Interactive drawing state machine.
//!
//! The [`Editor`] owns the annotation set and the transient drawing session,
//! and is the only place that mutates them. Pointer and toolbar events come
//! in already named (pointer down/move/up, label selected, tool changed,
//! finish polygon); every transition is explicit, and invalid user input is
//! rejected with a typed [`EditorError`] instead of a panic.

use thiserror::Error;

use crate::model::{AnnotationSet, LabelCatalog, LabelRef, Point, Shape, ShapeKind};

/// User-input rejections surfaced as transient notices.
///
/// None of these change editor state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Drawing attempted with no active label
    #[error("select a label before drawing")]
    NoLabelSelected,

    /// Finish requested on a polygon with too few distinct vertices
    #[error("polygon needs at least 3 distinct vertices, has {have}")]
    PolygonIncomplete {
        /// Distinct vertices placed so far
        have: usize,
    },

    /// Label index outside the catalog
    #[error("no label at catalog index {index}")]
    UnknownLabel {
        /// The out-of-range index
        index: usize,
    },
}

/// The drawing state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No shape in progress.
    Idle,
    /// A bounding box is being dragged.
    DrawingBox,
    /// A polygon is collecting vertices.
    DrawingPolygon,
}

/// The annotation editor: committed shapes plus the drawing session.
#[derive(Debug, Clone)]
pub struct Editor {
    catalog: LabelCatalog,
    annotations: AnnotationSet,
    tool: ShapeKind,
    active_label: Option<usize>,
    in_progress: Option<Shape>,
}

impl Editor {
    /// Create an empty editor over the given label catalog.
    pub fn new(catalog: LabelCatalog) -> Self {
        Self {
            catalog,
            annotations: AnnotationSet::new(),
            tool: ShapeKind::default(),
            active_label: None,
            in_progress: None,
        }
    }

    /// Replace the annotation set wholesale, e.g. from a loaded sample.
    ///
    /// Bypasses the drawing transitions and leaves the editor idle.
    pub fn load(&mut self, shapes: Vec<Shape>) {
        self.in_progress = None;
        self.annotations = AnnotationSet::from_shapes(shapes);
        log::info!("Loaded {} annotations", self.annotations.len());
    }

    /// Select the active label by catalog index.
    ///
    /// Selecting a label while a polygon is in progress force-closes the
    /// polygon first (when it has enough vertices), so a single polygon can
    /// never mix labels. An unclosable polygon stays in progress with the
    /// label it was started with.
    pub fn select_label(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= self.catalog.len() {
            return Err(EditorError::UnknownLabel { index });
        }

        if let Some(shape) = self.in_progress.take() {
            if shape.kind == ShapeKind::Polygon {
                match shape.close() {
                    Some(closed) => {
                        log::debug!("Label switch closed in-progress polygon");
                        self.annotations.push(closed);
                    }
                    None => self.in_progress = Some(shape),
                }
            } else {
                self.in_progress = Some(shape);
            }
        }

        self.active_label = Some(index);
        let name = self.catalog.get(index).map_or("?", |l| l.name.as_str());
        log::debug!("🏷️ Active label: {}", name);
        Ok(())
    }

    /// Switch the drawing tool.
    ///
    /// A partially-built shape of the old kind is not convertible, so any
    /// in-progress shape is discarded unconditionally.
    pub fn set_tool(&mut self, tool: ShapeKind) {
        if self.in_progress.take().is_some() {
            log::debug!("Tool switch discarded in-progress shape");
        }
        self.tool = tool;
        log::debug!("🖌️ Tool: {:?}", tool);
    }

    /// Handle a pointer-down at a unit-square position.
    ///
    /// Bounding boxes always start a new shape (one box per drag); polygons
    /// start on the first click and append a vertex on each further click.
    pub fn pointer_down(&mut self, p: Point) -> Result<(), EditorError> {
        let Some(label_index) = self.active_label else {
            return Err(EditorError::NoLabelSelected);
        };
        let label = LabelRef::Known(label_index);

        match self.tool {
            ShapeKind::BoundingBox => {
                self.in_progress = Some(Shape::start_bounding_box(label, p));
                log::debug!("✏️ Started bbox at ({:.3}, {:.3})", p.x, p.y);
            }
            ShapeKind::Polygon => match &self.in_progress {
                Some(shape) => {
                    let grown = shape.with_vertex(p);
                    log::debug!(
                        "✏️ Added polygon vertex ({:.3}, {:.3}), total: {}",
                        p.x,
                        p.y,
                        grown.vertices.len()
                    );
                    self.in_progress = Some(grown);
                }
                None => {
                    self.in_progress = Some(Shape::start_polygon(label, p));
                    log::debug!("✏️ Started polygon at ({:.3}, {:.3})", p.x, p.y);
                }
            },
        }
        Ok(())
    }

    /// Handle pointer motion. Only a bounding box drag reacts: its path is
    /// re-derived from the anchor and the live pointer position.
    pub fn pointer_move(&mut self, p: Point) {
        if self.state() == EditorState::DrawingBox {
            if let Some(shape) = &self.in_progress {
                self.in_progress = Some(shape.with_box_corner(p));
            }
        }
    }

    /// Handle pointer release.
    ///
    /// Commits an in-progress bounding box, zero-area included; the path is
    /// completed from the anchor if the pointer never moved. Polygons ignore
    /// the release (click-to-place model).
    pub fn pointer_up(&mut self) {
        if self.state() != EditorState::DrawingBox {
            return;
        }
        if let Some(shape) = self.in_progress.take() {
            let committed = if shape.vertices.len() == 5 {
                shape
            } else if let Some(&corner) = shape.vertices.last() {
                shape.with_box_corner(corner)
            } else {
                return;
            };
            log::info!("✅ Committed bbox ({} total)", self.annotations.len() + 1);
            self.annotations.push(committed);
        }
    }

    /// Explicitly finish the in-progress polygon.
    ///
    /// A polygon with fewer than 3 distinct vertices cannot close; the shape
    /// stays in progress and the rejection is returned for display.
    pub fn finish_polygon(&mut self) -> Result<(), EditorError> {
        let Some(shape) = self.in_progress.take() else {
            return Ok(());
        };
        match shape.close() {
            Some(closed) => {
                log::info!(
                    "✅ Committed polygon with {} vertices",
                    closed.vertices.len()
                );
                self.annotations.push(closed);
                Ok(())
            }
            None => {
                let have = shape.distinct_vertex_count();
                self.in_progress = Some(shape);
                Err(EditorError::PolygonIncomplete { have })
            }
        }
    }

    /// Remove a committed shape by position.
    pub fn delete(&mut self, index: usize) -> Option<Shape> {
        let removed = self.annotations.remove(index);
        if removed.is_some() {
            log::info!("🗑️ Deleted annotation {}", index);
        }
        removed
    }

    /// Drop all committed shapes and any in-progress shape.
    pub fn clear(&mut self) {
        let count = self.annotations.len();
        self.annotations.clear();
        self.in_progress = None;
        log::info!("🗑️ Cleared {} annotations", count);
    }

    /// Current drawing state, derived from the in-progress shape.
    pub fn state(&self) -> EditorState {
        match &self.in_progress {
            None => EditorState::Idle,
            Some(shape) => match shape.kind {
                ShapeKind::BoundingBox => EditorState::DrawingBox,
                ShapeKind::Polygon => EditorState::DrawingPolygon,
            },
        }
    }

    /// The committed annotation set.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// The shape currently under construction, if any.
    pub fn in_progress(&self) -> Option<&Shape> {
        self.in_progress.as_ref()
    }

    /// The active drawing tool.
    pub fn tool(&self) -> ShapeKind {
        self.tool
    }

    /// The active label's catalog index, if one is selected.
    pub fn active_label(&self) -> Option<usize> {
        self.active_label
    }

    /// The label catalog this editor annotates against.
    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }
}

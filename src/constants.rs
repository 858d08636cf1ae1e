//! Global constants for the annotation editor.

/// Stroke width as a fraction of the larger surface dimension.
pub const STROKE_WIDTH_RATIO: f32 = 0.003;

/// Label text size as a fraction of the larger surface dimension.
pub const FONT_SIZE_RATIO: f32 = 0.02;

/// Upward offset of label text above a shape's first vertex, in pixels.
pub const TEXT_MARGIN: f32 = 5.0;

/// Radius of polygon vertex markers, in pixels.
pub const VERTEX_MARKER_RADIUS: f32 = 4.0;

/// Fallback stroke color for shapes whose label is not in the catalog.
pub const FALLBACK_COLOR: [u8; 3] = [255, 0, 0];

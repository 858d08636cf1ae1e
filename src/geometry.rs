//! Coordinate normalization between surface pixels and the unit square.
//!
//! Shapes are stored in unit-square coordinates so they are independent of
//! the rendered surface size. Pointer input is normalized on the way in;
//! the renderer scales back out to pixels.

use crate::model::Point;

/// Map a pixel position on a surface to unit-square coordinates.
///
/// Each axis is divided by the surface dimension and clamped to `[0, 1]`,
/// so positions outside the surface (a drag past the edge) still produce a
/// valid point.
pub fn to_unit(pixel_x: f32, pixel_y: f32, surface_width: f32, surface_height: f32) -> Point {
    Point::new(
        (pixel_x / surface_width).clamp(0.0, 1.0),
        (pixel_y / surface_height).clamp(0.0, 1.0),
    )
}

/// Map a unit-square point back to surface pixels.
///
/// No clamping: unit points are already bounded by construction.
pub fn to_pixel(point: Point, surface_width: f32, surface_height: f32) -> (f32, f32) {
    (point.x * surface_width, point.y * surface_height)
}

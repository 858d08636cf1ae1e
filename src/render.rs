//! Deterministic raster rendering of annotations.
//!
//! The renderer is a pure function of its inputs: background image, committed
//! annotation set, optional in-progress shape, and label catalog. Re-rendering
//! the same inputs produces the same raster byte for byte. Stroke width and
//! text size scale with the larger surface dimension so annotations look the
//! same across image resolutions.
//!
//! Label text needs a font; rendering without one simply skips the text, the
//! same way the rest of the pipeline degrades (shapes are never dropped).

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::color_utils::parse_hex_color;
use crate::constants::{
    FALLBACK_COLOR, FONT_SIZE_RATIO, STROKE_WIDTH_RATIO, TEXT_MARGIN, VERTEX_MARKER_RADIUS,
};
use crate::geometry::to_pixel;
use crate::model::{AnnotationSet, LabelCatalog, LabelRef, Shape, ShapeKind};

/// Renders annotation overlays onto raster images.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    font: Option<FontArc>,
}

impl Renderer {
    /// Renderer without a font; label text is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that draws label names with the given font.
    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Paint the background plus all shapes, committed first, in-progress
    /// last (drawn as a closed preview).
    pub fn render(
        &self,
        background: &RgbaImage,
        set: &AnnotationSet,
        in_progress: Option<&Shape>,
        catalog: &LabelCatalog,
    ) -> RgbaImage {
        let (width, height) = (background.width(), background.height());
        let Some(size) = tiny_skia::IntSize::from_wh(width, height) else {
            return background.clone();
        };
        // Background images are opaque, so straight and premultiplied alpha
        // coincide and the buffer can cross into tiny-skia unchanged.
        let Some(mut pixmap) = Pixmap::from_vec(background.as_raw().clone(), size) else {
            return background.clone();
        };

        for shape in set.iter() {
            self.draw_shape(&mut pixmap, shape, catalog);
        }
        if let Some(shape) = in_progress {
            let preview = closed_preview(shape);
            self.draw_shape(&mut pixmap, &preview, catalog);
        }

        RgbaImage::from_raw(width, height, pixmap.take())
            .unwrap_or_else(|| background.clone())
    }

    fn draw_shape(&self, pixmap: &mut Pixmap, shape: &Shape, catalog: &LabelCatalog) {
        if shape.vertices.is_empty() {
            return;
        }
        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;
        let stroke_width = (width.max(height) * STROKE_WIDTH_RATIO).max(1.0);
        let color = stroke_color(shape.label, catalog);

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = true;

        // Shape outline
        let mut pb = PathBuilder::new();
        for (i, v) in shape.vertices.iter().enumerate() {
            let (x, y) = to_pixel(*v, width, height);
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: stroke_width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        // Vertex markers, polygons only
        if shape.kind == ShapeKind::Polygon {
            for v in &shape.vertices {
                let (x, y) = to_pixel(*v, width, height);
                let mut pb = PathBuilder::new();
                pb.push_circle(x, y, VERTEX_MARKER_RADIUS);
                if let Some(path) = pb.finish() {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }

        // Label name above the first vertex; unresolved labels get a
        // placeholder so they stay visually distinct instead of anonymous
        if let Some(font) = &self.font {
            let text = label_text(shape.label, catalog);
            let (x, y) = to_pixel(shape.vertices[0], width, height);
            let font_size = width.max(height) * FONT_SIZE_RATIO;
            draw_text(pixmap, font, &text, x, y - TEXT_MARGIN, font_size, color);
        }
    }
}

/// Resolve a shape's stroke color, falling back for unresolved labels.
fn stroke_color(label: LabelRef, catalog: &LabelCatalog) -> [u8; 3] {
    match label {
        LabelRef::Known(index) => catalog
            .get(index)
            .and_then(|l| parse_hex_color(&l.color))
            .unwrap_or(FALLBACK_COLOR),
        LabelRef::Unknown(_) => FALLBACK_COLOR,
    }
}

/// The text to render for a shape's label: the catalog name when resolved,
/// a placeholder carrying the raw class id otherwise.
fn label_text(label: LabelRef, catalog: &LabelCatalog) -> String {
    match label {
        LabelRef::Known(index) => catalog
            .get(index)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| format!("unknown ({})", index)),
        LabelRef::Unknown(class_id) => format!("unknown ({})", class_id),
    }
}

/// An in-progress shape is previewed closed: the first vertex is appended
/// unless the path already closes on itself.
fn closed_preview(shape: &Shape) -> Shape {
    if shape.vertices.len() > 1 && !shape.is_closed_path() {
        shape.with_vertex(shape.vertices[0])
    } else {
        shape.clone()
    }
}

/// Rasterize a line of text with `baseline` at `(x, y)`.
fn draw_text(
    pixmap: &mut Pixmap,
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: [u8; 3],
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);

    let mut caret = x;
    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(caret, y));
        caret += scaled.h_advance(glyph_id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend_pixel(pixmap, px, py, color, coverage);
            });
        }
    }
}

/// Source-over blend of a single pixel at the given coverage.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: [u8; 3], coverage: f32) {
    let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
    if x < 0 || y < 0 || x >= w || y >= h {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let idx = ((y * w + x) * 4) as usize;
    let data = pixmap.data_mut();
    for c in 0..3 {
        let src = color[c] as f32 * alpha;
        let dst = data[idx + c] as f32 * (1.0 - alpha);
        data[idx + c] = (src + dst).round().clamp(0.0, 255.0) as u8;
    }
    let src_a = 255.0 * alpha;
    let dst_a = data[idx + 3] as f32 * (1.0 - alpha);
    data[idx + 3] = (src_a + dst_a).round().clamp(0.0, 255.0) as u8;
}

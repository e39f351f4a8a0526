//! Debug visualizations of pipeline stages.
//!
//! Both renderers produce fully opaque RGBA images the same size as the
//! source, suitable for showing next to the input.

use image::{Luma, Rgba};
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::types::{BinaryMask, Contour, Dimensions, RgbaImage};

/// Canvas color behind the contour overlay.
pub const CANVAS: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Stroke color of the contour overlay.
pub const CONTOUR_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Render a binary mask as opaque gray: each sample is copied to the red,
/// green and blue channels.
#[must_use = "returns the rendered mask"]
pub fn render_mask(mask: &BinaryMask) -> RgbaImage {
    imageproc::map::map_pixels(mask, |Luma([v])| Rgba([v, v, v, 255]))
}

/// Stroke a contour as a closed outline on a blank opaque canvas.
///
/// `None` (no shape found) and zero-sized images produce a blank canvas.
/// A contour whose outline has no extent, such as a single pixel, is drawn
/// as a `thickness`-sized dot.
#[must_use = "returns the rendered overlay"]
#[allow(clippy::cast_precision_loss)]
pub fn render_contour(
    contour: Option<&Contour>,
    dimensions: Dimensions,
    thickness: f32,
) -> RgbaImage {
    let blank = || RgbaImage::from_pixel(dimensions.width, dimensions.height, CANVAS);

    let Some(contour) = contour.filter(|c| !c.is_empty()) else {
        return blank();
    };
    let Some(mut pixmap) = Pixmap::new(dimensions.width, dimensions.height) else {
        return blank();
    };
    let [r, g, b, a] = CANVAS.0;
    pixmap.fill(Color::from_rgba8(r, g, b, a));

    let mut paint = Paint::default();
    let [r, g, b, a] = CONTOUR_COLOR.0;
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;

    // Pixel (x, y) covers [x, x + 1); stroke through its centre.
    let centre = |v: i32| v as f32 + 0.5;

    let points = contour.points();
    let origin = points[0];
    if points.iter().all(|p| *p == origin) {
        let half = thickness / 2.0;
        if let Some(rect) = Rect::from_xywh(
            centre(origin.x) - half,
            centre(origin.y) - half,
            thickness,
            thickness,
        ) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    } else {
        let mut pb = PathBuilder::new();
        pb.move_to(centre(origin.x), centre(origin.y));
        for p in &points[1..] {
            pb.line_to(centre(p.x), centre(p.y));
        }
        pb.close();

        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: thickness,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    // Every pixel is opaque, so premultiplied and straight RGBA coincide.
    RgbaImage::from_raw(dimensions.width, dimensions.height, pixmap.take())
        .unwrap_or_else(blank)
}

//! Pixel-level drawing on RGBA images.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_ellipse_mut, draw_line_segment_mut};

use crate::colormap::Color;

/// A rectangle in pixel space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Maps projected plot coordinates into a pixel rectangle (y up).
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Projected extent `[min_x, min_y, max_x, max_y]`
    pub extent: [f64; 4],
    pub rect: PixelRect,
}

impl Viewport {
    /// Create a viewport, optionally shrinking the pixel rect so one
    /// projected unit has the same pixel length on both axes.
    pub fn new(extent: [f64; 4], rect: PixelRect, equal_aspect: bool) -> Self {
        let [x0, y0, x1, y1] = extent;
        let dx = (x1 - x0).abs().max(f64::MIN_POSITIVE);
        let dy = (y1 - y0).abs().max(f64::MIN_POSITIVE);
        let rect = if equal_aspect {
            let scale = (rect.width / dx).min(rect.height / dy);
            let w = dx * scale;
            let h = dy * scale;
            PixelRect::new(
                rect.x + (rect.width - w) / 2.0,
                rect.y + (rect.height - h) / 2.0,
                w,
                h,
            )
        } else {
            rect
        };
        Self { extent, rect }
    }

    #[inline]
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let [x0, y0, x1, y1] = self.extent;
        let px = self.rect.x + (x - x0) / (x1 - x0) * self.rect.width;
        let py = self.rect.y + (y1 - y) / (y1 - y0) * self.rect.height;
        (px, py)
    }

    /// Pixel length of one projected unit along x.
    pub fn scale_x(&self) -> f64 {
        self.rect.width / (self.extent[2] - self.extent[0])
    }

    /// Pixel length of one projected unit along y.
    pub fn scale_y(&self) -> f64 {
        self.rect.height / (self.extent[3] - self.extent[1])
    }
}

#[inline]
fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba())
}

/// Alpha-blend a color onto a pixel; out-of-bounds writes are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    if color.a == 0 {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    if color.a == 255 {
        *pixel = rgba(color);
        return;
    }
    let alpha = color.a as f32 / 255.0;
    let src = color.to_rgba();
    for c in 0..3 {
        pixel.0[c] = (src[c] as f32 * alpha + pixel.0[c] as f32 * (1.0 - alpha)).round() as u8;
    }
    pixel.0[3] = pixel.0[3].max(color.a);
}

/// Scanline fill of a simple polygon (even-odd rule, pixel-centre sampling).
///
/// Adjacent polygons sharing an edge cover every pixel exactly once.
pub fn fill_polygon(img: &mut RgbaImage, points: &[(f64, f64)], color: Color) {
    if points.len() < 3 || color.a == 0 {
        return;
    }
    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }
    let y_start = ((min_y - 0.5).ceil() as i64).max(0);
    let y_end = ((max_y - 0.5).floor() as i64).min(img.height() as i64 - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for py in y_start..=y_end {
        let sample_y = py as f64 + 0.5;
        crossings.clear();
        for k in 0..points.len() {
            let (xa, ya) = points[k];
            let (xb, yb) = points[(k + 1) % points.len()];
            // Half-open rule keeps shared vertices from being counted twice
            if (ya <= sample_y && yb > sample_y) || (yb <= sample_y && ya > sample_y) {
                let t = (sample_y - ya) / (yb - ya);
                crossings.push(xa + t * (xb - xa));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let x_start = ((pair[0] - 0.5).ceil() as i64).max(0);
            let x_end = ((pair[1] - 0.5).ceil() as i64 - 1).min(img.width() as i64 - 1);
            for px in x_start..=x_end {
                blend_pixel(img, px, py, color);
            }
        }
    }
}

/// Fill an axis-aligned rectangle.
pub fn fill_rect(img: &mut RgbaImage, rect: PixelRect, color: Color) {
    let corners = [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.right(), rect.bottom()),
        (rect.x, rect.bottom()),
    ];
    fill_polygon(img, &corners, color);
}

pub fn draw_line(img: &mut RgbaImage, from: (f64, f64), to: (f64, f64), color: Color) {
    draw_line_segment_mut(
        img,
        (from.0 as f32, from.1 as f32),
        (to.0 as f32, to.1 as f32),
        rgba(color),
    );
}

/// Outline of an axis-aligned rectangle.
pub fn stroke_rect(img: &mut RgbaImage, rect: PixelRect, color: Color) {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.right() - 1.0, rect.bottom() - 1.0);
    draw_line(img, (x0, y0), (x1, y0), color);
    draw_line(img, (x1, y0), (x1, y1), color);
    draw_line(img, (x1, y1), (x0, y1), color);
    draw_line(img, (x0, y1), (x0, y0), color);
}

pub fn stroke_ellipse(img: &mut RgbaImage, center: (f64, f64), rx: f64, ry: f64, color: Color) {
    if rx < 1.0 || ry < 1.0 {
        return;
    }
    draw_hollow_ellipse_mut(
        img,
        (center.0.round() as i32, center.1.round() as i32),
        rx.round() as i32,
        ry.round() as i32,
        rgba(color),
    );
}

/// Bounding box `(x, y, width, height)` of pixels differing from `background`.
pub fn content_bounds(img: &RgbaImage, background: Color) -> Option<(u32, u32, u32, u32)> {
    let bg = rgba(background);
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if *pixel == bg {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Crop an image to its content plus `pad` pixels on each side.
pub fn crop_to_content(img: &RgbaImage, background: Color, pad: u32) -> RgbaImage {
    match content_bounds(img, background) {
        Some((x, y, w, h)) => {
            let x0 = x.saturating_sub(pad);
            let y0 = y.saturating_sub(pad);
            let x1 = (x + w + pad).min(img.width());
            let y1 = (y + h + pad).min(img.height());
            image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image()
        }
        None => img.clone(),
    }
}

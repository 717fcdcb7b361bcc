//! Text drawing and number formatting for figure annotations.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::colormap::Color;
use crate::error::{RenderError, Result};

/// Horizontal placement of a text run relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement of a text run relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Draws text with a TrueType font.
#[derive(Clone)]
pub struct TextRenderer {
    font: Font<'static>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer").finish_non_exhaustive()
    }
}

impl TextRenderer {
    /// Load a TrueType font from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| RenderError::Font(format!("not a TrueType font: {}", path.display())))?;
        Ok(Self { font })
    }

    /// Pixel size `(width, height)` of a text run.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw `text` anchored at `(x, y)` in pixels.
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        (x, y): (f64, f64),
        size: f32,
        color: Color,
        align: (HAlign, VAlign),
    ) {
        if text.is_empty() {
            return;
        }
        let (w, h) = self.measure(text, size);
        let left = match align.0 {
            HAlign::Left => x,
            HAlign::Center => x - w as f64 / 2.0,
            HAlign::Right => x - w as f64,
        };
        let top = match align.1 {
            VAlign::Top => y,
            VAlign::Center => y - h as f64 / 2.0,
            VAlign::Bottom => y - h as f64,
        };
        draw_text_mut(
            img,
            Rgba(color.to_rgba()),
            left.round() as i32,
            top.round() as i32,
            Scale::uniform(size),
            &self.font,
            text,
        );
    }
}

/// Format a value in scientific notation with a signed, two-digit exponent.
///
/// `format_sci(0.01234, 2)` gives `1.23e-02`; non-finite values give `nan`,
/// `inf` or `-inf`.
pub fn format_sci(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(0.01234, 2), "1.23e-02");
        assert_eq!(format_sci(-1234.5, 2), "-1.23e+03");
        assert_eq!(format_sci(0.0, 2), "0.00e+00");
        assert_eq!(format_sci(1.5e-120, 1), "1.5e-120");
        assert_eq!(format_sci(12.5, 4), "1.2500e+01");
    }

    #[test]
    fn test_format_sci_non_finite() {
        assert_eq!(format_sci(f64::NAN, 2), "nan");
        assert_eq!(format_sci(f64::INFINITY, 2), "inf");
        assert_eq!(format_sci(f64::NEG_INFINITY, 2), "-inf");
    }

    #[test]
    fn test_missing_font_file() {
        assert!(TextRenderer::from_file("/nonexistent/font.ttf").is_err());
    }
}

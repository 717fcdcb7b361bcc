//! Named colormaps mapping normalized values to colors.
//!
//! Each map is a list of evenly spaced anchor colors with linear
//! interpolation between them. Appending `_r` to a name reverses the map.

use crate::error::{RenderError, Result};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

const RDBU: &[(u8, u8, u8)] = &[
    (103, 0, 31),
    (178, 24, 43),
    (214, 96, 77),
    (244, 165, 130),
    (253, 219, 199),
    (247, 247, 247),
    (209, 229, 240),
    (146, 197, 222),
    (67, 147, 195),
    (33, 102, 172),
    (5, 48, 97),
];

const PUOR: &[(u8, u8, u8)] = &[
    (127, 59, 8),
    (179, 88, 6),
    (224, 130, 20),
    (253, 184, 99),
    (254, 224, 182),
    (247, 247, 247),
    (216, 218, 235),
    (178, 171, 210),
    (128, 115, 172),
    (84, 39, 136),
    (45, 0, 75),
];

const COOLWARM: &[(u8, u8, u8)] = &[
    (59, 76, 192),
    (98, 130, 234),
    (141, 176, 254),
    (184, 208, 249),
    (221, 221, 221),
    (245, 196, 173),
    (244, 154, 123),
    (222, 96, 77),
    (180, 4, 38),
];

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
];

const INFERNO: &[(u8, u8, u8)] = &[
    (0, 0, 4),
    (31, 12, 72),
    (85, 15, 109),
    (136, 34, 106),
    (186, 54, 85),
    (227, 89, 51),
    (249, 140, 10),
    (249, 201, 50),
    (252, 255, 164),
];

const MAGMA: &[(u8, u8, u8)] = &[
    (0, 0, 4),
    (28, 16, 68),
    (79, 18, 123),
    (129, 37, 129),
    (181, 54, 122),
    (229, 80, 100),
    (251, 135, 97),
    (254, 194, 135),
    (252, 253, 191),
];

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (75, 3, 161),
    (125, 3, 168),
    (168, 34, 150),
    (203, 70, 121),
    (229, 107, 93),
    (248, 148, 65),
    (253, 195, 40),
    (240, 249, 33),
];

const GREYS: &[(u8, u8, u8)] = &[(255, 255, 255), (0, 0, 0)];

fn base_stops(name: &str) -> Option<&'static [(u8, u8, u8)]> {
    match name {
        "RdBu" => Some(RDBU),
        "PuOr" => Some(PUOR),
        "coolwarm" => Some(COOLWARM),
        "viridis" => Some(VIRIDIS),
        "inferno" => Some(INFERNO),
        "magma" => Some(MAGMA),
        "plasma" => Some(PLASMA),
        "Greys" => Some(GREYS),
        _ => None,
    }
}

/// A colormap resolved from its name.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Color>,
    bad: Color,
}

impl Colormap {
    /// Resolve a colormap by name, e.g. `RdBu_r` or `viridis`.
    pub fn from_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let stops = base_stops(base).ok_or_else(|| {
            RenderError::UnknownColormap(format!(
                "{} (known: {}, each also reversed with _r)",
                name,
                Self::known_names().join(", ")
            ))
        })?;

        let mut stops: Vec<Color> = stops.iter().map(|&(r, g, b)| Color::rgb(r, g, b)).collect();
        if reversed {
            stops.reverse();
        }
        Ok(Self {
            name: name.to_string(),
            stops,
            bad: Color::transparent(),
        })
    }

    /// Names accepted by [`Colormap::from_name`] (each also with `_r`).
    pub fn known_names() -> &'static [&'static str] {
        &["RdBu", "PuOr", "coolwarm", "viridis", "inferno", "magma", "plasma", "Greys"]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for a normalized position in [0, 1]; out-of-range clamps.
    pub fn at(&self, t: f32) -> Color {
        if t.is_nan() {
            return self.bad;
        }
        let t = t.clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(self.stops.len() - 2);
        interpolate_color(self.stops[lower], self.stops[lower + 1], pos - lower as f32)
    }

    /// Color for a data value under linear normalization to `[vmin, vmax]`.
    ///
    /// Non-finite values get the "bad" color (transparent). A degenerate
    /// range maps every finite value to the bottom of the map.
    pub fn map(&self, value: f64, vmin: f64, vmax: f64) -> Color {
        if !value.is_finite() {
            return self.bad;
        }
        let range = vmax - vmin;
        let t = if range.abs() > 0.0 && range.is_finite() {
            (value - vmin) / range
        } else {
            0.0
        };
        self.at(t as f32)
    }
}

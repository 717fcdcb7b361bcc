//! Mollweide equal-area projection on the unit sphere.
//!
//! Input is longitude in [-π, π] and latitude in [-π/2, π/2], both radians.
//! The projected ellipse spans x in [-2√2, 2√2] and y in [-√2, √2].

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use crate::transform::Projection;

const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1e-12;

/// Mollweide projection (unit sphere, central meridian 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mollweide;

impl Mollweide {
    /// Solve `2t + sin(2t) = π sin(lat)` for the auxiliary angle `t`.
    pub fn auxiliary_angle(lat: f64) -> f64 {
        if (FRAC_PI_2 - lat.abs()).abs() < 1e-10 {
            return lat.signum() * FRAC_PI_2;
        }
        let target = PI * lat.sin();
        let mut t = lat;
        for _ in 0..MAX_ITERATIONS {
            let f = 2.0 * t + (2.0 * t).sin() - target;
            let df = 2.0 + 2.0 * (2.0 * t).cos();
            if df.abs() < f64::EPSILON {
                break;
            }
            let step = f / df;
            t -= step;
            if step.abs() < TOLERANCE {
                break;
            }
        }
        t
    }
}

impl Projection for Mollweide {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        if lat.abs() > FRAC_PI_2 + 1e-9 || lon.abs() > PI + 1e-9 {
            return None;
        }
        let t = Self::auxiliary_angle(lat.clamp(-FRAC_PI_2, FRAC_PI_2));
        let x = 2.0 * SQRT_2 / PI * lon * t.cos();
        let y = SQRT_2 * t.sin();
        Some((x, y))
    }

    fn domain(&self) -> Option<[f64; 4]> {
        Some([-2.0 * SQRT_2, -SQRT_2, 2.0 * SQRT_2, SQRT_2])
    }
}

//! Polar axes projection.
//!
//! Data coordinates are (angle in radians, radius). Angle zero points along
//! +x and increases counter-clockwise, so a meridional half-disk whose
//! angles run from π/2 (north pole) to -π/2 (south pole) sits on the right.

use crate::transform::Projection;

/// Polar projection parameters.
#[derive(Debug, Clone, Copy)]
pub struct Polar {
    /// Angle added to every data angle (radians)
    pub theta_offset: f64,
    /// Outer radius of the plotted disk, fixes the projected domain
    pub r_max: Option<f64>,
}

impl Default for Polar {
    fn default() -> Self {
        Self {
            theta_offset: 0.0,
            r_max: None,
        }
    }
}

impl Polar {
    pub fn new(theta_offset: f64, r_max: Option<f64>) -> Self {
        Self { theta_offset, r_max }
    }
}

impl Projection for Polar {
    #[inline]
    fn forward(&self, theta: f64, r: f64) -> Option<(f64, f64)> {
        if !theta.is_finite() || !r.is_finite() {
            return None;
        }
        let angle = theta + self.theta_offset;
        Some((r * angle.cos(), r * angle.sin()))
    }

    fn domain(&self) -> Option<[f64; 4]> {
        self.r_max.map(|r| [-r, -r, r, r])
    }
}

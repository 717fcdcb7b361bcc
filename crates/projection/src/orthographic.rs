//! Orthographic (globe) projection on the unit sphere.
//!
//! Input is longitude/latitude in degrees. Points on the hemisphere facing
//! away from the viewer are not visible and project to `None`.

use crate::transform::Projection;

/// Orthographic projection centred on a point of the sphere.
#[derive(Debug, Clone, Copy)]
pub struct Orthographic {
    /// Longitude of the projection centre (degrees)
    pub central_longitude: f64,
    /// Latitude of the projection centre (degrees)
    pub central_latitude: f64,
}

impl Default for Orthographic {
    fn default() -> Self {
        Self {
            central_longitude: 0.0,
            central_latitude: 0.0,
        }
    }
}

impl Orthographic {
    pub fn new(central_longitude: f64, central_latitude: f64) -> Self {
        Self {
            central_longitude,
            central_latitude,
        }
    }

    /// Cosine of the angular distance from the projection centre.
    #[inline]
    fn cos_distance(&self, lon: f64, lat: f64) -> f64 {
        let phi0 = self.central_latitude.to_radians();
        let phi = lat.to_radians();
        let dlambda = (lon - self.central_longitude).to_radians();
        phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * dlambda.cos()
    }

    /// Whether a lon/lat point lies on the visible hemisphere.
    pub fn is_visible(&self, lon: f64, lat: f64) -> bool {
        self.cos_distance(lon, lat) >= 0.0
    }
}

impl Projection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        if !self.is_visible(lon, lat) {
            return None;
        }
        let phi0 = self.central_latitude.to_radians();
        let phi = lat.to_radians();
        let dlambda = (lon - self.central_longitude).to_radians();

        let x = phi.cos() * dlambda.sin();
        let y = phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * dlambda.cos();
        Some((x, y))
    }

    fn domain(&self) -> Option<[f64; 4]> {
        Some([-1.0, -1.0, 1.0, 1.0])
    }
}

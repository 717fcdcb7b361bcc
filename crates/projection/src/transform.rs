//! The projection trait and trivial projections.

/// A forward map from data coordinates to the projected plane.
pub trait Projection: Send + Sync {
    /// Project a data-space point. `None` when the point is not visible.
    fn forward(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Fixed extent `[min_x, min_y, max_x, max_y]` of the projected domain,
    /// or `None` when the extent follows the data.
    fn domain(&self) -> Option<[f64; 4]> {
        None
    }
}

/// Rectilinear axes: data coordinates are plot coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Projection for Identity {
    #[inline]
    fn forward(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, y))
    }
}

/// Longitude/latitude in degrees, passed through unchanged.
///
/// Used as the data transform for geographic axes: data in plate-carrée
/// degrees is composed with the axes projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlateCarree;

impl Projection for PlateCarree {
    #[inline]
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some((lon, lat))
    }

    fn domain(&self) -> Option<[f64; 4]> {
        Some([-180.0, -90.0, 180.0, 90.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(Identity.forward(1.5, -2.0), Some((1.5, -2.0)));
    }

    #[test]
    fn test_plate_carree_rejects_bad_latitude() {
        assert!(PlateCarree.forward(0.0, 91.0).is_none());
        assert_eq!(PlateCarree.forward(10.0, 45.0), Some((10.0, 45.0)));
    }
}

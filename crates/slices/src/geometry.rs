//! Plot geometries: mesh coordinates from basis arrays, and matching
//! field padding.
//!
//! Convention: `xx[i][j] = x'[i]`, `yy[i][j] = y'[j]` with shape
//! `(len x', len y')`, where `x'` and `y'` are the geometry's transformed
//! basis arrays.

use std::f64::consts::{FRAC_PI_2, PI};

use renderer::{Axes, AxesProjection, DataTransform};
use serde::{Deserialize, Serialize};
use slice_common::{match_basis, Dataset, Field2, Result};

fn default_r_inner() -> f64 {
    0.0
}

fn default_r_outer() -> f64 {
    1.0
}

/// Coordinate geometry of a colormesh panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Plain x/y box
    #[default]
    Cartesian,
    /// Azimuth x radius disk or annulus
    Polar {
        #[serde(default = "default_r_inner")]
        r_inner: f64,
        #[serde(default = "default_r_outer")]
        r_outer: f64,
    },
    /// Colatitude x radius half disk, drawn on the left or right
    Meridional {
        #[serde(default = "default_r_inner")]
        r_inner: f64,
        #[serde(default = "default_r_outer")]
        r_outer: f64,
        #[serde(default)]
        left: bool,
    },
    /// Azimuth x colatitude on a Mollweide map
    Mollweide,
    /// Azimuth x colatitude on an orthographic globe
    Orthographic,
}

/// Cached mesh coordinates of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCoordinates {
    pub xx: Field2,
    pub yy: Field2,
    /// Lengths of the x and y basis arrays before padding
    pub basis_shape: [usize; 2],
}

impl Geometry {
    /// Polar geometry with optional radial bounds (defaults 0 and 1).
    pub fn polar(r_inner: Option<f64>, r_outer: Option<f64>) -> Self {
        Self::Polar {
            r_inner: r_inner.unwrap_or(0.0),
            r_outer: r_outer.unwrap_or(1.0),
        }
    }

    /// Meridional geometry with optional radial bounds (defaults 0 and 1).
    pub fn meridional(r_inner: Option<f64>, r_outer: Option<f64>, left: bool) -> Self {
        Self::Meridional {
            r_inner: r_inner.unwrap_or(0.0),
            r_outer: r_outer.unwrap_or(1.0),
            left,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Cartesian => "cartesian",
            Geometry::Polar { .. } => "polar",
            Geometry::Meridional { .. } => "meridional",
            Geometry::Mollweide => "mollweide",
            Geometry::Orthographic => "orthographic",
        }
    }

    /// Basis names used when a panel does not name its own.
    pub fn default_bases(&self) -> (&'static str, &'static str) {
        match self {
            Geometry::Cartesian => ("x", "z"),
            Geometry::Polar { .. } => ("phi", "r"),
            Geometry::Meridional { .. } => ("theta", "r"),
            Geometry::Mollweide | Geometry::Orthographic => ("phi", "theta"),
        }
    }

    /// Whether this geometry needs geographic projection support.
    pub fn requires_geographic(&self) -> bool {
        matches!(self, Geometry::Orthographic)
    }

    /// Whether axes with `projection` can show this geometry.
    pub fn suits(&self, projection: &AxesProjection) -> bool {
        matches!(
            (self, projection),
            (Geometry::Cartesian, AxesProjection::Rectilinear)
                | (Geometry::Polar { .. }, AxesProjection::Polar)
                | (Geometry::Meridional { .. }, AxesProjection::Polar)
                | (Geometry::Mollweide, AxesProjection::Mollweide)
                | (Geometry::Orthographic, AxesProjection::Orthographic { .. })
        )
    }

    /// Coordinate system the mesh coordinates are expressed in.
    pub fn data_transform(&self) -> DataTransform {
        match self {
            Geometry::Orthographic => DataTransform::PlateCarree,
            _ => DataTransform::Axes,
        }
    }

    /// Build mesh coordinates from the dataset's basis arrays.
    pub fn coordinates(
        &self,
        dset: &Dataset,
        x_basis: &str,
        y_basis: &str,
    ) -> Result<MeshCoordinates> {
        let x = match_basis(dset, x_basis)?;
        let y = match_basis(dset, y_basis)?;
        let basis_shape = [x.len(), y.len()];

        let (x, y): (Vec<f64>, Vec<f64>) = match *self {
            Geometry::Cartesian => (x.to_vec(), y.to_vec()),
            Geometry::Polar { r_inner, r_outer } => {
                let mut phi = x.to_vec();
                phi.push(2.0 * PI);
                (phi, pad_radius(y, r_inner, r_outer))
            }
            Geometry::Meridional { r_inner, r_outer, left } => {
                let theta = std::iter::once(PI)
                    .chain(x.iter().copied())
                    .chain(std::iter::once(0.0))
                    .map(|t| if left { FRAC_PI_2 + t } else { FRAC_PI_2 - t })
                    .collect();
                (theta, pad_radius(y, r_inner, r_outer))
            }
            Geometry::Mollweide => (
                x.iter().map(|phi| phi - PI).collect(),
                y.iter().map(|theta| FRAC_PI_2 - theta).collect(),
            ),
            Geometry::Orthographic => (
                x.iter().map(|phi| phi.to_degrees() - 180.0).collect(),
                y.iter().map(|theta| theta.to_degrees() - 90.0).collect(),
            ),
        };

        let (xx, yy) = Field2::meshgrid(&x, &y);
        Ok(MeshCoordinates { xx, yy, basis_shape })
    }

    /// Edge-pad a transformed field to match this geometry's coordinates.
    ///
    /// Polar fields gain one column at the start of the radial axis;
    /// meridional fields additionally gain one row at the end of the
    /// colatitude axis.
    pub fn pad_field(&self, field: Field2) -> Field2 {
        match self {
            Geometry::Polar { .. } => field.pad_edge((0, 0), (1, 0)),
            Geometry::Meridional { .. } => field.pad_edge((0, 1), (1, 0)),
            _ => field,
        }
    }

    /// Axes decorations for this geometry.
    pub fn decorate(&self, ax: &mut Axes) {
        match self {
            Geometry::Cartesian => {}
            Geometry::Polar { .. } | Geometry::Meridional { .. } => {
                ax.hide_ticks();
                ax.set_aspect_equal();
            }
            Geometry::Mollweide => ax.hide_ticks(),
            Geometry::Orthographic => ax.gridlines(),
        }
    }
}

/// `[r_inner] ++ r ++ [r_outer]`
fn pad_radius(r: &[f64], r_inner: f64, r_outer: f64) -> Vec<f64> {
    let mut padded = Vec::with_capacity(r.len() + 2);
    padded.push(r_inner);
    padded.extend_from_slice(r);
    padded.push(r_outer);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        assert_approx_eq, create_cartesian_dataset, create_disk_dataset, create_meridional_dataset,
        create_sphere_dataset,
    };

    #[test]
    fn test_cartesian_uses_bases_unchanged() {
        let dset = create_cartesian_dataset("b", 8, 4, 1);
        let coords = Geometry::Cartesian.coordinates(&dset, "x", "z").unwrap();
        assert_eq!(coords.xx.shape(), [8, 4]);
        assert_eq!(coords.xx.get(3, 2), dset.bases["x"][3]);
        assert_eq!(coords.yy.get(3, 2), dset.bases["z"][2]);
    }

    #[test]
    fn test_polar_wraps_azimuth_and_pads_radius() {
        let dset = create_disk_dataset("T", 16, 5, 1);
        let geometry = Geometry::polar(Some(0.25), Some(1.5));
        let coords = geometry.coordinates(&dset, "phi", "r").unwrap();
        assert_eq!(coords.xx.shape(), [17, 7]);
        assert_eq!(coords.basis_shape, [16, 5]);
        assert_eq!(coords.xx.get(16, 0), 2.0 * PI);
        assert_eq!(coords.yy.get(0, 0), 0.25);
        assert_eq!(coords.yy.get(0, 6), 1.5);

        let field = geometry.pad_field(dset.field(0, None).unwrap());
        assert_eq!(field.shape(), [16, 6]);
        // The padded inner column repeats the innermost sample
        assert_eq!(field.get(3, 0), field.get(3, 1));
    }

    #[test]
    fn test_polar_defaults() {
        assert_eq!(
            Geometry::polar(None, None),
            Geometry::Polar {
                r_inner: 0.0,
                r_outer: 1.0
            }
        );
    }

    #[test]
    fn test_meridional_left_and_right_reflect() {
        let dset = create_meridional_dataset("u", 6, 4, 1);
        let theta = &dset.bases["theta"];
        let left = Geometry::meridional(None, None, true)
            .coordinates(&dset, "theta", "r")
            .unwrap();
        let right = Geometry::meridional(None, None, false)
            .coordinates(&dset, "theta", "r")
            .unwrap();
        assert_eq!(left.xx.shape(), [8, 6]);
        assert_ne!(left.xx, right.xx);

        // Pole padding: pi first, 0 last
        assert_approx_eq!(left.xx.get(0, 0), FRAC_PI_2 + PI, 1e-12);
        assert_approx_eq!(right.xx.get(0, 0), FRAC_PI_2 - PI, 1e-12);
        assert_approx_eq!(left.xx.get(7, 0), FRAC_PI_2, 1e-12);
        for (k, t) in theta.iter().enumerate() {
            assert_approx_eq!(left.xx.get(k + 1, 0), FRAC_PI_2 + t, 1e-12);
            assert_approx_eq!(right.xx.get(k + 1, 0), FRAC_PI_2 - t, 1e-12);
        }

        let field = Geometry::meridional(None, None, false).pad_field(dset.field(0, None).unwrap());
        assert_eq!(field.shape(), [7, 5]);
    }

    #[test]
    fn test_mollweide_shifts_to_longitude_latitude() {
        let dset = create_sphere_dataset("s", 8, 4, 1);
        let coords = Geometry::Mollweide.coordinates(&dset, "phi", "theta").unwrap();
        assert_eq!(coords.xx.get(0, 0), -PI);
        assert_approx_eq!(coords.yy.get(0, 0), FRAC_PI_2 - dset.bases["theta"][0], 1e-12);
        assert_eq!(Geometry::Mollweide.pad_field(dset.field(0, None).unwrap()).shape(), [8, 4]);
    }

    #[test]
    fn test_orthographic_uses_degrees() {
        let dset = create_sphere_dataset("s", 8, 4, 1);
        let coords = Geometry::Orthographic.coordinates(&dset, "phi", "theta").unwrap();
        assert_approx_eq!(coords.xx.get(0, 0), -180.0, 1e-9);
        assert_approx_eq!(coords.xx.get(4, 0), 0.0, 1e-9);
        assert_approx_eq!(coords.yy.get(0, 0), dset.bases["theta"][0].to_degrees() - 90.0, 1e-9);
        assert_eq!(Geometry::Orthographic.data_transform(), DataTransform::PlateCarree);
        assert!(Geometry::Orthographic.requires_geographic());
    }

    #[test]
    fn test_missing_basis() {
        let dset = create_cartesian_dataset("b", 4, 4, 1);
        assert!(Geometry::Cartesian.coordinates(&dset, "x", "y").is_err());
    }

    #[test]
    fn test_suits_projection() {
        assert!(Geometry::polar(None, None).suits(&AxesProjection::Polar));
        assert!(Geometry::meridional(None, None, true).suits(&AxesProjection::Polar));
        assert!(!Geometry::Cartesian.suits(&AxesProjection::Mollweide));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let geometry: Geometry =
            serde_json::from_str(r#"{"type": "meridional", "left": true}"#).unwrap();
        assert_eq!(geometry, Geometry::meridional(None, None, true));
        let geometry: Geometry =
            serde_json::from_str(r#"{"type": "polar", "r_outer": 2.0}"#).unwrap();
        assert_eq!(geometry, Geometry::polar(None, Some(2.0)));
        assert_eq!(Geometry::default(), Geometry::Cartesian);
    }
}

//! Pseudocolor quad meshes.
//!
//! A mesh is given either cell-corner coordinates (one more row and column
//! than the values, "flat" shading) or sample-centre coordinates (same shape
//! as the values, "nearest" shading). Centre coordinates are converted to
//! corners by taking midpoints and extrapolating half a cell at the edges.

use image::RgbaImage;
use projection::Projection;
use rayon::prelude::*;
use slice_common::Field2;

use crate::canvas::{fill_polygon, Viewport};
use crate::colormap::{Color, Colormap};
use crate::error::{RenderError, Result};

/// How mesh coordinates relate to the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Coordinates are cell corners
    Flat,
    /// Coordinates are cell centres
    Nearest,
}

/// Cell edges for a 1D run of centres.
fn centre_edges(centres: &[f64]) -> Vec<f64> {
    let n = centres.len();
    match n {
        0 => Vec::new(),
        1 => vec![centres[0] - 0.5, centres[0] + 0.5],
        _ => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centres[0] - (centres[1] - centres[0]) / 2.0);
            for k in 1..n {
                edges.push((centres[k - 1] + centres[k]) / 2.0);
            }
            edges.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);
            edges
        }
    }
}

/// Convert a grid of centre coordinates to a grid of corner coordinates.
pub fn corners_from_centres(centres: &Field2) -> Field2 {
    let [n0, n1] = centres.shape();
    // Along axis 1 first, then along axis 0.
    let mut along1 = Field2::zeros(n0, n1 + 1);
    for i in 0..n0 {
        let row: Vec<f64> = (0..n1).map(|j| centres.get(i, j)).collect();
        for (j, e) in centre_edges(&row).into_iter().enumerate() {
            along1.set(i, j, e);
        }
    }
    let mut corners = Field2::zeros(n0 + 1, n1 + 1);
    for j in 0..=n1 {
        let column: Vec<f64> = (0..n0).map(|i| along1.get(i, j)).collect();
        for (i, e) in centre_edges(&column).into_iter().enumerate() {
            corners.set(i, j, e);
        }
    }
    corners
}

/// A filled quad mesh ready to rasterize.
#[derive(Debug, Clone)]
pub struct QuadMesh {
    corners_x: Field2,
    corners_y: Field2,
    values: Field2,
    shading: Shading,
    cmap: Colormap,
    vmin: f64,
    vmax: f64,
    subdivisions: usize,
}

impl QuadMesh {
    /// Build a mesh from coordinate grids and values.
    ///
    /// Fails when the coordinate grids differ in shape or match neither the
    /// value shape nor the value shape plus one on both axes.
    pub fn new(
        xx: &Field2,
        yy: &Field2,
        values: Field2,
        cmap: Colormap,
        vmin: f64,
        vmax: f64,
    ) -> Result<Self> {
        if xx.shape() != yy.shape() {
            return Err(RenderError::shape_mismatch(format!(
                "x coordinates {:?} and y coordinates {:?} differ",
                xx.shape(),
                yy.shape()
            )));
        }
        let [c0, c1] = xx.shape();
        let [v0, v1] = values.shape();
        let (corners_x, corners_y, shading) = if c0 == v0 + 1 && c1 == v1 + 1 {
            (xx.clone(), yy.clone(), Shading::Flat)
        } else if c0 == v0 && c1 == v1 {
            (corners_from_centres(xx), corners_from_centres(yy), Shading::Nearest)
        } else {
            return Err(RenderError::shape_mismatch(format!(
                "coordinates {:?} incompatible with values {:?}",
                xx.shape(),
                values.shape()
            )));
        };
        Ok(Self {
            corners_x,
            corners_y,
            values,
            shading,
            cmap,
            vmin,
            vmax,
            subdivisions: 1,
        })
    }

    /// Split each cell into `n x n` sub-quads before projecting, so curved
    /// projections draw curved cell edges.
    pub fn with_subdivisions(mut self, n: usize) -> Self {
        self.subdivisions = n.max(1);
        self
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    /// Number of cells along each axis.
    pub fn cells(&self) -> [usize; 2] {
        self.values.shape()
    }

    pub fn values(&self) -> &Field2 {
        &self.values
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.vmin, self.vmax)
    }

    pub fn cmap(&self) -> &Colormap {
        &self.cmap
    }

    /// Corner coordinates in data space.
    pub fn corners(&self) -> (&Field2, &Field2) {
        (&self.corners_x, &self.corners_y)
    }

    /// Bounding box of all visible projected corners.
    pub fn projected_extent(&self, proj: &dyn Projection) -> Option<[f64; 4]> {
        let xs = self.corners_x.as_slice();
        let ys = self.corners_y.as_slice();
        xs.iter()
            .zip(ys)
            .filter_map(|(&x, &y)| proj.forward(x, y))
            .filter(|(px, py)| px.is_finite() && py.is_finite())
            .fold(None, |acc, (px, py)| match acc {
                None => Some([px, py, px, py]),
                Some([x0, y0, x1, y1]) => Some([x0.min(px), y0.min(py), x1.max(px), y1.max(py)]),
            })
    }

    /// Bilinear position inside cell `(i, j)` at fractions `(s, t)`.
    #[inline]
    fn cell_point(&self, i: usize, j: usize, s: f64, t: f64) -> (f64, f64) {
        let lerp = |f: &Field2| {
            let a = f.get(i, j) * (1.0 - t) + f.get(i, j + 1) * t;
            let b = f.get(i + 1, j) * (1.0 - t) + f.get(i + 1, j + 1) * t;
            a * (1.0 - s) + b * s
        };
        (lerp(&self.corners_x), lerp(&self.corners_y))
    }

    /// Pixel-space polygons for one cell, skipping sub-quads with a hidden
    /// corner.
    fn cell_polygons(
        &self,
        i: usize,
        j: usize,
        proj: &dyn Projection,
        view: &Viewport,
    ) -> Vec<[(f64, f64); 4]> {
        let n = self.subdivisions;
        let step = 1.0 / n as f64;
        let mut polygons = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                let (s0, s1) = (a as f64 * step, (a + 1) as f64 * step);
                let (t0, t1) = (b as f64 * step, (b + 1) as f64 * step);
                let quad = [(s0, t0), (s1, t0), (s1, t1), (s0, t1)];
                let projected: Option<Vec<(f64, f64)>> = quad
                    .iter()
                    .map(|&(s, t)| {
                        let (x, y) = self.cell_point(i, j, s, t);
                        proj.forward(x, y).map(|(px, py)| view.to_pixel(px, py))
                    })
                    .collect();
                if let Some(p) = projected {
                    polygons.push([p[0], p[1], p[2], p[3]]);
                }
            }
        }
        polygons
    }

    /// Draw the mesh into `img`. Cells with non-finite values are left
    /// unpainted.
    pub fn rasterize(&self, img: &mut RgbaImage, proj: &dyn Projection, view: &Viewport) {
        let [n0, n1] = self.values.shape();
        let painted: Vec<(Color, Vec<[(f64, f64); 4]>)> = (0..n0 * n1)
            .into_par_iter()
            .filter_map(|k| {
                let (i, j) = (k / n1, k % n1);
                let color = self.cmap.map(self.values.get(i, j), self.vmin, self.vmax);
                if color.a == 0 {
                    return None;
                }
                Some((color, self.cell_polygons(i, j, proj, view)))
            })
            .collect();

        for (color, polygons) in painted {
            for polygon in polygons {
                fill_polygon(img, &polygon, color);
            }
        }
    }
}

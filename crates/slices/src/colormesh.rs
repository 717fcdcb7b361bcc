//! Colormesh panels: one task drawn with one geometry into one grid cell.

use renderer::{
    format_sci, Axes, Colorbar, ColorbarAxes, Colormap, MeshHandle, MeshStyle, RenderCapabilities,
};
use serde::{Deserialize, Serialize};
use slice_common::{Dataset, Result, SliceError};
use tracing::{debug, warn};

use crate::geometry::{Geometry, MeshCoordinates};
use crate::limits::limits;
use crate::transform::{transform, TransformOptions};

fn default_cmap() -> String {
    "RdBu_r".to_string()
}

/// Per-panel plotting options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColormeshOptions {
    /// Basis plotted along x; the geometry default when unset
    #[serde(default)]
    pub x_basis: Option<String>,
    /// Basis plotted along y; the geometry default when unset
    #[serde(default)]
    pub y_basis: Option<String>,
    #[serde(default)]
    pub transform: TransformOptions,
    #[serde(default = "default_cmap")]
    pub cmap: String,
    /// Field is one-signed; limits run from zero
    #[serde(default)]
    pub pos_def: bool,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    /// Component to plot from a vector-valued task
    #[serde(default)]
    pub vector_ind: Option<usize>,
    /// Colorbar label; defaults to the task name
    #[serde(default)]
    pub label: Option<String>,
}

impl Default for ColormeshOptions {
    fn default() -> Self {
        Self {
            x_basis: None,
            y_basis: None,
            transform: TransformOptions::default(),
            cmap: default_cmap(),
            pos_def: false,
            vmin: None,
            vmax: None,
            vector_ind: None,
            label: None,
        }
    }
}

/// Coordinate cache of a panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Uninitialized,
    Ready(MeshCoordinates),
}

/// A colormesh of one task.
#[derive(Debug, Clone)]
pub struct Colormesh {
    task: String,
    geometry: Geometry,
    options: ColormeshOptions,
    cmap: Colormap,
    state: PanelState,
}

impl Colormesh {
    /// Create a panel for this build's rendering capabilities.
    pub fn new(
        task: impl Into<String>,
        geometry: Geometry,
        options: ColormeshOptions,
    ) -> Result<Self> {
        Self::with_capabilities(task, geometry, options, &RenderCapabilities::default())
    }

    /// Create a panel, failing when `capabilities` cannot draw `geometry`
    /// or the colormap is unknown.
    pub fn with_capabilities(
        task: impl Into<String>,
        geometry: Geometry,
        options: ColormeshOptions,
        capabilities: &RenderCapabilities,
    ) -> Result<Self> {
        let task = task.into();
        if geometry.requires_geographic() && !capabilities.geographic {
            return Err(SliceError::MissingCapability(format!(
                "{} colormesh of '{}' needs geographic projection support",
                geometry.name(),
                task
            )));
        }
        let cmap = Colormap::from_name(&options.cmap)?;
        Ok(Self {
            task,
            geometry,
            options,
            cmap,
            state: PanelState::Uninitialized,
        })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn options(&self) -> &ColormeshOptions {
        &self.options
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn x_basis(&self) -> &str {
        self.options
            .x_basis
            .as_deref()
            .unwrap_or(self.geometry.default_bases().0)
    }

    pub fn y_basis(&self) -> &str {
        self.options
            .y_basis
            .as_deref()
            .unwrap_or(self.geometry.default_bases().1)
    }

    /// Text drawn in the colorbar axes.
    pub fn colorbar_label(&self) -> String {
        match (&self.options.label, self.options.vector_ind) {
            (Some(label), _) => label.clone(),
            (None, Some(ind)) => format!("{}[{}]", self.task, ind),
            (None, None) => self.task.clone(),
        }
    }

    /// Compute and cache mesh coordinates from `dset` on first use.
    ///
    /// Coordinates whose basis lengths disagree with `field_shape` are not
    /// cached.
    fn ensure_coordinates(&mut self, dset: &Dataset, field_shape: [usize; 2]) -> Result<()> {
        if let PanelState::Uninitialized = self.state {
            let coords = self.geometry.coordinates(dset, self.x_basis(), self.y_basis())?;
            self.check_basis_shape(field_shape, coords.basis_shape)?;
            debug!(
                task = %self.task,
                geometry = self.geometry.name(),
                shape = ?coords.xx.shape(),
                "Computed mesh coordinates"
            );
            self.state = PanelState::Ready(coords);
        }
        Ok(())
    }

    fn check_basis_shape(&self, field_shape: [usize; 2], basis_shape: [usize; 2]) -> Result<()> {
        if field_shape == basis_shape {
            return Ok(());
        }
        Err(SliceError::shape_mismatch(format!(
            "task '{}' field {:?} does not match bases '{}' x '{}' {:?}",
            self.task,
            field_shape,
            self.x_basis(),
            self.y_basis(),
            basis_shape
        )))
    }

    /// Draw write `ni` of `dset` into `ax` with its colorbar in `cax`.
    pub fn plot(
        &mut self,
        ax: &mut Axes,
        cax: &mut ColorbarAxes,
        dset: &Dataset,
        ni: usize,
    ) -> Result<(MeshHandle, Colorbar)> {
        if matches!(self.state, PanelState::Uninitialized)
            && !self.geometry.suits(&ax.projection())
        {
            warn!(
                task = %self.task,
                geometry = self.geometry.name(),
                axes = ax.key(),
                projection = ax.projection().name(),
                "Axes projection does not match panel geometry"
            );
        }

        let field = dset.field(ni, self.options.vector_ind)?;
        self.ensure_coordinates(dset, field.shape())?;
        let PanelState::Ready(coords) = &self.state else {
            return Err(SliceError::render("mesh coordinates were not computed"));
        };
        self.check_basis_shape(field.shape(), coords.basis_shape)?;

        let field = self.geometry.pad_field(transform(&field, &self.options.transform));
        let lim = limits(&field, self.options.pos_def, self.options.vmin, self.options.vmax)?;

        let style = MeshStyle {
            cmap: self.cmap.clone(),
            vmin: lim.vmin,
            vmax: lim.vmax,
            transform: self.geometry.data_transform(),
        };
        let handle = ax.pcolormesh(&coords.xx, &coords.yy, field, style)?;

        let cb = cax.colorbar(self.cmap.clone(), lim.vmin, lim.vmax);
        cb.set_ticks(&[lim.vmin, lim.vmax]);
        cb.set_ticklabels(&[format_sci(lim.vmin, 2), format_sci(lim.vmax, 2)]);
        let colorbar = cb.clone();
        cax.text(0.5, 0.5, self.colorbar_label());

        self.geometry.decorate(ax);
        Ok((handle, colorbar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{AxesProjection, Rect};
    use test_utils::{create_cartesian_dataset, create_disk_dataset, create_vector_dataset};

    fn cell(projection: AxesProjection) -> (Axes, ColorbarAxes) {
        (
            Axes::new("ax_0-0", Rect::new(0.1, 0.1, 0.8, 0.7), projection),
            ColorbarAxes::new("ax_0-0", Rect::new(0.1, 0.85, 0.8, 0.05)),
        )
    }

    #[test]
    fn test_label_fallbacks() {
        let plain = Colormesh::new("T", Geometry::Cartesian, ColormeshOptions::default()).unwrap();
        assert_eq!(plain.colorbar_label(), "T");

        let vector = Colormesh::new(
            "u",
            Geometry::Cartesian,
            ColormeshOptions {
                vector_ind: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(vector.colorbar_label(), "u[2]");

        let labelled = Colormesh::new(
            "u",
            Geometry::Cartesian,
            ColormeshOptions {
                vector_ind: Some(2),
                label: Some("w".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(labelled.colorbar_label(), "w");
    }

    #[test]
    fn test_default_bases_follow_geometry() {
        let panel =
            Colormesh::new("T", Geometry::polar(None, None), ColormeshOptions::default()).unwrap();
        assert_eq!((panel.x_basis(), panel.y_basis()), ("phi", "r"));
        let panel = Colormesh::new(
            "T",
            Geometry::Cartesian,
            ColormeshOptions {
                y_basis: Some("y".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!((panel.x_basis(), panel.y_basis()), ("x", "y"));
    }

    #[test]
    fn test_unknown_colormap() {
        let options = ColormeshOptions {
            cmap: "not_a_map".into(),
            ..Default::default()
        };
        assert!(matches!(
            Colormesh::new("T", Geometry::Cartesian, options),
            Err(SliceError::UnknownColormap(_))
        ));
    }

    #[test]
    fn test_orthographic_needs_capability() {
        let result = Colormesh::with_capabilities(
            "T",
            Geometry::Orthographic,
            ColormeshOptions::default(),
            &RenderCapabilities { geographic: false },
        );
        assert!(matches!(result, Err(SliceError::MissingCapability(_))));
    }

    #[test]
    fn test_plot_draws_mesh_and_colorbar() {
        let dset = create_cartesian_dataset("b", 8, 4, 2);
        let mut panel =
            Colormesh::new("b", Geometry::Cartesian, ColormeshOptions::default()).unwrap();
        let (mut ax, mut cax) = cell(AxesProjection::Rectilinear);

        assert_eq!(*panel.state(), PanelState::Uninitialized);
        let (handle, cb) = panel.plot(&mut ax, &mut cax, &dset, 1).unwrap();
        assert!(matches!(panel.state(), PanelState::Ready(_)));

        assert_eq!(handle.cells, [8, 4]);
        assert_eq!(handle.vmin, -handle.vmax);
        assert_eq!(cb.ticks, vec![handle.vmin, handle.vmax]);
        assert_eq!(cb.tick_labels.len(), 2);
        assert_eq!(cb.tick_labels[1], format_sci(handle.vmax, 2));
        assert_eq!(cax.texts()[0].text, "b");
        assert!(ax.ticks_visible());
    }

    #[test]
    fn test_coordinates_are_cached() {
        let dset = create_disk_dataset("T", 16, 4, 2);
        let mut panel =
            Colormesh::new("T", Geometry::polar(None, None), ColormeshOptions::default()).unwrap();
        let (mut ax, mut cax) = cell(AxesProjection::Polar);
        panel.plot(&mut ax, &mut cax, &dset, 0).unwrap();
        let first = panel.state().clone();

        // A dataset without bases still plots: coordinates come from the cache
        let mut stripped = dset.clone();
        stripped.bases.clear();
        panel.plot(&mut ax, &mut cax, &stripped, 1).unwrap();
        assert_eq!(*panel.state(), first);
        assert!(!ax.ticks_visible());
    }

    #[test]
    fn test_vector_component_selection() {
        let dset = create_vector_dataset("u", 4, 3, 1);
        let options = ColormeshOptions {
            vector_ind: Some(1),
            pos_def: true,
            ..Default::default()
        };
        let mut panel = Colormesh::new("u", Geometry::Cartesian, options).unwrap();
        let (mut ax, mut cax) = cell(AxesProjection::Rectilinear);
        let (handle, _) = panel.plot(&mut ax, &mut cax, &dset, 0).unwrap();
        // Component 1 is 200 everywhere
        assert_eq!((handle.vmin, handle.vmax), (0.0, 200.0));
        assert_eq!(cax.texts()[0].text, "u[1]");
    }

    #[test]
    fn test_missing_component_is_an_error() {
        let dset = create_vector_dataset("u", 4, 3, 1);
        let options = ColormeshOptions {
            vector_ind: Some(3),
            ..Default::default()
        };
        let mut panel = Colormesh::new("u", Geometry::Cartesian, options).unwrap();
        let (mut ax, mut cax) = cell(AxesProjection::Rectilinear);
        assert!(matches!(
            panel.plot(&mut ax, &mut cax, &dset, 0),
            Err(SliceError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_basis_length_mismatch() {
        let mut dset = create_cartesian_dataset("b", 8, 4, 1);
        dset.bases.insert("x".into(), vec![0.0; 5]);
        let mut panel =
            Colormesh::new("b", Geometry::Cartesian, ColormeshOptions::default()).unwrap();
        let (mut ax, mut cax) = cell(AxesProjection::Rectilinear);
        assert!(matches!(
            panel.plot(&mut ax, &mut cax, &dset, 0),
            Err(SliceError::ShapeMismatch(_))
        ));
        assert_eq!(*panel.state(), PanelState::Uninitialized);

        // The panel recovers once the bases match the field
        let good = create_cartesian_dataset("b", 8, 4, 1);
        panel.plot(&mut ax, &mut cax, &good, 0).unwrap();
        match panel.state() {
            PanelState::Ready(coords) => assert_eq!(coords.basis_shape, [8, 4]),
            other => panic!("unexpected state {:?}", other),
        }
    }
}

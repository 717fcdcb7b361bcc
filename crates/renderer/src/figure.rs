//! Figures, axes and colorbar axes.
//!
//! A [`Figure`] owns a set of plotting axes and colorbar axes, each placed
//! by a rectangle in figure fractions. Artists are recorded on the axes and
//! only rasterized when the figure is rendered or saved.

use std::path::Path;

use image::{Rgba, RgbaImage};
use projection::{Identity, Mollweide, Orthographic, PlateCarree, Polar, Projection};
use serde::{Deserialize, Serialize};
use slice_common::Field2;
use tracing::{debug, info};

use crate::canvas::{self, PixelRect, Viewport};
use crate::colormap::{Color, Colormap};
use crate::error::{RenderError, Result};
use crate::mesh::QuadMesh;
use crate::png;
use crate::text::{HAlign, TextRenderer, VAlign};

/// The projection of a plotting axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxesProjection {
    #[default]
    Rectilinear,
    /// Data is (angle in radians, radius)
    Polar,
    /// Data is (longitude, latitude) in radians
    Mollweide,
    /// Globe view; data is projected coordinates unless drawn through the
    /// plate-carrée transform
    Orthographic {
        central_longitude: f64,
        central_latitude: f64,
    },
}

impl AxesProjection {
    pub fn name(&self) -> &'static str {
        match self {
            AxesProjection::Rectilinear => "rectilinear",
            AxesProjection::Polar => "polar",
            AxesProjection::Mollweide => "mollweide",
            AxesProjection::Orthographic { .. } => "orthographic",
        }
    }

    /// Whether drawing on this projection needs geographic support.
    pub fn is_geographic(&self) -> bool {
        matches!(self, AxesProjection::Orthographic { .. })
    }
}

/// Coordinate system the data of an artist is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataTransform {
    /// The native data coordinates of the axes projection
    #[default]
    Axes,
    /// Longitude/latitude in degrees
    PlateCarree,
}

/// Optional rendering capabilities of this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCapabilities {
    /// Geographic projections (orthographic globes)
    pub geographic: bool,
}

impl Default for RenderCapabilities {
    fn default() -> Self {
        Self {
            geographic: cfg!(feature = "geographic"),
        }
    }
}

impl RenderCapabilities {
    pub fn supports(&self, projection: &AxesProjection) -> bool {
        !projection.is_geographic() || self.geographic
    }

    /// Error unless `projection` can be drawn.
    pub fn require(&self, projection: &AxesProjection) -> Result<()> {
        if self.supports(projection) {
            Ok(())
        } else {
            Err(RenderError::UnsupportedProjection(format!(
                "{} axes need geographic projection support",
                projection.name()
            )))
        }
    }
}

/// Rectangle in figure fractions, measured from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    fn to_pixels(self, width: f64, height: f64) -> PixelRect {
        PixelRect::new(
            self.left * width,
            (1.0 - self.bottom - self.height) * height,
            self.width * width,
            self.height * height,
        )
    }
}

/// Style of a pseudocolor mesh.
#[derive(Debug, Clone)]
pub struct MeshStyle {
    pub cmap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    pub transform: DataTransform,
}

/// Handle to a mesh drawn on an axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHandle {
    pub index: usize,
    pub vmin: f64,
    pub vmax: f64,
    pub cells: [usize; 2],
}

#[derive(Debug, Clone)]
struct DrawnMesh {
    mesh: QuadMesh,
    transform: DataTransform,
}

/// A plotting axes.
#[derive(Debug, Clone)]
pub struct Axes {
    key: String,
    rect: Rect,
    projection: AxesProjection,
    meshes: Vec<DrawnMesh>,
    aspect_equal: bool,
    ticks_visible: bool,
    gridlines: bool,
}

impl Axes {
    pub fn new(key: impl Into<String>, rect: Rect, projection: AxesProjection) -> Self {
        Self {
            key: key.into(),
            rect,
            projection,
            meshes: Vec::new(),
            aspect_equal: false,
            ticks_visible: true,
            gridlines: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn projection(&self) -> AxesProjection {
        self.projection
    }

    /// Draw a pseudocolor quad mesh.
    pub fn pcolormesh(
        &mut self,
        xx: &Field2,
        yy: &Field2,
        values: Field2,
        style: MeshStyle,
    ) -> Result<MeshHandle> {
        let subdivisions = match self.projection {
            AxesProjection::Rectilinear => 1,
            _ => 4,
        };
        let mesh = QuadMesh::new(xx, yy, values, style.cmap, style.vmin, style.vmax)?
            .with_subdivisions(subdivisions);
        let handle = MeshHandle {
            index: self.meshes.len(),
            vmin: style.vmin,
            vmax: style.vmax,
            cells: mesh.cells(),
        };
        self.meshes.push(DrawnMesh {
            mesh,
            transform: style.transform,
        });
        Ok(handle)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &QuadMesh> {
        self.meshes.iter().map(|d| &d.mesh)
    }

    pub fn set_aspect_equal(&mut self) {
        self.aspect_equal = true;
    }

    pub fn hide_ticks(&mut self) {
        self.ticks_visible = false;
    }

    pub fn ticks_visible(&self) -> bool {
        self.ticks_visible
    }

    pub fn gridlines(&mut self) {
        self.gridlines = true;
    }

    pub fn has_gridlines(&self) -> bool {
        self.gridlines
    }

    /// Remove all artists and decorations set since the last clear.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.aspect_equal = false;
        self.ticks_visible = true;
        self.gridlines = false;
    }

    /// The projection chain for one drawn mesh, and whether it fixes the
    /// projected extent.
    fn data_projection(&self, transform: DataTransform, r_max: f64) -> Box<dyn Projection> {
        match (self.projection, transform) {
            (AxesProjection::Rectilinear, DataTransform::Axes) => Box::new(Identity),
            (AxesProjection::Rectilinear, DataTransform::PlateCarree) => Box::new(PlateCarree),
            (AxesProjection::Polar, _) => Box::new(Polar::new(0.0, Some(r_max))),
            (AxesProjection::Mollweide, _) => Box::new(Mollweide),
            (AxesProjection::Orthographic { .. }, DataTransform::Axes) => Box::new(Identity),
            (
                AxesProjection::Orthographic {
                    central_longitude,
                    central_latitude,
                },
                DataTransform::PlateCarree,
            ) => Box::new(Orthographic::new(central_longitude, central_latitude)),
        }
    }

    /// Largest radius over all meshes (polar axes).
    fn max_radius(&self) -> f64 {
        self.meshes
            .iter()
            .flat_map(|d| d.mesh.corners().1.as_slice().iter().copied())
            .filter(|r| r.is_finite())
            .fold(0.0_f64, |acc, r| acc.max(r.abs()))
    }

    fn render(&self, img: &mut RgbaImage, figure_px: (f64, f64)) {
        let rect = self.rect.to_pixels(figure_px.0, figure_px.1);
        let r_max = match self.max_radius() {
            r if r > 0.0 => r,
            _ => 1.0,
        };
        let frame_projection = self.data_projection(DataTransform::PlateCarree, r_max);

        let extent = match (self.projection, frame_projection.domain()) {
            (AxesProjection::Rectilinear, _) | (_, None) => self
                .meshes
                .iter()
                .filter_map(|d| {
                    d.mesh
                        .projected_extent(self.data_projection(d.transform, r_max).as_ref())
                })
                .reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])
                .unwrap_or([0.0, 0.0, 1.0, 1.0]),
            (_, Some(domain)) => domain,
        };
        let equal = self.aspect_equal || self.projection != AxesProjection::Rectilinear;
        let view = Viewport::new(extent, rect, equal);

        for drawn in &self.meshes {
            let proj = self.data_projection(drawn.transform, r_max);
            drawn.mesh.rasterize(img, proj.as_ref(), &view);
        }
        self.render_frame(img, &view);
    }

    fn render_frame(&self, img: &mut RgbaImage, view: &Viewport) {
        let (cx, cy) = view.rect.center();
        let (rx, ry) = (view.rect.width / 2.0, view.rect.height / 2.0);
        match self.projection {
            AxesProjection::Rectilinear => {
                canvas::stroke_rect(img, view.rect, Color::BLACK);
                if self.ticks_visible {
                    self.render_ticks(img, view);
                }
            }
            AxesProjection::Polar | AxesProjection::Mollweide => {
                canvas::stroke_ellipse(img, (cx, cy), rx, ry, Color::BLACK);
            }
            AxesProjection::Orthographic {
                central_longitude,
                central_latitude,
            } => {
                canvas::stroke_ellipse(img, (cx, cy), rx, ry, Color::BLACK);
                if self.gridlines {
                    let globe = Orthographic::new(central_longitude, central_latitude);
                    render_graticule(img, &globe, view);
                }
            }
        }
    }

    fn render_ticks(&self, img: &mut RgbaImage, view: &Viewport) {
        const TICKS: usize = 5;
        let len = 4.0;
        let r = view.rect;
        for k in 0..TICKS {
            let f = k as f64 / (TICKS - 1) as f64;
            let x = r.x + f * (r.width - 1.0);
            let y = r.y + f * (r.height - 1.0);
            let bottom = r.bottom() - 1.0;
            canvas::draw_line(img, (x, bottom), (x, bottom - len), Color::BLACK);
            canvas::draw_line(img, (r.x, y), (r.x + len, y), Color::BLACK);
        }
    }
}

/// Longitude/latitude lines every 30 degrees on a globe.
fn render_graticule(img: &mut RgbaImage, globe: &Orthographic, view: &Viewport) {
    let grey = Color::new(128, 128, 128, 160);
    let polyline = |img: &mut RgbaImage, points: Vec<(f64, f64)>| {
        let projected: Vec<Option<(f64, f64)>> = points
            .into_iter()
            .map(|(lon, lat)| globe.forward(lon, lat).map(|(x, y)| view.to_pixel(x, y)))
            .collect();
        for pair in projected.windows(2) {
            if let (Some(a), Some(b)) = (pair[0], pair[1]) {
                canvas::draw_line(img, a, b, grey);
            }
        }
    };
    for lon in (-180..180).step_by(30) {
        let points = (-90..=90).map(|lat| (lon as f64, lat as f64)).collect();
        polyline(img, points);
    }
    for lat in (-60..=60).step_by(30) {
        let points = (-180..=180).map(|lon| (lon as f64, lat as f64)).collect();
        polyline(img, points);
    }
}

/// A horizontal colorbar.
#[derive(Debug, Clone)]
pub struct Colorbar {
    pub cmap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl Colorbar {
    pub fn new(cmap: Colormap, vmin: f64, vmax: f64) -> Self {
        Self {
            cmap,
            vmin,
            vmax,
            ticks: Vec::new(),
            tick_labels: Vec::new(),
        }
    }

    pub fn set_ticks(&mut self, ticks: &[f64]) {
        self.ticks = ticks.to_vec();
    }

    pub fn set_ticklabels(&mut self, labels: &[String]) {
        self.tick_labels = labels.to_vec();
    }
}

/// Text placed in axes fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesText {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Axes holding a colorbar and its label.
#[derive(Debug, Clone)]
pub struct ColorbarAxes {
    key: String,
    rect: Rect,
    colorbar: Option<Colorbar>,
    texts: Vec<AxesText>,
}

impl ColorbarAxes {
    pub fn new(key: impl Into<String>, rect: Rect) -> Self {
        Self {
            key: key.into(),
            rect,
            colorbar: None,
            texts: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Draw a colorbar for a mesh, replacing any previous colorbar.
    pub fn colorbar(&mut self, cmap: Colormap, vmin: f64, vmax: f64) -> &mut Colorbar {
        self.colorbar.insert(Colorbar::new(cmap, vmin, vmax))
    }

    pub fn current_colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }

    /// Add centred text at axes fractions `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>) {
        self.texts.push(AxesText {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn texts(&self) -> &[AxesText] {
        &self.texts
    }

    pub fn clear(&mut self) {
        self.colorbar = None;
        self.texts.clear();
    }

    fn render(
        &self,
        img: &mut RgbaImage,
        figure_px: (f64, f64),
        font: Option<&TextRenderer>,
        font_size: f32,
    ) {
        let rect = self.rect.to_pixels(figure_px.0, figure_px.1);
        if let Some(cb) = &self.colorbar {
            let columns = rect.width.round().max(1.0) as usize;
            for c in 0..columns {
                let t = (c as f32 + 0.5) / columns as f32;
                let strip = PixelRect::new(rect.x + c as f64, rect.y, 1.0, rect.height);
                canvas::fill_rect(img, strip, cb.cmap.at(t));
            }
            canvas::stroke_rect(img, rect, Color::BLACK);

            let range = cb.vmax - cb.vmin;
            for (k, &tick) in cb.ticks.iter().enumerate() {
                let f = if range.abs() > 0.0 && range.is_finite() {
                    ((tick - cb.vmin) / range).clamp(0.0, 1.0)
                } else {
                    k as f64 / (cb.ticks.len().max(2) - 1) as f64
                };
                let x = rect.x + f * (rect.width - 1.0);
                // Ticks point into the bar from its bottom edge
                let bottom = rect.bottom();
                canvas::draw_line(img, (x, bottom - 1.0), (x, bottom - 4.0), Color::BLACK);
                if let (Some(font), Some(label)) = (font, cb.tick_labels.get(k)) {
                    let halign = if k == 0 {
                        HAlign::Left
                    } else if k + 1 == cb.ticks.len() {
                        HAlign::Right
                    } else {
                        HAlign::Center
                    };
                    let anchor = (halign, VAlign::Top);
                    font.draw(img, label, (x, bottom + 2.0), font_size, Color::BLACK, anchor);
                }
            }
        }
        if let Some(font) = font {
            for t in &self.texts {
                let x = rect.x + t.x * rect.width;
                let y = rect.y + (1.0 - t.y) * rect.height;
                let anchor = (HAlign::Center, VAlign::Center);
                font.draw(img, &t.text, (x, y), font_size, Color::BLACK, anchor);
            }
        }
    }
}

/// Options for [`Figure::savefig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    /// Pixels per inch
    pub dpi: u32,
    /// Crop the image to its content plus a small pad
    pub bbox_tight: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            bbox_tight: true,
        }
    }
}

/// A composite figure.
#[derive(Debug, Clone)]
pub struct Figure {
    width_in: f64,
    height_in: f64,
    axes: Vec<Axes>,
    cbar_axes: Vec<ColorbarAxes>,
    suptitle: Option<String>,
    font: Option<TextRenderer>,
    font_size_pt: f32,
}

impl Figure {
    /// Create an empty figure of the given size in inches.
    pub fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
            axes: Vec::new(),
            cbar_axes: Vec::new(),
            suptitle: None,
            font: None,
            font_size_pt: 9.0,
        }
    }

    pub fn size_inches(&self) -> (f64, f64) {
        (self.width_in, self.height_in)
    }

    /// Font used for all text; without one, text artists are recorded but
    /// not rasterized.
    pub fn set_font(&mut self, font: Option<TextRenderer>) {
        self.font = font;
    }

    pub fn add_axes(&mut self, axes: Axes) {
        self.axes.push(axes);
    }

    pub fn add_cbar_axes(&mut self, cax: ColorbarAxes) {
        self.cbar_axes.push(cax);
    }

    pub fn axes(&self, key: &str) -> Option<&Axes> {
        self.axes.iter().find(|a| a.key == key)
    }

    pub fn cbar_axes(&self, key: &str) -> Option<&ColorbarAxes> {
        self.cbar_axes.iter().find(|a| a.key == key)
    }

    pub fn axes_keys(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.key.as_str())
    }

    /// Mutable access to the axes and colorbar axes sharing `key`.
    pub fn axes_pair_mut(&mut self, key: &str) -> Result<(&mut Axes, &mut ColorbarAxes)> {
        let ax = self
            .axes
            .iter_mut()
            .find(|a| a.key == key)
            .ok_or_else(|| RenderError::AxesNotFound(key.to_string()))?;
        let cax = self
            .cbar_axes
            .iter_mut()
            .find(|a| a.key == key)
            .ok_or_else(|| RenderError::AxesNotFound(format!("colorbar {}", key)))?;
        Ok((ax, cax))
    }

    pub fn suptitle(&mut self, title: impl Into<String>) {
        self.suptitle = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.suptitle.as_deref()
    }

    /// Clear every axes, colorbar axes and the title.
    pub fn clear_all(&mut self) {
        self.axes.iter_mut().for_each(Axes::clear);
        self.cbar_axes.iter_mut().for_each(ColorbarAxes::clear);
        self.suptitle = None;
    }

    /// Rasterize the figure at `dpi`.
    pub fn render(&self, dpi: u32) -> RgbaImage {
        let width = (self.width_in * dpi as f64).round().max(1.0);
        let height = (self.height_in * dpi as f64).round().max(1.0);
        let mut img =
            RgbaImage::from_pixel(width as u32, height as u32, Rgba(Color::WHITE.to_rgba()));
        let font_px = self.font_size_pt * dpi as f32 / 72.0;

        for ax in &self.axes {
            ax.render(&mut img, (width, height));
        }
        for cax in &self.cbar_axes {
            cax.render(&mut img, (width, height), self.font.as_ref(), font_px);
        }
        if let (Some(title), Some(font)) = (&self.suptitle, &self.font) {
            font.draw(
                &mut img,
                title,
                (width / 2.0, 0.02 * height),
                font_px * 1.2,
                Color::BLACK,
                (HAlign::Center, VAlign::Top),
            );
        } else if self.suptitle.is_some() {
            debug!("no font configured, title not drawn");
        }
        img
    }

    /// Render and write the figure as a PNG file.
    pub fn savefig(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let mut img = self.render(options.dpi);
        if options.bbox_tight {
            let pad = (0.1 * options.dpi as f64).round() as u32;
            img = canvas::crop_to_content(&img, Color::WHITE, pad);
        }
        let bytes = png::encode_image(&img, options.dpi)?;
        std::fs::write(path, &bytes)?;
        info!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            bytes = bytes.len(),
            "Saved figure"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_axes_figure(projection: AxesProjection) -> Figure {
        let mut fig = Figure::new(2.0, 2.0);
        fig.add_axes(Axes::new("ax_0-0", Rect::new(0.1, 0.1, 0.8, 0.7), projection));
        fig.add_cbar_axes(ColorbarAxes::new("ax_0-0", Rect::new(0.1, 0.85, 0.8, 0.05)));
        fig
    }

    fn style(name: &str) -> MeshStyle {
        MeshStyle {
            cmap: Colormap::from_name(name).unwrap(),
            vmin: 0.0,
            vmax: 1.0,
            transform: DataTransform::Axes,
        }
    }

    #[test]
    fn test_default_projection_is_rectilinear() {
        assert_eq!(AxesProjection::default(), AxesProjection::Rectilinear);
        assert!(!AxesProjection::default().is_geographic());
    }

    #[test]
    fn test_capabilities() {
        let without = RenderCapabilities { geographic: false };
        let ortho = AxesProjection::Orthographic {
            central_longitude: 0.0,
            central_latitude: 0.0,
        };
        assert!(without.supports(&AxesProjection::Mollweide));
        assert!(!without.supports(&ortho));
        assert!(matches!(
            without.require(&ortho),
            Err(RenderError::UnsupportedProjection(_))
        ));
        assert!(RenderCapabilities { geographic: true }.require(&ortho).is_ok());
    }

    #[test]
    fn test_pcolormesh_records_handle_and_clear_resets() {
        let mut fig = single_axes_figure(AxesProjection::Rectilinear);
        let (ax, cax) = fig.axes_pair_mut("ax_0-0").unwrap();
        let (xx, yy) = Field2::meshgrid(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
        let handle = ax
            .pcolormesh(&xx, &yy, Field2::zeros(3, 2), style("viridis"))
            .unwrap();
        assert_eq!(handle.index, 0);
        assert_eq!(handle.cells, [3, 2]);
        cax.colorbar(Colormap::from_name("viridis").unwrap(), 0.0, 1.0);
        cax.text(0.5, 0.5, "T");
        ax.set_aspect_equal();

        fig.clear_all();
        let ax = fig.axes("ax_0-0").unwrap();
        assert_eq!(ax.meshes().count(), 0);
        assert!(fig.cbar_axes("ax_0-0").unwrap().current_colorbar().is_none());
        assert!(fig.cbar_axes("ax_0-0").unwrap().texts().is_empty());
    }

    #[test]
    fn test_missing_axes_key() {
        let mut fig = single_axes_figure(AxesProjection::Rectilinear);
        assert!(matches!(
            fig.axes_pair_mut("ax_1-0"),
            Err(RenderError::AxesNotFound(_))
        ));
    }

    #[test]
    fn test_render_size_follows_dpi() {
        let fig = single_axes_figure(AxesProjection::Rectilinear);
        assert_eq!(fig.render(50).dimensions(), (100, 100));
    }

    #[test]
    fn test_polar_mesh_paints_disk_centre() {
        let mut fig = single_axes_figure(AxesProjection::Polar);
        let (ax, _) = fig.axes_pair_mut("ax_0-0").unwrap();
        let phi: Vec<f64> = (0..=16).map(|k| k as f64 * std::f64::consts::PI / 8.0).collect();
        let (xx, yy) = Field2::meshgrid(&phi, &[0.0, 1.0]);
        ax.pcolormesh(&xx, &yy, Field2::from_fn(16, 1, |_, _| 1.0), style("Greys"))
            .unwrap();

        let img = fig.render(50);
        // Axes rect spans x 10..90, y 20..90; the disk centre is black
        assert_eq!(img.get_pixel(50, 55).0, [0, 0, 0, 255]);
        // Outside the disk stays white
        assert_eq!(img.get_pixel(12, 22).0, [255, 255, 255, 255]);
    }
}

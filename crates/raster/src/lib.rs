#![deny(unsafe_code)]
//! CPU raster backend for canvas-nest: an in-memory overlay surface, a host
//! that owns it and PNG snapshots of what it shows.
//!
//! This crate lets the core run without a browser. The CLI attaches a nest
//! to a [`RasterHost`], drives frames by hand and writes the overlay out
//! with [`snapshot::write_png`].

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use canvas_nest_core::color::ColorChannels;
use canvas_nest_core::error::NestError;
use canvas_nest_core::nest::{Host, OverlayStyle};
use canvas_nest_core::pointer::FixedGeometry;
use canvas_nest_core::surface::{LineStyle, Surface};
use canvas_nest_core::DVec2;

use crate::pixel::Pixmap;

/// An overlay rasterized into a [`Pixmap`].
///
/// Drawing ignores the overlay opacity, exactly like a canvas whose element
/// carries a CSS opacity; it is applied when the pixels are exported.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    opacity: f64,
}

impl RasterSurface {
    pub fn new(width: usize, height: usize, opacity: f64) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            opacity,
        }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// The overlay as it would appear on screen: opacity applied and, if
    /// given, composited over an opaque `background`.
    pub fn to_rgba8(&self, background: Option<ColorChannels>) -> Vec<u8> {
        self.pixmap.flatten(background, self.opacity)
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (f64, f64) {
        (self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    fn clear(&mut self) {
        self.pixmap.clear();
    }

    fn fill_square(&mut self, center: DVec2, size: f64, color: ColorChannels) {
        let half = DVec2::splat(size / 2.0);
        self.pixmap.fill_rect(center - half, center + half, color, 1.0);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle) {
        self.pixmap
            .stroke_segment(from, to, style.width, style.color, style.alpha);
    }
}

/// A fixed-size pixel host carrying at most one [`RasterSurface`] overlay.
#[derive(Debug, Clone)]
pub struct RasterHost {
    width: usize,
    height: usize,
    geometry: FixedGeometry,
    overlay: Option<OverlayStyle>,
}

impl RasterHost {
    /// Returns `NestError::InvalidDimensions` if either side is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, NestError> {
        if width == 0 || height == 0 {
            return Err(NestError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            geometry: FixedGeometry::default(),
            overlay: None,
        })
    }

    /// Places the host at `offset` on a page scrolled by `scroll`.
    pub fn with_geometry(mut self, geometry: FixedGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn overlay(&self) -> Option<&OverlayStyle> {
        self.overlay.as_ref()
    }
}

impl Host for RasterHost {
    type Surface = RasterSurface;
    type Geometry = FixedGeometry;

    fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    fn geometry(&self) -> FixedGeometry {
        self.geometry
    }

    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<RasterSurface, NestError> {
        if self.overlay.is_some() {
            return Err(NestError::Host("raster host already has an overlay".into()));
        }
        log::debug!(
            "raster overlay {}x{} (z-index {}, opacity {})",
            self.width,
            self.height,
            style.z_index,
            style.opacity
        );
        self.overlay = Some(*style);
        Ok(RasterSurface::new(self.width, self.height, style.opacity))
    }

    fn remove_overlay(&mut self, _surface: &RasterSurface) {
        self.overlay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_nest_core::animation::ManualScheduler;
    use canvas_nest_core::config::NestConfig;
    use canvas_nest_core::nest::attach;
    use canvas_nest_core::pointer::PointerHub;

    #[test]
    fn zero_sized_host_is_rejected() {
        assert!(matches!(
            RasterHost::new(0, 10),
            Err(NestError::InvalidDimensions)
        ));
        assert!(matches!(
            RasterHost::new(10, 0),
            Err(NestError::InvalidDimensions)
        ));
    }

    #[test]
    fn second_overlay_is_refused() {
        let mut host = RasterHost::new(8, 8).unwrap();
        let style = OverlayStyle {
            z_index: -1,
            opacity: 0.5,
        };
        let surface = host.create_overlay(&style).unwrap();
        assert!(matches!(
            host.create_overlay(&style),
            Err(NestError::Host(_))
        ));
        host.remove_overlay(&surface);
        assert!(host.create_overlay(&style).is_ok());
    }

    #[test]
    fn points_are_two_by_two_squares() {
        let mut s = RasterSurface::new(8, 8, 1.0);
        s.fill_square(DVec2::new(4.0, 4.0), 2.0, ColorChannels::BLACK);
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            assert_eq!(s.pixmap().pixel(x, y), [0, 0, 0, 255]);
        }
        assert_eq!(s.pixmap().pixel(2, 3), [0, 0, 0, 0]);
        assert_eq!(s.pixmap().pixel(5, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn line_alpha_above_one_is_clamped() {
        let mut s = RasterSurface::new(10, 10, 1.0);
        let style = LineStyle {
            strength: 0.9,
            width: 1.0,
            color: ColorChannels::DEFAULT,
            alpha: 1.1,
        };
        s.stroke_line(DVec2::new(0.0, 5.5), DVec2::new(10.0, 5.5), &style);
        assert_eq!(s.pixmap().pixel(5, 5), [0, 255, 255, 255]);
    }

    #[test]
    fn opacity_applies_on_export_only() {
        let mut s = RasterSurface::new(2, 2, 0.5);
        s.fill_square(DVec2::ONE, 2.0, ColorChannels::BLACK);
        assert_eq!(s.pixmap().pixel(0, 0)[3], 255);
        assert_eq!(&s.to_rgba8(None)[..4], &[0, 0, 0, 128]);
        assert_eq!(
            &s.to_rgba8(Some(ColorChannels::new(255, 255, 255)))[..4],
            &[128, 128, 128, 255]
        );
    }

    #[test]
    fn clear_erases_previous_frame() {
        let mut s = RasterSurface::new(4, 4, 1.0);
        s.fill_square(DVec2::splat(2.0), 2.0, ColorChannels::BLACK);
        s.clear();
        assert!(s.to_rgba8(None).iter().all(|&b| b == 0));
    }

    #[test]
    fn nest_draws_into_raster_overlay() {
        let config = NestConfig {
            count: 40,
            ..NestConfig::default()
        };
        let scheduler = ManualScheduler::new();
        let nest = attach(
            RasterHost::new(64, 48).unwrap(),
            &config,
            scheduler.clone(),
            PointerHub::new(),
            7,
        )
        .unwrap();
        assert_eq!(nest.host().overlay().map(|o| o.opacity), Some(0.5));

        scheduler.run_frames(3);
        assert_eq!(nest.frames(), 3);
        let painted = nest.with_surface(|s| s.to_rgba8(None).chunks(4).filter(|p| p[3] > 0).count());
        assert!(painted > 0);

        let host = nest.destroy();
        assert!(host.overlay().is_none());
    }
}

//! PNG snapshots of a [`RasterSurface`].
//!
//! This module is feature-gated behind `png` (default on) so that consumers
//! that only need the pixels can skip the `image` crate. The compositing
//! itself lives in [`crate::pixel`] (always available).

use canvas_nest_core::color::ColorChannels;
use canvas_nest_core::error::NestError;
use std::path::Path;

use crate::RasterSurface;

/// Writes the overlay as it appears on screen to a PNG file.
///
/// With `background` the image is opaque, otherwise it keeps the overlay's
/// transparency. Returns `NestError::InvalidDimensions` if the surface is
/// too large for a PNG, or `NestError::Io` on write failure.
pub fn write_png(
    surface: &RasterSurface,
    background: Option<ColorChannels>,
    path: &Path,
) -> Result<(), NestError> {
    let pixmap = surface.pixmap();
    let w = u32::try_from(pixmap.width()).map_err(|_| NestError::InvalidDimensions)?;
    let h = u32::try_from(pixmap.height()).map_err(|_| NestError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.to_rgba8(background))
        .ok_or_else(|| NestError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| NestError::Io(e.to_string()))?;
    log::info!("wrote {w}x{h} snapshot to {}", path.display());
    Ok(())
}

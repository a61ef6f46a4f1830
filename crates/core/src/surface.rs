//! The drawing surface the renderer paints on.
//!
//! Backends: a browser 2D canvas context (wasm crate), a CPU raster buffer
//! (raster crate) and [`RecordingSurface`], which keeps the draw calls for
//! inspection.

use glam::DVec2;

use crate::color::ColorChannels;

/// Stroke parameters of one link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Proximity in [0, 1): 0 at the link radius, approaching 1 as the
    /// endpoints meet.
    pub strength: f64,
    pub width: f64,
    pub color: ColorChannels,
    /// Unclamped; backends clamp to [0, 1] when painting.
    pub alpha: f64,
}

/// A 2D drawing target.
pub trait Surface {
    /// Drawable size in surface units.
    fn size(&self) -> (f64, f64);

    /// Erases the whole surface to transparent.
    fn clear(&mut self);

    /// Fills a `size x size` square centered on `center`.
    fn fill_square(&mut self, center: DVec2, size: f64, color: ColorChannels);

    /// Strokes a straight segment.
    fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle);
}

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Square {
        center: DVec2,
        size: f64,
        color: ColorChannels,
    },
    Line {
        from: DVec2,
        to: DVec2,
        style: LineStyle,
    },
}

/// A surface that only records what was drawn since the last clear.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            clears: 0,
        }
    }

    /// Commands since (and including) the most recent clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Total number of clears, i.e. frames started.
    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn lines(&self) -> impl Iterator<Item = (DVec2, DVec2, &LineStyle)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, style } => Some((*from, *to, style)),
            _ => None,
        })
    }

    pub fn squares(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Square { center, .. } => Some(*center),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.clears += 1;
    }

    fn fill_square(&mut self, center: DVec2, size: f64, color: ColorChannels) {
        self.commands.push(DrawCommand::Square {
            center,
            size,
            color,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            style: *style,
        });
    }
}

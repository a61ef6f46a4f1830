//! Per-frame drawing of particles and proximity links.
//!
//! Each tick advances every particle, paints it, and tests it against every
//! later entry of the sequence `particles ++ [pointer]`. Restricting tests to
//! later entries evaluates each unordered pair exactly once, an O(n^2) scan
//! sized for tens to low hundreds of particles.
//!
//! Links are tested against the *later* endpoint's radius, so a particle
//! reaches further toward the pointer than toward another particle.

use glam::DVec2;

use crate::color::ColorChannels;
use crate::config::NestConfig;
use crate::field::{advance, ParticleField};
use crate::point::{dist_sq, PointerPoint};
use crate::surface::{LineStyle, Surface};

/// Drawing constants taken from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub color: ColorChannels,
    pub point_color: ColorChannels,
    pub point_size: f64,
    pub attraction: f64,
    pub alpha_floor: f64,
    pub line_width_scale: f64,
}

impl RenderStyle {
    pub fn from_config(config: &NestConfig) -> Self {
        Self {
            color: config.color,
            point_color: config.point_color,
            point_size: config.point_size,
            attraction: config.attraction,
            alpha_floor: config.alpha_floor,
            line_width_scale: config.line_width_scale,
        }
    }

    /// Style of a link whose endpoints are `d` apart (squared) against a
    /// squared radius `r`. Only meaningful for `d < r`.
    pub fn link(&self, d: f64, r: f64) -> LineStyle {
        let strength = (r - d) / r;
        LineStyle {
            strength,
            width: strength * self.line_width_scale,
            color: self.color,
            alpha: strength + self.alpha_floor,
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&NestConfig::default())
    }
}

/// What one tick drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub points: usize,
    pub links: usize,
    pub nudges: usize,
}

/// Owns the drawing surface and paints one frame per [`Renderer::draw_tick`].
pub struct Renderer<S> {
    surface: S,
    style: RenderStyle,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S, style: RenderStyle) -> Self {
        Self { surface, style }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Clears the surface, advances and paints every particle, and strokes
    /// every link in range.
    ///
    /// A particle within the pointer's radius but outside half of it is
    /// pulled toward the pointer by `attraction` of the offset before its
    /// link to the pointer is drawn. Nothing links to an absent pointer.
    pub fn draw_tick(&mut self, field: &mut ParticleField, pointer: &PointerPoint) -> TickStats {
        self.surface.clear();

        let (width, height) = (field.width(), field.height());
        let style = self.style;
        let target = pointer.position();
        let pointer_r = pointer.link_radius_sq();
        let mut stats = TickStats {
            points: field.len(),
            ..TickStats::default()
        };

        let points = field.points_mut();
        for i in 0..points.len() {
            let (head, later) = points.split_at_mut(i + 1);
            let p = &mut head[i];

            advance(p, width, height);
            self.surface
                .fill_square(p.position, style.point_size, style.point_color);

            for q in later.iter() {
                let r = q.link_radius_sq();
                let d = dist_sq(p.position, q.position);
                if d < r {
                    self.stroke(p.position, q.position, style.link(d, r));
                    stats.links += 1;
                }
            }

            let Some(target) = target else {
                continue;
            };
            let d = dist_sq(p.position, target);
            if d >= pointer_r {
                continue;
            }
            if d >= pointer_r / 2.0 {
                p.position = attract(p.position, target, style.attraction);
                stats.nudges += 1;
            }
            self.stroke(p.position, target, style.link(d, pointer_r));
            stats.links += 1;
        }

        log::trace!(
            "tick: {} points, {} links, {} nudges",
            stats.points,
            stats.links,
            stats.nudges
        );
        stats
    }

    fn stroke(&mut self, from: DVec2, to: DVec2, line: LineStyle) {
        self.surface.stroke_line(from, to, &line);
    }
}

/// Moves `position` toward `target` by `factor` of the offset between them.
fn attract(position: DVec2, target: DVec2, factor: f64) -> DVec2 {
    position - factor * (position - target)
}

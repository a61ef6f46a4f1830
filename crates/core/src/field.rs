//! The particle field: a fixed set of points drifting in straight lines and
//! reflecting off the four edges of the surface.

use glam::DVec2;

use crate::point::Point;
use crate::prng::Xorshift64;

/// A fixed-size collection of particles inside a `width x height` surface.
///
/// The number of points never changes after construction. The pointer point
/// is not stored here; the renderer treats it as one extra entry after the
/// last particle.
#[derive(Debug, Clone)]
pub struct ParticleField {
    points: Vec<Point>,
    width: f64,
    height: f64,
}

impl ParticleField {
    /// Scatters `count` particles uniformly over `[0, width) x [0, height)`
    /// with each velocity component uniform in `[-max_speed, max_speed)`.
    ///
    /// Negative or non-finite dimensions are treated as 0. `count = 0`
    /// yields an empty field.
    pub fn generate(
        count: usize,
        width: f64,
        height: f64,
        link_radius_sq: f64,
        max_speed: f64,
        rng: &mut Xorshift64,
    ) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);
        let points = (0..count)
            .map(|_| {
                let position = DVec2::new(rng.next_range(0.0, width), rng.next_range(0.0, height));
                let velocity = DVec2::new(
                    rng.next_range(-max_speed, max_speed),
                    rng.next_range(-max_speed, max_speed),
                );
                Point::new(position, velocity, link_radius_sq)
            })
            .collect();
        Self {
            points,
            width,
            height,
        }
    }

    /// Builds a field from explicit points.
    pub fn from_points(points: Vec<Point>, width: f64, height: f64) -> Self {
        Self {
            points,
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Moves `point` by its velocity, then flips each velocity component whose
/// coordinate left `[0, extent]`.
///
/// The point is not pulled back inside; it may sit just outside the bounds
/// for a frame before the flipped velocity returns it.
pub fn advance(point: &mut Point, width: f64, height: f64) {
    point.position += point.velocity;
    if point.position.x < 0.0 || point.position.x > width {
        point.velocity.x = -point.velocity.x;
    }
    if point.position.y < 0.0 || point.position.y > height {
        point.velocity.y = -point.velocity.y;
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

//! Particles and the pointer point they link to.
//!
//! Link radii are stored squared so the per-pair test needs no square root.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;

/// One drifting particle.
///
/// `link_radius_sq` is fixed at construction: it is the squared distance
/// under which an earlier point draws a link to this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: DVec2,
    pub velocity: DVec2,
    link_radius_sq: f64,
}

impl Point {
    pub fn new(position: DVec2, velocity: DVec2, link_radius_sq: f64) -> Self {
        Self {
            position,
            velocity,
            link_radius_sq,
        }
    }

    /// A point with zero velocity.
    pub fn at_rest(x: f64, y: f64, link_radius_sq: f64) -> Self {
        Self::new(DVec2::new(x, y), DVec2::ZERO, link_radius_sq)
    }

    pub fn link_radius_sq(&self) -> f64 {
        self.link_radius_sq
    }
}

/// The pointer as a link endpoint.
///
/// Both coordinates are present or both absent: the position is `None`
/// while the pointer is outside the tracked area or has never moved over it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    position: Option<DVec2>,
    link_radius_sq: f64,
}

impl PointerPoint {
    /// An absent pointer with the given squared link radius.
    pub fn new(link_radius_sq: f64) -> Self {
        Self {
            position: None,
            link_radius_sq,
        }
    }

    pub fn position(&self) -> Option<DVec2> {
        self.position
    }

    pub fn is_present(&self) -> bool {
        self.position.is_some()
    }

    pub fn link_radius_sq(&self) -> f64 {
        self.link_radius_sq
    }

    /// Moves the pointer to surface-local `(x, y)`.
    pub fn set(&mut self, position: DVec2) {
        self.position = Some(position);
    }

    /// Marks the pointer absent.
    pub fn clear(&mut self) {
        self.position = None;
    }
}

/// Pointer point shared between the tracker callbacks (writers) and the
/// renderer (reader). Single-threaded by construction.
pub type SharedPointer = Rc<Cell<PointerPoint>>;

/// Creates an absent shared pointer point.
pub fn shared_pointer(link_radius_sq: f64) -> SharedPointer {
    Rc::new(Cell::new(PointerPoint::new(link_radius_sq)))
}

/// Squared Euclidean distance between two positions.
pub fn dist_sq(a: DVec2, b: DVec2) -> f64 {
    a.distance_squared(b)
}

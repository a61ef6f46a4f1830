#![deny(unsafe_code)]
//! Core of canvas-nest, an ambient particle-link background.
//!
//! A fixed field of drifting particles is drawn on an overlay surface; every
//! pair of particles closer than a link radius is joined by a line whose
//! width and alpha grow with proximity, and particles also link to (and are
//! gently pulled toward) the pointer.
//!
//! Host capabilities are traits the core is generic over: [`Surface`] for
//! drawing, [`FrameScheduler`] for frame callbacks, [`PointerEvents`] for the
//! global pointer handlers and [`Host`] for the element being decorated.
//! [`attach`] wires them together; [`Nest::destroy`] takes them apart.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod nest;
pub mod params;
pub mod point;
pub mod pointer;
pub mod prng;
pub mod renderer;
pub mod surface;

pub use glam::DVec2;

pub use animation::{AnimationLoop, FrameScheduler, ManualScheduler};
pub use color::ColorChannels;
pub use config::NestConfig;
pub use error::NestError;
pub use field::ParticleField;
pub use nest::{attach, HeadlessHost, Host, Nest, OverlayStyle};
pub use point::{Point, PointerPoint, SharedPointer};
pub use pointer::{FixedGeometry, HostGeometry, PointerEvents, PointerHub, PointerTracker};
pub use prng::Xorshift64;
pub use renderer::{RenderStyle, Renderer, TickStats};
pub use surface::{LineStyle, RecordingSurface, Surface};

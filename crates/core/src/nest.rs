//! Attaching a nest to a host surface and tearing it down again.
//!
//! [`attach`] wires the pieces together: it creates the overlay surface on
//! the host, scatters the particles, chains pointer tracking into the
//! host's event registry and starts the animation loop. [`Nest::destroy`]
//! undoes each step and hands the host back.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::{AnimationLoop, FrameScheduler};
use crate::config::NestConfig;
use crate::error::NestError;
use crate::field::ParticleField;
use crate::point::{shared_pointer, PointerPoint, SharedPointer};
use crate::pointer::{FixedGeometry, HostGeometry, PointerEvents, PointerTracker};
use crate::prng::Xorshift64;
use crate::renderer::{RenderStyle, Renderer, TickStats};
use crate::surface::{RecordingSurface, Surface};

/// Styling of the overlay placed over the host.
///
/// The overlay covers the host exactly, is absolutely positioned and does
/// not capture pointer events of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub z_index: i32,
    pub opacity: f64,
}

impl OverlayStyle {
    pub fn from_config(config: &NestConfig) -> Self {
        Self {
            z_index: config.z_index,
            opacity: config.opacity,
        }
    }

    /// The overlay's inline CSS.
    pub fn css(&self) -> String {
        format!(
            "display:block;z-index:{};opacity:{};position:absolute;top:0;left:0;\
             width:100%;height:100%;overflow:hidden;pointer-events:none;",
            self.z_index, self.opacity
        )
    }
}

/// The visual element a nest is attached to.
pub trait Host {
    type Surface: Surface + 'static;
    type Geometry: HostGeometry + 'static;

    /// Client size of the host; the overlay and the field take this size.
    fn size(&self) -> (f64, f64);

    /// Live page position of the host, used to localize pointer events.
    fn geometry(&self) -> Self::Geometry;

    /// Creates the overlay surface and attaches it to the host.
    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<Self::Surface, NestError>;

    /// Detaches the overlay created by [`Host::create_overlay`].
    fn remove_overlay(&mut self, surface: &Self::Surface);
}

struct Scene<S> {
    field: ParticleField,
    renderer: Renderer<S>,
}

/// A running (or stopped) particle-link background attached to a host.
pub struct Nest<H, F, E>
where
    H: Host,
    F: FrameScheduler + 'static,
    E: PointerEvents,
{
    host: H,
    scene: Rc<RefCell<Scene<H::Surface>>>,
    pointer: SharedPointer,
    tracker: PointerTracker<E>,
    animation: AnimationLoop<F>,
    last_stats: Rc<Cell<TickStats>>,
}

/// Attaches a nest to `host` and starts animating it.
///
/// `seed` drives particle placement; equal seeds on equal hosts give equal
/// fields. Returns `NestError::InvalidConfig` / `InvalidDimensions` before
/// touching the host, or the host's own error if the overlay cannot be
/// created.
pub fn attach<H, F, E>(
    mut host: H,
    config: &NestConfig,
    scheduler: F,
    events: E,
    seed: u64,
) -> Result<Nest<H, F, E>, NestError>
where
    H: Host,
    F: FrameScheduler + 'static,
    E: PointerEvents,
{
    config.validate()?;
    let (width, height) = host.size();
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(NestError::InvalidDimensions);
    }

    let surface = host.create_overlay(&OverlayStyle::from_config(config))?;
    let field = ParticleField::generate(
        config.count,
        width,
        height,
        config.point_link_radius_sq,
        config.max_speed,
        &mut Xorshift64::new(seed),
    );
    let scene = Rc::new(RefCell::new(Scene {
        field,
        renderer: Renderer::new(surface, RenderStyle::from_config(config)),
    }));

    let pointer = shared_pointer(config.pointer_link_radius_sq);
    let tracker = PointerTracker::install(events, host.geometry(), Rc::clone(&pointer));

    let last_stats = Rc::new(Cell::new(TickStats::default()));
    let tick = {
        let scene = Rc::clone(&scene);
        let pointer = Rc::clone(&pointer);
        let last_stats = Rc::clone(&last_stats);
        move || {
            let mut scene = scene.borrow_mut();
            let Scene { field, renderer } = &mut *scene;
            last_stats.set(renderer.draw_tick(field, &pointer.get()));
        }
    };
    let animation = AnimationLoop::new(scheduler, tick);
    animation.start();

    log::debug!(
        "nest attached: {} points on {width}x{height}, seed {seed}",
        config.count
    );
    Ok(Nest {
        host,
        scene,
        pointer,
        tracker,
        animation,
        last_stats,
    })
}

impl<H, F, E> Nest<H, F, E>
where
    H: Host,
    F: FrameScheduler + 'static,
    E: PointerEvents,
{
    /// Stops the loop, restores the pointer handlers that existed before
    /// attach, removes the overlay and returns the host.
    pub fn destroy(self) -> H {
        let Self {
            mut host,
            scene,
            tracker,
            animation,
            ..
        } = self;
        animation.stop();
        tracker.teardown();
        host.remove_overlay(scene.borrow().renderer.surface());
        log::debug!("nest destroyed after {} frames", animation.frames());
        host
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current pointer point as the next tick will see it.
    pub fn pointer(&self) -> PointerPoint {
        self.pointer.get()
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Ticks drawn so far.
    pub fn frames(&self) -> u64 {
        self.animation.frames()
    }

    /// What the most recent tick drew.
    pub fn last_stats(&self) -> TickStats {
        self.last_stats.get()
    }

    pub fn scheduler(&self) -> &F {
        self.animation.scheduler()
    }

    /// Restarts ticking after [`stop`](Self::stop).
    pub fn start(&self) {
        self.animation.start();
    }

    /// Pauses ticking; the overlay and pointer tracking stay in place.
    pub fn stop(&self) {
        self.animation.stop();
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&H::Surface) -> R) -> R {
        f(self.scene.borrow().renderer.surface())
    }

    pub fn with_field<R>(&self, f: impl FnOnce(&ParticleField) -> R) -> R {
        f(&self.scene.borrow().field)
    }
}

/// A host with no page behind it: fixed size and geometry, and a
/// [`RecordingSurface`] overlay.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    width: f64,
    height: f64,
    geometry: FixedGeometry,
    overlay: Option<OverlayStyle>,
}

impl HeadlessHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            geometry: FixedGeometry::default(),
            overlay: None,
        }
    }

    pub fn with_geometry(mut self, geometry: FixedGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Style of the attached overlay, if one is attached.
    pub fn overlay(&self) -> Option<&OverlayStyle> {
        self.overlay.as_ref()
    }
}

impl Host for HeadlessHost {
    type Surface = RecordingSurface;
    type Geometry = FixedGeometry;

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn geometry(&self) -> FixedGeometry {
        self.geometry
    }

    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<RecordingSurface, NestError> {
        if self.overlay.is_some() {
            return Err(NestError::Host("host already has an overlay".into()));
        }
        self.overlay = Some(*style);
        Ok(RecordingSurface::new(self.width, self.height))
    }

    fn remove_overlay(&mut self, _surface: &RecordingSurface) {
        self.overlay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ManualScheduler;
    use crate::pointer::{MoveHandler, PointerHub};
    use glam::DVec2;

    type TestNest = Nest<HeadlessHost, ManualScheduler, PointerHub>;

    fn attach_with(config: &NestConfig) -> (TestNest, ManualScheduler, PointerHub) {
        let scheduler = ManualScheduler::new();
        let hub = PointerHub::new();
        let nest = attach(
            HeadlessHost::new(300.0, 200.0),
            config,
            scheduler.clone(),
            hub.clone(),
            42,
        )
        .unwrap();
        (nest, scheduler, hub)
    }

    #[test]
    fn overlay_css_is_full_size_and_non_interactive() {
        let css = OverlayStyle {
            z_index: -1,
            opacity: 0.5,
        }
        .css();
        assert!(css.contains("z-index:-1;"));
        assert!(css.contains("opacity:0.5;"));
        assert!(css.contains("position:absolute;"));
        assert!(css.contains("width:100%;height:100%;"));
        assert!(css.contains("pointer-events:none;"));
    }

    #[test]
    fn attach_creates_overlay_and_starts_loop() {
        let (nest, scheduler, _hub) = attach_with(&NestConfig::default());
        assert!(nest.is_running());
        assert_eq!(nest.host().overlay().unwrap().z_index, -1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(nest.with_field(|f| f.len()), 100);
        assert_eq!(nest.with_field(|f| (f.width(), f.height())), (300.0, 200.0));
    }

    #[test]
    fn each_frame_clears_and_paints_every_point() {
        let (nest, scheduler, _hub) = attach_with(&NestConfig::default());
        scheduler.run_frames(3);
        assert_eq!(nest.frames(), 3);
        assert_eq!(nest.with_surface(|s| s.clears()), 3);
        assert_eq!(nest.with_surface(|s| s.squares().count()), 100);
        assert_eq!(nest.last_stats().points, 100);
    }

    #[test]
    fn zero_count_without_pointer_draws_nothing() {
        let config = NestConfig {
            count: 0,
            ..NestConfig::default()
        };
        let (nest, scheduler, _hub) = attach_with(&config);
        scheduler.run_frames(4);
        assert_eq!(nest.with_surface(|s| s.commands().len()), 1);
        assert_eq!(nest.last_stats(), TickStats::default());
    }

    #[test]
    fn pointer_moves_are_seen_by_next_tick() {
        let config = NestConfig {
            count: 0,
            ..NestConfig::default()
        };
        let (nest, _scheduler, hub) = attach_with(&config);
        hub.dispatch_move(12.0, 34.0);
        assert_eq!(nest.pointer().position(), Some(DVec2::new(12.0, 34.0)));
        assert_eq!(nest.pointer().link_radius_sq(), 10000.0);
        hub.dispatch_leave();
        assert!(!nest.pointer().is_present());
    }

    #[test]
    fn pointer_near_points_draws_links_to_it() {
        let (nest, scheduler, hub) = attach_with(&NestConfig::default());
        scheduler.run_frame();
        let without = nest.last_stats().links;
        hub.dispatch_move(150.0, 100.0);
        scheduler.run_frame();
        assert!(
            nest.last_stats().links > without,
            "pointer added no links: {} vs {without}",
            nest.last_stats().links
        );
    }

    #[test]
    fn destroy_stops_ticks_and_restores_prior_handler() {
        let scheduler = ManualScheduler::new();
        let hub = PointerHub::new();
        let calls = Rc::new(Cell::new(0));
        let prior: MoveHandler = {
            let calls = Rc::clone(&calls);
            Rc::new(move |_: DVec2| calls.set(calls.get() + 1))
        };
        hub.set_move_handler(Some(Rc::clone(&prior)));

        let nest = attach(
            HeadlessHost::new(300.0, 200.0),
            &NestConfig::default(),
            scheduler.clone(),
            hub.clone(),
            1,
        )
        .unwrap();
        scheduler.run_frames(2);
        hub.dispatch_move(1.0, 1.0);
        assert_eq!(calls.get(), 1);

        let host = nest.destroy();
        assert!(host.overlay().is_none());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.run_frames(5), 0);

        hub.dispatch_move(2.0, 2.0);
        assert_eq!(calls.get(), 2);
        assert!(Rc::ptr_eq(&hub.move_handler().unwrap(), &prior));
    }

    #[test]
    fn stop_and_start_pause_without_detaching() {
        let (nest, scheduler, hub) = attach_with(&NestConfig::default());
        scheduler.run_frame();
        nest.stop();
        assert_eq!(scheduler.run_frames(3), 0);
        assert!(hub.move_handler().is_some());
        assert!(nest.host().overlay().is_some());
        nest.start();
        scheduler.run_frame();
        assert_eq!(nest.frames(), 2);
    }

    #[test]
    fn attach_rejects_invalid_config_without_touching_host() {
        let config = NestConfig {
            opacity: 2.0,
            ..NestConfig::default()
        };
        let hub = PointerHub::new();
        let result = attach(
            HeadlessHost::new(300.0, 200.0),
            &config,
            ManualScheduler::new(),
            hub.clone(),
            1,
        );
        assert!(matches!(result, Err(NestError::InvalidConfig(_))));
        assert!(hub.move_handler().is_none());
    }

    #[test]
    fn attach_rejects_non_finite_host_size() {
        let result = attach(
            HeadlessHost::new(f64::INFINITY, 200.0),
            &NestConfig::default(),
            ManualScheduler::new(),
            PointerHub::new(),
            1,
        );
        assert!(matches!(result, Err(NestError::InvalidDimensions)));
    }

    #[test]
    fn attach_accepts_zero_sized_host() {
        let scheduler = ManualScheduler::new();
        let nest = attach(
            HeadlessHost::new(0.0, 0.0),
            &NestConfig::default(),
            scheduler.clone(),
            PointerHub::new(),
            1,
        )
        .unwrap();
        assert!(nest.with_field(|f| f.points().iter().all(|p| p.position == DVec2::ZERO)));
        scheduler.run_frame();
        assert_eq!(nest.frames(), 1);
    }

    #[test]
    fn same_seed_gives_same_field() {
        let (a, _, _) = attach_with(&NestConfig::default());
        let (b, _, _) = attach_with(&NestConfig::default());
        let pa = a.with_field(|f| f.points().to_vec());
        let pb = b.with_field(|f| f.points().to_vec());
        assert_eq!(pa, pb);
    }

    #[test]
    fn pointer_uses_host_geometry() {
        let host = HeadlessHost::new(300.0, 200.0).with_geometry(FixedGeometry {
            offset: DVec2::new(100.0, 50.0),
            scroll: DVec2::new(0.0, 25.0),
        });
        let hub = PointerHub::new();
        let nest = attach(
            host,
            &NestConfig::default(),
            ManualScheduler::new(),
            hub.clone(),
            1,
        )
        .unwrap();
        hub.dispatch_move(150.0, 60.0);
        assert_eq!(nest.pointer().position(), Some(DVec2::new(50.0, 35.0)));
    }
}

//! Pointer tracking with handler chaining.
//!
//! The host page may already have global pointer-move and pointer-leave
//! handlers. [`PointerTracker`] installs its own handlers *in front of* them:
//! each event first updates the shared [`PointerPoint`](crate::PointerPoint),
//! then reaches whatever handler was registered before. Teardown puts the
//! previous handlers back exactly.
//!
//! The global registry is abstracted as [`PointerEvents`]. The previous
//! handlers travel as an opaque [`PointerEvents::Previous`] value held only
//! by the tracker; nothing else ever sees or reassigns them.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;

use crate::point::SharedPointer;

/// Where the host surface sits on the page.
pub trait HostGeometry {
    /// Offset of the host surface from the page origin.
    fn offset(&self) -> DVec2;

    /// Current page scroll.
    fn scroll(&self) -> DVec2;
}

/// Converts viewport (client) coordinates to surface-local coordinates.
pub fn to_surface_local(client: DVec2, geometry: &impl HostGeometry) -> DVec2 {
    client - geometry.offset() + geometry.scroll()
}

/// Geometry that never changes: a fixed offset and scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedGeometry {
    pub offset: DVec2,
    pub scroll: DVec2,
}

impl HostGeometry for FixedGeometry {
    fn offset(&self) -> DVec2 {
        self.offset
    }

    fn scroll(&self) -> DVec2 {
        self.scroll
    }
}

/// Called with the client coordinates of a pointer move.
pub type MoveCallback = Box<dyn Fn(DVec2)>;
/// Called when the pointer leaves the page.
pub type LeaveCallback = Box<dyn Fn()>;

/// A global pointer-event registry with one move slot and one leave slot.
pub trait PointerEvents {
    /// The handlers registered before [`PointerEvents::install`].
    type Previous;

    /// Installs `on_move` / `on_leave` so that each runs first and the
    /// previously registered handler (if any) then runs with the original
    /// event. Returns the previous handlers.
    fn install(&mut self, on_move: MoveCallback, on_leave: LeaveCallback) -> Self::Previous;

    /// Puts back handlers returned by [`PointerEvents::install`].
    fn restore(&mut self, previous: Self::Previous);
}

/// Keeps a [`SharedPointer`] in sync with pointer events.
pub struct PointerTracker<E: PointerEvents> {
    events: E,
    previous: E::Previous,
    pointer: SharedPointer,
}

impl<E: PointerEvents> PointerTracker<E> {
    /// Chains tracking handlers in front of whatever `events` already has.
    pub fn install<G>(mut events: E, geometry: G, pointer: SharedPointer) -> Self
    where
        G: HostGeometry + 'static,
    {
        let on_move = {
            let pointer = Rc::clone(&pointer);
            Box::new(move |client: DVec2| {
                let mut p = pointer.get();
                p.set(to_surface_local(client, &geometry));
                pointer.set(p);
            })
        };
        let on_leave = {
            let pointer = Rc::clone(&pointer);
            Box::new(move || {
                let mut p = pointer.get();
                p.clear();
                pointer.set(p);
            })
        };
        let previous = events.install(on_move, on_leave);
        log::debug!("pointer tracking installed");
        Self {
            events,
            previous,
            pointer,
        }
    }

    pub fn pointer(&self) -> &SharedPointer {
        &self.pointer
    }

    /// Restores the handlers that were registered before [`install`](Self::install)
    /// and hands the registry back.
    pub fn teardown(self) -> E {
        let Self {
            mut events,
            previous,
            ..
        } = self;
        events.restore(previous);
        log::debug!("pointer tracking removed");
        events
    }
}

/// A registered move handler.
pub type MoveHandler = Rc<dyn Fn(DVec2)>;
/// A registered leave handler.
pub type LeaveHandler = Rc<dyn Fn()>;

#[derive(Default)]
struct Slots {
    on_move: Option<MoveHandler>,
    on_leave: Option<LeaveHandler>,
}

/// In-process pointer-event registry, the headless stand-in for the
/// browser's `window.onmousemove` / `window.onmouseout` slots.
///
/// Clones share the same slots.
#[derive(Clone, Default)]
pub struct PointerHub {
    slots: Rc<RefCell<Slots>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the move handler, returning the old one.
    pub fn set_move_handler(&self, handler: Option<MoveHandler>) -> Option<MoveHandler> {
        std::mem::replace(&mut self.slots.borrow_mut().on_move, handler)
    }

    /// Replaces the leave handler, returning the old one.
    pub fn set_leave_handler(&self, handler: Option<LeaveHandler>) -> Option<LeaveHandler> {
        std::mem::replace(&mut self.slots.borrow_mut().on_leave, handler)
    }

    pub fn move_handler(&self) -> Option<MoveHandler> {
        self.slots.borrow().on_move.clone()
    }

    pub fn leave_handler(&self) -> Option<LeaveHandler> {
        self.slots.borrow().on_leave.clone()
    }

    /// Delivers a pointer move at client coordinates `(x, y)`.
    pub fn dispatch_move(&self, x: f64, y: f64) {
        // Release the borrow before calling out: handlers may touch the hub.
        if let Some(handler) = self.move_handler() {
            handler(DVec2::new(x, y));
        }
    }

    /// Delivers a pointer leave.
    pub fn dispatch_leave(&self) {
        if let Some(handler) = self.leave_handler() {
            handler();
        }
    }
}

impl PointerEvents for PointerHub {
    type Previous = (Option<MoveHandler>, Option<LeaveHandler>);

    fn install(&mut self, on_move: MoveCallback, on_leave: LeaveCallback) -> Self::Previous {
        let prev_move = self.move_handler();
        let prev_leave = self.leave_handler();

        let next = prev_move.clone();
        let chained_move: MoveHandler = Rc::new(move |client: DVec2| {
            on_move(client);
            if let Some(next) = &next {
                next(client);
            }
        });
        let next = prev_leave.clone();
        let chained_leave: LeaveHandler = Rc::new(move || {
            on_leave();
            if let Some(next) = &next {
                next();
            }
        });

        self.set_move_handler(Some(chained_move));
        self.set_leave_handler(Some(chained_leave));
        (prev_move, prev_leave)
    }

    fn restore(&mut self, (on_move, on_leave): Self::Previous) {
        self.set_move_handler(on_move);
        self.set_leave_handler(on_leave);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::shared_pointer;
    use std::cell::Cell;

    fn geometry() -> FixedGeometry {
        FixedGeometry {
            offset: DVec2::new(10.0, 20.0),
            scroll: DVec2::new(0.0, 100.0),
        }
    }

    #[test]
    fn surface_local_subtracts_offset_and_adds_scroll() {
        let local = to_surface_local(DVec2::new(50.0, 50.0), &geometry());
        assert_eq!(local, DVec2::new(40.0, 130.0));
    }

    #[test]
    fn move_updates_pointer_in_surface_coordinates() {
        let hub = PointerHub::new();
        let pointer = shared_pointer(10000.0);
        let _tracker = PointerTracker::install(hub.clone(), geometry(), Rc::clone(&pointer));
        hub.dispatch_move(50.0, 50.0);
        assert_eq!(pointer.get().position(), Some(DVec2::new(40.0, 130.0)));
    }

    #[test]
    fn leave_clears_both_coordinates() {
        let hub = PointerHub::new();
        let pointer = shared_pointer(10000.0);
        let _tracker = PointerTracker::install(hub.clone(), geometry(), Rc::clone(&pointer));
        hub.dispatch_move(50.0, 50.0);
        hub.dispatch_leave();
        assert_eq!(pointer.get().position(), None);
        assert_eq!(pointer.get().link_radius_sq(), 10000.0);
    }

    #[test]
    fn previous_handlers_still_receive_events() {
        let hub = PointerHub::new();
        let seen = Rc::new(Cell::new(None));
        let left = Rc::new(Cell::new(0));
        {
            let seen = Rc::clone(&seen);
            hub.set_move_handler(Some(Rc::new(move |c: DVec2| seen.set(Some(c)))));
            let left = Rc::clone(&left);
            hub.set_leave_handler(Some(Rc::new(move || left.set(left.get() + 1))));
        }

        let pointer = shared_pointer(10000.0);
        let _tracker = PointerTracker::install(hub.clone(), geometry(), Rc::clone(&pointer));
        hub.dispatch_move(7.0, 8.0);
        hub.dispatch_leave();

        // The chained handler gets the original client coordinates.
        assert_eq!(seen.get(), Some(DVec2::new(7.0, 8.0)));
        assert_eq!(left.get(), 1);
        assert_eq!(pointer.get().position(), None);
    }

    #[test]
    fn teardown_restores_exact_previous_handlers() {
        let hub = PointerHub::new();
        let original: MoveHandler = Rc::new(|_: DVec2| {});
        hub.set_move_handler(Some(Rc::clone(&original)));

        let tracker = PointerTracker::install(hub.clone(), geometry(), shared_pointer(10000.0));
        assert!(!Rc::ptr_eq(&hub.move_handler().unwrap(), &original));
        tracker.teardown();

        assert!(Rc::ptr_eq(&hub.move_handler().unwrap(), &original));
        assert!(hub.leave_handler().is_none());
    }

    #[test]
    fn teardown_without_previous_handlers_empties_slots() {
        let hub = PointerHub::new();
        let tracker = PointerTracker::install(hub.clone(), geometry(), shared_pointer(10000.0));
        assert!(hub.move_handler().is_some());
        tracker.teardown();
        assert!(hub.move_handler().is_none());
        assert!(hub.leave_handler().is_none());
    }

    #[test]
    fn pointer_stops_tracking_after_teardown() {
        let hub = PointerHub::new();
        let pointer = shared_pointer(10000.0);
        let tracker = PointerTracker::install(hub.clone(), geometry(), Rc::clone(&pointer));
        tracker.teardown();
        hub.dispatch_move(50.0, 50.0);
        assert_eq!(pointer.get().position(), None);
    }

    #[test]
    fn stacked_trackers_unwind_in_reverse_order() {
        let hub = PointerHub::new();
        let a = shared_pointer(10000.0);
        let b = shared_pointer(10000.0);
        let first = PointerTracker::install(hub.clone(), FixedGeometry::default(), Rc::clone(&a));
        let second = PointerTracker::install(hub.clone(), FixedGeometry::default(), Rc::clone(&b));

        hub.dispatch_move(1.0, 2.0);
        assert_eq!(a.get().position(), Some(DVec2::new(1.0, 2.0)));
        assert_eq!(b.get().position(), Some(DVec2::new(1.0, 2.0)));

        second.teardown();
        hub.dispatch_move(3.0, 4.0);
        assert_eq!(a.get().position(), Some(DVec2::new(3.0, 4.0)));
        assert_eq!(b.get().position(), Some(DVec2::new(1.0, 2.0)));

        first.teardown();
        assert!(hub.move_handler().is_none());
    }
}

//! The self-rescheduling frame loop.
//!
//! Frame scheduling is a host capability ([`FrameScheduler`]): the browser's
//! `requestAnimationFrame`, or [`ManualScheduler`] for headless runs and
//! tests. [`AnimationLoop::start`] schedules a tick; each tick runs and then
//! schedules the next, forever, until [`AnimationLoop::stop`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A frame callback handed to a scheduler.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Host capability that runs a callback on the next frame.
pub trait FrameScheduler {
    /// Identifies one pending callback.
    type Handle;

    /// Arranges for `callback` to run once on a later frame.
    fn schedule(&self, callback: FrameCallback) -> Self::Handle;

    /// Drops a pending callback. Cancelling one that already ran is a no-op.
    fn cancel(&self, handle: Self::Handle);
}

struct LoopState<F: FrameScheduler> {
    scheduler: F,
    tick: RefCell<Box<dyn FnMut()>>,
    pending: RefCell<Option<F::Handle>>,
    running: Cell<bool>,
    frames: Cell<u64>,
}

/// Runs `tick` once per scheduled frame until stopped.
pub struct AnimationLoop<F: FrameScheduler + 'static> {
    state: Rc<LoopState<F>>,
}

impl<F: FrameScheduler + 'static> AnimationLoop<F> {
    /// A stopped loop. Call [`start`](Self::start) to begin ticking.
    pub fn new(scheduler: F, tick: impl FnMut() + 'static) -> Self {
        Self {
            state: Rc::new(LoopState {
                scheduler,
                tick: RefCell::new(Box::new(tick)),
                pending: RefCell::new(None),
                running: Cell::new(false),
                frames: Cell::new(0),
            }),
        }
    }

    /// Schedules the first tick. No-op if already running.
    pub fn start(&self) {
        if self.state.running.replace(true) {
            return;
        }
        log::debug!("animation loop started");
        schedule_next(&self.state);
    }

    /// Cancels the pending frame. A tick already executing finishes but
    /// schedules no successor.
    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(handle) = self.state.pending.borrow_mut().take() {
            self.state.scheduler.cancel(handle);
        }
        log::debug!(
            "animation loop stopped after {} frames",
            self.state.frames.get()
        );
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Number of ticks executed since construction.
    pub fn frames(&self) -> u64 {
        self.state.frames.get()
    }

    pub fn scheduler(&self) -> &F {
        &self.state.scheduler
    }
}

impl<F: FrameScheduler + 'static> Drop for AnimationLoop<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule_next<F: FrameScheduler + 'static>(state: &Rc<LoopState<F>>) {
    let weak: Weak<LoopState<F>> = Rc::downgrade(state);
    let handle = state.scheduler.schedule(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            run_frame(&state);
        }
    }));
    *state.pending.borrow_mut() = Some(handle);
}

fn run_frame<F: FrameScheduler + 'static>(state: &Rc<LoopState<F>>) {
    state.pending.borrow_mut().take();
    if !state.running.get() {
        return;
    }
    {
        let mut tick = state.tick.borrow_mut();
        (&mut **tick)();
    }
    state.frames.set(state.frames.get() + 1);
    // A stop/start inside the tick has already scheduled the successor.
    let restarted = state.pending.borrow().is_some();
    if state.running.get() && !restarted {
        schedule_next(state);
    }
}

/// Handle of a callback queued on a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

#[derive(Default)]
struct FrameQueue {
    next_id: u64,
    pending: VecDeque<(FrameId, FrameCallback)>,
}

/// A scheduler driven by hand: callbacks run only when
/// [`run_frame`](ManualScheduler::run_frame) is called.
///
/// Clones share one queue, so a caller can keep a clone to drive frames
/// while the loop owns another.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<FrameQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Runs every callback queued before this call. Callbacks scheduled
    /// while running wait for the next frame. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let due: Vec<_> = self.queue.borrow_mut().pending.drain(..).collect();
        let ran = due.len();
        for (_, callback) in due {
            callback();
        }
        ran
    }

    /// Runs `n` frames, returning the total number of callbacks run.
    pub fn run_frames(&self, n: usize) -> usize {
        (0..n).map(|_| self.run_frame()).sum()
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = FrameId;

    fn schedule(&self, callback: FrameCallback) -> FrameId {
        let mut queue = self.queue.borrow_mut();
        let id = FrameId(queue.next_id);
        queue.next_id += 1;
        queue.pending.push_back((id, callback));
        id
    }

    fn cancel(&self, handle: FrameId) {
        self.queue
            .borrow_mut()
            .pending
            .retain(|(id, _)| *id != handle);
    }
}

//! `requestAnimationFrame` scheduling, with a ~60 Hz `setTimeout` fallback.

use canvas_nest_core::animation::{FrameCallback, FrameScheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

const FALLBACK_INTERVAL_MS: i32 = 1000 / 60;

/// A pending browser frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHandle {
    AnimationFrame(i32),
    Timeout(i32),
    /// Neither mechanism accepted the callback.
    Refused,
}

pub struct AnimationFrameScheduler {
    window: Window,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    type Handle = FrameHandle;

    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        // A cancelled callback is never freed by JS; it only holds a weak
        // reference to the loop state.
        let js = Closure::once_into_js(move || callback());
        let function = js.unchecked_ref();
        if let Ok(id) = self.window.request_animation_frame(function) {
            return FrameHandle::AnimationFrame(id);
        }
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(function, FALLBACK_INTERVAL_MS)
        {
            Ok(id) => FrameHandle::Timeout(id),
            Err(e) => {
                log::warn!("could not schedule a frame: {e:?}");
                FrameHandle::Refused
            }
        }
    }

    fn cancel(&self, handle: FrameHandle) {
        match handle {
            FrameHandle::AnimationFrame(id) => {
                if let Err(e) = self.window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {e:?}");
                }
            }
            FrameHandle::Timeout(id) => self.window.clear_timeout_with_handle(id),
            FrameHandle::Refused => {}
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn schedules_on_animation_frames_and_cancels() {
        let scheduler = AnimationFrameScheduler::new(web_sys::window().unwrap());
        let handle = scheduler.schedule(Box::new(|| panic!("cancelled frame ran")));
        assert!(matches!(handle, FrameHandle::AnimationFrame(_)));
        scheduler.cancel(handle);
    }

    #[wasm_bindgen_test]
    fn cancelling_a_refused_frame_is_a_no_op() {
        let scheduler = AnimationFrameScheduler::new(web_sys::window().unwrap());
        scheduler.cancel(FrameHandle::Refused);
    }
}

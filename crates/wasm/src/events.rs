//! Chaining into `window.onmousemove` / `window.onmouseout`.

use canvas_nest_core::pointer::{LeaveCallback, MoveCallback, PointerEvents};
use canvas_nest_core::DVec2;
use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, MouseEvent, Window};

/// The page's own handlers, found in the window slots at install time.
pub struct PreviousHandlers {
    on_move: Option<Function>,
    on_leave: Option<Function>,
}

/// Runs the page's handler, if any. Whatever it throws is rethrown to the
/// event dispatcher.
fn call_previous(previous: Option<&Function>, event: &JsValue) -> Result<(), JsValue> {
    match previous {
        Some(f) => f.call1(&JsValue::UNDEFINED, event).map(|_| ()),
        None => Ok(()),
    }
}

type MoveClosure = Closure<dyn FnMut(MouseEvent) -> Result<(), JsValue>>;
type LeaveClosure = Closure<dyn FnMut(Event) -> Result<(), JsValue>>;

/// The window's global pointer handler slots.
pub struct WindowPointerEvents {
    window: Window,
    installed: Option<(MoveClosure, LeaveClosure)>,
}

impl WindowPointerEvents {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            installed: None,
        }
    }
}

impl PointerEvents for WindowPointerEvents {
    type Previous = PreviousHandlers;

    fn install(&mut self, on_move: MoveCallback, on_leave: LeaveCallback) -> PreviousHandlers {
        let previous = PreviousHandlers {
            on_move: self.window.onmousemove(),
            on_leave: self.window.onmouseout(),
        };

        let chained = previous.on_move.clone();
        let move_closure = MoveClosure::new(move |event: MouseEvent| {
            on_move(DVec2::new(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
            ));
            call_previous(chained.as_ref(), &event)
        });
        let chained = previous.on_leave.clone();
        let leave_closure = LeaveClosure::new(move |event: Event| {
            on_leave();
            call_previous(chained.as_ref(), &event)
        });

        self.window
            .set_onmousemove(Some(move_closure.as_ref().unchecked_ref()));
        self.window
            .set_onmouseout(Some(leave_closure.as_ref().unchecked_ref()));
        self.installed = Some((move_closure, leave_closure));
        previous
    }

    fn restore(&mut self, previous: PreviousHandlers) {
        self.window.set_onmousemove(previous.on_move.as_ref());
        self.window.set_onmouseout(previous.on_leave.as_ref());
        self.installed = None;
    }
}

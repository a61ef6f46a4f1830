#![deny(unsafe_code)]
//! Browser bindings for canvas-nest.
//!
//! ```js
//! const nest = new CanvasNest(document.querySelector("header"), { color: "255,0,0", count: 88 });
//! // ...
//! nest.destroy();
//! ```

pub mod canvas;
pub mod events;
pub mod frame;

use canvas_nest_core::{attach, Nest, NestConfig, NestError};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::canvas::ElementHost;
use crate::events::WindowPointerEvents;
use crate::frame::AnimationFrameScheduler;

type BrowserNest = Nest<ElementHost, AnimationFrameScheduler, WindowPointerEvents>;

fn to_js(err: NestError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Parses the JSON text of an options object, merged over the defaults.
/// `None` (no options given) yields the defaults.
fn parse_options(json: Option<&str>) -> Result<NestConfig, NestError> {
    let Some(json) = json else {
        return Ok(NestConfig::default());
    };
    let options: Value = serde_json::from_str(json)
        .map_err(|e| NestError::InvalidConfig(format!("options are not JSON: {e}")))?;
    NestConfig::from_json(&options)
}

/// Maps `Math.random()` in [0, 1) onto a 53-bit seed.
fn seed_from_unit(r: f64) -> u64 {
    (r.clamp(0.0, 1.0) * (1u64 << 53) as f64) as u64
}

/// A particle-link background attached to a page element.
#[wasm_bindgen]
pub struct CanvasNest {
    nest: Option<BrowserNest>,
}

#[wasm_bindgen]
impl CanvasNest {
    /// Overlays `element` with an animated canvas. `config` is an optional
    /// plain object; missing keys take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, config: JsValue) -> Result<CanvasNest, JsValue> {
        let json = if config.is_undefined() || config.is_null() {
            None
        } else {
            let text = js_sys::JSON::stringify(&config)?;
            Some(String::from(text))
        };
        let config = parse_options(json.as_deref()).map_err(to_js)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let host = ElementHost::new(window.clone(), element).map_err(to_js)?;
        let nest = attach(
            host,
            &config,
            AnimationFrameScheduler::new(window.clone()),
            WindowPointerEvents::new(window),
            seed_from_unit(js_sys::Math::random()),
        )
        .map_err(to_js)?;
        Ok(CanvasNest { nest: Some(nest) })
    }

    /// Stops the animation, restores the page's pointer handlers and
    /// removes the canvas. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(nest) = self.nest.take() {
            nest.destroy();
        }
    }

    /// Pauses the animation without removing the canvas.
    pub fn stop(&self) {
        if let Some(nest) = &self.nest {
            nest.stop();
        }
    }

    /// Resumes after [`stop`](Self::stop).
    pub fn start(&self) {
        if let Some(nest) = &self.nest {
            nest.start();
        }
    }

    /// Frames drawn so far.
    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.nest.as_ref().map_or(0.0, |n| n.frames() as f64)
    }
}

impl Drop for CanvasNest {
    /// Detaches from the page if `destroy()` was never called.
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_nest_core::ColorChannels;

    #[test]
    fn missing_options_use_defaults() {
        assert_eq!(parse_options(None).unwrap(), NestConfig::default());
    }

    #[test]
    fn options_merge_over_defaults() {
        let c = parse_options(Some(r#"{"color":"255,0,0","count":88}"#)).unwrap();
        assert_eq!(c.color, ColorChannels::new(255, 0, 0));
        assert_eq!(c.count, 88);
        assert_eq!(c.opacity, NestConfig::default().opacity);
    }

    #[test]
    fn malformed_color_is_rejected() {
        assert!(matches!(
            parse_options(Some(r#"{"color":"red"}"#)),
            Err(NestError::InvalidColor(_))
        ));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        assert!(matches!(
            parse_options(Some("{")),
            Err(NestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn seeds_span_53_bits() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert_eq!(seed_from_unit(0.5), 1u64 << 52);
        assert!(seed_from_unit(0.999_999) < 1u64 << 53);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use js_sys::Function;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn host_element() -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let el: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
        el.style().set_property("width", "200px").unwrap();
        el.style().set_property("height", "100px").unwrap();
        document.body().unwrap().append_child(&el).unwrap();
        el
    }

    #[wasm_bindgen_test]
    fn new_overlays_a_positioned_canvas() {
        let el = host_element();
        let mut nest = CanvasNest::new(el.clone(), JsValue::UNDEFINED).unwrap();
        assert_eq!(el.child_element_count(), 1);
        assert_eq!(el.style().get_property_value("position").unwrap(), "relative");
        nest.destroy();
        assert_eq!(el.child_element_count(), 0);
        el.remove();
    }

    #[wasm_bindgen_test]
    fn dropping_without_destroy_restores_page_handlers() {
        let window = web_sys::window().unwrap();
        let prior = Function::new_no_args("");
        window.set_onmousemove(Some(&prior));
        let el = host_element();

        let nest = CanvasNest::new(el.clone(), JsValue::UNDEFINED).unwrap();
        let current = window.onmousemove().unwrap();
        assert_ne!(AsRef::<JsValue>::as_ref(&current), AsRef::<JsValue>::as_ref(&prior));
        drop(nest);

        let restored = window.onmousemove().unwrap();
        assert_eq!(AsRef::<JsValue>::as_ref(&restored), AsRef::<JsValue>::as_ref(&prior));
        assert_eq!(el.child_element_count(), 0);
        window.set_onmousemove(None);
        el.remove();
    }
}

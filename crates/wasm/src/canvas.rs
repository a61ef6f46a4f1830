//! A host element decorated with a `<canvas>` overlay.

use canvas_nest_core::color::ColorChannels;
use canvas_nest_core::error::NestError;
use canvas_nest_core::nest::{Host, OverlayStyle};
use canvas_nest_core::pointer::HostGeometry;
use canvas_nest_core::surface::{LineStyle, Surface};
use canvas_nest_core::DVec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

fn host_error(context: &str, err: JsValue) -> NestError {
    NestError::Host(format!("{context}: {err:?}"))
}

/// The overlay canvas and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.context.clear_rect(0.0, 0.0, w, h);
    }

    fn fill_square(&mut self, center: DVec2, size: f64, color: ColorChannels) {
        let half = size / 2.0;
        self.context.set_fill_style_str(&color.to_css_rgba(1.0));
        self.context
            .fill_rect(center.x - half, center.y - half, size, size);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle) {
        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.set_line_width(style.width);
        ctx.set_stroke_style_str(&style.color.to_css_rgba(style.alpha));
        ctx.line_to(to.x, to.y);
        ctx.stroke();
    }
}

/// Live position of the host element on the page.
pub struct ElementGeometry {
    element: HtmlElement,
    document: Document,
}

impl HostGeometry for ElementGeometry {
    fn offset(&self) -> DVec2 {
        DVec2::new(
            f64::from(self.element.offset_left()),
            f64::from(self.element.offset_top()),
        )
    }

    fn scroll(&self) -> DVec2 {
        self.document
            .scrolling_element()
            .map(|s| DVec2::new(f64::from(s.scroll_left()), f64::from(s.scroll_top())))
            .unwrap_or(DVec2::ZERO)
    }
}

/// An element of the page that receives a canvas overlay.
pub struct ElementHost {
    window: Window,
    document: Document,
    element: HtmlElement,
}

impl ElementHost {
    pub fn new(window: Window, element: HtmlElement) -> Result<Self, NestError> {
        let document = window
            .document()
            .ok_or_else(|| NestError::Host("window has no document".into()))?;
        Ok(Self {
            window,
            document,
            element,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Makes a statically positioned host a containing block for the
    /// absolutely positioned overlay.
    fn ensure_positioned(&self) -> Result<(), NestError> {
        let computed = self
            .window
            .get_computed_style(&self.element)
            .map_err(|e| host_error("getComputedStyle", e))?;
        let position = match computed {
            Some(style) => style
                .get_property_value("position")
                .map_err(|e| host_error("position", e))?,
            None => return Ok(()),
        };
        if position == "static" {
            self.element
                .style()
                .set_property("position", "relative")
                .map_err(|e| host_error("set position", e))?;
        }
        Ok(())
    }
}

impl Host for ElementHost {
    type Surface = CanvasSurface;
    type Geometry = ElementGeometry;

    fn size(&self) -> (f64, f64) {
        (
            f64::from(self.element.client_width()),
            f64::from(self.element.client_height()),
        )
    }

    fn geometry(&self) -> ElementGeometry {
        ElementGeometry {
            element: self.element.clone(),
            document: self.document.clone(),
        }
    }

    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<CanvasSurface, NestError> {
        self.ensure_positioned()?;
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|e| host_error("createElement", e))?
            .dyn_into()
            .map_err(|_| NestError::Host("created element is not a canvas".into()))?;
        canvas.set_width(u32::try_from(self.element.client_width()).unwrap_or(0));
        canvas.set_height(u32::try_from(self.element.client_height()).unwrap_or(0));
        canvas.style().set_css_text(&style.css());

        let context = canvas
            .get_context("2d")
            .map_err(|e| host_error("getContext", e))?
            .ok_or_else(|| NestError::Host("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| NestError::Host("context is not 2d".into()))?;
        self.element
            .append_child(&canvas)
            .map_err(|e| host_error("appendChild", e))?;
        Ok(CanvasSurface { canvas, context })
    }

    fn remove_overlay(&mut self, surface: &CanvasSurface) {
        if let Err(e) = self.element.remove_child(surface.canvas()) {
            log::warn!("overlay canvas already detached: {e:?}");
        }
    }
}

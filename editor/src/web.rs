//! Browser backends: a canvas 2D [`Surface`], a DOM [`OverlayHost`] and the
//! [`InputBindings`] that feed DOM events into an [`EditorSession`].
//!
//! This module is the only place that touches `web_sys`. Failed canvas calls
//! propagate as [`RenderError::Canvas`]; failed DOM style updates inside the
//! overlay host are logged, since the host trait has no error channel.
//!
//! Input bindings install one listener per event type when attached and
//! remove all of them when dropped. The selection-scan timer lives as long
//! as the scan it was started for.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use image::Rgba;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, ImageData, KeyboardEvent,
    MouseEvent,
};

use crate::assets::ImageHandle;
use crate::consts::OVERLAY_PADDING_PX;
use crate::engine::Action;
use crate::geometry::{Bounds, Point};
use crate::input::{Button, Key, Modifiers};
use crate::overlay::{CursorPreview, OverlayFrame, OverlayHost, OverlayId, OverlayStyle};
use crate::render::{RenderError, Surface};
use crate::session::EditorSession;

fn js_err(e: JsValue) -> RenderError {
    RenderError::Canvas(format!("{e:?}"))
}

fn css_rgba(c: Rgba<u8>) -> String {
    format!("rgba({}, {}, {}, {:.3})", c[0], c[1], c[2], f64::from(c[3]) / 255.0)
}

fn px(v: f64) -> String {
    format!("{v}px")
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
    canvas
        .get_context("2d")
        .map_err(js_err)?
        .ok_or_else(|| RenderError::Canvas("2d context unavailable".to_owned()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| js_err(e.into()))
}

// =============================================================================
// CANVAS SURFACE
// =============================================================================

/// [`Surface`] over an `HtmlCanvasElement`.
///
/// Decoded images are uploaded once into offscreen canvases keyed by
/// [`ImageHandle::key`], so redraws only issue `drawImage` calls.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    document: Document,
    uploaded: HashMap<usize, HtmlCanvasElement>,
}

impl WebSurface {
    /// Wrap a canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas is detached or has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = context_2d(&canvas)?;
        let document = canvas
            .owner_document()
            .ok_or_else(|| RenderError::Canvas("canvas has no owner document".to_owned()))?;
        Ok(Self { canvas, ctx, document, uploaded: HashMap::new() })
    }

    fn upload(&mut self, image: &ImageHandle) -> Result<HtmlCanvasElement, RenderError> {
        if let Some(canvas) = self.uploaded.get(&image.key()) {
            return Ok(canvas.clone());
        }
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|e| js_err(e.into()))?;
        canvas.set_width(image.width());
        canvas.set_height(image.height());
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(image.pixels().as_raw()), image.width(), image.height())
            .map_err(js_err)?;
        context_2d(&canvas)?.put_image_data(&data, 0.0, 0.0).map_err(js_err)?;
        self.uploaded.insert(image.key(), canvas.clone());
        Ok(canvas)
    }
}

impl Surface for WebSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn fill(&mut self, color: Rgba<u8>) -> Result<(), RenderError> {
        let (w, h) = self.size();
        self.ctx.set_fill_style_str(&css_rgba(color));
        self.ctx.fill_rect(0.0, 0.0, f64::from(w), f64::from(h));
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageHandle, origin: Point, offset: Point, rotation_deg: f64) -> Result<(), RenderError> {
        let source = self.upload(image)?;
        self.ctx.save();
        self.ctx.translate(origin.x, origin.y).map_err(js_err)?;
        self.ctx.rotate(-rotation_deg.to_radians()).map_err(js_err)?;
        let drawn = self.ctx.draw_image_with_html_canvas_element(&source, offset.x, offset.y);
        self.ctx.restore();
        drawn.map_err(js_err)
    }

    fn draw_grid(&mut self, cell: u32, color: Rgba<u8>) -> Result<(), RenderError> {
        if cell == 0 {
            return Ok(());
        }
        let (w, h) = self.size();
        let (fw, fh) = (f64::from(w), f64::from(h));
        self.ctx.set_stroke_style_str(&css_rgba(color));
        self.ctx.set_line_width(1.0);
        self.ctx.begin_path();
        for x in (cell..w).step_by(cell as usize) {
            self.ctx.move_to(f64::from(x), 0.0);
            self.ctx.line_to(f64::from(x), fh);
        }
        for y in (cell..h).step_by(cell as usize) {
            self.ctx.move_to(0.0, f64::from(y));
            self.ctx.line_to(fw, f64::from(y));
        }
        self.ctx.stroke();
        Ok(())
    }

    fn to_png_data_url(&self) -> Result<String, RenderError> {
        self.canvas.to_data_url_with_type("image/png").map_err(js_err)
    }
}

// =============================================================================
// DOM OVERLAYS
// =============================================================================

/// [`OverlayHost`] that positions `div` elements over the canvas.
///
/// The container must be the positioned parent of the canvas so overlay
/// coordinates match canvas pixels.
pub struct DomOverlays {
    document: Document,
    container: HtmlElement,
    elements: HashMap<OverlayId, HtmlElement>,
    preview: HtmlElement,
    selection_box: HtmlElement,
    preview_images: HashMap<String, String>,
}

impl DomOverlays {
    /// Create the preview and selection-box elements inside `container`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the elements cannot be created.
    pub fn new(container: HtmlElement) -> Result<Self, RenderError> {
        let document = container
            .owner_document()
            .ok_or_else(|| RenderError::Canvas("container has no owner document".to_owned()))?;
        let preview = create_div(&document)?;
        set_styles(
            &preview,
            &[
                ("position", "absolute"),
                ("opacity", "0.5"),
                ("padding", "0"),
                ("margin", "0"),
                ("background-repeat", "no-repeat"),
                ("background-size", "100% 100%"),
                ("display", "none"),
                ("pointer-events", "none"),
            ],
        );
        let selection_box = create_div(&document)?;
        set_styles(
            &selection_box,
            &[
                ("position", "absolute"),
                ("padding", "0"),
                ("margin", "0"),
                ("display", "none"),
                ("pointer-events", "none"),
                ("border", "1px dashed blue"),
            ],
        );
        container.append_child(&preview).map_err(js_err)?;
        container.append_child(&selection_box).map_err(js_err)?;
        Ok(Self { document, container, elements: HashMap::new(), preview, selection_box, preview_images: HashMap::new() })
    }

    /// Register the image shown by the cursor preview for an object type.
    pub fn set_preview_image(&mut self, kind: impl Into<String>, data_url: impl Into<String>) {
        self.preview_images.insert(kind.into(), data_url.into());
    }
}

impl OverlayHost for DomOverlays {
    fn create(&mut self, id: OverlayId, frame: &OverlayFrame, interactive: bool) {
        let el = match create_div(&self.document) {
            Ok(el) => el,
            Err(e) => {
                warn!(%id, error = %e, "overlay element not created");
                return;
            }
        };
        let width = px(frame.width - 2.0 * OVERLAY_PADDING_PX);
        let height = px(frame.height - 2.0 * OVERLAY_PADDING_PX);
        let transform = format!("rotate({}deg)", 360.0 - frame.rotation);
        set_styles(
            &el,
            &[
                ("position", "absolute"),
                ("left", px(frame.left).as_str()),
                ("top", px(frame.top).as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("padding", px(OVERLAY_PADDING_PX).as_str()),
                ("transform", transform.as_str()),
                ("border", "1px dashed lime"),
                ("background-color", "rgba(0,255,0,0.1)"),
                ("z-index", "2"),
                ("opacity", "0"),
                ("pointer-events", if interactive { "auto" } else { "none" }),
            ],
        );
        log_dom("set overlay id", el.set_attribute("data-overlay-id", &id.to_string()));
        log_dom("append overlay", self.container.append_child(&el).map(|_| ()));
        self.elements.insert(id, el);
    }

    fn reposition(&mut self, id: OverlayId, left: f64, top: f64) {
        if let Some(el) = self.elements.get(&id) {
            set_styles(el, &[("left", px(left).as_str()), ("top", px(top).as_str())]);
        }
    }

    fn rotate(&mut self, id: OverlayId, rotation: f64) {
        if let Some(el) = self.elements.get(&id) {
            set_styles(el, &[("transform", format!("rotate({}deg)", 360.0 - rotation).as_str())]);
        }
    }

    fn set_style(&mut self, id: OverlayId, style: OverlayStyle) {
        let Some(el) = self.elements.get(&id) else {
            return;
        };
        let (opacity, border) = match style {
            OverlayStyle::Idle => ("0", "1px dashed lime"),
            OverlayStyle::Hovered => ("1", "1px dashed lime"),
            OverlayStyle::Selected => ("1", "1px solid blue"),
        };
        set_styles(el, &[("opacity", opacity), ("border", border)]);
    }

    fn set_interactive(&mut self, id: OverlayId, interactive: bool) {
        if let Some(el) = self.elements.get(&id) {
            set_styles(el, &[("pointer-events", if interactive { "auto" } else { "none" })]);
        }
    }

    fn set_ref_id(&mut self, id: OverlayId, ref_id: u32) {
        if let Some(el) = self.elements.get(&id) {
            log_dom("set ref id", el.set_attribute("data-ref-id", &ref_id.to_string()));
        }
    }

    fn destroy(&mut self, id: OverlayId) {
        if let Some(el) = self.elements.remove(&id) {
            el.remove();
        }
    }

    fn restack(&mut self, order: &[OverlayId]) {
        for id in order {
            if let Some(el) = self.elements.get(id) {
                log_dom("restack overlay", self.container.append_child(el).map(|_| ()));
            }
        }
    }

    fn present_preview(&mut self, preview: &CursorPreview) {
        let image = preview
            .kind
            .as_ref()
            .and_then(|k| self.preview_images.get(k))
            .map_or_else(|| "none".to_owned(), |url| format!("url({url})"));
        set_styles(
            &self.preview,
            &[
                ("display", if preview.visible { "block" } else { "none" }),
                ("left", px(preview.left).as_str()),
                ("top", px(preview.top).as_str()),
                ("width", px(f64::from(preview.width)).as_str()),
                ("height", px(f64::from(preview.height)).as_str()),
                ("transform", format!("rotate({}deg)", preview.transform_deg).as_str()),
                ("background-image", image.as_str()),
            ],
        );
    }

    fn present_selection_box(&mut self, rect: Option<&Bounds>) {
        match rect {
            Some(r) => set_styles(
                &self.selection_box,
                &[
                    ("display", "block"),
                    ("left", px(r.left).as_str()),
                    ("top", px(r.top).as_str()),
                    ("width", px(r.width()).as_str()),
                    ("height", px(r.height()).as_str()),
                ],
            ),
            None => set_styles(&self.selection_box, &[("display", "none")]),
        }
    }

    fn live_count(&self) -> usize {
        self.elements.len()
    }
}

// =============================================================================
// INPUT BINDINGS
// =============================================================================

/// Session shared between the page and its event listeners.
pub type SharedSession = Rc<RefCell<EditorSession>>;

type Listener = Closure<dyn FnMut(Event)>;

const POINTER_EVENTS: [&str; 6] = ["mousemove", "mousedown", "mouseup", "click", "mouseenter", "mouseleave"];
const KEY_EVENTS: [&str; 2] = ["keydown", "keyup"];

/// DOM listeners routing pointer events on the map container and key events
/// on the window into the session's engine. Dropping the bindings detaches
/// every listener and cancels a running selection scan.
pub struct InputBindings {
    dispatcher: Rc<Dispatcher>,
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl InputBindings {
    /// Attach listeners for `session` to `container` and the window.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no window or a listener cannot be added.
    pub fn attach(session: SharedSession, container: &HtmlElement) -> Result<Self, RenderError> {
        let window = web_sys::window().ok_or_else(|| RenderError::Canvas("no window".to_owned()))?;
        let dispatcher = Rc::new(Dispatcher { session, container: container.clone(), scan: RefCell::new(None) });
        let mut bindings = Self { dispatcher, listeners: Vec::new() };

        let pointer_target: EventTarget = container.clone().into();
        for kind in POINTER_EVENTS {
            bindings.listen(&pointer_target, kind)?;
        }
        let key_target: EventTarget = window.into();
        for kind in KEY_EVENTS {
            bindings.listen(&key_target, kind)?;
        }
        debug!(listeners = bindings.listeners.len(), "input bindings attached");
        Ok(bindings)
    }

    fn listen(&mut self, target: &EventTarget, kind: &'static str) -> Result<(), RenderError> {
        let dispatcher = Rc::clone(&self.dispatcher);
        let cb: Listener =
            Closure::wrap(Box::new(move |event: Event| Dispatcher::handle(&dispatcher, kind, &event)) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
            .map_err(js_err)?;
        self.listeners.push((target.clone(), kind, cb));
        Ok(())
    }
}

impl Drop for InputBindings {
    fn drop(&mut self) {
        for (target, kind, cb) in self.listeners.drain(..) {
            log_dom(kind, target.remove_event_listener_with_callback(kind, cb.as_ref().unchecked_ref()));
        }
        self.dispatcher.scan.borrow_mut().take();
        debug!("input bindings detached");
    }
}

struct Dispatcher {
    session: SharedSession,
    container: HtmlElement,
    scan: RefCell<Option<Interval>>,
}

impl Dispatcher {
    fn handle(this: &Rc<Self>, kind: &str, event: &Event) {
        let Ok(mut session) = this.session.try_borrow_mut() else {
            warn!(event = kind, "session busy; event dropped");
            return;
        };
        let engine = session.engine_mut();
        let actions = if let Some(e) = event.dyn_ref::<KeyboardEvent>() {
            let key = Key::new(e.code());
            let mods = Modifiers { shift: e.shift_key(), ctrl: e.ctrl_key(), alt: e.alt_key(), meta: e.meta_key() };
            if kind == "keydown" { engine.on_key_down(&key, mods) } else { engine.on_key_up(&key, mods) }
        } else if let Some(e) = event.dyn_ref::<MouseEvent>() {
            let rect = this.container.get_bounding_client_rect();
            let pt = Point::new(f64::from(e.client_x()) - rect.left(), f64::from(e.client_y()) - rect.top());
            let button = match e.button() {
                1 => Button::Middle,
                2 => Button::Secondary,
                _ => Button::Primary,
            };
            match kind {
                "mousemove" => engine.on_pointer_move(pt),
                "mousedown" => engine.on_pointer_down(pt, button),
                "mouseup" => engine.on_pointer_up(pt, button),
                "click" => {
                    let mods = Modifiers { shift: e.shift_key(), ctrl: e.ctrl_key(), alt: e.alt_key(), meta: e.meta_key() };
                    engine.on_click(pt, mods)
                }
                "mouseenter" => engine.on_pointer_enter(),
                _ => engine.on_pointer_leave(),
            }
        } else {
            return;
        };
        drop(session);
        Self::apply(this, event, actions);
    }

    fn apply(this: &Rc<Self>, event: &Event, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::EventConsumed => event.prevent_default(),
                Action::StartSelectionScan { period } => {
                    let scanner = Rc::clone(this);
                    let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
                    let interval = Interval::new(millis, move || {
                        if let Ok(mut session) = scanner.session.try_borrow_mut() {
                            session.engine_mut().on_selection_scan();
                        }
                    });
                    *this.scan.borrow_mut() = Some(interval);
                }
                Action::StopSelectionScan => {
                    this.scan.borrow_mut().take();
                }
                Action::ReloadRequested => spawn_local(reload(Rc::clone(&this.session))),
                Action::SceneChanged => {}
            }
        }
    }
}

/// Rebuild the scene; image loads resolve without yielding to the event loop.
#[allow(clippy::await_holding_refcell_ref)]
async fn reload(session: SharedSession) {
    let Ok(mut session) = session.try_borrow_mut() else {
        warn!("session busy; reload skipped");
        return;
    };
    session.dispatch(vec![Action::ReloadRequested]).await;
}

fn create_div(document: &Document) -> Result<HtmlElement, RenderError> {
    document
        .create_element("div")
        .map_err(js_err)?
        .dyn_into::<HtmlElement>()
        .map_err(|e| js_err(e.into()))
}

fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) {
    let style = el.style();
    for (name, value) in props {
        log_dom(name, style.set_property(name, value));
    }
}

fn log_dom(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        warn!(op, error = ?e, "dom update failed");
    }
}

//! Browser widgets for folio sites
//!
//! This crate provides WASM bindings for the interactive parts of a generated
//! site: the particle network background, the custom cursor, the chat widget
//! and the contact form. The logic behind each widget lives in plain Rust
//! modules that are unit tested natively; only the bindings below touch the
//! DOM.

pub mod canvas2d;
pub mod contact;
pub mod cursor;
pub mod gemini;
pub mod http;
pub mod page_config;
pub mod particles;
pub mod pointer;
pub mod projection;
pub mod session;
pub mod transcript;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Element, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use crate::canvas2d::BackgroundRenderer;
use crate::contact::{ContactClient, ContactError, ContactForm};
use crate::cursor::{CursorLayer, CursorState, INTERACTIVE_SELECTOR};
use crate::gemini::GeminiConnector;
use crate::http::FetchTransport;
use crate::page_config::{CONFIG_ELEMENT_ID, PageConfig};
use crate::particles::{FieldConfig, ParticleField};
use crate::pointer::PointerTracker;
use crate::session::{ChatWidget, SessionManager};

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log a caught error and mirror it to the developer console
fn report(context: &str, err: &dyn Display) {
    tracing::error!(error = %err, "{context}");
    web_sys::console::error_1(&JsValue::from_str(&format!("{context}: {err}")));
}

fn warn(message: &str) {
    tracing::warn!("{message}");
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))
}

fn window_size(window: &Window) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0)
    };
    (dimension(window.inner_width()), dimension(window.inner_height()))
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            web_sys::console::error_1(&err);
        }
    }
}

fn listen<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    callback.forget();
    Ok(())
}

/// Read the runtime configuration embedded in the page
///
/// A missing or malformed config yields defaults, which leave the chat and
/// contact widgets in their "not configured" state.
fn read_page_config() -> PageConfig {
    let json = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|e| e.text_content());

    match json {
        Some(json) => PageConfig::from_json(&json).unwrap_or_else(|err| {
            report("invalid page config", &err);
            PageConfig::default()
        }),
        None => PageConfig::default(),
    }
}

struct Background {
    renderer: BackgroundRenderer,
    field: ParticleField,
    pointer: PointerTracker,
    rng: SmallRng,
    origin: f64,
}

impl Background {
    fn frame(&mut self, timestamp: f64) {
        let elapsed = ((timestamp - self.origin) / 1000.0) as f32;
        let pointer = self.pointer.on_frame().to_world(self.field.viewport());
        self.field.update(elapsed, pointer);
        self.renderer.render(&self.field);
    }

    /// Resize the canvas and respread the particles over the new viewport
    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.pointer.resize(width as f32, height as f32);
        let viewport = self.renderer.projection().viewport();
        self.field = ParticleField::new(self.field.config().clone(), viewport, &mut self.rng);
    }
}

/// Start the particle network background on `canvas`
///
/// Runs for the lifetime of the page.
#[wasm_bindgen]
pub fn start_background(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
    let window = window()?;
    let (width, height) = window_size(&window);

    let mut renderer = BackgroundRenderer::new(canvas).map_err(|e| JsValue::from_str(&e))?;
    renderer.resize(width, height);

    let mut rng = SmallRng::seed_from_u64(js_sys::Date::now() as u64);
    let field = ParticleField::new(
        FieldConfig::default(),
        renderer.projection().viewport(),
        &mut rng,
    );
    let origin = window.performance().map(|p| p.now()).unwrap_or(0.0);

    let state = Rc::new(RefCell::new(Background {
        renderer,
        field,
        pointer: PointerTracker::new(width as f32, height as f32),
        rng,
        origin,
    }));

    {
        let state = state.clone();
        listen(&window, "mousemove", move |event: MouseEvent| {
            state
                .borrow_mut()
                .pointer
                .record(event.client_x() as f32, event.client_y() as f32);
        })?;
    }
    {
        let state = state.clone();
        listen(&window, "resize", move |_: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                let (width, height) = window_size(&window);
                state.borrow_mut().resize(width, height);
            }
        })?;
    }

    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        state.borrow_mut().frame(timestamp);
        if let Some(callback) = next.borrow().as_ref() {
            request_frame(callback);
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = frame.borrow().as_ref() {
        request_frame(callback);
    }
    Ok(())
}

struct Cursor {
    state: CursorState,
    tracker: PointerTracker,
    dot: HtmlElement,
    ring: HtmlElement,
}

impl Cursor {
    fn apply(&self) {
        for (element, layer) in [(&self.dot, CursorLayer::Dot), (&self.ring, CursorLayer::Trail)] {
            let style = element.style();
            let transform = self.state.transform(layer);
            let opacity = self.state.opacity(layer).to_string();
            if style
                .set_property("transform", &transform)
                .and_then(|_| style.set_property("opacity", &opacity))
                .is_err()
            {
                tracing::debug!("failed to style cursor layer");
            }
        }
    }
}

/// Drive the custom cursor elements from pointer events
#[wasm_bindgen]
pub fn start_cursor(dot: HtmlElement, ring: HtmlElement) -> Result<(), JsValue> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let cursor = Rc::new(RefCell::new(Cursor {
        state: CursorState::new(),
        tracker: PointerTracker::default(),
        dot,
        ring,
    }));
    cursor.borrow().apply();

    // Applies the latest coalesced sample
    let on_frame = {
        let cursor = cursor.clone();
        Closure::wrap(Box::new(move |_: f64| {
            let mut cursor = cursor.borrow_mut();
            cursor.tracker.on_frame();
            if let Some(position) = cursor.tracker.client_position() {
                cursor.state.moved(position);
            }
            cursor.apply();
        }) as Box<dyn FnMut(f64)>)
    };

    {
        let cursor = cursor.clone();
        listen(&window, "mousemove", move |event: MouseEvent| {
            let first = cursor
                .borrow_mut()
                .tracker
                .record(event.client_x() as f32, event.client_y() as f32);
            if first {
                request_frame(&on_frame);
            }
        })?;
    }
    {
        let cursor = cursor.clone();
        listen(&window, "mouseover", move |event: MouseEvent| {
            let hovering = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest(INTERACTIVE_SELECTOR).ok().flatten())
                .is_some();
            let mut cursor = cursor.borrow_mut();
            cursor.state.set_hovering(hovering);
            cursor.apply();
        })?;
    }
    listen(&document, "mouseleave", move |_: MouseEvent| {
        let mut cursor = cursor.borrow_mut();
        cursor.state.left();
        cursor.apply();
    })?;
    Ok(())
}

type PageChat = ChatWidget<GeminiConnector<FetchTransport>>;

/// Chat widget state shared with the page script
#[wasm_bindgen]
pub struct ChatHandle {
    widget: Rc<RefCell<PageChat>>,
}

impl Default for ChatHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ChatHandle {
    /// Build the widget from the page's embedded configuration
    #[wasm_bindgen(constructor)]
    pub fn new() -> ChatHandle {
        let config = read_page_config().chat;
        let connector = GeminiConnector::new(config.api_key, Some(config.model), FetchTransport);
        if !connector.is_configured() {
            warn("chat has no model credentials");
        }
        let sessions = SessionManager::new(connector, config.preamble);
        let widget = ChatWidget::new(sessions, config.greeting);
        ChatHandle {
            widget: Rc::new(RefCell::new(widget)),
        }
    }

    /// Transcript as a JSON array of `{speaker, text}`
    pub fn turns(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.widget.borrow().transcript())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn is_busy(&self) -> bool {
        self.widget.borrow().is_busy()
    }

    pub fn can_submit(&self, input: &str) -> bool {
        self.widget.borrow().can_submit(input)
    }

    /// Send `input`; resolves with the assistant turn as JSON
    ///
    /// The user turn and the busy flag are in place when this returns.
    /// Rejects only when the input guard refuses the message.
    pub fn send(&self, input: String) -> js_sys::Promise {
        let pending = match self.widget.borrow_mut().begin_send(&input) {
            Ok(pending) => pending,
            Err(err) => return js_sys::Promise::reject(&JsValue::from_str(&err.to_string())),
        };

        let widget = self.widget.clone();
        future_to_promise(async move {
            let outcome = pending.run().await;
            if let Err(err) = outcome.result() {
                report("chat request failed", err);
            }

            let mut widget = widget.borrow_mut();
            let turn = widget.finish_send(outcome);
            let json = serde_json::to_string(turn).map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Start a fresh remote session; the transcript is kept
    pub fn reset(&self) {
        self.widget.borrow_mut().reset();
    }
}

/// Deliver the contact form; resolves on success, rejects with a user-facing message
#[wasm_bindgen]
pub fn submit_contact(name: String, email: String, message: String) -> js_sys::Promise {
    let config = read_page_config().contact;
    let client = ContactClient::new(config.bot_token, config.chat_id, FetchTransport);
    let form = ContactForm::new(name, email, message);

    future_to_promise(async move {
        match client.submit(&form).await {
            Ok(()) => Ok(JsValue::TRUE),
            Err(err) => {
                if !matches!(err, ContactError::Invalid(_)) {
                    report("contact form delivery failed", &err);
                }
                Err(JsValue::from_str(&err.to_string()))
            }
        }
    })
}

//! Browser bindings: `Dom`/`Host` over `web-sys` and the event wiring that
//! replaces the per-template `DOMContentLoaded` scripts.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlDocument, HtmlInputElement,
    HtmlSelectElement, KeyboardEvent, ScrollBehavior, ScrollToOptions, Window,
};

use crate::config::UiConfig;
use crate::dom::Dom;
use crate::fingerprint::{browser_fingerprint, BrowserTraits, FingerprintSource};
use crate::host::Host;
use crate::page::{hash_kind, Dispatch, Page, PageEvent};
use crate::transport::HttpTransport;

fn js_err(v: JsValue) -> String {
    v.as_string().unwrap_or_else(|| format!("{:?}", v))
}

// ── DOM ───────────────────────────────────────────────

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        WebDom { document }
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn first_by_tag(&self, parent: &Element, tag: &str) -> Option<Element> {
        parent.query_selector(tag).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node.as_ref();
        ancestor.contains(Some(node))
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            node.get_attribute("value").unwrap_or_default()
        }
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            let _ = node.set_attribute("value", value);
        }
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else {
            let _ = node.toggle_attribute_with_force("disabled", disabled);
        }
    }

    fn is_disabled(&self, node: &Element) -> bool {
        node.has_attribute("disabled")
    }

    fn create_element(&self, tag: &str) -> Element {
        self.document.create_element(tag).unwrap_throw()
    }

    fn append_to_body(&self, node: &Element) {
        if let Some(body) = self.document.body() {
            let _ = body.append_child(node);
        }
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn select_and_copy(&self, node: &Element) -> bool {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.select();
        }
        self.document
            .dyn_ref::<HtmlDocument>()
            .and_then(|d| d.exec_command("copy").ok())
            .unwrap_or(false)
    }
}

// ── Host ──────────────────────────────────────────────

pub struct WebHost {
    window: Window,
}

impl WebHost {
    pub fn new(window: Window) -> Self {
        WebHost { window }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn browser_traits(&self) -> BrowserTraits {
        let navigator = self.window.navigator();
        let screen = self.window.screen().ok();
        let dim = |v: Option<Result<i32, JsValue>>| v.and_then(|r| r.ok()).unwrap_or(0).max(0) as u32;
        BrowserTraits {
            user_agent: navigator.user_agent().unwrap_or_default(),
            screen_width: dim(screen.as_ref().map(|s| s.width())),
            screen_height: dim(screen.as_ref().map(|s| s.height())),
            color_depth: dim(screen.as_ref().map(|s| s.color_depth())),
            timezone_offset: js_sys::Date::new_0().get_timezone_offset() as i32,
            language: navigator.language().unwrap_or_default(),
        }
    }
}

impl Host for WebHost {
    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn navigate(&self, url: &str) {
        let _ = self.window.location().set_href(url);
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to_top(&self) {
        let opts = ScrollToOptions::new();
        opts.set_top(0.0);
        opts.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&opts);
    }

    fn now_ms(&self) -> u64 {
        self.window
            .performance()
            .map(|p| p.now() as u64)
            .unwrap_or(0)
    }
}

// ── Fingerprint library ───────────────────────────────

/// `window.FingerprintJS`, when the page loaded it.
pub struct FingerprintJs;

#[async_trait(?Send)]
impl FingerprintSource for FingerprintJs {
    async fn visitor_id(&self) -> Result<String, String> {
        let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
        let lib = Reflect::get(&window, &JsValue::from_str("FingerprintJS")).map_err(js_err)?;
        if lib.is_undefined() || lib.is_null() {
            return Err("FingerprintJS not loaded".into());
        }

        let load: Function = Reflect::get(&lib, &JsValue::from_str("load"))
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let agent = JsFuture::from(Promise::from(load.call0(&lib).map_err(js_err)?))
            .await
            .map_err(js_err)?;

        let get: Function = Reflect::get(&agent, &JsValue::from_str("get"))
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let result = JsFuture::from(Promise::from(get.call0(&agent).map_err(js_err)?))
            .await
            .map_err(js_err)?;

        Reflect::get(&result, &JsValue::from_str("visitorId"))
            .map_err(js_err)?
            .as_string()
            .ok_or_else(|| "visitorId missing".to_string())
    }
}

// ── Wiring ────────────────────────────────────────────

type SharedPage = Rc<RefCell<Page<WebDom>>>;

fn event_element(e: &Event) -> Option<Element> {
    e.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Keep ticking while toasts are on screen.
fn schedule_tick(page: &SharedPage, dom: &Rc<WebDom>, host: &Rc<WebHost>) {
    let delay = match page.borrow().next_tick_in(host.now_ms()) {
        Some(d) => d,
        None => return,
    };
    let (page, dom, host) = (page.clone(), dom.clone(), host.clone());
    let window = host.window().clone();
    let cb = Closure::once_into_js(move || {
        let _ = page.borrow_mut().handle(&*dom, &*host, PageEvent::Tick);
        schedule_tick(&page, &dom, &host);
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref(),
        delay.min(i32::MAX as u64) as i32,
    );
}

/// Mount every controller on the current document and attach listeners.
/// The fingerprint library resolves in the background and only updates the
/// subscription forms.
pub fn run(config: UiConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let dom = Rc::new(WebDom::new(document.clone()));
    let host = Rc::new(WebHost::new(window.clone()));
    let origin = window.location().origin()?;
    let transport = Rc::new(
        HttpTransport::new(&origin, &config.subscribe.endpoint)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
    );

    let traits = host.browser_traits();
    let page = Page::mount_with_fallback(&*dom, &*host, &config, &traits)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let page: SharedPage = Rc::new(RefCell::new(page));

    // Scroll
    {
        let (page, dom, host) = (page.clone(), dom.clone(), host.clone());
        let cb = Closure::wrap(Box::new(move |_: Event| {
            let offset = host.scroll_offset();
            let _ = page
                .borrow_mut()
                .handle(&*dom, &*host, PageEvent::Scroll { offset });
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("scroll", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Clicks anywhere in the document
    {
        let (page, dom, host) = (page.clone(), dom.clone(), host.clone());
        let cb = Closure::wrap(Box::new(move |e: Event| {
            let target = match event_element(&e) {
                Some(t) => t,
                None => return,
            };
            let _ = page
                .borrow_mut()
                .handle(&*dom, &*host, PageEvent::Click { target });
            schedule_tick(&page, &dom, &host);
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Enter in the search box
    {
        let (page, dom, host) = (page.clone(), dom.clone(), host.clone());
        let cb = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let target = match event_element(&e) {
                Some(t) => t,
                None => return,
            };
            let _ = page.borrow_mut().handle(
                &*dom,
                &*host,
                PageEvent::KeyDown {
                    target,
                    key: e.key(),
                },
            );
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Subscription forms
    {
        let (page, dom, host) = (page.clone(), dom.clone(), host.clone());
        let cb = Closure::wrap(Box::new(move |e: Event| {
            let form = match event_element(&e) {
                Some(f) => f,
                None => return,
            };
            let dispatch = page
                .borrow_mut()
                .handle(&*dom, &*host, PageEvent::Submit { form });
            if let Dispatch::Submit(form) = dispatch {
                e.prevent_default();
                let (dom, host, transport) = (dom.clone(), host.clone(), transport.clone());
                wasm_bindgen_futures::spawn_local(async move {
                    form.submit(&*dom, &*host, &*transport).await;
                });
            }
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    web_sys::console::log_1(&format!("pagewire: {}", page.borrow().mounted().join(", ")).into());
    if !page.borrow().forms().is_empty() {
        let kind = hash_kind(&config);
        wasm_bindgen_futures::spawn_local(async move {
            let fingerprint = browser_fingerprint(Some(&FingerprintJs), &traits, kind).await;
            page.borrow_mut().set_fingerprint(&*dom, &fingerprint);
        });
    }
    Ok(())
}

fn boot(config: UiConfig) {
    if let Err(e) = run(config) {
        web_sys::console::error_1(&format!("pagewire setup failed: {}", js_err(e)).into());
    }
}

fn start_when_ready(config: UiConfig) {
    let document = match web_sys::window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return,
    };
    if document.ready_state() != "loading" {
        boot(config);
        return;
    }
    let cb = Closure::once_into_js(move || boot(config));
    let _ = document.add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref());
}

/// Entry point with the stock element IDs. Call once from the page's module script.
#[wasm_bindgen]
pub fn start() {
    start_when_ready(UiConfig::default());
}

/// Entry point for templates that override IDs or messages with a TOML block.
#[wasm_bindgen]
pub fn start_with_config(toml: &str) -> Result<(), JsValue> {
    let config = UiConfig::from_toml_str(toml).map_err(|e| JsValue::from_str(&e.to_string()))?;
    start_when_ready(config);
    Ok(())
}

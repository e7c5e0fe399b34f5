use std::cell::{Cell, RefCell};

/// Window-level services: dialogs, navigation, viewport and clock.
/// Implementations: `MemoryHost` here and `WebHost` behind the `web` feature.
pub trait Host {
    /// Blocking alert dialog.
    fn alert(&self, message: &str);
    /// Full-page navigation to `url`.
    fn navigate(&self, url: &str);
    /// The current page URL (`location.href`).
    fn location(&self) -> String;
    fn viewport_width(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    /// Smooth-scroll the window back to the top.
    fn scroll_to_top(&self);
    /// Monotonic milliseconds, used to age toasts.
    fn now_ms(&self) -> u64;
}

/// Scriptable host for tests and offline template checks.
/// Records every alert and navigation instead of performing it.
pub struct MemoryHost {
    location: RefCell<String>,
    viewport_width: Cell<f64>,
    scroll_offset: Cell<f64>,
    now_ms: Cell<u64>,
    alerts: RefCell<Vec<String>>,
    navigations: RefCell<Vec<String>>,
    scroll_to_top_calls: Cell<u32>,
}

impl MemoryHost {
    pub fn new(location: &str) -> Self {
        MemoryHost {
            location: RefCell::new(location.to_string()),
            viewport_width: Cell::new(1280.0),
            scroll_offset: Cell::new(0.0),
            now_ms: Cell::new(0),
            alerts: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
            scroll_to_top_calls: Cell::new(0),
        }
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    pub fn set_scroll_offset(&self, offset: f64) {
        self.scroll_offset.set(offset);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn scroll_to_top_calls(&self) -> u32 {
        self.scroll_to_top_calls.get()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        MemoryHost::new("http://localhost/")
    }
}

impl Host for MemoryHost {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
        *self.location.borrow_mut() = url.to_string();
    }

    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    fn scroll_to_top(&self) {
        self.scroll_offset.set(0.0);
        self.scroll_to_top_calls.set(self.scroll_to_top_calls.get() + 1);
    }

    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

use crate::config::NavbarConfig;
use crate::dom::{require, Dom};
use crate::error::UiError;
use crate::host::Host;
use crate::toggle::{MenuState, NavbarStyle};

/// Navbar background/shadow that switches on once the page scrolls.
pub struct Navbar<D: Dom> {
    cfg: NavbarConfig,
    navbar: D::Node,
}

impl<D: Dom> Navbar<D> {
    pub fn bind(dom: &D, cfg: &NavbarConfig, offset: f64) -> Option<Self> {
        let navbar = dom.by_id(&cfg.navbar_id)?;
        let this = Navbar {
            cfg: cfg.clone(),
            navbar,
        };
        this.on_scroll(dom, offset);
        Some(this)
    }

    pub fn on_scroll(&self, dom: &D, offset: f64) -> NavbarStyle {
        let style = NavbarStyle::from_offset(offset, self.cfg.threshold);
        style.classes(&self.cfg).apply(dom, &self.navbar);
        style
    }
}

/// What a document click did to the mobile menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuClick {
    /// Click on the toggle button; carries the new state.
    Toggled(MenuState),
    /// Click inside the menu; propagation stops here.
    Swallowed,
    /// Outside click on a narrow viewport closed the open menu.
    Closed,
    Ignored,
}

/// Mobile menu opened by a toggle button. State lives in the menu's hidden class.
pub struct MobileMenu<D: Dom> {
    cfg: NavbarConfig,
    toggle: D::Node,
    menu: D::Node,
}

impl<D: Dom> MobileMenu<D> {
    /// Anchored on the toggle button; once that exists the menu itself is required.
    pub fn bind(dom: &D, cfg: &NavbarConfig) -> Result<Option<Self>, UiError> {
        let toggle = match dom.by_id(&cfg.menu_toggle_id) {
            Some(t) => t,
            None => return Ok(None),
        };
        let menu = require(dom, &cfg.mobile_menu_id)?;
        Ok(Some(MobileMenu {
            cfg: cfg.clone(),
            toggle,
            menu,
        }))
    }

    pub fn state(&self, dom: &D) -> MenuState {
        MenuState::from_hidden(dom.has_class(&self.menu, &self.cfg.menu_hidden_class))
    }

    fn set_state(&self, dom: &D, state: MenuState) {
        state.classes(&self.cfg).apply(dom, &self.menu);
    }

    pub fn toggle(&self, dom: &D) -> MenuState {
        let next = self.state(dom).toggled();
        self.set_state(dom, next);
        next
    }

    /// Route a click anywhere in the document.
    pub fn on_click<H: Host>(&self, dom: &D, host: &H, target: &D::Node) -> MenuClick {
        if dom.contains(&self.menu, target) {
            return MenuClick::Swallowed;
        }
        if dom.contains(&self.toggle, target) {
            return MenuClick::Toggled(self.toggle(dom));
        }
        if host.viewport_width() < self.cfg.breakpoint && self.state(dom) == MenuState::Open {
            self.set_state(dom, MenuState::Closed);
            return MenuClick::Closed;
        }
        MenuClick::Ignored
    }
}

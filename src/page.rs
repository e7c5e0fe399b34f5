use crate::config::UiConfig;
use crate::controllers::{
    BackToTop, CopyLink, Favorite, MenuClick, MobileMenu, Navbar, SearchBox, SubmitOutcome,
    SubscribeForm,
};
use crate::dom::Dom;
use crate::error::UiError;
use crate::fingerprint::{
    browser_fingerprint, fallback_fingerprint, BrowserTraits, FingerprintSource, HashKind,
};
use crate::host::Host;
use crate::toast::ToastRack;
use crate::transport::SubscribeTransport;

/// Digest used for the fallback fingerprint.
pub fn hash_kind(config: &UiConfig) -> HashKind {
    if config.subscribe.use_digest {
        HashKind::Sha256
    } else {
        HashKind::Fold
    }
}

/// Events the page reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    Scroll { offset: f64 },
    Click { target: N },
    KeyDown { target: N, key: String },
    Submit { form: N },
    /// Timer wake-up for toast fades.
    Tick,
}

/// What `Page::handle` did with an event.
pub enum Dispatch<D: Dom> {
    Ignored,
    Handled,
    /// A subscription form was submitted. Default navigation must be prevented
    /// and the form run with `SubscribeForm::submit`.
    Submit(SubscribeForm<D>),
}

impl<D: Dom> Dispatch<D> {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Dispatch::Ignored)
    }
}

/// Every controller bound to one page.
pub struct Page<D: Dom> {
    back_to_top: Option<BackToTop<D>>,
    navbar: Option<Navbar<D>>,
    menu: Option<MobileMenu<D>>,
    favorite: Option<Favorite<D>>,
    copy_link: Option<CopyLink<D>>,
    search: Option<SearchBox<D>>,
    forms: Vec<SubscribeForm<D>>,
    toasts: ToastRack<D>,
}

impl<D: Dom> Page<D> {
    /// Bind every controller whose anchor element is on the page.
    /// Fails when an anchor is present but an element it needs is missing.
    pub fn mount<H: Host>(
        dom: &D,
        host: &H,
        config: &UiConfig,
        fingerprint: &str,
    ) -> Result<Self, UiError> {
        let offset = host.scroll_offset();

        let mut forms = Vec::new();
        for ids in &config.subscribe.forms {
            if let Some(form) = SubscribeForm::bind(dom, ids, &config.subscribe, fingerprint)? {
                forms.push(form);
            }
        }

        let page = Page {
            back_to_top: BackToTop::bind(dom, &config.back_to_top, offset),
            navbar: Navbar::bind(dom, &config.navbar, offset),
            menu: MobileMenu::bind(dom, &config.navbar)?,
            favorite: Favorite::bind(dom, &config.article)?,
            copy_link: CopyLink::bind(dom, &config.article),
            search: SearchBox::bind(dom, &config.search)?,
            forms,
            toasts: ToastRack::new(config.toast.clone()),
        };
        log::debug!("[page] mounted: {}", page.mounted().join(", "));
        Ok(page)
    }

    /// Compute the browser fingerprint (only if the page has a subscription
    /// form) and mount.
    pub async fn setup<H, S>(
        dom: &D,
        host: &H,
        config: &UiConfig,
        source: Option<&S>,
        traits: &BrowserTraits,
    ) -> Result<Self, UiError>
    where
        H: Host,
        S: FingerprintSource + ?Sized,
    {
        let fingerprint = if Self::wants_fingerprint(dom, config) {
            browser_fingerprint(source, traits, hash_kind(config)).await
        } else {
            String::new()
        };
        Self::mount(dom, host, config, &fingerprint)
    }

    /// Mount at once with the local fallback fingerprint. Nothing waits on the
    /// fingerprint library; its visitor id goes in later via `set_fingerprint`.
    pub fn mount_with_fallback<H: Host>(
        dom: &D,
        host: &H,
        config: &UiConfig,
        traits: &BrowserTraits,
    ) -> Result<Self, UiError> {
        let fingerprint = if Self::wants_fingerprint(dom, config) {
            fallback_fingerprint(traits, hash_kind(config))
        } else {
            String::new()
        };
        Self::mount(dom, host, config, &fingerprint)
    }

    /// True when a subscription form is on the page.
    pub fn wants_fingerprint(dom: &D, config: &UiConfig) -> bool {
        config
            .subscribe
            .forms
            .iter()
            .any(|ids| dom.by_id(&ids.form_id).is_some())
    }

    /// Swap the fingerprint every bound form submits.
    pub fn set_fingerprint(&mut self, dom: &D, fingerprint: &str) {
        for form in &mut self.forms {
            form.set_fingerprint(dom, fingerprint);
        }
    }

    /// Names of the controllers that found their anchor.
    pub fn mounted(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.back_to_top.is_some() {
            names.push("back-to-top".to_string());
        }
        if self.navbar.is_some() {
            names.push("navbar".to_string());
        }
        if self.menu.is_some() {
            names.push("mobile-menu".to_string());
        }
        if self.favorite.is_some() {
            names.push("favorite".to_string());
        }
        if self.copy_link.is_some() {
            names.push("copy-link".to_string());
        }
        if self.search.is_some() {
            names.push("search".to_string());
        }
        for form in &self.forms {
            names.push(format!("subscribe:{}", form.ids().form_id));
        }
        names
    }

    pub fn handle<H: Host>(&mut self, dom: &D, host: &H, event: PageEvent<D::Node>) -> Dispatch<D> {
        match event {
            PageEvent::Scroll { offset } => {
                let mut handled = false;
                if let Some(b) = &mut self.back_to_top {
                    b.on_scroll(dom, offset);
                    handled = true;
                }
                if let Some(n) = &self.navbar {
                    n.on_scroll(dom, offset);
                    handled = true;
                }
                if handled {
                    Dispatch::Handled
                } else {
                    Dispatch::Ignored
                }
            }
            PageEvent::Click { target } => self.handle_click(dom, host, &target),
            PageEvent::KeyDown { target, key } => match &self.search {
                Some(s) if dom.contains(s.input(), &target) => {
                    if s.on_keydown(dom, host, &key).is_some() {
                        Dispatch::Handled
                    } else {
                        Dispatch::Ignored
                    }
                }
                _ => Dispatch::Ignored,
            },
            PageEvent::Submit { form } => match self.forms.iter().find(|f| *f.form() == form) {
                Some(f) => Dispatch::Submit(f.clone()),
                None => Dispatch::Ignored,
            },
            PageEvent::Tick => {
                self.toasts.tick(dom, host.now_ms());
                Dispatch::Handled
            }
        }
    }

    fn handle_click<H: Host>(&mut self, dom: &D, host: &H, target: &D::Node) -> Dispatch<D> {
        let mut handled = false;

        if let Some(b) = &self.back_to_top {
            if dom.contains(b.button(), target) {
                b.on_click(host);
                handled = true;
            }
        }
        if let Some(f) = &mut self.favorite {
            if dom.contains(f.button(), target) {
                f.on_click(dom, host, &mut self.toasts);
                handled = true;
            }
        }
        if let Some(c) = &self.copy_link {
            if dom.contains(c.button(), target) {
                c.on_click(dom, host, &mut self.toasts);
                handled = true;
            }
        }
        if let Some(s) = &self.search {
            if dom.contains(s.button(), target) {
                s.submit(dom, host);
                handled = true;
            }
        }
        // document-level listener: runs for every click that was not swallowed
        if let Some(m) = &self.menu {
            if m.on_click(dom, host, target) != MenuClick::Ignored {
                handled = true;
            }
        }

        if handled {
            Dispatch::Handled
        } else {
            Dispatch::Ignored
        }
    }

    /// `handle`, then run any resulting subscription to completion.
    pub async fn dispatch<H, T>(
        &mut self,
        dom: &D,
        host: &H,
        transport: &T,
        event: PageEvent<D::Node>,
    ) -> Option<SubmitOutcome>
    where
        H: Host,
        T: SubscribeTransport + ?Sized,
    {
        match self.handle(dom, host, event) {
            Dispatch::Submit(form) => Some(form.submit(dom, host, transport).await),
            _ => None,
        }
    }

    /// Milliseconds until the next toast needs a `Tick`.
    pub fn next_tick_in(&self, now_ms: u64) -> Option<u64> {
        self.toasts.next_deadline(now_ms)
    }

    pub fn menu(&self) -> Option<&MobileMenu<D>> {
        self.menu.as_ref()
    }

    pub fn favorite(&self) -> Option<&Favorite<D>> {
        self.favorite.as_ref()
    }

    pub fn forms(&self) -> &[SubscribeForm<D>] {
        &self.forms
    }

    pub fn toasts(&self) -> &ToastRack<D> {
        &self.toasts
    }
}

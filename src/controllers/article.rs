use crate::config::ArticleConfig;
use crate::dom::Dom;
use crate::error::UiError;
use crate::host::Host;
use crate::toast::ToastRack;
use crate::toggle::FavoriteState;

/// Favorite button on the article page. Client-local only: nothing is sent
/// to the server and the state resets on reload.
pub struct Favorite<D: Dom> {
    cfg: ArticleConfig,
    button: D::Node,
    icon: D::Node,
    label: D::Node,
    state: FavoriteState,
}

impl<D: Dom> Favorite<D> {
    pub fn bind(dom: &D, cfg: &ArticleConfig) -> Result<Option<Self>, UiError> {
        let button = match dom.by_id(&cfg.favorite_id) {
            Some(b) => b,
            None => return Ok(None),
        };
        let icon = dom
            .first_by_tag(&button, &cfg.icon_tag)
            .ok_or_else(|| UiError::missing(&format!("{} > {}", cfg.favorite_id, cfg.icon_tag)))?;
        let label = dom
            .first_by_tag(&button, &cfg.label_tag)
            .ok_or_else(|| UiError::missing(&format!("{} > {}", cfg.favorite_id, cfg.label_tag)))?;

        let state = if dom.has_class(&icon, &cfg.favorited.icon_class) {
            FavoriteState::Favorited
        } else {
            FavoriteState::Unfavorited
        };

        Ok(Some(Favorite {
            cfg: cfg.clone(),
            button,
            icon,
            label,
            state,
        }))
    }

    /// Flip the state. A toast is shown only when the article becomes favorited.
    pub fn on_click<H: Host>(&mut self, dom: &D, host: &H, toasts: &mut ToastRack<D>) -> FavoriteState {
        self.state = self.state.toggled();
        let render = self.state.render(&self.cfg);
        render.icon.apply(dom, &self.icon);
        render.container.apply(dom, &self.button);
        dom.set_text(&self.label, render.label);

        if self.state == FavoriteState::Favorited {
            toasts.show(dom, &self.cfg.favorited_toast, host.now_ms());
        }
        self.state
    }

    pub fn button(&self) -> &D::Node {
        &self.button
    }

    pub fn state(&self) -> FavoriteState {
        self.state
    }
}

/// "Copy link" button: puts the current page URL on the clipboard.
pub struct CopyLink<D: Dom> {
    toast: String,
    button: D::Node,
}

impl<D: Dom> CopyLink<D> {
    pub fn bind(dom: &D, cfg: &ArticleConfig) -> Option<Self> {
        let button = dom.by_id(&cfg.copy_link_id)?;
        Some(CopyLink {
            toast: cfg.copied_toast.clone(),
            button,
        })
    }

    /// Copies through a temporary input and the platform copy command.
    /// A refused copy is silent; the toast is shown either way.
    pub fn on_click<H: Host>(&self, dom: &D, host: &H, toasts: &mut ToastRack<D>) -> bool {
        let input = dom.create_element("input");
        dom.set_value(&input, &host.location());
        dom.append_to_body(&input);
        let copied = dom.select_and_copy(&input);
        dom.remove(&input);
        if !copied {
            log::debug!("[copy-link] copy command refused");
        }
        toasts.show(dom, &self.toast, host.now_ms());
        copied
    }

    pub fn button(&self) -> &D::Node {
        &self.button
    }
}

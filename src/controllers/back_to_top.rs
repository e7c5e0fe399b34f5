use crate::config::BackToTopConfig;
use crate::dom::Dom;
use crate::host::Host;
use crate::toggle::BackToTopState;

/// Fixed "back to top" button shown once the page is scrolled far enough.
pub struct BackToTop<D: Dom> {
    cfg: BackToTopConfig,
    button: D::Node,
    state: BackToTopState,
}

impl<D: Dom> BackToTop<D> {
    /// `None` when the page has no back-to-top button.
    pub fn bind(dom: &D, cfg: &BackToTopConfig, offset: f64) -> Option<Self> {
        let button = dom.by_id(&cfg.id)?;
        let mut this = BackToTop {
            cfg: cfg.clone(),
            button,
            state: BackToTopState::Hidden,
        };
        this.on_scroll(dom, offset);
        Some(this)
    }

    pub fn on_scroll(&mut self, dom: &D, offset: f64) -> BackToTopState {
        self.state = BackToTopState::from_offset(offset, self.cfg.threshold);
        self.state.classes(&self.cfg).apply(dom, &self.button);
        self.state
    }

    pub fn on_click<H: Host>(&self, host: &H) {
        host.scroll_to_top();
    }

    pub fn button(&self) -> &D::Node {
        &self.button
    }

    pub fn state(&self) -> BackToTopState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId};
    use crate::host::MemoryHost;

    const HTML: &str =
        r#"<body><button id="back-to-top" class="fixed bottom-8 opacity-0 invisible">Top</button></body>"#;

    fn classes_without_layout(dom: &MemoryDom, node: NodeId) -> Vec<String> {
        let mut c: Vec<String> = dom
            .class_names(node)
            .into_iter()
            .filter(|c| c != "fixed" && c != "bottom-8")
            .collect();
        c.sort();
        c
    }

    #[test]
    fn test_missing_button_is_not_mounted() {
        let dom = MemoryDom::from_html("<body></body>").unwrap();
        assert!(BackToTop::bind(&dom, &BackToTopConfig::default(), 0.0).is_none());
    }

    #[test]
    fn test_classes_follow_offset() {
        let dom = MemoryDom::from_html(HTML).unwrap();
        let cfg = BackToTopConfig::default();
        let mut ctl = BackToTop::bind(&dom, &cfg, 0.0).unwrap();
        let node = *ctl.button();

        let mut visible = cfg.visible_classes.clone();
        visible.sort();
        let mut hidden = cfg.hidden_classes.clone();
        hidden.sort();

        for offset in [0.0, 1.0, 150.0, 299.0, 299.99, 300.0, 301.0, 5000.0, 120.0, 300.0] {
            ctl.on_scroll(&dom, offset);
            let expected = if offset >= 300.0 { &visible } else { &hidden };
            assert_eq!(&classes_without_layout(&dom, node), expected, "offset {}", offset);
        }
        assert!(dom.has_class(&node, "fixed"));
    }

    #[test]
    fn test_bind_applies_current_offset() {
        let dom = MemoryDom::from_html(HTML).unwrap();
        let ctl = BackToTop::bind(&dom, &BackToTopConfig::default(), 800.0).unwrap();
        assert_eq!(ctl.state(), BackToTopState::Visible);
        assert!(dom.has_class(ctl.button(), "visible"));
        assert!(!dom.has_class(ctl.button(), "invisible"));
    }

    #[test]
    fn test_click_scrolls_to_top() {
        let dom = MemoryDom::from_html(HTML).unwrap();
        let host = MemoryHost::default();
        host.set_scroll_offset(900.0);
        let ctl = BackToTop::bind(&dom, &BackToTopConfig::default(), 900.0).unwrap();
        ctl.on_click(&host);
        assert_eq!(host.scroll_to_top_calls(), 1);
        assert_eq!(host.scroll_offset(), 0.0);
    }
}

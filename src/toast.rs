use crate::config::ToastConfig;
use crate::dom::Dom;

/// Where a toast is in its life: shown, fading out, then gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Fading,
    Removed,
}

impl ToastPhase {
    pub fn at(elapsed_ms: u64, cfg: &ToastConfig) -> Self {
        if elapsed_ms < cfg.visible_ms {
            ToastPhase::Visible
        } else if elapsed_ms < cfg.visible_ms + cfg.fade_ms {
            ToastPhase::Fading
        } else {
            ToastPhase::Removed
        }
    }
}

struct ActiveToast<N> {
    node: N,
    shown_at: u64,
    phase: ToastPhase,
}

/// Transient notifications appended to `<body>`.
pub struct ToastRack<D: Dom> {
    cfg: ToastConfig,
    active: Vec<ActiveToast<D::Node>>,
}

impl<D: Dom> ToastRack<D> {
    pub fn new(cfg: ToastConfig) -> Self {
        ToastRack {
            cfg,
            active: Vec::new(),
        }
    }

    pub fn show(&mut self, dom: &D, message: &str, now_ms: u64) -> D::Node {
        let node = dom.create_element("div");
        for class in &self.cfg.classes {
            dom.add_class(&node, class);
        }
        dom.set_text(&node, message);
        dom.append_to_body(&node);
        self.active.push(ActiveToast {
            node: node.clone(),
            shown_at: now_ms,
            phase: ToastPhase::Visible,
        });
        node
    }

    /// Fade and remove toasts whose time is up.
    pub fn tick(&mut self, dom: &D, now_ms: u64) {
        let cfg = &self.cfg;
        self.active.retain_mut(|toast| {
            let phase = ToastPhase::at(now_ms.saturating_sub(toast.shown_at), cfg);
            if phase != toast.phase {
                match phase {
                    ToastPhase::Fading => dom.add_class(&toast.node, &cfg.fade_class),
                    ToastPhase::Removed => dom.remove(&toast.node),
                    ToastPhase::Visible => {}
                }
                toast.phase = phase;
            }
            phase != ToastPhase::Removed
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Milliseconds from `now_ms` until the next phase change, if any toast is live.
    pub fn next_deadline(&self, now_ms: u64) -> Option<u64> {
        self.active
            .iter()
            .map(|t| {
                let boundary = match t.phase {
                    ToastPhase::Visible => t.shown_at + self.cfg.visible_ms,
                    _ => t.shown_at + self.cfg.visible_ms + self.cfg.fade_ms,
                };
                boundary.saturating_sub(now_ms)
            })
            .min()
    }
}

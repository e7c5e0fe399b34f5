use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::UiError;

/// Everything the controllers need to know about the page they are mounted on:
/// element IDs, thresholds, class names, messages and timings.
/// Every field has a default matching the stock public-site templates, so an
/// empty TOML file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub back_to_top: BackToTopConfig,
    pub navbar: NavbarConfig,
    pub article: ArticleConfig,
    pub toast: ToastConfig,
    pub search: SearchConfig,
    pub subscribe: SubscribeConfig,
}

impl UiConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, UiError> {
        let config: UiConfig = toml::from_str(s).map_err(|e| UiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, UiError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| UiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), UiError> {
        if self.back_to_top.threshold < 0.0 || self.navbar.threshold < 0.0 {
            return Err(UiError::Config("scroll thresholds must not be negative".into()));
        }
        if !self.subscribe.endpoint.starts_with('/') && !self.subscribe.endpoint.starts_with("http") {
            return Err(UiError::Config(format!(
                "subscribe endpoint '{}' must be a path or absolute URL",
                self.subscribe.endpoint
            )));
        }
        for form in &self.subscribe.forms {
            if form.form_id.is_empty() || form.email_id.is_empty() {
                return Err(UiError::Config("subscribe form ids must not be empty".into()));
            }
        }
        Ok(())
    }
}

fn classes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

// ── Scroll toggles ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackToTopConfig {
    pub id: String,
    /// Button becomes visible once the offset reaches this many pixels.
    pub threshold: f64,
    pub visible_classes: Vec<String>,
    pub hidden_classes: Vec<String>,
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        BackToTopConfig {
            id: "back-to-top".into(),
            threshold: 300.0,
            visible_classes: classes(&["opacity-100", "visible"]),
            hidden_classes: classes(&["opacity-0", "invisible"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub navbar_id: String,
    pub menu_toggle_id: String,
    pub mobile_menu_id: String,
    /// Navbar switches to its scrolled style strictly past this offset.
    pub threshold: f64,
    pub scrolled_classes: Vec<String>,
    pub resting_classes: Vec<String>,
    pub menu_hidden_class: String,
    /// Outside clicks only close the menu below this viewport width.
    pub breakpoint: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        NavbarConfig {
            navbar_id: "navbar".into(),
            menu_toggle_id: "menu-toggle".into(),
            mobile_menu_id: "mobile-menu".into(),
            threshold: 50.0,
            scrolled_classes: classes(&["shadow-md", "bg-white/95", "backdrop-blur"]),
            resting_classes: classes(&["bg-transparent"]),
            menu_hidden_class: "hidden".into(),
            breakpoint: 768.0,
        }
    }
}

// ── Article interactions ──────────────────────────────

/// How one favorite state is drawn on the button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLook {
    pub icon_class: String,
    pub label: String,
    pub color_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub favorite_id: String,
    pub copy_link_id: String,
    /// Tag of the icon element inside the favorite button.
    pub icon_tag: String,
    /// Tag of the label element inside the favorite button.
    pub label_tag: String,
    pub unfavorited: FavoriteLook,
    pub favorited: FavoriteLook,
    pub favorited_toast: String,
    pub copied_toast: String,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        ArticleConfig {
            favorite_id: "favorite-btn".into(),
            copy_link_id: "copy-link-btn".into(),
            icon_tag: "i".into(),
            label_tag: "span".into(),
            unfavorited: FavoriteLook {
                icon_class: "fa-regular".into(),
                label: "Favorite".into(),
                color_class: "text-gray-600".into(),
            },
            favorited: FavoriteLook {
                icon_class: "fa-solid".into(),
                label: "Favorited".into(),
                color_class: "text-red-500".into(),
            },
            favorited_toast: "Added to favorites".into(),
            copied_toast: "Link copied to clipboard".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub visible_ms: u64,
    pub fade_ms: u64,
    pub classes: Vec<String>,
    pub fade_class: String,
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            visible_ms: 2000,
            fade_ms: 300,
            classes: classes(&[
                "fixed",
                "bottom-4",
                "right-4",
                "bg-gray-800",
                "text-white",
                "px-4",
                "py-2",
                "rounded",
                "shadow-lg",
                "transition-opacity",
                "duration-300",
            ]),
            fade_class: "opacity-0".into(),
        }
    }
}

// ── Search ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub input_id: String,
    pub button_id: String,
    pub order_id: String,
    pub path: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            input_id: "article-search".into(),
            button_id: "search-button".into(),
            order_id: "article-order-by".into(),
            path: "/search".into(),
        }
    }
}

// ── Subscription ──────────────────────────────────────

/// Element IDs of one subscription form variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeFormIds {
    pub form_id: String,
    pub email_id: String,
    pub button_id: String,
    pub fingerprint_id: String,
}

impl SubscribeFormIds {
    pub fn footer() -> Self {
        SubscribeFormIds {
            form_id: "subscribe-form".into(),
            email_id: "subscribe-email".into(),
            button_id: "subscribe-button".into(),
            fingerprint_id: "browser-fingerprint".into(),
        }
    }

    pub fn article() -> Self {
        SubscribeFormIds {
            form_id: "article-subscribe-form".into(),
            email_id: "article-subscribe-email".into(),
            button_id: "article-subscribe-button".into(),
            fingerprint_id: "article-browser-fingerprint".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeConfig {
    pub endpoint: String,
    pub forms: Vec<SubscribeFormIds>,
    pub invalid_email_message: String,
    pub failure_message: String,
    pub loading_html: String,
    /// Hash the fallback fingerprint with SHA-256. When off, the 32-bit fold hash is used.
    pub use_digest: bool,
}

impl Default for SubscribeConfig {
    fn default() -> Self {
        SubscribeConfig {
            endpoint: "/subscribe".into(),
            forms: vec![SubscribeFormIds::footer(), SubscribeFormIds::article()],
            invalid_email_message: "Please enter a valid email address".into(),
            failure_message: "Subscription failed, please try again later".into(),
            loading_html: "<i class=\"fa-solid fa-spinner fa-spin\"></i> Subscribing...".into(),
            use_digest: true,
        }
    }
}

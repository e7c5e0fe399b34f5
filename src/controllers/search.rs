use url::form_urlencoded;

use crate::config::SearchConfig;
use crate::dom::{require, Dom};
use crate::error::UiError;
use crate::host::Host;

/// Sort orders the search page understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Newest first.
    Latest,
    /// Most viewed first.
    Popular,
}

impl OrderBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            OrderBy::Latest => "0",
            OrderBy::Popular => "1",
        }
    }

    pub fn from_param(s: &str) -> Option<Self> {
        match s.trim() {
            "0" | "latest" => Some(OrderBy::Latest),
            "1" | "popular" => Some(OrderBy::Popular),
            _ => None,
        }
    }
}

/// Build `<path>?keyword=<term>&order_by=<order>`, form-encoding both values.
pub fn search_url(path: &str, keyword: &str, order_by: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("keyword", keyword)
        .append_pair("order_by", order_by)
        .finish();
    format!("{}?{}", path, query)
}

/// Search box with an order-by selector and a submit button.
pub struct SearchBox<D: Dom> {
    path: String,
    input: D::Node,
    button: D::Node,
    order: D::Node,
}

impl<D: Dom> SearchBox<D> {
    /// Anchored on the search input; button and selector are then required.
    pub fn bind(dom: &D, cfg: &SearchConfig) -> Result<Option<Self>, UiError> {
        let input = match dom.by_id(&cfg.input_id) {
            Some(i) => i,
            None => return Ok(None),
        };
        let button = require(dom, &cfg.button_id)?;
        let order = require(dom, &cfg.order_id)?;
        Ok(Some(SearchBox {
            path: cfg.path.clone(),
            input,
            button,
            order,
        }))
    }

    /// The URL the current input would navigate to. An empty keyword is allowed.
    pub fn current_url(&self, dom: &D) -> String {
        let keyword = dom.value(&self.input);
        let order = dom.value(&self.order);
        search_url(&self.path, keyword.trim(), &order)
    }

    pub fn submit<H: Host>(&self, dom: &D, host: &H) -> String {
        let url = self.current_url(dom);
        log::debug!("[search] navigating to {}", url);
        host.navigate(&url);
        url
    }

    /// Enter in the input submits; any other key is ignored.
    pub fn on_keydown<H: Host>(&self, dom: &D, host: &H, key: &str) -> Option<String> {
        if key == "Enter" {
            Some(self.submit(dom, host))
        } else {
            None
        }
    }

    pub fn input(&self) -> &D::Node {
        &self.input
    }

    pub fn button(&self) -> &D::Node {
        &self.button
    }
}

use std::cell::{Cell, RefCell};

use quick_xml::escape::{escape, partial_escape, resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::Dom;
use crate::error::UiError;

/// Handle to an element in a `MemoryDom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Element(NodeId),
}

#[derive(Debug, Clone, Default)]
struct MemNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    value: String,
    disabled: bool,
    parent: Option<NodeId>,
    content: Vec<Content>,
}

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose body is raw text, not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

fn tag_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase()
}

/// Resolve named, decimal and hex character references. Text that is not
/// valid markup (a bare `&`) is kept as written.
fn decode_entities(s: &str) -> String {
    unescape_with(s, resolve_html5_entity)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

fn parse_error(position: impl std::fmt::Display, e: quick_xml::Error) -> UiError {
    UiError::Template(format!("HTML parse error at byte {}: {}", position, e))
}

/// A small in-memory document. Parses enough HTML to bind controllers to a
/// real page template and records what the controllers did to it.
pub struct MemoryDom {
    nodes: RefCell<Vec<MemNode>>,
    root: NodeId,
    clipboard: RefCell<Option<String>>,
    copy_supported: Cell<bool>,
}

impl MemoryDom {
    pub fn new() -> Self {
        MemoryDom {
            nodes: RefCell::new(vec![MemNode {
                tag: "#document".into(),
                ..MemNode::default()
            }]),
            root: NodeId(0),
            clipboard: RefCell::new(None),
            copy_supported: Cell::new(true),
        }
    }

    pub fn from_html(html: &str) -> Result<Self, UiError> {
        let dom = MemoryDom::new();
        dom.parse_into(dom.root, html)?;
        Ok(dom)
    }

    fn parse_into(&self, parent: NodeId, html: &str) -> Result<(), UiError> {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut stack: Vec<NodeId> = vec![parent];
        loop {
            let top = *stack.last().unwrap_or(&parent);
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let name = tag_name(&e);
                    let node = self.open_element(top, &name, &e);
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        continue;
                    }
                    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        let end = e.to_end().into_owned();
                        let raw = reader
                            .read_text(end.name())
                            .map_err(|err| parse_error(reader.buffer_position(), err))?;
                        if name == "textarea" {
                            self.nodes.borrow_mut()[node.0].value = decode_entities(&raw);
                        } else if !raw.is_empty() {
                            self.nodes.borrow_mut()[node.0]
                                .content
                                .push(Content::Text(raw.into_owned()));
                        }
                        continue;
                    }
                    stack.push(node);
                }
                Ok(Event::Empty(e)) => {
                    self.open_element(top, &tag_name(&e), &e);
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    if let Some(idx) = stack.iter().rposition(|n| self.tag_of(*n) == name) {
                        if idx > 0 {
                            stack.truncate(idx);
                        }
                    }
                }
                Ok(Event::Text(t)) => self.push_text(top, &String::from_utf8_lossy(&t)),
                // comments, doctype, CDATA, processing instructions
                Ok(_) => {}
                Err(e) => return Err(parse_error(reader.buffer_position(), e)),
            }
        }
        Ok(())
    }

    fn open_element(&self, parent: NodeId, name: &str, start: &BytesStart) -> NodeId {
        let node = self.create_element(name);
        self.apply_attributes(node, start);
        self.attach(parent, node);
        node
    }

    fn push_text(&self, parent: NodeId, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.nodes.borrow_mut()[parent.0]
            .content
            .push(Content::Text(decode_entities(raw)));
    }

    fn apply_attributes(&self, node: NodeId, start: &BytesStart) {
        let mut attrs = start.html_attributes();
        attrs.with_checks(false);
        let mut nodes = self.nodes.borrow_mut();
        let n = &mut nodes[node.0];
        for attr in attrs.flatten() {
            let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = decode_entities(&String::from_utf8_lossy(&attr.value));
            match name.as_str() {
                "id" => n.id = Some(value),
                "class" => n.classes = value.split_whitespace().map(|c| c.to_string()).collect(),
                "value" => n.value = value,
                "disabled" => n.disabled = true,
                _ => n.attrs.push((name, value)),
            }
        }
    }

    fn tag_of(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0]
                .content
                .retain(|c| !matches!(c, Content::Element(id) if *id == node));
        }
    }

    fn attach(&self, parent: NodeId, node: NodeId) {
        self.detach(node);
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].parent = Some(parent);
        nodes[parent.0].content.push(Content::Element(node));
    }

    fn clear_content(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let old = std::mem::take(&mut nodes[node.0].content);
        for c in old {
            if let Content::Element(child) = c {
                nodes[child.0].parent = None;
            }
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut cur = node;
        loop {
            if cur == self.root {
                return true;
            }
            match nodes[cur.0].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    fn body(&self) -> NodeId {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.tag_of(*n) == "body")
            .unwrap_or(self.root)
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = nodes[node.0]
            .content
            .iter()
            .rev()
            .filter_map(|c| match c {
                Content::Element(id) => Some(*id),
                Content::Text(_) => None,
            })
            .collect();
        while let Some(n) = pending.pop() {
            out.push(n);
            for c in nodes[n.0].content.iter().rev() {
                if let Content::Element(id) = c {
                    pending.push(*id);
                }
            }
        }
        out
    }

    fn serialize_content(&self, node: NodeId, out: &mut String) {
        let content = self.nodes.borrow()[node.0].content.clone();
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag_of(node).as_str());
        for c in content {
            match c {
                Content::Text(t) if raw => out.push_str(&t),
                Content::Text(t) => out.push_str(&partial_escape(&t)),
                Content::Element(child) => self.serialize_element(child, out),
            }
        }
    }

    fn serialize_element(&self, node: NodeId, out: &mut String) {
        let n = self.nodes.borrow()[node.0].clone();
        out.push('<');
        out.push_str(&n.tag);
        if let Some(id) = &n.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !n.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&n.classes.join(" "))));
        }
        for (k, v) in &n.attrs {
            out.push_str(&format!(" {}=\"{}\"", k, escape(v)));
        }
        if n.tag == "input" && !n.value.is_empty() {
            out.push_str(&format!(" value=\"{}\"", escape(&n.value)));
        }
        if n.disabled {
            out.push_str(" disabled");
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&n.tag.as_str()) {
            return;
        }
        self.serialize_content(node, out);
        out.push_str(&format!("</{}>", n.tag));
    }

    // ── Inspection ────────────────────────────────────

    pub fn class_names(&self, node: NodeId) -> Vec<String> {
        self.nodes.borrow()[node.0].classes.clone()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.tag_of(node)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    /// IDs of every element currently attached to the document, in document order.
    pub fn element_ids(&self) -> Vec<String> {
        let nodes = self.nodes.borrow();
        self.descendants(self.root)
            .into_iter()
            .filter_map(|n| nodes[n.0].id.clone())
            .collect()
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|n| self.has_class(n, class))
            .collect()
    }

    /// Number of element children directly under `<body>` (or the document root).
    pub fn body_len(&self) -> usize {
        let body = self.body();
        self.nodes.borrow()[body.0]
            .content
            .iter()
            .filter(|c| matches!(c, Content::Element(_)))
            .count()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    pub fn set_copy_supported(&self, supported: bool) {
        self.copy_supported.set(supported);
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        MemoryDom::new()
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        self.descendants(self.root)
            .into_iter()
            .find(|n| nodes[n.0].id.as_deref() == Some(id))
    }

    fn first_by_tag(&self, parent: &NodeId, tag: &str) -> Option<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(*parent)
            .into_iter()
            .find(|n| self.tag_of(*n) == tag)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut cur = Some(*node);
        while let Some(n) = cur {
            if n == *ancestor {
                return true;
            }
            cur = nodes[n.0].parent;
        }
        false
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.retain(|c| c != class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn text(&self, node: &NodeId) -> String {
        let content = self.nodes.borrow()[node.0].content.clone();
        let mut out = String::new();
        for c in content {
            match c {
                Content::Text(t) => out.push_str(&t),
                Content::Element(child) => out.push_str(&self.text(&child)),
            }
        }
        out
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.clear_content(*node);
        if !text.is_empty() {
            self.nodes.borrow_mut()[node.0]
                .content
                .push(Content::Text(text.to_string()));
        }
    }

    fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.serialize_content(*node, &mut out);
        out
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        self.clear_content(*node);
        if self.parse_into(*node, html).is_err() {
            log::debug!("set_inner_html: unparsable markup kept as text");
            self.set_text(node, html);
        }
    }

    fn value(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].value.clone()
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        self.nodes.borrow_mut()[node.0].value = value.to_string();
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        self.nodes.borrow_mut()[node.0].disabled = disabled;
    }

    fn is_disabled(&self, node: &NodeId) -> bool {
        self.nodes.borrow()[node.0].disabled
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MemNode {
            tag: tag.to_ascii_lowercase(),
            ..MemNode::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn append_to_body(&self, node: &NodeId) {
        let body = self.body();
        self.attach(body, *node);
    }

    fn remove(&self, node: &NodeId) {
        self.detach(*node);
    }

    fn select_and_copy(&self, node: &NodeId) -> bool {
        if !self.copy_supported.get() || !self.is_attached(*node) {
            return false;
        }
        *self.clipboard.borrow_mut() = Some(self.value(node));
        true
    }
}

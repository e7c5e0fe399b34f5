pub mod memory;

use std::fmt::Debug;

use crate::error::UiError;

pub use memory::{MemoryDom, NodeId};

/// The slice of the document API the controllers use.
/// Implementations: `MemoryDom` (tests, template checks) and `WebDom` (browser, `web` feature).
///
/// All methods take `&self`; implementations keep their own interior mutability so a
/// controller can hold the DOM across an `.await`.
pub trait Dom {
    type Node: Clone + PartialEq + Debug;

    fn by_id(&self, id: &str) -> Option<Self::Node>;
    /// First descendant of `parent` with the given tag name.
    fn first_by_tag(&self, parent: &Self::Node, tag: &str) -> Option<Self::Node>;
    /// True if `node` is `ancestor` or sits anywhere beneath it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn inner_html(&self, node: &Self::Node) -> String;
    fn set_inner_html(&self, node: &Self::Node, html: &str);

    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&self, node: &Self::Node, value: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    fn is_disabled(&self, node: &Self::Node) -> bool;

    fn create_element(&self, tag: &str) -> Self::Node;
    fn append_to_body(&self, node: &Self::Node);
    fn remove(&self, node: &Self::Node);

    /// Select the contents of an input and run the platform copy command.
    /// Returns false when the platform refuses.
    fn select_and_copy(&self, node: &Self::Node) -> bool;
}

/// Look up an element that must exist once its controller's anchor is present.
pub fn require<D: Dom>(dom: &D, id: &str) -> Result<D::Node, UiError> {
    dom.by_id(id).ok_or_else(|| UiError::missing(id))
}

/// Classes to add and remove for one state of a two-state toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassSet<'a> {
    pub add: &'a [String],
    pub remove: &'a [String],
}

impl<'a> ClassSet<'a> {
    pub fn apply<D: Dom>(&self, dom: &D, node: &D::Node) {
        for class in self.remove {
            dom.remove_class(node, class);
        }
        for class in self.add {
            dom.add_class(node, class);
        }
    }

    /// True when the node already carries exactly this state's classes.
    pub fn is_applied<D: Dom>(&self, dom: &D, node: &D::Node) -> bool {
        self.add.iter().all(|c| dom.has_class(node, c))
            && !self.remove.iter().any(|c| dom.has_class(node, c))
    }
}

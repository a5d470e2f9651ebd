//! Arena document model.
//!
//! All nodes live in a flat arena owned by [`Document`] and reference each
//! other by [`NodeId`], so element handles stay `Copy` and the tree can be
//! mutated without reference juggling.

/// Handle to a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Elements that never have children or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A single attribute; `value` is `None` for bare attributes like `selected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

/// Data specific to element nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercased tag name.
    pub name: String,

    /// Attributes in source order, names lowercased.
    pub attrs: Vec<Attr>,
}

impl ElementData {
    /// Attribute value; `None` when absent or bare.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }

    /// True when the attribute is present, bare or not.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = Some(value.to_string());
        } else {
            self.attrs.push(Attr {
                name: name.to_string(),
                value: Some(value.to_string()),
            });
        }
    }

    /// Class tokens in attribute order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Append a class token; no-op when already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut value = self.attribute("class").unwrap_or("").to_string();
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(class);
        self.set_attribute("class", &value);
    }

    /// Drop a class token; no-op when absent.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let value = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute("class", &value);
    }
}

/// Payload distinguishing the kinds of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Doctype content after the keyword, e.g. `html`.
    Doctype(String),

    Element(ElementData),

    /// Raw text run; entities are kept verbatim.
    Text(String),

    /// Comment body without the `<!--` and `-->` delimiters.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    line: usize,
}

/// A parsed HTML page.
///
/// The tree is rooted in a list of top-level nodes (doctype, comments, the
/// `html` element); there is no synthetic document node.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Document {
    pub(crate) fn push(&mut self, kind: NodeKind, parent: Option<NodeId>, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            line,
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Top-level nodes in source order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// 1-based source line the node started on.
    pub fn line(&self, id: NodeId) -> usize {
        self.nodes[id.0].line
    }

    /// Element payload, `None` for non-element nodes.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Every node in document order (pre-order walk of all roots).
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Pre-order walk of a node's subtree, excluding the node itself.
    pub fn descendants_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Concatenated text of a node's subtree, in document order.
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(text) = self.kind(id) {
            out.push_str(text);
        }
        for child in self.descendants_of(id) {
            if let NodeKind::Text(text) = self.kind(child) {
                out.push_str(text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(name: &str) -> NodeKind {
        NodeKind::Element(ElementData {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let mut doc = Document::default();
        let html = doc.push(element("html"), None, 1);
        let head = doc.push(element("head"), Some(html), 2);
        doc.push(element("title"), Some(head), 3);
        let body = doc.push(element("body"), Some(html), 4);
        doc.push(element("p"), Some(body), 5);

        let names: Vec<&str> = doc
            .descendants()
            .filter_map(|id| doc.element(id).map(|el| el.name.as_str()))
            .collect();

        assert_eq!(names, vec!["html", "head", "title", "body", "p"]);
    }

    #[test]
    fn text_of_concatenates_subtree_text() {
        let mut doc = Document::default();
        let p = doc.push(element("p"), None, 1);
        doc.push(NodeKind::Text("Hello ".to_string()), Some(p), 1);
        let em = doc.push(element("em"), Some(p), 1);
        doc.push(NodeKind::Text("world".to_string()), Some(em), 1);

        assert_eq!(doc.text_of(p), "Hello world");
    }

    #[test]
    fn set_attribute_replaces_existing_value() {
        let mut el = ElementData {
            name: "div".to_string(),
            attrs: vec![Attr {
                name: "data-weight".to_string(),
                value: Some("regular".to_string()),
            }],
        };

        el.set_attribute("data-weight", "bold");

        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attribute("data-weight"), Some("bold"));
    }

    #[test]
    fn class_tokens_add_and_remove() {
        let mut el = ElementData {
            name: "div".to_string(),
            attrs: vec![Attr {
                name: "class".to_string(),
                value: Some("js-modifiable regular".to_string()),
            }],
        };

        el.add_class("bold");
        assert_eq!(el.attribute("class"), Some("js-modifiable regular bold"));

        el.add_class("bold");
        assert_eq!(el.attribute("class"), Some("js-modifiable regular bold"));

        el.remove_class("regular");
        assert_eq!(el.attribute("class"), Some("js-modifiable bold"));

        el.remove_class("absent");
        assert_eq!(el.attribute("class"), Some("js-modifiable bold"));
    }

    #[test]
    fn class_queries_on_missing_attribute() {
        let mut el = ElementData {
            name: "span".to_string(),
            attrs: Vec::new(),
        };

        assert!(!el.has_class("bold"));
        el.add_class("bold");
        assert_eq!(el.attribute("class"), Some("bold"));
    }
}

//! Element tree built from the tag stream.
//!
//! Elements are created on a start tag, filled while they sit on the
//! extractor's open stack and handed to the document sink once closed. Each
//! element caches the length of the text below it so that pattern rules with
//! a character limit can reject long paragraphs without walking the subtree.

use std::fmt;

/// Ordered attribute map with unique keys.
///
/// Insertion order is kept so that serialized elements look like their
/// source. Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of an attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

/// A child of an element: either a nested element or a text fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Aggregate text of this node.
    pub fn text(&self) -> String {
        match self {
            Node::Element(elem) => elem.text(),
            Node::Text(text) => text.clone(),
        }
    }

    /// Cached text length in characters.
    pub fn text_len(&self) -> usize {
        match self {
            Node::Element(elem) => elem.text_len(),
            Node::Text(text) => text.chars().count(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(elem) => Some(elem),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(elem)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// An HTML element with its children.
///
/// The cached text length is the sum of the children's lengths at the time
/// they were added. Children must not be changed after being added, or the
/// cache goes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Attributes,
    children: Vec<Node>,
    text_len: usize,
}

impl Element {
    /// Create an element with no children.
    pub fn new(tag: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: Vec::new(),
            text_len: 0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Rename the element, e.g. to turn a false heading into a paragraph.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Shorthand for `attrs().get(name)`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Append a child element or text fragment.
    pub fn add_child(&mut self, child: impl Into<Node>) {
        let child = child.into();
        self.text_len += child.text_len();
        self.children.push(child);
    }

    /// Insert a child in front of the existing ones.
    pub fn prepend_child(&mut self, child: impl Into<Node>) {
        let child = child.into();
        self.text_len += child.text_len();
        self.children.insert(0, child);
    }

    /// Text inside the element. A `br` contributes a single newline.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.text_len);
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.tag == "br" {
            out.push('\n');
        }
        for child in &self.children {
            match child {
                Node::Element(elem) => elem.collect_text(out),
                Node::Text(text) => out.push_str(text),
            }
        }
    }

    /// Length of the text inside the element, in characters.
    pub fn text_len(&self) -> usize {
        self.text_len
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag)
    }
}

//! The receiving end of the extractor.

use crate::element::{Element, Node};
use crate::error::Result;

/// A chapter heading reported by the extractor.
///
/// When a paragraph heading directly precedes the heading, the two are
/// merged: the paragraph becomes the first child of `element` and `text`
/// reads `"<paragraph>. <heading>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub element: Element,
    /// Text for the table of contents.
    pub text: String,
    /// A paragraph heading was merged in as the first child.
    pub merged: bool,
}

impl Heading {
    pub fn new(element: Element) -> Self {
        Self {
            text: element.text(),
            element,
            merged: false,
        }
    }

    /// Merge `paragraph` into `element` as its leading line.
    pub fn merged(paragraph: Element, mut element: Element) -> Self {
        let text = format!("{}. {}", paragraph.text(), element.text());
        element.prepend_child(paragraph);
        Self {
            element,
            text,
            merged: true,
        }
    }
}

/// Consumer of extracted book content.
///
/// The extractor reports every top level element of the content region once
/// it is closed, together with its classification. Depth decisions for the
/// table of contents belong to the sink.
pub trait DocumentSink {
    /// A new source document is about to be parsed.
    fn new_part(&mut self) -> Result<()>;

    /// A closed top level element, or text directly inside the content root.
    fn handle_node(&mut self, node: Node);

    /// A chapter heading, with a preceding paragraph heading merged in.
    fn handle_heading(&mut self, heading: Heading);

    /// A `<p>` element that is a chapter heading on its own, i.e. not
    /// directly followed by a heading element.
    fn handle_paragraph_heading(&mut self, elem: Element);

    /// A heading element that is not a chapter heading.
    fn handle_false_heading(&mut self, elem: Element);
}

impl<S: DocumentSink + ?Sized> DocumentSink for &mut S {
    fn new_part(&mut self) -> Result<()> {
        (**self).new_part()
    }

    fn handle_node(&mut self, node: Node) {
        (**self).handle_node(node);
    }

    fn handle_heading(&mut self, heading: Heading) {
        (**self).handle_heading(heading);
    }

    fn handle_paragraph_heading(&mut self, elem: Element) {
        (**self).handle_paragraph_heading(elem);
    }

    fn handle_false_heading(&mut self, elem: Element) {
        (**self).handle_false_heading(elem);
    }
}

/// Something a [`Collector`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    NewPart,
    Node(Node),
    Heading(Heading),
    ParagraphHeading(Element),
    FalseHeading(Element),
}

/// A sink that keeps everything it receives, in order.
///
/// Handy for inspecting what the extractor finds on a page before writing
/// a real ebook.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    pub events: Vec<SinkEvent>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reported element in document order, skipping bare text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.events.iter().filter_map(|event| match event {
            SinkEvent::Node(Node::Element(elem))
            | SinkEvent::ParagraphHeading(elem)
            | SinkEvent::FalseHeading(elem) => Some(elem),
            SinkEvent::Heading(heading) => Some(&heading.element),
            SinkEvent::Node(Node::Text(_)) | SinkEvent::NewPart => None,
        })
    }
}

impl DocumentSink for Collector {
    fn new_part(&mut self) -> Result<()> {
        self.events.push(SinkEvent::NewPart);
        Ok(())
    }

    fn handle_node(&mut self, node: Node) {
        self.events.push(SinkEvent::Node(node));
    }

    fn handle_heading(&mut self, heading: Heading) {
        self.events.push(SinkEvent::Heading(heading));
    }

    fn handle_paragraph_heading(&mut self, elem: Element) {
        self.events.push(SinkEvent::ParagraphHeading(elem));
    }

    fn handle_false_heading(&mut self, elem: Element) {
        self.events.push(SinkEvent::FalseHeading(elem));
    }
}

//! Book content extraction from a stream of tag events.
//!
//! The [`Extractor`] consumes start tags, end tags and text in document
//! order. It waits for the element matching the root pattern, tracks every
//! element below it on an open-element stack and hands each closed top
//! level element to a [`DocumentSink`]. Outside the content region it looks
//! for the anchor leading to the next page.
//!
//! A paragraph heading is held back until the next report. If that is a
//! heading the two are merged into one [`Heading`].
//!
//! Web pages are rarely well formed. Two repairs happen on the fly, both
//! reported as [`Warning`]s:
//!
//! - a heading or paragraph that starts while another one is still open
//!   closes the open one first;
//! - an end tag that does not match the innermost open element closes
//!   elements until it does.
//!
//! # Example
//!
//! ```
//! use bookweave::{Collector, Extractor, Pattern};
//!
//! let mut extractor = Extractor::new(Collector::new())
//!     .with_root(Pattern::new().tag("div").class("book"))
//!     .with_next_link("Next")?;
//! extractor.feed(r#"<div class="book"><p>Text.</p></div><a href="2.html">Next</a>"#);
//!
//! assert_eq!(extractor.next_target(), Some("2.html"));
//! assert_eq!(extractor.sink().events.len(), 1);
//! # Ok::<(), bookweave::Error>(())
//! ```

mod sink;
mod tokenizer;

use std::fmt;

use regex::Regex;

pub use sink::{Collector, DocumentSink, Heading, SinkEvent};

use crate::element::{Attributes, Element, Node};
use crate::error::Result;
use crate::pattern::{Pattern, anchored_regex};
use crate::quirks::{self, Quirks};

/// What the extractor is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Outside the content region and not inside a candidate anchor.
    Idle,
    /// Inside the content region.
    Content,
    /// Inside an anchor that may be the link to the next page.
    AnchorScan,
}

/// A recoverable problem found in the source markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An element was closed implicitly.
    MissingEndTag { tag: String, line: u64 },
    /// The anchor text matched the next-link pattern but there is no `href`.
    NextLinkWithoutHref { line: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingEndTag { tag, line } => {
                write!(f, "missing </{tag}> tag in line {line}")
            }
            Warning::NextLinkWithoutHref { line } => {
                write!(f, "the anchor matching the next link in line {line} has no href attribute")
            }
        }
    }
}

/// Incremental content extractor.
///
/// Configuration (root pattern, next-link pattern, quirks and the sink)
/// lasts for the lifetime of the extractor. Everything else belongs to the
/// current document and is cleared by [`Extractor::reset`], except the
/// `<base href>` override which stays in effect for later documents.
pub struct Extractor<S> {
    sink: S,
    root: Pattern,
    next_link: Option<Regex>,
    quirks: Quirks,

    stack: Vec<Element>,
    mode: Mode,
    last_void_tag: Option<String>,
    next_target: Option<String>,
    base_override: Option<String>,
    pending_heading: Option<Element>,
    line: u64,
    warnings: Vec<Warning>,
}

impl<S: DocumentSink> Extractor<S> {
    /// Create an extractor that treats the whole `<body>` as content and
    /// uses the default quirks.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            root: Pattern::new().tag("body"),
            next_link: None,
            quirks: Quirks::new(),
            stack: Vec::new(),
            mode: Mode::Idle,
            last_void_tag: None,
            next_target: None,
            base_override: None,
            pending_heading: None,
            line: 1,
            warnings: Vec::new(),
        }
    }

    /// Set the pattern for the element holding the book content. Only tag,
    /// class and id are tested.
    pub fn with_root(mut self, root: Pattern) -> Self {
        self.root = root;
        self
    }

    /// Set the pattern for the text of the link to the next page.
    pub fn with_next_link(mut self, pattern: &str) -> Result<Self> {
        self.next_link = Some(anchored_regex(pattern)?);
        Ok(self)
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn quirks(&self) -> &Quirks {
        &self.quirks
    }

    pub fn quirks_mut(&mut self) -> &mut Quirks {
        &mut self.quirks
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of currently open tracked elements.
    pub fn open_elements(&self) -> usize {
        self.stack.len()
    }

    /// The link to the next page, if one was found in this document.
    pub fn next_target(&self) -> Option<&str> {
        self.next_target.as_deref()
    }

    /// The `href` of the last `<base>` element seen, in any document.
    pub fn base_override(&self) -> Option<&str> {
        self.base_override.as_deref()
    }

    /// Warnings for the current document.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Parse a complete HTML document.
    pub fn feed(&mut self, html: &str) {
        tokenizer::feed_html(self, html);
        self.end_document();
    }

    /// The current document is complete. A paragraph heading still waiting
    /// for a following heading is reported on its own.
    pub fn end_document(&mut self) {
        self.flush_paragraph_heading();
    }

    /// Forget the current document. Configuration and the base override
    /// are kept; a pending paragraph heading is reported first.
    pub fn reset(&mut self) {
        self.end_document();
        self.stack.clear();
        self.mode = Mode::Idle;
        self.last_void_tag = None;
        self.next_target = None;
        self.line = 1;
        self.warnings.clear();
    }

    /// Set the source line reported in warnings.
    pub fn set_line(&mut self, line: u64) {
        self.line = line;
    }

    /// Handle a start tag.
    pub fn start_tag(&mut self, tag: &str, attrs: Attributes) {
        match self.mode {
            Mode::Content | Mode::AnchorScan => {
                if quirks::is_heading_or_paragraph(tag)
                    && let Some(open) = self
                        .stack
                        .iter()
                        .rposition(|e| quirks::is_heading_or_paragraph(e.tag()))
                {
                    let count = self.stack.len() - open;
                    for _ in 0..count {
                        if let Some(unclosed) = self.close_element() {
                            self.warn_missing_end_tag(unclosed);
                        }
                    }
                }
                self.stack.push(Element::new(tag, attrs));
                if quirks::is_void(tag) {
                    // A matching end tag may still follow; it must not
                    // close anything.
                    self.last_void_tag = self.close_element();
                }
            }
            Mode::Idle if tag == "a" && self.next_link.is_some() && self.next_target.is_none() => {
                self.mode = Mode::AnchorScan;
                self.stack.push(Element::new(tag, attrs));
            }
            Mode::Idle if tag == "base" => {
                if let Some(href) = attrs.get("href") {
                    log::debug!("base href: {href}");
                    self.base_override = Some(href.to_string());
                }
            }
            Mode::Idle => {
                let candidate = Element::new(tag, attrs);
                if self.root.matches_start_tag(&candidate) {
                    log::debug!("content starts at {candidate} in line {}", self.line);
                    self.mode = Mode::Content;
                }
            }
        }
    }

    /// Handle an end tag.
    pub fn end_tag(&mut self, tag: &str) {
        if self.last_void_tag.as_deref() != Some(tag) {
            let mut closed = self.close_element();
            while self.mode != Mode::Idle && closed.as_deref() != Some(tag) {
                if let Some(unclosed) = closed {
                    self.warn_missing_end_tag(unclosed);
                }
                closed = self.close_element();
            }
        }
        self.last_void_tag = None;
    }

    /// Handle character data.
    pub fn text(&mut self, data: &str) {
        let text = normalize_text(data);
        if text.is_empty() {
            return;
        }
        match self.stack.last_mut() {
            Some(top) => top.add_child(text),
            None if self.mode == Mode::Content => {
                self.flush_paragraph_heading();
                self.sink.handle_node(Node::Text(text));
            }
            None => {}
        }
    }

    /// Close the innermost open element and return its tag.
    ///
    /// With nothing left to close, the content region or anchor has ended.
    fn close_element(&mut self) -> Option<String> {
        let Some(elem) = self.stack.pop() else {
            self.mode = Mode::Idle;
            return None;
        };
        let tag = elem.tag().to_string();
        match self.mode {
            Mode::AnchorScan if tag == "a" => {
                self.check_next_link(&elem);
                // outer anchors left open end with the scan
                self.stack.clear();
                self.mode = Mode::Idle;
            }
            Mode::Content if !self.quirks.is_skipped(&elem) => match self.stack.last_mut() {
                Some(parent) => parent.add_child(elem),
                None => self.report(elem),
            },
            _ => {}
        }
        Some(tag)
    }

    fn check_next_link(&mut self, anchor: &Element) {
        let Some(next_link) = &self.next_link else {
            return;
        };
        if !next_link.is_match(&anchor.text()) {
            return;
        }
        match anchor.attr("href") {
            Some(href) => {
                log::debug!("next page: {href}");
                self.next_target = Some(href.to_string());
            }
            None => self.warn(Warning::NextLinkWithoutHref { line: self.line }),
        }
    }

    /// Hand a closed top level element to the sink.
    ///
    /// A paragraph heading is held back until the next report: if that is
    /// a chapter heading, both go out as one merged [`Heading`].
    fn report(&mut self, elem: Element) {
        if elem.tag() == "p" && self.quirks.is_paragraph_heading(&elem) {
            self.flush_paragraph_heading();
            self.pending_heading = Some(elem);
        } else if quirks::is_heading(elem.tag()) && !self.quirks.is_false_heading(&elem) {
            let heading = match self.pending_heading.take() {
                Some(par) => Heading::merged(par, elem),
                None => Heading::new(elem),
            };
            self.sink.handle_heading(heading);
        } else if quirks::is_heading(elem.tag()) {
            self.flush_paragraph_heading();
            self.sink.handle_false_heading(elem);
        } else {
            self.flush_paragraph_heading();
            self.sink.handle_node(Node::Element(elem));
        }
    }

    fn flush_paragraph_heading(&mut self) {
        if let Some(par) = self.pending_heading.take() {
            self.sink.handle_paragraph_heading(par);
        }
    }

    fn warn_missing_end_tag(&mut self, tag: String) {
        let line = self.line;
        self.warn(Warning::MissingEndTag { tag, line });
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Trim every line, drop blank ones and join the rest with newlines.
fn normalize_text(data: &str) -> String {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! Quirks: pattern based exceptions for badly structured source markup.
//!
//! Three kinds of quirks are known:
//!
//! - *skip*: elements that must not appear in the output at all.
//! - *false heading*: heading tags around something that is not a chapter
//!   heading. They are kept but stay out of the table of contents.
//! - *paragraph heading*: a chapter heading (or part of one) set in `<p>`
//!   tags. If it is immediately followed by a real heading, the two are
//!   joined into one.

use crate::element::Element;
use crate::error::{Error, Result};
use crate::pattern::{Pattern, PatternSet};

pub(crate) const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that cannot have children. They are closed right after their
/// start tag.
pub(crate) const VOID_ELEMENTS: [&str; 9] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
];

/// Elements introduced by HTML5, skipped by default.
pub const HTML5_ONLY: [&str; 25] = [
    "article", "aside", "figure", "footer", "header", "nav", "section", "audio", "source",
    "video", "canvas", "command", "datagrid", "datalist", "details", "output", "progress",
    "rp", "rt", "ruby", "dialog", "hgroup", "mark", "meter", "time",
];

/// Default character limit for paragraph headings. Longer paragraphs are
/// assumed to be body text.
pub const PARAGRAPH_HEADING_CHAR_LIMIT: usize = 20;

pub(crate) fn is_heading(tag: &str) -> bool {
    HEADINGS.contains(&tag)
}

pub(crate) fn is_heading_or_paragraph(tag: &str) -> bool {
    tag == "p" || is_heading(tag)
}

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Registry of skip, false-heading and paragraph-heading patterns.
#[derive(Debug, Clone)]
pub struct Quirks {
    skip: PatternSet,
    false_headings: PatternSet,
    paragraph_headings: PatternSet,
}

impl Default for Quirks {
    fn default() -> Self {
        Self::new()
    }
}

impl Quirks {
    /// Quirks that skip `script` elements and all HTML5-only elements.
    pub fn new() -> Self {
        Self::with_defaults(true, true)
    }

    /// Quirks with no rules at all.
    pub fn empty() -> Self {
        Self {
            skip: PatternSet::new(),
            false_headings: PatternSet::new(),
            paragraph_headings: PatternSet::new(),
        }
    }

    /// Choose which of the default skip rules to install.
    pub fn with_defaults(skip_scripts: bool, skip_html5: bool) -> Self {
        let mut quirks = Self::empty();
        let mut tags: Vec<&str> = Vec::new();
        if skip_html5 {
            tags.extend(HTML5_ONLY);
        }
        if skip_scripts {
            tags.push("script");
        }
        if !tags.is_empty() {
            quirks.skip.push(Pattern::new().tags(tags));
        }
        quirks
    }

    /// Add a false heading rule.
    ///
    /// The pattern's tags are replaced by `h{level}`, or by all heading
    /// tags when no level is given. The level must be between 1 and 6.
    pub fn false_heading(&mut self, level: Option<u8>, mut pattern: Pattern) -> Result<&mut Self> {
        let tags = match level {
            None => HEADINGS.iter().map(|h| h.to_string()).collect(),
            Some(level @ 1..=6) => vec![format!("h{level}")],
            Some(level) => return Err(Error::InvalidHeadingLevel(level)),
        };
        pattern.set_tags(tags);
        self.false_headings.push(pattern.with_char_limit(None));
        Ok(self)
    }

    /// Add a paragraph heading rule. The pattern's tags are replaced by `p`.
    ///
    /// Pass a pattern with a character limit (usually
    /// [`PARAGRAPH_HEADING_CHAR_LIMIT`]) to avoid testing long paragraphs.
    pub fn paragraph_heading(&mut self, mut pattern: Pattern) -> &mut Self {
        pattern.set_tags(vec!["p".to_string()]);
        self.paragraph_headings.push(pattern);
        self
    }

    /// Add a skip rule. The tag `h*` stands for every heading tag.
    pub fn skip(&mut self, mut pattern: Pattern) -> &mut Self {
        if let Some(tags) = pattern.allowed_tags()
            && tags.iter().any(|t| t == "h*")
        {
            let expanded = tags
                .iter()
                .flat_map(|t| {
                    if t == "h*" {
                        HEADINGS.iter().map(|h| h.to_string()).collect()
                    } else {
                        vec![t.clone()]
                    }
                })
                .collect();
            pattern.set_tags(expanded);
        }
        self.skip.push(pattern);
        self
    }

    pub fn is_skipped(&self, elem: &Element) -> bool {
        self.skip.matches(elem)
    }

    pub fn is_false_heading(&self, elem: &Element) -> bool {
        self.false_headings.matches(elem)
    }

    pub fn is_paragraph_heading(&self, elem: &Element) -> bool {
        self.paragraph_headings.matches(elem)
    }
}

//! Element patterns.
//!
//! A [`Pattern`] describes a class of elements by tag, `class`, `id`, text
//! and text length. Every field is optional; an unset field never causes a
//! mismatch.

use regex::Regex;

use crate::element::Element;
use crate::error::Result;

/// Compile a user supplied regular expression that must match at the start
/// of the text. Trailing text after the match is allowed.
pub(crate) fn anchored_regex(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{pattern})"))?)
}

/// Description of a set of elements.
///
/// # Example
///
/// ```
/// use bookweave::Pattern;
///
/// let chapter_par = Pattern::new()
///     .tag("p")
///     .class("center")
///     .text(r"Chapter [0-9]+")?
///     .char_limit(20);
/// # Ok::<(), bookweave::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    tags: Option<Vec<String>>,
    classes: Option<Vec<String>>,
    ids: Option<Vec<String>>,
    text_re: Option<Regex>,
    char_limit: Option<usize>,
}

impl Pattern {
    /// A pattern matching every element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the given tag (may be called repeatedly).
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Replace the allowed tags.
    pub(crate) fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = Some(tags);
    }

    pub(crate) fn allowed_tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// Allow the given `class` attribute value (compared as a whole).
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.get_or_insert_with(Vec::new).push(class.into());
        self
    }

    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .get_or_insert_with(Vec::new)
            .extend(classes.into_iter().map(Into::into));
        self
    }

    /// Allow the given `id` attribute value.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids
            .get_or_insert_with(Vec::new)
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Require the element text to match `pattern` from its start.
    pub fn text(mut self, pattern: &str) -> Result<Self> {
        self.text_re = Some(anchored_regex(pattern)?);
        Ok(self)
    }

    /// Reject elements whose text is longer than `limit` characters.
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = Some(limit);
        self
    }

    /// Set or clear the character limit.
    pub fn with_char_limit(mut self, limit: Option<usize>) -> Self {
        self.char_limit = limit;
        self
    }

    /// Check tag, class and id only. Used where the text is not known yet.
    pub fn matches_start_tag(&self, elem: &Element) -> bool {
        if let Some(tags) = &self.tags
            && !tags.iter().any(|t| t == elem.tag())
        {
            return false;
        }
        if !attr_allowed(self.classes.as_deref(), elem.attr("class")) {
            return false;
        }
        attr_allowed(self.ids.as_deref(), elem.attr("id"))
    }

    /// Check every configured condition.
    ///
    /// The length limit is tested first since it is cheap and rules out most
    /// paragraphs before the regex runs.
    pub fn matches(&self, elem: &Element) -> bool {
        if let Some(limit) = self.char_limit
            && elem.text_len() > limit
        {
            return false;
        }
        if !self.matches_start_tag(elem) {
            return false;
        }
        match &self.text_re {
            Some(re) => re.is_match(&elem.text()),
            None => true,
        }
    }
}

fn attr_allowed(allowed: Option<&[String]>, value: Option<&str>) -> bool {
    match (allowed, value) {
        (None, _) => true,
        (Some(allowed), Some(value)) => allowed.iter().any(|a| a == value),
        (Some(_), None) => false,
    }
}

/// A group of patterns that matches if any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet(Vec<Pattern>);

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pattern: Pattern) {
        self.0.push(pattern);
    }

    pub fn matches(&self, elem: &Element) -> bool {
        self.0.iter().any(|p| p.matches(elem))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Attributes;

    fn elem(tag: &str, attrs: &[(&str, &str)], text: &str) -> Element {
        let mut e = Element::new(tag, attrs.iter().copied().collect());
        if !text.is_empty() {
            e.add_child(text);
        }
        e
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let p = Pattern::new();
        assert!(p.matches(&elem("div", &[], "")));
        assert!(p.matches(&elem("p", &[("class", "x")], "text")));
    }

    #[test]
    fn test_tag_class_and_id() {
        let p = Pattern::new().tag("div").class("book").id("main");
        assert!(p.matches_start_tag(&elem("div", &[("class", "book"), ("id", "main")], "")));
        assert!(!p.matches_start_tag(&elem("span", &[("class", "book"), ("id", "main")], "")));
        assert!(!p.matches_start_tag(&elem("div", &[("class", "other"), ("id", "main")], "")));
        // Required attribute missing entirely
        assert!(!p.matches_start_tag(&elem("div", &[("class", "book")], "")));
    }

    #[test]
    fn test_class_is_compared_as_whole_value() {
        let p = Pattern::new().class("book");
        assert!(!p.matches_start_tag(&elem("div", &[("class", "book wide")], "")));
    }

    #[test]
    fn test_multiple_allowed_values() {
        let p = Pattern::new().tags(["h1", "h2"]).classes(["a", "b"]);
        assert!(p.matches(&elem("h2", &[("class", "b")], "")));
        assert!(!p.matches(&elem("h3", &[("class", "b")], "")));
    }

    #[test]
    fn test_text_regex_is_anchored_at_start() {
        let p = Pattern::new().text("Chapter [0-9]+").unwrap();
        assert!(p.matches(&elem("p", &[], "Chapter 3 →")));
        assert!(!p.matches(&elem("p", &[], "See Chapter 3")));
    }

    #[test]
    fn test_char_limit() {
        let p = Pattern::new().tag("p").char_limit(5);
        assert!(p.matches(&elem("p", &[], "short")));
        assert!(!p.matches(&elem("p", &[], "too long")));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(Pattern::new().text("(unclosed").is_err());
    }

    #[test]
    fn test_pattern_set_is_an_or_group() {
        let set: PatternSet = [Pattern::new().tag("script"), Pattern::new().class("ad")]
            .into_iter()
            .collect();
        assert!(set.matches(&elem("script", &[], "")));
        assert!(set.matches(&elem("div", &[("class", "ad")], "")));
        assert!(!set.matches(&Element::new("div", Attributes::new())));
        assert!(!PatternSet::new().matches(&elem("div", &[], "")));
    }
}

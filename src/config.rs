//! Declarative book configuration.
//!
//! Everything the programmatic API offers, as plain data that can be read
//! from a JSON file (with the `cli` feature). The `build_*` methods validate
//! it and produce the runtime objects:
//!
//! ```json
//! {
//!   "root": { "tags": ["div"], "classes": ["book"] },
//!   "next_link": "Next|Weiter",
//!   "quirks": {
//!     "false_headings": [{ "level": 4, "classes": ["stars"] }],
//!     "paragraph_headings": [{ "text": "Chapter [0-9]+" }]
//!   },
//!   "metadata": { "title": "Der Prozess", "authors": ["Franz Kafka"], "language": "de" }
//! }
//! ```

use crate::epub::{Author, Metadata};
use crate::error::Result;
use crate::extract::{DocumentSink, Extractor};
use crate::pattern::Pattern;
use crate::quirks::{PARAGRAPH_HEADING_CHAR_LIMIT, Quirks};

/// Element selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct PatternConfig {
    pub tags: Vec<String>,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
    /// Regex matched against the start of the element's text.
    pub text: Option<String>,
    /// Only test the text of elements with at most this many characters.
    pub char_limit: Option<usize>,
}

impl PatternConfig {
    pub fn build(&self) -> Result<Pattern> {
        // an empty list means "any", not "none"
        let mut pattern = Pattern::new().with_char_limit(self.char_limit);
        if !self.tags.is_empty() {
            pattern = pattern.tags(&self.tags);
        }
        if !self.classes.is_empty() {
            pattern = pattern.classes(&self.classes);
        }
        if !self.ids.is_empty() {
            pattern = pattern.ids(&self.ids);
        }
        if let Some(ref text) = self.text {
            pattern = pattern.text(text)?;
        }
        Ok(pattern)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct FalseHeadingConfig {
    /// Heading level 1 to 6; any heading when absent.
    pub level: Option<u8>,
    #[cfg_attr(feature = "cli", serde(flatten))]
    pub pattern: PatternConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct QuirksConfig {
    pub skip_scripts: bool,
    pub skip_html5: bool,
    pub skip: Vec<PatternConfig>,
    pub false_headings: Vec<FalseHeadingConfig>,
    /// Char limit defaults to [`PARAGRAPH_HEADING_CHAR_LIMIT`].
    pub paragraph_headings: Vec<PatternConfig>,
}

impl Default for QuirksConfig {
    fn default() -> Self {
        Self {
            skip_scripts: true,
            skip_html5: true,
            skip: Vec::new(),
            false_headings: Vec::new(),
            paragraph_headings: Vec::new(),
        }
    }
}

impl QuirksConfig {
    pub fn build(&self) -> Result<Quirks> {
        let mut quirks = Quirks::with_defaults(self.skip_scripts, self.skip_html5);
        for skip in &self.skip {
            quirks.skip(skip.build()?);
        }
        for fh in &self.false_headings {
            quirks.false_heading(fh.level, fh.pattern.build()?)?;
        }
        for ph in &self.paragraph_headings {
            let limit = ph.char_limit.unwrap_or(PARAGRAPH_HEADING_CHAR_LIMIT);
            quirks.paragraph_heading(ph.build()?.char_limit(limit));
        }
        Ok(quirks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct MetadataConfig {
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub authors: Vec<String>,
    pub language: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub rights: Option<String>,
}

impl MetadataConfig {
    pub fn build(&self) -> Result<Metadata> {
        let mut meta = Metadata::default();
        if let Some(ref title) = self.title {
            meta.title = title.clone();
        }
        if let Some(ref identifier) = self.identifier {
            meta.identifier = identifier.clone();
        }
        meta.authors = self.authors.iter().map(Author::new).collect();
        if let Some(ref language) = self.language {
            meta.set_language(language)?;
        }
        if let Some(ref date) = self.date {
            meta.set_date(date)?;
        }
        meta.publisher = self.publisher.clone();
        meta.rights = self.rights.clone();
        Ok(meta)
    }
}

/// Complete configuration of one book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct BookConfig {
    /// Element holding the content; the whole `<body>` when absent.
    pub root: Option<PatternConfig>,
    /// Regex for the text of the link to the next page.
    pub next_link: Option<String>,
    pub quirks: QuirksConfig,
    pub metadata: MetadataConfig,
    /// Add a generated title page.
    pub titlepage: bool,
}

impl BookConfig {
    /// Parse a JSON configuration.
    #[cfg(feature = "cli")]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Read a JSON configuration file.
    #[cfg(feature = "cli")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| crate::Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn build_metadata(&self) -> Result<Metadata> {
        self.metadata.build()
    }

    pub fn build_quirks(&self) -> Result<Quirks> {
        self.quirks.build()
    }

    /// An extractor configured with root, next link and quirks.
    pub fn build_extractor<S: DocumentSink>(&self, sink: S) -> Result<Extractor<S>> {
        let mut extractor = Extractor::new(sink).with_quirks(self.build_quirks()?);
        if let Some(ref root) = self.root {
            extractor = extractor.with_root(root.build()?);
        }
        if let Some(ref next) = self.next_link {
            extractor = extractor.with_next_link(next)?;
        }
        Ok(extractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::element::{Attributes, Element};

    fn elem(tag: &str, class: Option<&str>, text: &str) -> Element {
        let mut attrs = Attributes::new();
        if let Some(class) = class {
            attrs.set("class", class);
        }
        let mut e = Element::new(tag, attrs);
        e.add_child(text);
        e
    }

    #[test]
    fn test_default_quirks_skip_scripts() {
        let quirks = BookConfig::default().build_quirks().unwrap();
        assert!(quirks.is_skipped(&elem("script", None, "")));
        assert!(quirks.is_skipped(&elem("nav", None, "")));
    }

    #[test]
    fn test_paragraph_heading_default_limit() {
        let config = QuirksConfig {
            paragraph_headings: vec![PatternConfig {
                text: Some("Chapter".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let quirks = config.build().unwrap();
        assert!(quirks.is_paragraph_heading(&elem("p", None, "Chapter 1")));
        let long = format!("Chapter {}", "x".repeat(PARAGRAPH_HEADING_CHAR_LIMIT));
        assert!(!quirks.is_paragraph_heading(&elem("p", None, &long)));
    }

    #[test]
    fn test_invalid_heading_level() {
        let config = QuirksConfig {
            false_headings: vec![FalseHeadingConfig {
                level: Some(7),
                pattern: PatternConfig::default(),
            }],
            ..Default::default()
        };
        assert!(matches!(config.build(), Err(Error::InvalidHeadingLevel(7))));
    }

    #[test]
    fn test_invalid_metadata() {
        let config = MetadataConfig {
            language: Some("english".into()),
            ..Default::default()
        };
        assert!(matches!(config.build(), Err(Error::InvalidMetadata(_))));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_json() {
        let config = BookConfig::from_json(
            r#"{
                "root": { "tags": ["div"], "classes": ["book"] },
                "next_link": "Next",
                "quirks": {
                    "skip_html5": false,
                    "false_headings": [{ "level": 4, "classes": ["stars"] }]
                },
                "metadata": { "title": "Der Prozess", "authors": ["Franz Kafka"], "language": "de" },
                "titlepage": true
            }"#,
        )
        .unwrap();

        assert!(config.titlepage);
        assert!(config.quirks.skip_scripts);
        assert_eq!(config.quirks.false_headings[0].level, Some(4));
        assert_eq!(config.quirks.false_headings[0].pattern.classes, ["stars"]);

        let meta = config.build_metadata().unwrap();
        assert_eq!(meta.language(), "de");
        assert_eq!(meta.authors[0].file_as, "Kafka, Franz");

        let quirks = config.build_quirks().unwrap();
        assert!(!quirks.is_skipped(&elem("nav", None, "")));
        assert!(quirks.is_false_heading(&elem("h4", Some("stars"), "* * *")));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            BookConfig::from_json(r#"{ "root": 3 }"#),
            Err(Error::Config(_))
        ));
    }
}

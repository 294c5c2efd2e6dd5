//! Ebook metadata (Dublin Core subset used by EPUB 2).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::util::random_alnum;

/// `ll` or `ll-CC`, e.g. `en`, `de-AT`.
static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("valid language regex"));

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})(?:-([0-9]{2})(?:-([0-9]{2}))?)?$").expect("valid date regex")
});

/// A person who contributed to the book.
///
/// `file_as` is the form of the name used for sorting, `role` a MARC
/// relator code such as `aut` (author) or `edt` (editor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub file_as: String,
    pub role: String,
}

impl Author {
    /// An author whose file-as name is derived as "Last, First Middle".
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file_as: file_as_name(&name),
            name,
            role: "aut".to_string(),
        }
    }

    pub fn with_file_as(mut self, file_as: impl Into<String>) -> Self {
        self.file_as = file_as.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

impl From<&str> for Author {
    fn from(name: &str) -> Self {
        Author::new(name)
    }
}

impl From<String> for Author {
    fn from(name: String) -> Self {
        Author::new(name)
    }
}

/// Turn "Firstname [Middlenames] Lastname" into "Lastname, Firstname [Middlenames]".
fn file_as_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, {}", last, rest.join(" ")),
        _ => name.to_string(),
    }
}

/// Book metadata.
///
/// Title, identifier and language are required by EPUB; they default to
/// "Untitled", a pseudo-random identifier and `en`.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub title: String,
    pub identifier: String,
    pub authors: Vec<Author>,
    pub publisher: Option<String>,
    pub rights: Option<String>,
    language: String,
    date: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            identifier: random_alnum(15),
            authors: Vec::new(),
            publisher: None,
            rights: None,
            language: "en".to_string(),
            date: None,
        }
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<Author>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = Some(rights.into());
        self
    }

    pub fn with_language(mut self, language: &str) -> Result<Self> {
        self.set_language(language)?;
        Ok(self)
    }

    pub fn with_date(mut self, date: &str) -> Result<Self> {
        self.set_date(date)?;
        Ok(self)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Set the language, a lower-case two-letter code optionally followed
    /// by `-` and an upper-case country code (`en`, `en-US`, `de-AT`).
    pub fn set_language(&mut self, language: &str) -> Result<()> {
        if !LANGUAGE_RE.is_match(language) {
            return Err(Error::InvalidMetadata(format!(
                "invalid language code: {language}"
            )));
        }
        self.language = language.to_string();
        Ok(())
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Set the publication date in `YYYY[-MM[-DD]]` form.
    pub fn set_date(&mut self, date: &str) -> Result<()> {
        validate_date(date)?;
        self.date = Some(date.to_string());
        Ok(())
    }

    pub fn clear_date(&mut self) {
        self.date = None;
    }
}

fn validate_date(date: &str) -> Result<()> {
    let invalid = |why: &str| Error::InvalidMetadata(format!("invalid date {date}: {why}"));
    let caps = DATE_RE
        .captures(date)
        .ok_or_else(|| invalid("expected YYYY[-MM[-DD]]"))?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let Some(year) = number(1) else {
        return Err(invalid("missing year"));
    };
    let Some(month) = number(2) else {
        return Ok(());
    };
    if !(1..=12).contains(&month) {
        return Err(invalid("month must be in 1..12"));
    }
    if let Some(day) = number(3)
        && !(1..=days_in_month(year, month)).contains(&day)
    {
        return Err(invalid("no such day"));
    }
    Ok(())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

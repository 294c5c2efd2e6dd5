//! # bookweave
//!
//! Turn books published as a series of web pages into EPUB ebooks.
//!
//! ## Features
//!
//! - Extract the book content from each page, driven by element patterns
//! - Repair common markup mistakes on the fly (unclosed paragraphs,
//!   mismatched end tags)
//! - Follow the "next page" link across a whole book
//! - Build a nested table of contents from the chapter headings
//! - Write EPUB 2 with title page, NCX and stylesheet
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookweave::{EpubBuilder, Extractor, HttpFetcher, Metadata, Pattern, get_ebook};
//!
//! let meta = Metadata::new("Der Prozess").with_author("Franz Kafka");
//! let mut builder = EpubBuilder::create("prozess.epub", meta)?;
//!
//! let mut extractor = Extractor::new(&mut builder)
//!     .with_root(Pattern::new().tag("div").class("book"))
//!     .with_next_link("Weiter")?;
//! let mut fetcher = HttpFetcher::new()?;
//! get_ebook(&mut extractor, &mut fetcher, "https://example.org/prozess/", "kap1.html")?;
//! drop(extractor);
//!
//! builder.finish()?;
//! # Ok::<(), bookweave::Error>(())
//! ```
//!
//! ## Quirks
//!
//! [`Quirks`] describe elements to leave out (scripts, navigation, ads),
//! headings that are not chapter headings (e.g. `<h4>* * *</h4>`) and
//! paragraphs that are really the first line of a chapter heading
//! (`<p>Chapter 3</p><h2>The Trial</h2>`).

pub mod config;
pub mod element;
pub mod epub;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pattern;
pub mod quirks;
pub mod toc;
pub(crate) mod util;

pub use config::BookConfig;
pub use element::{Attributes, Element, Node};
pub use epub::{Author, EpubBuilder, FileOptions, Metadata};
pub use error::{Error, Result};
pub use extract::{Collector, DocumentSink, Extractor, Heading, Mode, SinkEvent, Warning};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchedPage, Fetcher, get_ebook};
pub use pattern::{Pattern, PatternSet};
pub use quirks::Quirks;
pub use toc::{Toc, TocEntry, TocTarget};

//! EPUB 2 output.
//!
//! [`EpubBuilder`] is a [`DocumentSink`]: plug it into an
//! [`Extractor`](crate::Extractor) and every page becomes one or more XHTML
//! parts of the book. Chapter headings are renumbered by table of contents
//! depth and collected into the NCX.
//!
//! ```no_run
//! use bookweave::{EpubBuilder, Extractor, Metadata};
//!
//! let meta = Metadata::new("Der Prozess").with_author("Franz Kafka");
//! let mut builder = EpubBuilder::create("prozess.epub", meta)?;
//! builder.titlepage(None, None)?;
//!
//! let mut extractor = Extractor::new(&mut builder);
//! extractor.sink_mut().new_part()?;
//! extractor.feed("<body><h1>Erstes Kapitel</h1><p>Jemand mußte Josef K. verleumdet haben.</p></body>");
//! drop(extractor);
//!
//! builder.finish()?;
//! # Ok::<(), bookweave::Error>(())
//! ```

mod metadata;
mod package;
mod xhtml;

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub use metadata::{Author, Metadata};
pub use package::FileOptions;

use self::package::{CONTAINER_XML, FileInfo, PACKAGE_OPF, STYLE_CSS, TOC_NCX};
use crate::element::{Element, Node};
use crate::error::Result;
use crate::extract::{DocumentSink, Heading};
use crate::quirks::is_heading;
use crate::toc::{Toc, TocTarget};

const TITLE_PAGE: &str = "title.html";

const CHAPTER_HEADING_CLASS: &str = "bookweave-chapter-h";
const SMALL_HEADING_CLASS: &str = "bookweave-small-h";
const FALSE_HEADING_CLASS: &str = "bookweave-false-h";

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

/// Writes extracted content into an EPUB container.
///
/// Content accumulates in memory until the next part starts, then is
/// written to the archive as `partNNN.html`. Nothing is listed in the
/// package document until [`EpubBuilder::finish`].
pub struct EpubBuilder<W: Write + Seek> {
    zip: ZipWriter<W>,
    metadata: Metadata,
    stylesheet: String,
    toc: Toc,
    files: Vec<FileInfo>,
    content: String,
    part_no: usize,
}

impl EpubBuilder<File> {
    /// Create the EPUB file at `path`.
    pub fn create(path: impl AsRef<Path>, metadata: Metadata) -> Result<Self> {
        Self::new(File::create(path)?, metadata)
    }
}

impl<W: Write + Seek> EpubBuilder<W> {
    /// Start a new EPUB archive on `writer`.
    pub fn new(writer: W, metadata: Metadata) -> Result<Self> {
        let mut zip = ZipWriter::new(writer);

        // mimetype must come first, uncompressed
        zip.start_file("mimetype", stored())?;
        zip.write_all(b"application/epub+zip")?;
        zip.start_file("META-INF/container.xml", deflated())?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        let files = vec![
            FileInfo::new(TOC_NCX, FileOptions::resource())?,
            FileInfo::new(STYLE_CSS, FileOptions::resource())?,
        ];

        Ok(Self {
            zip,
            metadata,
            stylesheet: xhtml::DEFAULT_STYLE.to_string(),
            toc: Toc::new(),
            files,
            content: String::new(),
            part_no: 0,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Replace the default stylesheet.
    pub fn set_stylesheet(&mut self, css: impl Into<String>) {
        self.stylesheet = css.into();
    }

    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// The table of contents, for nesting the following chapters with
    /// [`Toc::begin_subsections`] and [`Toc::end_subsections`].
    pub fn toc_mut(&mut self) -> &mut Toc {
        &mut self.toc
    }

    /// File name of the part currently being filled.
    pub fn current_part(&self) -> String {
        format!("part{:03}.html", self.part_no)
    }

    /// Number of parts written so far.
    pub fn part_count(&self) -> usize {
        self.part_no
    }

    /// Finish the current part and start a new one.
    ///
    /// A part without content is not written.
    pub fn new_part(&mut self) -> Result<()> {
        if self.content.is_empty() {
            return Ok(());
        }
        let name = self.current_part();
        let html = xhtml::document(&self.metadata.title, &self.content);
        self.files.push(FileInfo::new(&name, FileOptions::spine())?);
        self.write_entry(&name, html.as_bytes())?;
        self.content.clear();
        self.part_no += 1;
        Ok(())
    }

    /// Write a title page and put it first in the reading order.
    ///
    /// `main_title` defaults to the book title.
    pub fn titlepage(&mut self, main_title: Option<&str>, subtitle: Option<&str>) -> Result<()> {
        let mut page = String::from("<div class=\"bookweave-tp\">\n");
        if !self.metadata.authors.is_empty() {
            let names = xhtml::join_names(self.metadata.authors.iter().map(|a| a.name.as_str()));
            page.push_str(&format!(
                "<div class=\"bookweave-tp-authors\">{}</div>\n",
                escape(&names)
            ));
        }
        let title = main_title.unwrap_or(&self.metadata.title);
        page.push_str(&format!(
            "<div class=\"bookweave-tp-title\">{}",
            escape(title)
        ));
        if let Some(subtitle) = subtitle {
            page.push_str(&format!(
                "\n<div class=\"bookweave-tp-sub\">{}</div>",
                escape(subtitle)
            ));
        }
        page.push_str("</div>\n</div>\n");

        let html = xhtml::document(&self.metadata.title, &page);
        let info = FileInfo::new(
            TITLE_PAGE,
            FileOptions::spine().with_guide("Titlepage", "title-page"),
        )?;
        self.files.insert(0, info);
        self.write_entry(TITLE_PAGE, html.as_bytes())
    }

    /// Write a part holding only a heading (e.g. "Part One"), with a table
    /// of contents entry at the current depth.
    ///
    /// `toc_text` defaults to the heading.
    pub fn headingpage(
        &mut self,
        heading: &str,
        subtitle: Option<&str>,
        toc_text: Option<&str>,
    ) -> Result<()> {
        self.new_part()?;
        let tag = format!("h{}", self.toc.depth().min(6));
        self.content.push_str(&format!(
            "<div class=\"bookweave-tp\">\n<{tag} class=\"bookweave-tp-title\">{}",
            escape(heading)
        ));
        if let Some(subtitle) = subtitle {
            self.content.push_str(&format!(
                "\n<div class=\"bookweave-tp-sub\">{}</div>",
                escape(subtitle)
            ));
        }
        self.content.push_str(&format!("</{tag}>\n</div>\n"));
        self.toc.new_entry(
            toc_text.unwrap_or(heading),
            TocTarget::new(self.current_part()),
        );
        self.new_part()
    }

    /// Add a file to the book, e.g. an image or a prepared XHTML page.
    ///
    /// The media type comes from the extension of `arcname`; an unknown
    /// extension is an [`Error::UnsupportedMediaType`](crate::Error::UnsupportedMediaType)
    /// and nothing is written.
    pub fn add_file(&mut self, arcname: &str, data: &[u8], options: FileOptions) -> Result<()> {
        let info = FileInfo::new(arcname, options)?;
        self.write_entry(arcname, data)?;
        self.files.push(info);
        Ok(())
    }

    /// Add a file from disk. `arcname` defaults to the file name of `path`.
    pub fn insert_file(
        &mut self,
        path: impl AsRef<Path>,
        options: FileOptions,
        arcname: Option<&str>,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let default_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add_file(arcname.unwrap_or(&default_name), &data, options)
    }

    /// Write the remaining content, the package document, the NCX and the
    /// stylesheet, and close the archive.
    pub fn finish(mut self) -> Result<W> {
        self.new_part()?;

        let opf = package::generate_opf(&self.metadata, &self.files);
        self.write_entry(PACKAGE_OPF, opf.as_bytes())?;
        let ncx = package::generate_ncx(&self.metadata, &self.toc);
        self.write_entry(TOC_NCX, ncx.as_bytes())?;
        let css = std::mem::take(&mut self.stylesheet);
        self.write_entry(STYLE_CSS, css.as_bytes())?;

        log::info!(
            "finished ebook: {} parts, {} table of contents entries",
            self.part_no,
            self.toc.len()
        );
        Ok(self.zip.finish()?)
    }

    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, deflated())?;
        self.zip.write_all(data)?;
        log::debug!("wrote {name} ({} bytes)", data.len());
        Ok(())
    }

    fn write_node(&mut self, node: Node) {
        match node {
            Node::Element(elem) if is_heading(elem.tag()) => {
                self.write_heading(Heading::new(elem));
            }
            Node::Element(elem) => self.write_element(elem),
            Node::Text(text) => self.content.push_str(&escape(&text)),
        }
    }

    fn write_element(&mut self, elem: Element) {
        match elem.tag() {
            "br" => self.content.push_str("<br />\n"),
            "img" => {
                if let Some(alt) = elem.attr("alt") {
                    self.content.push_str(&escape(alt));
                }
            }
            "a" | "noscript" => self.write_children(elem),
            _ => {
                let tag = elem.tag().to_string();
                self.content.push_str(&xhtml::start_tag(&tag, elem.attrs()));
                self.write_children(elem);
                self.content.push_str(&format!("</{tag}>"));
                if tag == "p" {
                    self.content.push('\n');
                }
            }
        }
    }

    fn write_children(&mut self, elem: Element) {
        for child in elem.into_children() {
            self.write_node(child);
        }
    }

    /// A chapter heading at the current depth with a table of contents
    /// entry. A merged paragraph heading becomes its small leading line.
    fn write_heading(&mut self, heading: Heading) {
        let Heading {
            element: mut elem,
            text,
            merged,
        } = heading;
        let mut target = TocTarget::new(self.current_part());
        if let Some(id) = elem.attr("id") {
            target = target.with_fragment(id);
        }
        self.toc.new_entry(text, target);

        elem.attrs_mut().set("class", CHAPTER_HEADING_CLASS);
        let tag = format!("h{}", self.toc.depth().min(6));
        self.content.push_str(&xhtml::start_tag(&tag, elem.attrs()));
        let mut children = elem.into_children().into_iter();
        if merged && let Some(Node::Element(mut par)) = children.next() {
            par.set_tag("div");
            par.attrs_mut().set("class", SMALL_HEADING_CLASS);
            self.write_element(par);
        }
        for child in children {
            self.write_node(child);
        }
        self.content.push_str(&format!("</{tag}>\n"));
    }
}

impl<W: Write + Seek> DocumentSink for EpubBuilder<W> {
    fn new_part(&mut self) -> Result<()> {
        EpubBuilder::new_part(self)
    }

    fn handle_node(&mut self, node: Node) {
        self.write_node(node);
    }

    fn handle_heading(&mut self, heading: Heading) {
        self.write_heading(heading);
    }

    fn handle_paragraph_heading(&mut self, elem: Element) {
        self.write_heading(Heading::new(elem));
    }

    fn handle_false_heading(&mut self, mut elem: Element) {
        elem.set_tag("p");
        elem.attrs_mut().set("class", FALSE_HEADING_CLASS);
        self.write_node(Node::Element(elem));
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::element::Attributes;

    fn elem(tag: &str, text: &str) -> Element {
        let mut e = Element::new(tag, Attributes::new());
        e.add_child(text);
        e
    }

    fn builder() -> EpubBuilder<Cursor<Vec<u8>>> {
        EpubBuilder::new(Cursor::new(Vec::new()), Metadata::new("Test")).unwrap()
    }

    fn read_entry(data: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_heading_depth_and_toc() {
        let mut b = builder();
        b.handle_node(elem("h3", "One").into());
        b.toc_mut().begin_subsections();
        b.handle_node(elem("h1", "One.A").into());
        assert!(b.content.contains(r#"<h1 class="bookweave-chapter-h">One</h1>"#));
        assert!(b.content.contains(r#"<h2 class="bookweave-chapter-h">One.A</h2>"#));
        assert_eq!(b.toc().len(), 2);
        assert_eq!(b.toc().max_depth(), 2);
    }

    #[test]
    fn test_heading_fragment_from_id() {
        let mut b = builder();
        let mut h = elem("h2", "Two");
        h.attrs_mut().set("id", "ch2");
        b.handle_node(h.into());
        let entry = b.toc().iter().next().unwrap();
        assert_eq!(entry.target().to_string(), "part000.html#ch2");
    }

    #[test]
    fn test_merged_heading() {
        let mut b = builder();
        b.handle_heading(Heading::merged(elem("p", "Chapter 1"), elem("h2", "Title")));

        let entry = b.toc().iter().next().unwrap();
        assert_eq!(entry.text(), "Chapter 1. Title");
        assert!(b.content.contains(
            r#"<h1 class="bookweave-chapter-h"><div class="bookweave-small-h">Chapter 1</div>Title</h1>"#
        ));
    }

    #[test]
    fn test_lone_paragraph_heading_becomes_heading() {
        let mut b = builder();
        b.handle_paragraph_heading(elem("p", "Epilog"));

        assert_eq!(b.toc().len(), 1);
        assert_eq!(b.toc().iter().next().unwrap().text(), "Epilog");
        assert_eq!(b.content, "<h1 class=\"bookweave-chapter-h\">Epilog</h1>\n");
    }

    #[test]
    fn test_false_heading() {
        let mut b = builder();
        b.handle_false_heading(elem("h4", "* * *"));
        assert_eq!(b.content, "<p class=\"bookweave-false-h\">* * *</p>\n");
        assert!(b.toc().is_empty());
    }

    #[test]
    fn test_serialization_rules() {
        let mut b = builder();
        let mut p = Element::new("p", Attributes::new());
        p.add_child("a < b");
        p.add_child(Element::new("br", Attributes::new()));
        let mut a = Element::new("a", [("href", "x.html")].into_iter().collect());
        a.add_child("link");
        p.add_child(a);
        p.add_child(Element::new("img", [("alt", "[fig]")].into_iter().collect()));
        b.handle_node(p.into());
        assert_eq!(b.content, "<p>a &lt; b<br />\nlink[fig]</p>\n");
    }

    #[test]
    fn test_empty_part_not_written() {
        let mut b = builder();
        b.new_part().unwrap();
        assert_eq!(b.part_count(), 0);
        b.handle_node(elem("p", "x").into());
        b.new_part().unwrap();
        assert_eq!(b.part_count(), 1);
        assert_eq!(b.current_part(), "part001.html");
    }

    #[test]
    fn test_unknown_media_type_rejected() {
        let mut b = builder();
        assert!(b.add_file("notes.txt", b"x", FileOptions::resource()).is_err());
        assert!(b.files.iter().all(|f| f.name != "notes.txt"));
    }

    #[test]
    fn test_finish_writes_package() {
        let mut b = builder();
        b.titlepage(None, Some("Roman")).unwrap();
        b.handle_node(elem("h1", "Intro").into());
        b.handle_node(elem("p", "Hello").into());
        let data = b.finish().unwrap().into_inner();

        let opf = read_entry(data.clone(), "package.opf");
        assert!(opf.contains(r#"<itemref idref="title"/>"#));
        assert!(opf.contains(r#"<itemref idref="part000"/>"#));
        let part = read_entry(data.clone(), "part000.html");
        assert!(part.contains("<p>Hello</p>"));
        let title = read_entry(data.clone(), "title.html");
        assert!(title.contains("Roman"));
        let ncx = read_entry(data, "toc.ncx");
        assert!(ncx.contains("<text>Intro</text>"));
    }
}

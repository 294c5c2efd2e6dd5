//! Package document (OPF), NCX and manifest bookkeeping.

use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use quick_xml::escape::escape;

use super::metadata::Metadata;
use crate::error::{Error, Result};
use crate::toc::{Toc, TocEntry};

pub(crate) const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="package.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

pub(crate) const PACKAGE_OPF: &str = "package.opf";
pub(crate) const TOC_NCX: &str = "toc.ncx";
pub(crate) const STYLE_CSS: &str = "style.css";

/// Characters escaped in manifest hrefs. `/` stays as the path separator.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// How a file added to the book is listed in the package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// List the file in the reading order.
    pub in_spine: bool,
    /// Guide reference as `(title, type)`, e.g. `("Cover", "cover")`.
    pub guide: Option<(String, String)>,
}

impl FileOptions {
    /// A resource that is not part of the reading order (images, fonts).
    pub fn resource() -> Self {
        Self::default()
    }

    /// A document that is part of the reading order.
    pub fn spine() -> Self {
        Self {
            in_spine: true,
            guide: None,
        }
    }

    pub fn with_guide(mut self, title: impl Into<String>, kind: impl Into<String>) -> Self {
        self.guide = Some((title.into(), kind.into()));
        self
    }
}

/// A manifest item.
#[derive(Debug, Clone)]
pub(crate) struct FileInfo {
    pub name: String,
    pub id: String,
    pub media_type: &'static str,
    pub options: FileOptions,
}

impl FileInfo {
    /// Fails with [`Error::UnsupportedMediaType`] if the media type cannot
    /// be told from the file extension.
    pub fn new(name: &str, options: FileOptions) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            id: name_to_id(name),
            media_type: media_type(name)?,
            options,
        })
    }
}

fn media_type(name: &str) -> Result<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm" | "xhtml") => Ok("application/xhtml+xml"),
        Some("css") => Ok("text/css"),
        Some("ncx") => Ok("application/x-dtbncx+xml"),
        Some("png") => Ok("image/png"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        Some("gif") => Ok("image/gif"),
        Some("svg") => Ok("image/svg+xml"),
        Some("otf") => Ok("application/vnd.ms-opentype"),
        Some("ttf") => Ok("application/x-font-ttf"),
        Some("woff") => Ok("application/font-woff"),
        _ => Err(Error::UnsupportedMediaType(name.to_string())),
    }
}

/// Manifest id from a file name: the name without extension, with
/// characters not allowed in XML ids replaced.
fn name_to_id(name: &str) -> String {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let id: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if id.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        id
    } else {
        format!("id_{id}")
    }
}

pub(crate) fn generate_opf(metadata: &Metadata, files: &[FileInfo]) -> String {
    let mut opf = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid_id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );

    opf.push_str(&format!(
        "    <dc:identifier id=\"uid_id\" opf:scheme=\"bookweave\">{}</dc:identifier>\n",
        escape(&metadata.identifier)
    ));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        metadata.language()
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape(&metadata.title)
    ));
    for author in &metadata.authors {
        opf.push_str(&format!(
            "    <dc:creator opf:file-as=\"{}\" opf:role=\"{}\">{}</dc:creator>\n",
            escape(&author.file_as),
            escape(&author.role),
            escape(&author.name)
        ));
    }
    if let Some(date) = metadata.date() {
        opf.push_str(&format!("    <dc:date>{date}</dc:date>\n"));
    }
    if let Some(ref rights) = metadata.rights {
        opf.push_str(&format!("    <dc:rights>{}</dc:rights>\n", escape(rights)));
    }
    if let Some(ref publisher) = metadata.publisher {
        opf.push_str(&format!(
            "    <dc:publisher>{}</dc:publisher>\n",
            escape(publisher)
        ));
    }

    opf.push_str("  </metadata>\n  <manifest>\n");
    for file in files {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
            file.id,
            escape(&utf8_percent_encode(&file.name, HREF).to_string()),
            file.media_type
        ));
    }

    opf.push_str(&format!(
        "  </manifest>\n  <spine toc=\"{}\">\n",
        name_to_id(TOC_NCX)
    ));
    for file in files.iter().filter(|f| f.options.in_spine) {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", file.id));
    }
    opf.push_str("  </spine>\n");

    let guide: Vec<_> = files
        .iter()
        .filter_map(|f| f.options.guide.as_ref().map(|g| (f, g)))
        .collect();
    if !guide.is_empty() {
        opf.push_str("  <guide>\n");
        for (file, (title, kind)) in guide {
            opf.push_str(&format!(
                "    <reference href=\"{}\" type=\"{}\" title=\"{}\"/>\n",
                escape(&utf8_percent_encode(&file.name, HREF).to_string()),
                escape(kind),
                escape(title)
            ));
        }
        opf.push_str("  </guide>\n");
    }

    opf.push_str("</package>\n");
    opf
}

pub(crate) fn generate_ncx(metadata: &Metadata, toc: &Toc) -> String {
    let mut ncx = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape(&metadata.identifier)
    ));
    ncx.push_str(&format!(
        "    <meta name=\"dtb:depth\" content=\"{}\"/>\n",
        toc.max_depth()
    ));
    ncx.push_str(
        r#"    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
"#,
    );
    ncx.push_str(&format!(
        "  <docTitle>\n    <text>{}</text>\n  </docTitle>\n",
        escape(&metadata.title)
    ));
    for author in &metadata.authors {
        ncx.push_str(&format!(
            "  <docAuthor>\n    <text>{}</text>\n  </docAuthor>\n",
            escape(&author.name)
        ));
    }

    ncx.push_str("  <navMap>\n");
    for entry in toc.top_level() {
        write_nav_point(&mut ncx, toc, entry, 2);
    }
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn write_nav_point(ncx: &mut String, toc: &Toc, entry: &TocEntry, indent: usize) {
    let pad = "  ".repeat(indent);
    ncx.push_str(&format!(
        "{pad}<navPoint id=\"nav{}\" playOrder=\"{}\">\n",
        entry.number(),
        entry.number() + 1
    ));
    ncx.push_str(&format!(
        "{pad}  <navLabel>\n{pad}    <text>{}</text>\n{pad}  </navLabel>\n",
        escape(entry.text())
    ));
    ncx.push_str(&format!(
        "{pad}  <content src=\"{}\"/>\n",
        escape(&entry.target().to_string())
    ));
    for child in toc.children(entry) {
        write_nav_point(ncx, toc, child, indent + 1);
    }
    ncx.push_str(&format!("{pad}</navPoint>\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::Author;
    use crate::toc::TocTarget;

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("part000.html").unwrap(), "application/xhtml+xml");
        assert_eq!(media_type("images/Cover.JPG").unwrap(), "image/jpeg");
        assert_eq!(media_type("toc.ncx").unwrap(), "application/x-dtbncx+xml");
        assert!(matches!(
            media_type("notes.txt"),
            Err(Error::UnsupportedMediaType(_))
        ));
        assert!(media_type("README").is_err());
    }

    #[test]
    fn test_name_to_id() {
        assert_eq!(name_to_id("part000.html"), "part000");
        assert_eq!(name_to_id("images/cover.jpg"), "images_cover");
        assert_eq!(name_to_id("01 intro.html"), "id_01_intro");
    }

    #[test]
    fn test_opf_lists_manifest_spine_and_guide() {
        let meta = Metadata::new("Der Prozess & mehr")
            .with_identifier("abc")
            .with_author(Author::new("Franz Kafka"));
        let files = vec![
            FileInfo::new("title.html", FileOptions::spine().with_guide("Titlepage", "title-page"))
                .unwrap(),
            FileInfo::new("toc.ncx", FileOptions::resource()).unwrap(),
            FileInfo::new("part000.html", FileOptions::spine()).unwrap(),
            FileInfo::new("my image.png", FileOptions::resource()).unwrap(),
        ];
        let opf = generate_opf(&meta, &files);

        assert!(opf.contains("<dc:title>Der Prozess &amp; mehr</dc:title>"));
        assert!(opf.contains(r#"opf:file-as="Kafka, Franz" opf:role="aut">Franz Kafka<"#));
        assert!(opf.contains(r#"href="my%20image.png""#));
        assert!(opf.contains(r#"<spine toc="toc">"#));
        assert!(opf.contains(r#"<reference href="title.html" type="title-page" title="Titlepage"/>"#));

        let title = opf.find(r#"idref="title""#).unwrap();
        let part = opf.find(r#"idref="part000""#).unwrap();
        assert!(title < part);
        assert!(!opf.contains(r#"idref="my_image""#));
    }

    #[test]
    fn test_opf_without_guide() {
        let files = vec![FileInfo::new("part000.html", FileOptions::spine()).unwrap()];
        let opf = generate_opf(&Metadata::default(), &files);
        assert!(!opf.contains("<guide>"));
    }

    #[test]
    fn test_ncx_nesting_and_play_order() {
        let mut toc = Toc::new();
        toc.new_entry("One", TocTarget::new("part000.html"));
        toc.begin_subsections();
        toc.new_entry("One.A", TocTarget::new("part000.html").with_fragment("a"));
        toc.end_subsections();
        toc.new_entry("Two", TocTarget::new("part001.html"));

        let ncx = generate_ncx(&Metadata::new("Book"), &toc);
        assert!(ncx.contains(r#"<meta name="dtb:depth" content="2"/>"#));
        assert!(ncx.contains(r#"<navPoint id="nav0" playOrder="1">"#));
        assert!(ncx.contains(r#"<navPoint id="nav1" playOrder="2">"#));
        assert!(ncx.contains(r#"<content src="part000.html#a"/>"#));

        // One.A is nested inside One, Two is not.
        let one_a = ncx.find("One.A").unwrap();
        let first_close = ncx.find("</navPoint>").unwrap();
        let two = ncx.find(">Two<").unwrap();
        assert!(one_a < first_close);
        assert!(first_close < two);
    }
}

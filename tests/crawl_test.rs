use std::collections::HashMap;

use bookweave::{
    Collector, Error, Extractor, FetchedPage, Fetcher, Pattern, SinkEvent, get_ebook,
};
use url::Url;

/// Serves pages from memory and records every request.
#[derive(Default)]
struct MemoryFetcher {
    pages: HashMap<String, String>,
    requests: Vec<String>,
}

impl MemoryFetcher {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&mut self, base: &Url, path: &str) -> bookweave::Result<FetchedPage> {
        let url = base.join(path)?;
        self.requests.push(url.to_string());
        let (status, body) = match self.pages.get(url.as_str()) {
            Some(body) => (200, body.clone()),
            None => (404, String::new()),
        };
        Ok(FetchedPage { status, url, body })
    }
}

fn chapter(text: &str, next: Option<&str>) -> String {
    let link = next
        .map(|href| format!(r#"<a href="{href}">Next</a>"#))
        .unwrap_or_default();
    format!(r#"<html><body><div class="book"><p>{text}</p></div>{link}</body></html>"#)
}

fn extractor() -> Extractor<Collector> {
    Extractor::new(Collector::new())
        .with_root(Pattern::new().tag("div").class("book"))
        .with_next_link("Next")
        .expect("valid regex")
}

fn paragraphs(extractor: &Extractor<Collector>) -> Vec<String> {
    extractor.sink().elements().map(|e| e.text()).collect()
}

#[test]
fn test_follows_next_links() {
    let mut fetcher = MemoryFetcher::default()
        .page("https://example.org/book/ch1.html", &chapter("One", Some("ch2.html")))
        .page("https://example.org/book/ch2.html", &chapter("Two", Some("ch3.html")))
        .page("https://example.org/book/ch3.html", &chapter("Three", None));
    let mut ex = extractor();

    let pages = get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "ch1.html").unwrap();

    assert_eq!(pages, 3);
    assert_eq!(paragraphs(&ex), vec!["One", "Two", "Three"]);
    let parts = ex
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, SinkEvent::NewPart))
        .count();
    assert_eq!(parts, 3);
    assert_eq!(ex.sink().events[0], SinkEvent::NewPart);
}

#[test]
fn test_next_link_relative_to_fetched_page() {
    let mut fetcher = MemoryFetcher::default()
        .page(
            "https://example.org/book/part1/ch1.html",
            &chapter("One", Some("../part2/ch1.html")),
        )
        .page("https://example.org/book/part2/ch1.html", &chapter("Two", None));
    let mut ex = extractor();

    get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "part1/ch1.html").unwrap();

    assert_eq!(
        fetcher.requests,
        vec![
            "https://example.org/book/part1/ch1.html",
            "https://example.org/book/part2/ch1.html",
        ]
    );
}

#[test]
fn test_base_href_takes_precedence() {
    let first = r#"<html><head><base href="https://mirror.org/book/"></head>
<body><div class="book"><p>One</p></div><a href="ch2.html">Next</a></body></html>"#;
    let mut fetcher = MemoryFetcher::default()
        .page("https://example.org/book/ch1.html", first)
        .page("https://mirror.org/book/ch2.html", &chapter("Two", None));
    let mut ex = extractor();

    let pages = get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "ch1.html").unwrap();

    assert_eq!(pages, 2);
    assert_eq!(fetcher.requests[1], "https://mirror.org/book/ch2.html");
    assert_eq!(paragraphs(&ex), vec!["One", "Two"]);
}

#[test]
fn test_missing_page_is_fatal() {
    let mut fetcher = MemoryFetcher::default()
        .page("https://example.org/book/ch1.html", &chapter("One", Some("gone.html")));
    let mut ex = extractor();

    let err = get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "ch1.html").unwrap_err();

    match err {
        Error::PageNotFound { url, status } => {
            assert_eq!(url, "https://example.org/book/gone.html");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other}"),
    }
    // the first page was extracted before the failure
    assert_eq!(paragraphs(&ex), vec!["One"]);
}

#[test]
fn test_link_cycle_stops() {
    let mut fetcher = MemoryFetcher::default()
        .page("https://example.org/book/ch1.html", &chapter("One", Some("ch2.html")))
        .page("https://example.org/book/ch2.html", &chapter("Two", Some("ch1.html")));
    let mut ex = extractor();

    let pages = get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "ch1.html").unwrap();

    assert_eq!(pages, 2);
    assert_eq!(paragraphs(&ex), vec!["One", "Two"]);
}

#[test]
fn test_empty_start_path_reads_nothing() {
    let mut fetcher = MemoryFetcher::default();
    let mut ex = extractor();
    let pages = get_ebook(&mut ex, &mut fetcher, "https://example.org/book/", "").unwrap();
    assert_eq!(pages, 0);
    assert!(fetcher.requests.is_empty());
}

#[test]
fn test_invalid_base_url() {
    let mut fetcher = MemoryFetcher::default();
    let mut ex = extractor();
    let err = get_ebook(&mut ex, &mut fetcher, "not a url", "ch1.html").unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

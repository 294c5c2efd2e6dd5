//! Page fetching and the crawl loop.
//!
//! A book published as a series of web pages is read one page at a time:
//! fetch, extract, follow the next-page link, repeat until a page has no
//! such link. Everything is sequential; to stop early, stop calling.

use std::collections::HashSet;

use url::Url;

use crate::error::{Error, Result};
use crate::extract::{DocumentSink, Extractor};

/// A downloaded page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code.
    pub status: u16,
    /// Final URL of the page after redirects. Relative links on the page
    /// resolve against it.
    pub url: Url,
    /// Decoded page text.
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of pages.
pub trait Fetcher {
    /// Fetch `path` relative to `base`.
    fn fetch(&mut self, base: &Url, path: &str) -> Result<FetchedPage>;
}

impl<F: Fetcher + ?Sized> Fetcher for &mut F {
    fn fetch(&mut self, base: &Url, path: &str) -> Result<FetchedPage> {
        (**self).fetch(base, path)
    }
}

/// Extract a book starting at `base` + `path`, following next-page links.
///
/// Before each page, the sink is told a new part begins. A `<base href>`
/// seen on any page takes precedence over the page URL for resolving the
/// next link. Stops when a page has no next link or links back to a page
/// that was already read. Returns the number of pages read.
///
/// # Errors
///
/// Fails with [`Error::PageNotFound`] on a non-success status, and with
/// whatever the fetcher or the sink report.
pub fn get_ebook<S, F>(
    extractor: &mut Extractor<S>,
    fetcher: &mut F,
    base: &str,
    path: &str,
) -> Result<usize>
where
    S: DocumentSink,
    F: Fetcher + ?Sized,
{
    let mut base = Url::parse(base)?;
    let mut next = Some(path.to_string());
    let mut visited = HashSet::new();

    while let Some(path) = next.take().filter(|p| !p.is_empty()) {
        if let Some(base_href) = extractor.base_override() {
            base = base.join(base_href)?;
        }
        let page = fetcher.fetch(&base, &path)?;
        if !page.is_success() {
            return Err(Error::PageNotFound {
                url: page.url.to_string(),
                status: page.status,
            });
        }
        if !visited.insert(page.url.clone()) {
            log::warn!("{} was already read, stopping", page.url);
            break;
        }
        log::info!("reading page {}: {}", visited.len(), page.url);

        extractor.sink_mut().new_part()?;
        extractor.feed(&page.body);
        next = extractor.next_target().map(str::to_string);
        extractor.reset();
        base = page.url;
    }

    Ok(visited.len())
}

#[cfg(feature = "http")]
pub use self::http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use url::Url;

    use super::{FetchedPage, Fetcher};
    use crate::error::{Error, Result};
    use crate::util::{charset_from_content_type, decode_text};

    const USER_AGENT: &str = concat!("bookweave/", env!("CARGO_PKG_VERSION"));

    const TIMEOUT: Duration = Duration::from_secs(30);

    /// Blocking HTTP fetcher.
    pub struct HttpFetcher {
        client: reqwest::blocking::Client,
    }

    impl HttpFetcher {
        pub fn new() -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| Error::Http(format!("failed to create HTTP client: {e}")))?;
            Ok(Self { client })
        }
    }

    impl Fetcher for HttpFetcher {
        fn fetch(&mut self, base: &Url, path: &str) -> Result<FetchedPage> {
            let url = base.join(path)?;
            log::debug!("GET {url}");
            let response = self
                .client
                .get(url)
                .send()
                .map_err(|e| Error::Http(format!("request failed: {e}")))?;

            let status = response.status().as_u16();
            let url = response.url().clone();
            let charset = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(charset_from_content_type)
                .map(str::to_string);
            let bytes = response
                .bytes()
                .map_err(|e| Error::Http(format!("failed to read response body: {e}")))?;

            Ok(FetchedPage {
                status,
                url,
                body: decode_text(&bytes, charset.as_deref()).into_owned(),
            })
        }
    }
}

//! Content resolution for bookmarks.
//!
//! Turns a bookmark descriptor into the plain text the engines consume.
//! Articles use the service-provided excerpt, videos use the stored note,
//! everything else is fetched and stripped of markup.

use curio_core::truncate_chars;
use curio_raindrop::{Raindrop, RaindropType};
use scraper::{ElementRef, Html, Selector};

use crate::error::EnrichError;

/// Elements whose text never belongs in extracted page content.
const SKIPPED_ELEMENTS: [&str; 7] = [
    "script", "style", "nav", "header", "footer", "aside", "noscript",
];

/// Resolves the text content of one bookmark.
pub struct ContentResolver {
    client: reqwest::Client,
}

impl ContentResolver {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Produces the plain text for a bookmark, truncated to `max_chars`
    /// characters.
    ///
    /// - `article`: service excerpt, with a page fetch as fallback when the
    ///   excerpt is blank.
    /// - `video`: the stored note (transcript text); no network fetch.
    /// - `link` and unknown kinds: page fetch of the bookmark link.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::ContentUnavailable`] when no text can be obtained:
    ///   missing link, unreachable URL, non-2xx status, or a page with no
    ///   readable text.
    /// - [`EnrichError::Timeout`] when the page fetch times out.
    pub async fn resolve(
        &self,
        raindrop: &Raindrop,
        max_chars: usize,
    ) -> Result<String, EnrichError> {
        let text = match raindrop.kind {
            RaindropType::Article => {
                let excerpt = raindrop.excerpt.as_deref().map_or("", str::trim);
                if excerpt.is_empty() {
                    self.fetch_page_text(&raindrop.link).await?
                } else {
                    excerpt.to_owned()
                }
            }
            RaindropType::Video => {
                let note = raindrop.note.as_deref().map_or("", str::trim);
                if note.is_empty() {
                    return Err(EnrichError::ContentUnavailable(format!(
                        "video bookmark {} has no transcript note",
                        raindrop.id
                    )));
                }
                note.to_owned()
            }
            RaindropType::Link | RaindropType::Other => {
                self.fetch_page_text(&raindrop.link).await?
            }
        };

        Ok(truncate_chars(&text, max_chars))
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String, EnrichError> {
        if url.trim().is_empty() {
            return Err(EnrichError::ContentUnavailable(
                "bookmark has no link to fetch".to_owned(),
            ));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_fetch_error(url, &e))?;

        if !response.status().is_success() {
            return Err(EnrichError::ContentUnavailable(format!(
                "{url} returned status {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| map_fetch_error(url, &e))?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(EnrichError::ContentUnavailable(format!(
                "no readable text at {url}"
            )));
        }

        Ok(text)
    }
}

fn map_fetch_error(url: &str, e: &reqwest::Error) -> EnrichError {
    if e.is_timeout() {
        EnrichError::Timeout(format!("page fetch timed out for {url}: {e}"))
    } else {
        EnrichError::ContentUnavailable(format!("page fetch failed for {url}: {e}"))
    }
}

/// Converts an HTML document to whitespace-collapsed plain text.
///
/// Text inside [`SKIPPED_ELEMENTS`] is dropped wherever it nests.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap();

    let mut raw = String::new();
    // parse_document always synthesizes html/head/body elements.
    if let Some(body) = document.select(&body_selector).next() {
        collect_text(body, &mut raw);
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(el) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&el.value().name()) {
                collect_text(el, out);
            }
        }
    }
}

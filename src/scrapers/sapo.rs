//! SAPO 24 newspaper-kiosk cover crawler.
//!
//! This module downloads daily front-cover images from the
//! [SAPO 24 kiosk](https://24.sapo.pt/jornais/desporto), which republishes
//! the covers of the Portuguese sports dailies. Each newspaper/day pair has
//! its own page; the cover image URLs sit inside a `<picture>` element as
//! protocol-relative `data-srcset` attributes.
//!
//! # URL Pattern
//!
//! Cover pages live at `https://24.sapo.pt/jornais/desporto/{site_id}/{date}`
//! with the date in ISO `YYYY-MM-DD` form and the site id taken from the
//! [`Newspaper`] catalog.

use crate::catalog::{Newspaper, Resolution};
use crate::utils::{cover_stem, days_in_range};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::get;
use scraper::{Html, Selector};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Days fetched concurrently per newspaper. Workers share nothing and write
/// distinct files, so the bound only limits kiosk load.
const CRAWL_POOL_SIZE: usize = 5;

static PICTURE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("picture").unwrap());
static ANY_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());

/// Per-newspaper crawl tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Days whose cover was downloaded and written.
    pub saved: usize,
    /// Days skipped (missing page, no usable image entry, or fetch error).
    pub skipped: usize,
}

/// The kiosk page URL for one newspaper and day.
///
/// # Examples
///
/// ```ignore
/// let day = NaiveDate::from_ymd_opt(2019, 1, 3).unwrap();
/// assert_eq!(
///     cover_page_url(Newspaper::Abola, day),
///     "https://24.sapo.pt/jornais/desporto/4137/2019-01-03"
/// );
/// ```
pub fn cover_page_url(newspaper: Newspaper, day: NaiveDate) -> String {
    format!(
        "https://24.sapo.pt/jornais/desporto/{}/{}",
        newspaper.site_id(),
        day
    )
}

/// Pick the cover image URL out of a kiosk page.
///
/// Scans the descendants of the page's first `<picture>` element in document
/// order and returns, for the first entry whose `type` is `image/jpeg` and
/// whose `srcset` does not carry the requested resolution's `W={w}&H={h}`
/// fragment, its `data-srcset` URL prefixed with `http:` (the kiosk publishes
/// protocol-relative URLs). Entries missing any of the three attributes are
/// passed over.
///
/// The not-contains check on `srcset` is the crawler's long-standing
/// selection rule; every entry's `data-srcset` serves the same cover, so the
/// rule decides which copy gets fetched, not whether one exists.
///
/// # Arguments
///
/// * `html` - The kiosk page markup
/// * `resolution` - The resolution whose `srcset` entries are passed over
///
/// # Returns
///
/// The downloadable image URL, or `None` when the page has no `<picture>`
/// element or no entry satisfies the rule.
pub fn parse_cover_image_url(html: &str, resolution: Resolution) -> Option<String> {
    let document = Html::parse_document(html);
    let picture = document.select(&PICTURE_SELECTOR).next()?;
    let fragment = resolution.query_fragment();
    for element in picture.select(&ANY_ELEMENT_SELECTOR) {
        let value = element.value();
        let (Some(kind), Some(srcset), Some(data_srcset)) = (
            value.attr("type"),
            value.attr("srcset"),
            value.attr("data-srcset"),
        ) else {
            continue;
        };
        if kind == "image/jpeg" && !srcset.contains(&fragment) {
            return Some(format!("http:{data_srcset}"));
        }
    }
    None
}

/// Crawl one newspaper over an inclusive date range.
///
/// Days are fetched through a pool of [`CRAWL_POOL_SIZE`] concurrent
/// workers. Each saved cover lands at `{out_dir}/{Newspaper}_{date}.jpeg`.
/// Per-day failures are logged and skipped without failing the batch; there
/// is no retry, so a skipped day must be re-run manually.
///
/// # Arguments
///
/// * `newspaper` - Which daily to crawl
/// * `start` - First day, inclusive
/// * `end` - Last day, inclusive
/// * `resolution` - Resolution passed to the image-entry selection rule
/// * `out_dir` - Existing writable directory for the `.jpeg` files
///
/// # Returns
///
/// The per-newspaper saved/skipped tally.
#[instrument(
    level = "info",
    skip_all,
    fields(newspaper = newspaper.name(), start = %start, end = %end)
)]
pub async fn crawl_covers(
    newspaper: Newspaper,
    start: NaiveDate,
    end: NaiveDate,
    resolution: Resolution,
    out_dir: &Path,
) -> CrawlSummary {
    let days = days_in_range(start, end);
    let total = days.len();
    info!(days = total, pool = CRAWL_POOL_SIZE, "Starting newspaper crawl");

    let results: Vec<bool> = stream::iter(days)
        .map(|day| async move {
            match crawl_day(newspaper, day, resolution, out_dir).await {
                Ok(saved) => saved,
                Err(e) => {
                    error!(error = %e, day = %day, "Cover fetch failed; skipping day");
                    false
                }
            }
        })
        .buffer_unordered(CRAWL_POOL_SIZE)
        .collect()
        .await;

    let saved = results.iter().filter(|s| **s).count();
    let summary = CrawlSummary {
        saved,
        skipped: total - saved,
    };
    info!(
        saved = summary.saved,
        skipped = summary.skipped,
        "Finished newspaper crawl"
    );
    summary
}

/// Fetch and save a single day's cover.
///
/// Returns `Ok(true)` when a cover was written, `Ok(false)` when the day
/// was skipped (non-success page status, or no usable image entry). The
/// file write happens only after the image bytes are fully downloaded.
#[instrument(level = "debug", skip_all, fields(newspaper = newspaper.name(), day = %day))]
async fn crawl_day(
    newspaper: Newspaper,
    day: NaiveDate,
    resolution: Resolution,
    out_dir: &Path,
) -> Result<bool, Box<dyn Error>> {
    let stem = cover_stem(newspaper.name(), day);
    let page_url = cover_page_url(newspaper, day);
    debug!(%page_url, "Downloading cover page");

    let response = get(&page_url).await?;
    if !response.status().is_success() {
        warn!(status = %response.status(), %stem, "Error getting page; skipping");
        return Ok(false);
    }
    let html = response.text().await?;

    let Some(image_url) = parse_cover_image_url(&html, resolution) else {
        warn!(%stem, "No cover image entry found; skipping");
        return Ok(false);
    };
    // The `http:` fix-up of the protocol-relative attribute must leave a
    // valid absolute URL behind.
    let image_url = Url::parse(&image_url)?;
    debug!(%image_url, "Selected cover image");

    let bytes = get(image_url).await?.error_for_status()?.bytes().await?;
    let path = out_dir.join(format!("{stem}.jpeg"));
    fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved cover");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIOSK_PAGE: &str = r#"<html><body>
        <div class="newspaper-cover">
            <picture>
                <source type="image/webp"
                        srcset="//im.sapo.pt/c?W=320&H=398 320w"
                        data-srcset="//im.sapo.pt/cover.webp">
                <source type="image/jpeg"
                        srcset="//im.sapo.pt/c?W=1050&H=1305 1050w"
                        data-srcset="//im.sapo.pt/cover-large.jpeg">
                <source type="image/jpeg"
                        srcset="//im.sapo.pt/c?W=320&H=398 320w"
                        data-srcset="//im.sapo.pt/cover-small.jpeg">
                <img src="/static/fallback.jpeg" alt="capa">
            </picture>
        </div>
    </body></html>"#;

    #[test]
    fn test_cover_page_url() {
        let day = NaiveDate::from_ymd_opt(2019, 1, 3).unwrap();
        assert_eq!(
            cover_page_url(Newspaper::Abola, day),
            "https://24.sapo.pt/jornais/desporto/4137/2019-01-03"
        );
        assert_eq!(
            cover_page_url(Newspaper::Record, day),
            "https://24.sapo.pt/jornais/desporto/4139/2019-01-03"
        );
    }

    #[test]
    fn test_selects_first_jpeg_without_requested_fragment() {
        // Requesting 1050x1305 passes over the entry advertising it and
        // lands on the 320w jpeg entry; webp entries never qualify.
        let url = parse_cover_image_url(KIOSK_PAGE, Resolution::R1050x1305).unwrap();
        assert_eq!(url, "http://im.sapo.pt/cover-small.jpeg");
    }

    #[test]
    fn test_selection_depends_on_requested_resolution() {
        let url = parse_cover_image_url(KIOSK_PAGE, Resolution::R320x398).unwrap();
        assert_eq!(url, "http://im.sapo.pt/cover-large.jpeg");
    }

    #[test]
    fn test_no_candidate_when_all_entries_advertise_requested() {
        let html = r#"<picture>
            <source type="image/jpeg"
                    srcset="//im.sapo.pt/c?W=640&H=795 640w"
                    data-srcset="//im.sapo.pt/cover.jpeg">
        </picture>"#;
        assert_eq!(parse_cover_image_url(html, Resolution::R640x795), None);
    }

    #[test]
    fn test_no_picture_element() {
        let html = "<html><body><p>404</p></body></html>";
        assert_eq!(parse_cover_image_url(html, Resolution::R1050x1305), None);
    }

    #[test]
    fn test_entries_missing_attributes_are_passed_over() {
        let html = r#"<picture>
            <source type="image/jpeg" srcset="//im.sapo.pt/c?W=320&H=398 320w">
            <img src="/static/fallback.jpeg">
            <source type="image/jpeg"
                    srcset="//im.sapo.pt/c?W=320&H=398 320w"
                    data-srcset="//im.sapo.pt/cover.jpeg">
        </picture>"#;
        let url = parse_cover_image_url(html, Resolution::R1050x1305).unwrap();
        assert_eq!(url, "http://im.sapo.pt/cover.jpeg");
    }

    #[test]
    fn test_only_first_picture_is_scanned() {
        let html = r#"<div>
            <picture>
                <source type="image/png"
                        srcset="//im.sapo.pt/c?W=320&H=398 320w"
                        data-srcset="//im.sapo.pt/cover.png">
            </picture>
            <picture>
                <source type="image/jpeg"
                        srcset="//im.sapo.pt/c?W=320&H=398 320w"
                        data-srcset="//im.sapo.pt/other.jpeg">
            </picture>
        </div>"#;
        assert_eq!(parse_cover_image_url(html, Resolution::R1050x1305), None);
    }
}

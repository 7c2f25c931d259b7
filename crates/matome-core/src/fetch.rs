//! HTTP fetching and charset transcoding

use crate::{Page, Result};
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Match `<meta charset="...">`
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`
static HTTP_EQUIV_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("valid regex")
});

/// Configuration for fetching pages
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            // Aggregator sites serve bot-flavored UAs a degraded page, so
            // present a plain desktop browser.
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            )
            .to_string(),
            timeout_secs: 30,
        }
    }
}

/// Fetcher for aggregator pages
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page by URL.
    ///
    /// Performs a single GET with no retry; a transport error or non-2xx
    /// status fails the call. The body is taken as raw bytes and re-decoded
    /// with charset detection on the content itself, since aggregator sites
    /// routinely declare one encoding in the HTTP header and use another in
    /// the markup.
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        let url = Url::parse(url)?;
        info!("Fetching: {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let response = response.error_for_status()?;
        let body = response.bytes().await?;
        debug!("Fetched {} bytes", body.len());

        Ok(Page {
            url,
            html: transcode_to_utf8(&body),
        })
    }
}

/// Detect the charset declared in the markup, defaulting to UTF-8.
///
/// Only the first 1024 bytes are examined.
fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&html[..html.len().min(1024)]);

    for re in [&CHARSET_META_RE, &HTTP_EQUIV_CHARSET_RE] {
        if let Some(label) = re.captures(&head).and_then(|c| c.get(1)) {
            if let Some(encoding) = Encoding::for_label(label.as_str().as_bytes()) {
                return encoding;
            }
        }
    }

    UTF_8
}

/// Decode raw HTML bytes to a UTF-8 string, lossily.
pub fn transcode_to_utf8(html: &[u8]) -> String {
    let encoding = detect_encoding(html);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }

    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}

//! Matome Core Library
//!
//! Core functionality for the matome comment extractor including:
//! - HTTP fetching with content-based charset transcoding
//! - Heuristic comment extraction, generic and site-specific
//! - Speaker name resolution
//! - Script line segmentation and tabular output

pub mod extract;
pub mod fetch;
pub mod output;
pub mod script;
pub mod segment;
pub mod sites;
pub mod speaker;

use thiserror::Error;

// Re-export key types
pub use fetch::{FetchConfig, Fetcher};
pub use output::OutputFormat;
pub use sites::Site;

/// Speaker label used when no name can be inferred.
pub const ANONYMOUS: &str = "匿名";

#[derive(Error, Debug)]
pub enum MatomeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("no comments found in page")]
    NoComments,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MatomeError>;

/// Represents a fetched aggregator page
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL of the page
    pub url: url::Url,
    /// The page body decoded to UTF-8
    pub html: String,
}

impl Page {
    /// Host component of the page URL, used for site dispatch.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }
}

/// A single comment extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Ordinal parsed from the page, when present. Comments without one sort
    /// after all numbered comments.
    pub number: Option<u64>,
    /// Inferred speaker name, or the anonymous sentinel
    pub speaker: String,
    /// Visible comment text
    pub text: String,
}

/// One row of the narration script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// Speaker column
    pub speaker: String,
    /// Line column, normally at most the configured line length
    pub text: String,
}

/// Thresholds for the extraction heuristics
///
/// The defaults are the values tuned against observed aggregator layouts.
/// All lengths count characters, not bytes.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum visible text length for a comment candidate
    pub min_comment_len: usize,
    /// Minimum text length for the long-paragraph fallback scan
    pub fallback_min_len: usize,
    /// Maximum number of comments the fallback scan may accept
    pub fallback_cap: usize,
    /// Maximum script line length
    pub max_line_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_comment_len: 10,
            fallback_min_len: 20,
            fallback_cap: 50,
            max_line_len: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = ExtractConfig::default();
        assert_eq!(config.min_comment_len, 10);
        assert_eq!(config.fallback_min_len, 20);
        assert_eq!(config.fallback_cap, 50);
        assert_eq!(config.max_line_len, 50);
    }

    #[test]
    fn test_page_host() {
        let page = Page {
            url: url::Url::parse("https://bbs.animanch.com/board/12345/").unwrap(),
            html: String::new(),
        };
        assert_eq!(page.host(), "bbs.animanch.com");
    }
}

//! Known-sites registry and site-specific extraction paths
//!
//! Sites whose DOM convention is known get a dedicated locator; everything
//! else goes through the generic heuristics in [`crate::extract`]. The
//! variant is chosen once per run from the page host, so adding a site means
//! adding a variant here without touching the generic path.

use crate::extract::{extract_generic, visible_text};
use crate::{Comment, ExtractConfig, MatomeError, Result, ANONYMOUS};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Element id of an animanch comment container (`res1`, `res2`, ...).
static RES_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^res(\d+)$").expect("valid regex"));
/// Leading `ordinal + poster + yy/mm/dd` run of a comment header.
static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+([^0-9]+?)\d{2}/\d{2}/\d{2}").expect("valid regex"));
/// Posting date and time as rendered inside the poster field.
static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}/\d{2}/\d{2}\(.*?\)\s+\d{2}:\d{2}:\d{2}").expect("valid regex")
});
/// Body following the per-comment report link.
static REPORT_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"報告(.+)$").expect("valid regex"));
/// Body following the posting timestamp.
static TIME_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}(.+)$").expect("valid regex"));
/// Best-effort strip of the whole comment header.
static HEADER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\d+[^\d]+?\d{2}/\d{2}/\d{2}[^"]*"#).expect("valid regex"));

static ID_ATTR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[id]").expect("valid selector"));

/// Extraction path for a run, chosen once from the page host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// animanch.com - sequentially numbered `res<N>` comment containers
    Animanch,
    /// Any unrecognized host
    Generic,
}

impl Site {
    /// Match a host against the known-sites registry.
    pub fn from_host(host: &str) -> Self {
        if host.contains("animanch.com") {
            Site::Animanch
        } else {
            Site::Generic
        }
    }

    /// Run this site's locator over a parsed document. The dedup seen-set
    /// lives for exactly one call.
    pub fn extract(self, document: &Html, config: &ExtractConfig) -> Vec<Comment> {
        let mut seen = HashSet::new();
        match self {
            Site::Animanch => extract_animanch(document, &mut seen),
            Site::Generic => extract_generic(document, config, &mut seen),
        }
    }
}

/// Parse a page and extract its comments along the path registered for
/// `host`. Errors when the page yields no comments at all.
pub fn extract_comments(html: &str, host: &str, config: &ExtractConfig) -> Result<Vec<Comment>> {
    let document = Html::parse_document(html);
    let site = Site::from_host(host);
    debug!("extracting via {:?} path", site);

    let comments = site.extract(&document, config);
    if comments.is_empty() {
        return Err(MatomeError::NoComments);
    }
    Ok(comments)
}

/// Extract comments from an animanch.com thread page.
///
/// Each comment lives in an element with id `res<N>`; its visible text runs
/// ordinal, poster name, posting date, and body together in one blob, so the
/// pieces are recovered with anchored patterns. The reply-submission form
/// reuses the `res` id scheme and is skipped by class.
pub fn extract_animanch(document: &Html, seen: &mut HashSet<String>) -> Vec<Comment> {
    let mut comments = Vec::new();

    for element in document.select(&ID_ATTR_SELECTOR) {
        let id = element.value().attr("id").unwrap_or("");
        let number = match RES_ID_RE
            .captures(id)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            Some(n) => n,
            None => continue,
        };

        if element
            .value()
            .attr("class")
            .is_some_and(|class| class.contains("resform"))
        {
            continue;
        }

        let text = visible_text(element);
        if text.chars().count() < 10 {
            continue;
        }

        let speaker = match SPEAKER_RE.captures(&text).and_then(|c| c.get(1)) {
            Some(m) => clean_speaker(m.as_str()),
            None => ANONYMOUS.to_string(),
        };

        let body = match extract_body(&text) {
            Some(body) => body,
            None => continue,
        };

        let key = format!("{}:{}", number, body.chars().take(50).collect::<String>());
        if !seen.insert(key) {
            continue;
        }

        comments.push(Comment {
            number: Some(number),
            speaker,
            text: body,
        });
    }

    // unparseable ordinals would sort last, though every entry here has one
    comments.sort_by_key(|c| c.number.unwrap_or(u64::MAX));
    debug!("animanch scan done: {} comments", comments.len());
    comments
}

/// Strip the embedded posting date/time from a raw poster field.
fn clean_speaker(raw: &str) -> String {
    let cleaned = DATE_TIME_RE.replace_all(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        ANONYMOUS.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Pull the comment body out of the joined text blob: the text after the
/// report link, else after the timestamp, else a best-effort strip of the
/// header prefix. Bodies under 5 characters are discarded.
fn extract_body(text: &str) -> Option<String> {
    let body = if let Some(m) = REPORT_TAIL_RE.captures(text).and_then(|c| c.get(1)) {
        m.as_str().trim().to_string()
    } else if let Some(m) = TIME_TAIL_RE.captures(text).and_then(|c| c.get(1)) {
        m.as_str().trim().to_string()
    } else {
        HEADER_PREFIX_RE.replace(text, "").trim().to_string()
    };

    if body.chars().count() < 5 {
        None
    } else {
        Some(body)
    }
}

//! Speaker name resolution heuristics
//!
//! Aggregator pages rarely mark the poster up consistently, so the resolver
//! tries a chain of strategies from most to least specific: labeled patterns
//! in the comment text, then name-flavored element attributes, then the
//! first line of the text, bottoming out in the anonymous sentinel. It never
//! fails and always returns a non-empty label.

use crate::ANONYMOUS;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static ID_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ID[：:]\s*([^\s\n：:]+)").expect("valid regex"));
static NAME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"名前[：:]\s*([^\s\n：:]+)").expect("valid regex"));
static POSTER_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"投稿者[：:]\s*([^\s\n：:]+)").expect("valid regex"));
static LINE_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^：:\n]+)[：:]").expect("valid regex"));
static WORD_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)[：:]\s*").expect("valid regex"));
static ALNUM_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)").expect("valid regex"));

/// Class and id keywords that suggest an attribute carries a poster name.
const ATTR_KEYWORDS: [&str; 5] = ["name", "user", "id", "author", "poster"];

/// Label patterns tried in order of decreasing specificity; first hit wins.
const TEXT_STRATEGIES: [fn(&str) -> Option<String>; 5] = [
    by_id_label,
    by_name_label,
    by_poster_label,
    by_line_lead,
    by_word_colon,
];

/// Infer a speaker name for a comment.
///
/// `element` is the node the comment text came from; its attributes are
/// consulted when no labeled pattern matches the text itself.
pub fn resolve_speaker(element: ElementRef, text: &str) -> String {
    for strategy in TEXT_STRATEGIES {
        if let Some(name) = strategy(text) {
            return name;
        }
    }
    if let Some(name) = from_attributes(element) {
        return name;
    }
    if let Some(name) = from_first_line(text) {
        return name;
    }
    ANONYMOUS.to_string()
}

fn by_id_label(text: &str) -> Option<String> {
    capture(&ID_LABEL_RE, text)
}

fn by_name_label(text: &str) -> Option<String> {
    capture(&NAME_LABEL_RE, text)
}

fn by_poster_label(text: &str) -> Option<String> {
    capture(&POSTER_LABEL_RE, text)
}

/// Leading `name:` at the start of the text.
fn by_line_lead(text: &str) -> Option<String> {
    capture(&LINE_LEAD_RE, text)
}

/// Last resort: any `word:` anywhere in the text.
fn by_word_colon(text: &str) -> Option<String> {
    capture(&WORD_COLON_RE, text)
}

/// Run one labeled pattern, rejecting trivial or purely numeric captures.
fn capture(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim().to_string();
    if value.chars().count() > 1 && !value.chars().all(char::is_numeric) {
        Some(value)
    } else {
        None
    }
}

/// Look for a poster name in the element's attributes: class tokens first,
/// then the id, then any other attribute with a name-flavored key.
fn from_attributes(element: ElementRef) -> Option<String> {
    let el = element.value();

    if let Some(class) = el.attr("class") {
        for token in class.split_whitespace() {
            let lower = token.to_lowercase();
            if ATTR_KEYWORDS.iter().any(|k| lower.contains(k)) {
                if let Some(m) = ALNUM_RUN_RE.captures(token).and_then(|c| c.get(1)) {
                    return Some(m.as_str().to_string());
                }
            }
        }
    }

    if let Some(id) = el.attr("id") {
        let lower = id.to_lowercase();
        if ATTR_KEYWORDS.iter().any(|k| lower.contains(k)) {
            if let Some(m) = ALNUM_RUN_RE.captures(id).and_then(|c| c.get(1)) {
                return Some(m.as_str().to_string());
            }
        }
    }

    for (name, value) in el.attrs() {
        if name == "class" || name == "id" {
            continue;
        }
        let lower = name.to_lowercase();
        if ["name", "user", "id", "author"].iter().any(|k| lower.contains(k))
            && value.chars().count() > 1
        {
            return Some(value.to_string());
        }
    }

    None
}

/// Guess a name from the first line of the text, up to the first colon.
fn from_first_line(text: &str) -> Option<String> {
    let first = text
        .split('\n')
        .next()
        .unwrap_or("")
        .split('：')
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .trim();

    let len = first.chars().count();
    if (2..30).contains(&len) && !first.starts_with(">>") {
        Some(first.to_string())
    } else {
        None
    }
}

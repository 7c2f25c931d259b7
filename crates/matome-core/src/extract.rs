//! Generic comment extraction heuristics
//!
//! Four strategies applied in order over the parsed document, all feeding
//! one ordered result list and one shared seen-set so later strategies
//! cannot re-emit earlier results:
//!
//! 1. text nodes containing a `>>N` reply anchor
//! 2. block elements with comment-flavored class names
//! 3. block elements with comment-flavored ids
//! 4. a capped long-paragraph fallback, only when nothing else matched

use crate::speaker::resolve_speaker;
use crate::{Comment, ExtractConfig};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Reply anchor referencing a comment by number (`>>12`).
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">>(\d+)").expect("valid regex"));

static CLASS_SCAN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, p, li, article").expect("valid selector"));
static ID_SCAN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, p, li").expect("valid selector"));
static FALLBACK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, p, article").expect("valid selector"));

/// Block-level tags considered comment containers for the anchor scan.
const ANCHOR_BLOCK_TAGS: [&str; 5] = ["div", "p", "li", "article", "section"];
/// Class-name vocabulary that flags an element as a comment block.
const CLASS_KEYWORDS: [&str; 6] = ["comment", "res", "post", "message", "reply", "response"];
/// Narrower vocabulary for the id scan.
const ID_KEYWORDS: [&str; 3] = ["res", "comment", "post"];
/// Sentence-ending marks accepted by the fallback scan.
const SENTENCE_MARKS: [char; 3] = ['。', '！', '？'];

/// Extract comments with the generic strategy cascade.
///
/// `seen` carries dedup keys (full normalized text) across strategies; the
/// caller owns it, so the pass is a pure function of its inputs and can be
/// replayed or composed.
pub fn extract_generic(
    document: &Html,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
) -> Vec<Comment> {
    let mut comments = Vec::new();

    scan_reply_anchors(document, config, seen, &mut comments);
    scan_keyword_classes(document, config, seen, &mut comments);
    scan_keyword_ids(document, config, seen, &mut comments);

    if comments.is_empty() {
        warn!("no comments matched the standard patterns, running long-paragraph fallback");
        scan_long_paragraphs(document, config, seen, &mut comments);
    }

    sort_comments(comments)
}

/// Stable two-group ordering: numbered comments ascending, then unnumbered
/// comments in discovery order. The groups never interleave.
pub fn sort_comments(comments: Vec<Comment>) -> Vec<Comment> {
    let (mut numbered, unnumbered): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| c.number.is_some());
    numbered.sort_by_key(|c| c.number.unwrap_or(u64::MAX));
    numbered.extend(unnumbered);
    numbered
}

/// Space-joined visible text of an element, with each text node trimmed and
/// empty nodes dropped.
pub fn visible_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strategy 1: text nodes containing a reply anchor select their nearest
/// block-level ancestor as a comment container.
fn scan_reply_anchors(
    document: &Html,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
    comments: &mut Vec<Comment>,
) {
    for node in document.tree.root().descendants() {
        let text = match node.value() {
            Node::Text(text) => text,
            _ => continue,
        };
        if !ANCHOR_RE.is_match(&text.text) {
            continue;
        }

        let container = node.ancestors().find_map(|ancestor| {
            ElementRef::wrap(ancestor).filter(|el| ANCHOR_BLOCK_TAGS.contains(&el.value().name()))
        });
        if let Some(element) = container {
            accept(element, config, seen, comments);
        }
    }
    debug!("reply-anchor scan done: {} comments", comments.len());
}

/// Strategy 2: block elements whose class attribute contains a comment
/// keyword, scanned keyword by keyword in vocabulary order.
fn scan_keyword_classes(
    document: &Html,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
    comments: &mut Vec<Comment>,
) {
    for keyword in CLASS_KEYWORDS {
        for element in document.select(&CLASS_SCAN_SELECTOR) {
            let matches = element
                .value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains(keyword));
            if matches {
                accept(element, config, seen, comments);
            }
        }
    }
    debug!("keyword-class scan done: {} comments", comments.len());
}

/// Strategy 3: block elements whose id contains a comment keyword.
fn scan_keyword_ids(
    document: &Html,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
    comments: &mut Vec<Comment>,
) {
    for element in document.select(&ID_SCAN_SELECTOR) {
        let matches = element.value().attr("id").is_some_and(|id| {
            let id = id.to_lowercase();
            ID_KEYWORDS.iter().any(|k| id.contains(k))
        });
        if matches {
            accept(element, config, seen, comments);
        }
    }
    debug!("keyword-id scan done: {} comments", comments.len());
}

/// Strategy 4: any block element with enough text and a sentence-ending mark
/// or line break, capped at `fallback_cap` accepted items.
fn scan_long_paragraphs(
    document: &Html,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
    comments: &mut Vec<Comment>,
) {
    let mut accepted = 0usize;

    for element in document.select(&FALLBACK_SELECTOR) {
        let text = visible_text(element);
        if text.chars().count() < config.fallback_min_len {
            continue;
        }
        let has_boundary = text
            .chars()
            .any(|c| c == '\n' || SENTENCE_MARKS.contains(&c));
        if !has_boundary || !seen.insert(text.clone()) {
            continue;
        }

        push_comment(element, text, comments);
        accepted += 1;
        if accepted >= config.fallback_cap {
            break;
        }
    }
    debug!("fallback scan done: {} comments", comments.len());
}

/// Shared accept rule for strategies 1-3: long enough and not seen before.
fn accept(
    element: ElementRef,
    config: &ExtractConfig,
    seen: &mut HashSet<String>,
    comments: &mut Vec<Comment>,
) {
    let text = visible_text(element);
    if text.chars().count() <= config.min_comment_len || !seen.insert(text.clone()) {
        return;
    }
    push_comment(element, text, comments);
}

fn push_comment(element: ElementRef, text: String, comments: &mut Vec<Comment>) {
    let number = parse_number(&text);
    let speaker = resolve_speaker(element, &text);
    comments.push(Comment {
        number,
        speaker,
        text,
    });
}

/// Parse a comment's ordinal from the first reply anchor in its text.
fn parse_number(text: &str) -> Option<u64> {
    ANCHOR_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<Comment> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        extract_generic(&document, &ExtractConfig::default(), &mut seen)
    }

    #[test]
    fn test_reply_anchor_scan() {
        let html = r#"<html><body>
            <p>>>2 こっちが後のコメントだよね。</p>
            <p>>>1 こっちが先のコメントだよね。</p>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].number, Some(1));
        assert_eq!(comments[1].number, Some(2));
    }

    #[test]
    fn test_keyword_class_scan() {
        let html = r#"<html><body>
            <div class="commentBody">クラス名で見つかるコメントです。</div>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].number, None);
        assert_eq!(comments[0].text, "クラス名で見つかるコメントです。");
    }

    #[test]
    fn test_keyword_id_scan() {
        let html = r#"<html><body>
            <li id="post-77">ID属性で見つかるコメントです。</li>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn test_short_text_rejected() {
        // too short for the anchor scan, and too short for the fallback too
        let html = r#"<html><body><p>>>1 短い</p></body></html>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_cross_strategy_dedup() {
        // the same element qualifies by anchor, class, and id
        let html = r#"<html><body>
            <div class="comment" id="res1">>>1 全部の戦略に引っかかるコメント。</div>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn test_idempotent_over_same_html() {
        let html = r#"<html><body>
            <p>>>3 これはコメントその一です。</p>
            <div class="post">番号なしのコメントです。</div>
        </body></html>"#;
        assert_eq!(extract(html), extract(html));
    }

    #[test]
    fn test_numbered_before_unnumbered() {
        let html = r#"<html><body>
            <div class="comment">番号のないコメントその一。</div>
            <p>>>5 番号つきのコメントその一。</p>
            <div class="comment">番号のないコメントその二。</div>
            <p>>>2 番号つきのコメントその二。</p>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 4);
        assert_eq!(comments[0].number, Some(2));
        assert_eq!(comments[1].number, Some(5));
        assert_eq!(comments[2].number, None);
        assert_eq!(comments[2].text, "番号のないコメントその一。");
        assert_eq!(comments[3].number, None);
    }

    #[test]
    fn test_fallback_only_when_nothing_matched() {
        let html = r#"<html><body>
            <p>>>1 通常の戦略で見つかるコメント。</p>
            <p>これは二十文字以上あるただの段落ですが無視されます。</p>
        </body></html>"#;
        let comments = extract(html);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].number, Some(1));
    }

    #[test]
    fn test_fallback_activates_and_caps() {
        let mut body = String::new();
        for i in 0..60 {
            body.push_str(&format!(
                "<p>これは二十文字以上ある長さの段落です。その{}番目。</p>",
                i
            ));
        }
        let html = format!("<html><body>{}</body></html>", body);
        let comments = extract(&html);
        assert_eq!(comments.len(), ExtractConfig::default().fallback_cap);
        assert!(comments.iter().all(|c| c.number.is_none()));
    }

    #[test]
    fn test_fallback_requires_sentence_boundary() {
        let html = r#"<html><body>
            <p>句読点も改行もない二十文字以上のテキストですよ</p>
        </body></html>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_end_to_end_fixture() {
        let long_comment = "これはとても長いコメントです。".repeat(8);
        let html = format!(
            r#"<html><body>
                <div class="thread">
                    <p>>>3 {}</p>
                    <p>>>1 みじかいけど。</p>
                    <p>>>2 {}</p>
                </div>
            </body></html>"#,
            long_comment,
            "ちょうどいい長さのコメントで、六十文字くらいを狙って書いてあるのだけど、どうでしょうか。"
        );
        let comments = extract(&html);
        assert!(comments.len() >= 3);
        let numbers: Vec<_> = comments.iter().filter_map(|c| c.number).collect();
        assert_eq!(numbers, {
            let mut sorted = numbers.clone();
            sorted.sort_unstable();
            sorted
        });

        let lines = crate::script::to_script_lines(&comments, 50);
        assert!(lines.len() > 3);
        for line in &lines {
            assert!(line.text.chars().count() <= 50);
        }
    }
}

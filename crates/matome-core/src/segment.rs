//! Splitting comment text into display-length script lines

/// Marks that close a clause. Newlines are included so pre-formatted
/// comments keep their breaks.
const CLAUSE_DELIMITERS: [char; 4] = ['。', '！', '？', '\n'];

/// Split `text` into lines of at most `max_len` characters, preferring
/// sentence boundaries.
///
/// The text is cut into clauses at sentence-ending punctuation, with each
/// mark staying attached to the clause it ends, and consecutive clauses are
/// packed greedily into lines. A single clause longer than `max_len` is
/// emitted whole rather than broken mid-sentence, so the limit is not a hard
/// guarantee. Lengths count characters, not bytes.
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    if char_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for clause in split_clauses(text) {
        let clause_len = char_len(&clause);
        if current_len + clause_len <= max_len {
            current.push_str(&clause);
            current_len += clause_len;
        } else {
            if !current.is_empty() {
                lines.push(current.trim().to_string());
            }
            current = clause;
            current_len = clause_len;
        }
    }
    if !current.is_empty() {
        lines.push(current.trim().to_string());
    }

    if lines.is_empty() {
        // degenerate input, hard-truncate
        return vec![text.chars().take(max_len).collect()];
    }
    lines
}

/// Cut text at clause delimiters, keeping each delimiter attached to the
/// clause it ends.
fn split_clauses(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if CLAUSE_DELIMITERS.contains(&ch) {
            clauses.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    clauses
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_line() {
        let lines = split_text("短いコメント。", 50);
        assert_eq!(lines, vec!["短いコメント。"]);
    }

    #[test]
    fn test_exact_length_single_line() {
        let text: String = "あ".repeat(50);
        assert_eq!(split_text(&text, 50), vec![text.clone()]);
    }

    #[test]
    fn test_splits_at_sentence_marks() {
        let text = format!("{}。{}！", "あ".repeat(30), "い".repeat(30));
        let lines = split_text(&text, 50);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{}。", "あ".repeat(30)));
        assert_eq!(lines[1], format!("{}！", "い".repeat(30)));
    }

    #[test]
    fn test_packs_clauses_greedily() {
        // 11-char clauses: four fit in 50, the fifth starts a new line
        let text = "あいうえおかきくけこ。".repeat(6);
        let lines = split_text(&text, 50);
        assert_eq!(lines.len(), 2);
        assert_eq!(char_len(&lines[0]), 44);
        assert_eq!(char_len(&lines[1]), 22);
    }

    #[test]
    fn test_concatenation_reconstructs_input() {
        let text = "あいうえおかきくけこ。".repeat(10);
        let lines = split_text(&text, 50);
        assert_eq!(lines.concat(), text);
    }

    #[test]
    fn test_splits_at_newlines() {
        let text = format!("{}\n{}", "あ".repeat(40), "い".repeat(40));
        let lines = split_text(&text, 50);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_overlong_clause_emitted_whole() {
        let long = "あ".repeat(80);
        let text = format!("{}。はい。", long);
        let lines = split_text(&text, 50);
        assert_eq!(lines[0], format!("{}。", long));
        assert_eq!(lines[1], "はい。");
    }

    #[test]
    fn test_nonempty_output_for_nonempty_input() {
        let long = "y".repeat(200);
        for text in ["x", long.as_str(), "。。。", "a\nb\nc"] {
            assert!(!split_text(text, 50).is_empty());
        }
    }

    #[test]
    fn test_every_line_within_limit_for_short_clauses() {
        let text = "わかる。それな！ほんとこれ？いやまさか。草生える。".repeat(10);
        for line in split_text(&text, 50) {
            assert!(char_len(&line) <= 50);
        }
    }
}

//! Flattening comments into narration script lines

use crate::segment::split_text;
use crate::{Comment, ScriptLine};

/// Expand comments into (speaker, line) rows, splitting each body into
/// display-length lines. Every line of a comment carries that comment's
/// speaker; line order within a comment and comment order across the script
/// are preserved.
pub fn to_script_lines(comments: &[Comment], max_line_len: usize) -> Vec<ScriptLine> {
    let mut lines = Vec::new();
    for comment in comments {
        for text in split_text(&comment.text, max_line_len) {
            lines.push(ScriptLine {
                speaker: comment.speaker.clone(),
                text,
            });
        }
    }
    lines
}

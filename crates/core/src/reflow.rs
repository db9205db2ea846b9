//! Line reflow heuristic for multi-line captions.
//!
//! Captions are often one sentence wrapped for screen width. Translating the
//! wrapped fragments separately breaks grammar, so such captions are sent as a
//! single line and the translation is wrapped again afterwards by word count.

/// Decide whether the lines of `content` belong to one sentence.
/// A second line opening with a dialogue dash or an uppercase letter starts a
/// new sentence or speaker, so those captions are translated line by line.
pub fn should_merge_lines(content: &str) -> bool {
    let mut lines = content.split('\n');
    lines.next();
    match lines.next().and_then(|second| second.chars().next()) {
        Some(first) => !(first == '-' || first.is_uppercase()),
        None => true,
    }
}

/// Replace every line break with a space.
/// Returns the flat text and the number of breaks removed.
pub fn flatten(content: &str) -> (String, usize) {
    let breaks = content.matches('\n').count();
    (content.replace('\n', " "), breaks)
}

/// Wrap `text` into roughly `break_count + 1` lines by word count.
///
/// Every line but the last holds `words / (break_count + 1) + 1` words, which
/// favours longer lines and can yield fewer breaks than requested. A break that
/// would fall after the final word is not emitted.
pub fn reflow(text: &str, break_count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_offset = words.len() / (break_count + 1) + 1;
    words
        .chunks(word_offset)
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

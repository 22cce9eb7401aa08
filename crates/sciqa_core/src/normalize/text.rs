/// Post-process an article extract: trim every line, drop lines of one char or
/// less (blank lines included), rejoin with single newlines.
pub fn clean_document_text(raw: &str) -> String {
    raw.lines()
        .map(|l| l.trim())
        .filter(|l| l.chars().count() > 1)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hard cut to at most `max_chars` Unicode scalar values. May end mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

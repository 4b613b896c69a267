/// Characters of response body kept in snapshots and reports.
pub const BODY_PREVIEW_CHARS: usize = 500;
const MAX_ERROR_LENGTH: usize = 2_000;

/// First `max_chars` characters of `text`, with `...` appended when anything was cut.
/// Counts characters, not bytes, so multi-byte text never splits mid-codepoint.
pub fn truncate_prefix(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn truncate_error(error: &str) -> String {
    truncate_prefix(error, MAX_ERROR_LENGTH)
}

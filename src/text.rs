/// Cuts `input` down to at most `max_chars` characters without splitting a
/// multi-byte character.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((index, _)) => &input[..index],
        None => input,
    }
}

/// Error text shown to people in chat is capped at this many characters.
pub const DISPLAY_ERROR_LIMIT: usize = 200;

pub fn truncate_for_display(error: &impl std::fmt::Display) -> String {
    let rendered = error.to_string();
    truncate_chars(&rendered, DISPLAY_ERROR_LIMIT).to_string()
}

//! Logging utilities
//!
//! Helpers that keep chat content in log lines bounded

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        // Back up to a character boundary so slicing cannot panic
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} chars truncated)", &s[..end], s.len() - end)
    } else {
        s.to_string()
    }
}

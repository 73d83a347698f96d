//! Reply post-processing
//!
//! The upstream reply is one text blob carrying several chat bubbles.
//! The wire protocol between the system prompt and this parser:
//!
//! - segments are separated by `|||`
//! - a segment starting with `FOLLOWUP:` carries suggested follow-up
//!   questions rather than display text
//!
//! Segments are passed through to the widget in order and
//! undifferentiated; the widget branches on the `FOLLOWUP:` prefix. The
//! server only uses the classification for logging.

/// Segment separator in upstream replies
pub const MESSAGE_DELIMITER: &str = "|||";

/// Prefix marking a suggested-questions segment
pub const FOLLOWUP_MARKER: &str = "FOLLOWUP:";

/// Split an upstream reply into ordered, trimmed, non-empty segments
///
/// A reply that never mentions the delimiter still yields a valid
/// one-element list; a reply of pure whitespace yields an empty one.
pub fn split_reply(text: &str) -> Vec<String> {
    text.split(MESSAGE_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a segment is a suggested-questions segment
pub fn is_followup(segment: &str) -> bool {
    segment.starts_with(FOLLOWUP_MARKER)
}

/// Number of suggestion segments in a split reply
pub fn followup_count(segments: &[String]) -> usize {
    segments.iter().filter(|s| is_followup(s)).count()
}

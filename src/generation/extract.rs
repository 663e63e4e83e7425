//! Locating the JSON payload inside a free-text model reply.
//!
//! This is a delimiter heuristic, not a parser: it takes everything between
//! the first opening delimiter and the last closing one. Replies containing
//! stray brackets outside the payload (or unbalanced ones inside string
//! values) are not handled.

use super::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }
}

/// Removes a leading fence line (```` ```json ```` or ```` ``` ````) and a
/// trailing ```` ``` ````, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if text.starts_with("```") {
        text = match text.find('\n') {
            Some(newline) => &text[newline + 1..],
            None => text.trim_start_matches('`').trim_start_matches("json"),
        };
    }
    if let Some(stripped) = text.trim_end().strip_suffix("```") {
        text = stripped;
    }
    text.trim()
}

pub fn extract_json(raw: &str, shape: JsonShape) -> Result<&str, GenerationError> {
    let text = strip_code_fences(raw);
    let (open, close) = shape.delimiters();

    let start = text.find(open).ok_or(GenerationError::NoJsonFound)?;
    let end = text.rfind(close).ok_or(GenerationError::NoJsonFound)?;
    if end < start {
        return Err(GenerationError::NoJsonFound);
    }

    Ok(&text[start..=end])
}

//! Fixed-size content chunking for embedding.

/// Split text into consecutive, non-overlapping segments of at most
/// `max_chars` characters.
///
/// The input is trimmed first; all-whitespace text yields no segments.
/// Text that fits in one segment is returned as-is. Longer text is cut
/// every `max_chars` characters with the remainder in the final segment.
/// Splits are purely positional and may fall mid-word; that keeps the
/// chunker trivial and the chunk ids deterministic.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.trim();
    if text.is_empty() {
        return vec![];
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    chars
        .chunks(max_chars)
        .map(|segment| segment.iter().collect())
        .collect()
}

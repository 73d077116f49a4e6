// Splits generated text into ordered, bounded-length reply chunks.

/// Maximum characters per reply chunk. Kept well under Telegram's 4096
/// hard limit so the configured prefix still fits on the first chunk.
pub const CHUNK_LIMIT: usize = 1800;

/// Lossless partition of `text` into ordered segments of at most
/// `max_len` characters. Empty input yields no chunks at all.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() || max_len == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_len)
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        assert_eq!(chunk_text("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn chunks_reconstruct_input_exactly() {
        let text = "abcdefghij".repeat(37); // 370 chars
        let chunks = chunk_text(&text, 100);
        assert_eq!(chunks.len(), 4); // ceil(370 / 100)
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let text = "x".repeat(200);
        let chunks = chunk_text(&text, 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn splits_on_characters_not_bytes() {
        let text = "héllo wörld ünïcode".repeat(10);
        let total = text.chars().count();
        let chunks = chunk_text(&text, 7);
        assert_eq!(chunks.len(), total.div_ceil(7));
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }
}

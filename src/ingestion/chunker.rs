//! Fixed-window text chunking with overlap
//!
//! Chunks are contiguous character windows: each chunk holds `chunk_size`
//! characters and shares `overlap` characters with its predecessor, so
//! concatenating the chunks (dropping the leading overlap of every chunk
//! after the first) reconstructs the input exactly.

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` must be smaller than `chunk_size`
    /// (enforced at configuration load).
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        debug_assert!(overlap < chunk_size);
        Self { chunk_size, overlap }
    }

    /// Split text into overlapping chunks.
    ///
    /// Empty input yields an empty sequence; non-empty input never yields an
    /// empty chunk. Windows are measured in characters, not bytes.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the original text from chunks and the declared overlap
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut text = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                text.push_str(chunk);
            } else {
                text.extend(chunk.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(500, 50);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_short_input_is_a_single_chunk() {
        let chunker = TextChunker::new(500, 50);
        let chunks = chunker.chunk("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_chunks_have_configured_size_and_overlap() {
        let chunker = TextChunker::new(10, 3);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks[0], "abcdefghij");
        assert_eq!(chunks[1], "hijklmnopq");
        // Consecutive chunks share exactly `overlap` characters
        assert_eq!(&chunks[0][7..], &chunks[1][..3]);
    }

    #[test]
    fn test_total_coverage_reconstruction() {
        let chunker = TextChunker::new(10, 3);
        let text = "The quick brown fox jumps over the lazy dog, twice.";
        let chunks = chunker.chunk(text);
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, 3), text);
    }

    #[test]
    fn test_no_empty_chunks() {
        let chunker = TextChunker::new(4, 1);
        for text in ["a", "ab", "abcd", "abcde", "abcdefgh"] {
            let chunks = chunker.chunk(text);
            assert!(!chunks.is_empty());
            assert!(chunks.iter().all(|c| !c.is_empty()), "input {:?}", text);
            assert_eq!(reconstruct(&chunks, 1), text);
        }
    }

    #[test]
    fn test_multibyte_characters() {
        let chunker = TextChunker::new(5, 2);
        let text = "héllo wörld — ünïcode";
        let chunks = chunker.chunk(text);
        assert_eq!(reconstruct(&chunks, 2), text);
        // Windows are character counts, not byte counts
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_default_configuration_matches_upload_pipeline() {
        let chunker = TextChunker::new(500, 50);
        let text = "x".repeat(1200);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(reconstruct(&chunks, 50), text);
    }
}

//! Overlapping word windows over section text.

use crate::error::Result;

use super::options::ChunkOptions;

/// Splits text into bounded, overlapping word windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChunker {
    options: ChunkOptions,
}

impl TextChunker {
    /// Create a chunker, rejecting options whose window would not advance.
    pub fn new(options: ChunkOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options in use.
    pub fn options(&self) -> ChunkOptions {
        self.options
    }

    /// Split `text` into windows of at most `max_tokens` words.
    ///
    /// Text that already fits is returned unchanged as a single chunk.
    /// Longer text yields windows starting every `max_tokens - overlap`
    /// words; the last window ends exactly at the final word.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }
        if words.len() <= self.options.max_tokens {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.options.max_tokens).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start += self.options.stride();
        }
        chunks
    }
}

/// Chunk text with explicit window parameters.
pub fn chunk_text(text: &str, max_tokens: usize, overlap: usize) -> Result<Vec<String>> {
    let chunker = TextChunker::new(ChunkOptions::new(max_tokens, overlap)?)?;
    Ok(chunker.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn words(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("w{}", i)).collect()
    }

    #[test]
    fn test_three_hundred_words_make_two_chunks() {
        let text = words(0..300).join(" ");
        let chunks = chunk_text(&text, 200, 50).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], words(0..200).join(" "));
        assert_eq!(chunks[1], words(150..300).join(" "));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let text = words(0..150).join(" ");
        let chunks = chunk_text(&text, 200, 50).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_exact_fit_is_single_chunk() {
        let text = words(0..200).join("  ");
        let chunks = chunk_text(&text, 200, 50).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 200, 50).unwrap().is_empty());
        assert!(chunk_text("  \n ", 200, 50).unwrap().is_empty());
    }

    #[test]
    fn test_final_window_not_duplicated() {
        // 10 words, window 4, stride 2: [0..4] [2..6] [4..8] [6..10]
        let text = words(0..10).join(" ");
        let chunks = chunk_text(&text, 4, 2).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3], words(6..10).join(" "));
    }

    #[test]
    fn test_short_final_window() {
        let text = words(0..11).join(" ");
        let chunks = chunk_text(&text, 4, 1).unwrap();

        // Starts at 0, 3, 6, 9
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3], words(9..11).join(" "));
    }

    #[test]
    fn test_invalid_overlap() {
        assert!(matches!(
            chunk_text("a b c", 10, 10),
            Err(Error::InvalidOption(_))
        ));
    }
}

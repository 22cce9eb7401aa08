use sciqa_core::error::AppError;

use super::model::Chunk;

/// Split points tried in order before falling back to a hard cut.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "? ", "! ", " "];

/// Splits text into overlapping windows of at most `chunk_size` characters.
///
/// Every chunk after the first starts exactly `chunk_overlap` characters before
/// the end of its predecessor, so dropping those leading characters and
/// concatenating restores the input. Lengths are counted in chars, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(AppError::new(
                "CHUNK_CONFIG_INVALID",
                "Chunk overlap must be smaller than a non-zero chunk size",
            )
            .with_details(format!("chunk_size={chunk_size}; chunk_overlap={chunk_overlap}")));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        // bounds[i] is the byte offset of char i; the last element is text.len().
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let n = bounds.len() - 1;

        let mut out = Vec::new();
        let mut start = 0usize;
        while start < n {
            let end = if n - start <= self.chunk_size {
                n
            } else {
                self.split_point(text, &bounds, start)
            };
            out.push(Chunk {
                ordinal: out.len() as u32,
                text: text[bounds[start]..bounds[end]].to_string(),
                start,
                end,
                overlap: if start == 0 { 0 } else { self.chunk_overlap },
            });
            if end == n {
                break;
            }
            start = end - self.chunk_overlap;
        }
        out
    }

    /// Char index where the chunk starting at `start` should end.
    ///
    /// Natural split points must leave the chunk at least half full and strictly
    /// longer than the overlap so the next chunk always advances.
    fn split_point(&self, text: &str, bounds: &[usize], start: usize) -> usize {
        let limit = start + self.chunk_size;
        let min_end = start + (self.chunk_overlap + 1).max(self.chunk_size / 2);
        let window = &text[bounds[start]..bounds[limit]];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                let end_byte = bounds[start] + pos + sep.len();
                // Separators are ASCII, so the byte offset is always a char boundary.
                if let Ok(end) = bounds.binary_search(&end_byte) {
                    if end >= min_end {
                        return end;
                    }
                }
            }
        }
        limit
    }
}

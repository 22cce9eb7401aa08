use serde::{Deserialize, Serialize};

/// A window of a document. `start`/`end` are char offsets into the source text;
/// `overlap` is how many leading chars repeat the end of the previous chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub ordinal: u32,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub overlap: usize,
}

impl Chunk {
    /// The part of this chunk not shared with its predecessor.
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((i, _)) => &self.text[i..],
            None => "",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// sha256 of `text`, hex encoded.
    pub id: String,
    pub source: String,
    pub text: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IndexStatus {
    pub model: Option<String>,
    pub dims: Option<u32>,
    pub entry_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub id: String,
    pub source: String,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InsertSummary {
    pub inserted: u32,
    pub duplicates: u32,
}

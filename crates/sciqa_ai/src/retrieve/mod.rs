use sciqa_core::error::AppError;
use sciqa_core::normalize::truncate_chars;
use serde::{Deserialize, Serialize};

use crate::index::{RetrievedChunk, VectorIndex};

pub(crate) mod similarity;

/// Separator placed between retrieved chunks in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub hits: Vec<RetrievedChunk>,
    pub truncated: bool,
}

/// Builds the grounding context for a question from one index query.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    top_k: usize,
    max_chars: usize,
}

impl ContextAssembler {
    pub fn new(top_k: usize, max_chars: usize) -> Self {
        Self { top_k, max_chars }
    }

    /// Query with the raw question text, join hits in retrieval order and cut
    /// the result at `max_chars` characters, even mid-sentence.
    pub fn assemble(&self, index: &VectorIndex<'_>, question: &str) -> Result<AssembledContext, AppError> {
        let hits = index.query(question, self.top_k)?;
        let joined = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let text = truncate_chars(&joined, self.max_chars).to_string();
        let truncated = text.len() < joined.len();
        tracing::debug!(
            hits = hits.len(),
            chars = text.chars().count(),
            truncated,
            "assembled context"
        );
        Ok(AssembledContext {
            text,
            hits,
            truncated,
        })
    }
}

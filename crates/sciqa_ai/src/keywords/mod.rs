use sciqa_core::domain::{KeywordSet, QuestionItem};
use sciqa_core::error::AppError;
use sciqa_core::keywords::parse_keyword_reply;

use crate::llm::Llm;

mod prompts;

pub use prompts::keyword_prompt;

/// Turns a question into search keywords with one generation call.
pub struct KeywordExtractor<'a> {
    llm: &'a dyn Llm,
    model: String,
    include_choices: bool,
}

impl<'a> KeywordExtractor<'a> {
    pub fn new(llm: &'a dyn Llm, model: &str, include_choices: bool) -> Self {
        Self {
            llm,
            model: model.to_string(),
            include_choices,
        }
    }

    /// A reply that parses to nothing falls back to the question text itself.
    pub fn extract(&self, item: &QuestionItem) -> Result<KeywordSet, AppError> {
        let choices = self.include_choices.then(|| item.choices());
        let prompt = keyword_prompt(item.question(), choices);
        let reply = self.llm.generate(&self.model, &prompt)?;

        let keywords = parse_keyword_reply(&reply);
        if keywords.is_empty() {
            tracing::warn!(
                id = item.id(),
                reply = %reply.trim(),
                "keyword reply was empty; searching with the question text"
            );
            return Ok(KeywordSet::new([item.question()]));
        }
        tracing::debug!(id = item.id(), keywords = ?keywords.as_slice(), "extracted keywords");
        Ok(keywords)
    }

    pub fn extract_all(&self, items: &[QuestionItem]) -> Result<Vec<KeywordSet>, AppError> {
        items.iter().map(|q| self.extract(q)).collect()
    }
}

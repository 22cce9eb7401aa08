use sciqa_core::domain::QuestionItem;
use sciqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::llm::Llm;

mod prompts;

pub use prompts::answer_prompt;

/// Prompt and untouched reply for one question, kept for the audit logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub prompt: String,
    pub response: String,
}

pub struct AnswerGenerator<'a> {
    llm: &'a dyn Llm,
    model: String,
}

impl<'a> AnswerGenerator<'a> {
    pub fn new(llm: &'a dyn Llm, model: &str) -> Self {
        Self {
            llm,
            model: model.to_string(),
        }
    }

    /// Exactly one blocking call; a service failure is returned as-is.
    pub fn generate(&self, item: &QuestionItem, context: &str) -> Result<GeneratedAnswer, AppError> {
        let prompt = answer_prompt(item.question(), item.choices(), context);
        tracing::debug!(id = item.id(), prompt_chars = prompt.chars().count(), "generating answer");
        let response = self.llm.generate(&self.model, &prompt)?;
        Ok(GeneratedAnswer { prompt, response })
    }
}

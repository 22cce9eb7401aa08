use sciqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::{map_call_error, OllamaClient};

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    /// Returns the raw reply, possibly empty; interpreting it is the caller's job.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let resp = self
            .client
            .agent()
            .post(&url)
            .send_json(req)
            .map_err(|e| map_call_error("AI_GENERATE_FAILED", "generate", e))?;

        let v: GenerateResponse = resp.into_json().map_err(|e| {
            AppError::new("AI_GENERATE_FAILED", "Failed to decode generate response")
                .with_details(format!("model={model}; err={e}"))
        })?;
        Ok(v.response)
    }
}

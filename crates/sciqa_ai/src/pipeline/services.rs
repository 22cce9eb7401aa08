use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::knowledge::{KnowledgeSource, WikipediaSource};
use crate::llm::{Llm, OllamaLlm};
use crate::ollama::OllamaClient;

/// External service handles, built once at startup and dropped when the run ends.
pub struct Services {
    pub llm: Box<dyn Llm>,
    pub embedder: Box<dyn Embedder>,
    pub knowledge: Box<dyn KnowledgeSource>,
}

impl Services {
    pub fn new(
        llm: Box<dyn Llm>,
        embedder: Box<dyn Embedder>,
        knowledge: Box<dyn KnowledgeSource>,
    ) -> Self {
        Self {
            llm,
            embedder,
            knowledge,
        }
    }

    /// Ollama for generation and embeddings, Wikipedia for articles.
    pub fn ollama_wikipedia(client: OllamaClient, wiki_lang: &str) -> Self {
        Self::new(
            Box::new(OllamaLlm::new(client.clone())),
            Box::new(OllamaEmbedder::new(client)),
            Box::new(WikipediaSource::new(wiki_lang)),
        )
    }
}

pub mod answer;
pub mod embeddings;
pub mod fetch;
pub mod index;
pub mod keywords;
pub mod knowledge;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;

#[cfg(test)]
mod tests {
    use super::ollama::OllamaClient;

    #[test]
    fn validates_ollama_base_url() {
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
        assert!(OllamaClient::new("http://localhost:11434/").is_ok()); // trailing slash is trimmed
        assert!(OllamaClient::new("https://ollama.internal").is_ok());

        assert!(OllamaClient::new("ftp://127.0.0.1:11434").is_err());
        assert!(OllamaClient::new("127.0.0.1:11434").is_err());
        assert!(OllamaClient::new("http://user:pw@127.0.0.1:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:0").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:99999").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434/api").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434?x=1").is_err());
    }

    #[test]
    fn base_url_is_normalized_without_trailing_slash() {
        let c = OllamaClient::new("http://127.0.0.1:11434/").expect("client");
        assert_eq!(c.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn health_check_reports_unreachable_server() {
        // Port 1 is closed on loopback, so the connection is refused at once.
        let c = OllamaClient::new("http://127.0.0.1:1").expect("client");
        let err = c.health_check().unwrap_err();
        assert_eq!(err.code, "AI_OLLAMA_UNREACHABLE");
        assert!(err.retryable);
    }
}

use sciqa_core::error::AppError;
use url::Url;

/// Handle to an Ollama server. Cheap to clone; the underlying agent pools connections.
///
/// No request timeout is configured: generation calls block until the server answers.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    agent: ureq::Agent,
}

impl OllamaClient {
    /// Accepts `http(s)://host[:port]` with an optional trailing slash and nothing else.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let invalid = |why: &str| {
            AppError::new("AI_BASE_URL_INVALID", "Ollama base URL is not usable")
                .with_details(format!("base_url={base_url}; reason={why}"))
        };

        let parsed = Url::parse(&base_url).map_err(|e| invalid(&e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials are not allowed"));
        }
        if parsed.port() == Some(0) {
            return Err(invalid("port must be non-zero"));
        }
        if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("base URL must not carry a path, query or fragment"));
        }

        Ok(Self {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    /// Lists local models. Like every other call it has no timeout.
    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.agent.get(&url).call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(code, _)) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={code}")),
            ),
            Err(e) => Err(AppError::new("AI_OLLAMA_UNREACHABLE", "Failed to reach Ollama")
                .with_details(format!("base_url={}; err={}", self.base_url, e))
                .with_retryable(true)),
        }
    }
}

/// Map a ureq failure from an Ollama endpoint to the pipeline error shape.
pub(crate) fn map_call_error(code: &str, what: &str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let body: String = body.chars().take(300).collect();
            AppError::new(code, format!("{what} request failed"))
                .with_details(format!("status={status}; body={body}"))
        }
        other => AppError::new(code, format!("Failed to call {what} endpoint"))
            .with_details(other.to_string())
            .with_retryable(true),
    }
}

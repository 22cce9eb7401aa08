use std::collections::BTreeMap;

use sciqa_core::error::AppError;
use serde::Deserialize;
use url::Url;

use super::KnowledgeSource;

#[derive(Debug, Clone)]
pub struct WikipediaSource {
    lang: String,
    agent: ureq::Agent,
}

impl WikipediaSource {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("sciqa/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }

    fn summary_url(&self, keyword: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!(
            "https://{}.wikipedia.org/api/rest_v1/page/summary",
            self.lang
        ))
        .map_err(|e| {
            AppError::new("FETCH_URL_INVALID", "Failed to build summary URL")
                .with_details(format!("lang={}; err={}", self.lang, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| AppError::new("FETCH_URL_INVALID", "Summary URL cannot take path segments"))?
            .push(keyword);
        Ok(url)
    }

    fn api_url(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }
}

impl Default for WikipediaSource {
    fn default() -> Self {
        Self::new("en")
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: BTreeMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    extract: Option<String>,
}

/// Treat HTTP status failures as misses; only transport failures escape.
fn call(req: ureq::Request, what: &str, target: &str) -> Result<Option<ureq::Response>, AppError> {
    match req.call() {
        Ok(r) => Ok(Some(r)),
        Err(ureq::Error::Status(code, _)) => {
            tracing::warn!(status = code, lookup = target, "{what} lookup returned non-success status");
            Ok(None)
        }
        Err(e) => Err(
            AppError::new("FETCH_SOURCE_UNREACHABLE", format!("Failed to call {what} endpoint"))
                .with_details(format!("target={target}; err={e}"))
                .with_retryable(true),
        ),
    }
}

impl KnowledgeSource for WikipediaSource {
    fn resolve_title(&self, keyword: &str) -> Result<Option<String>, AppError> {
        let url = self.summary_url(keyword)?;
        let Some(resp) = call(self.agent.request_url("GET", &url), "summary", keyword)? else {
            return Ok(None);
        };
        let v: SummaryResponse = resp.into_json().map_err(|e| {
            AppError::new("FETCH_DECODE_FAILED", "Failed to decode summary response")
                .with_details(format!("keyword={keyword}; err={e}"))
        })?;
        tracing::debug!(keyword, title = ?v.title, "resolved summary");
        Ok(v.title.filter(|t| !t.trim().is_empty()))
    }

    fn fetch_content(&self, title: &str) -> Result<Option<String>, AppError> {
        let req = self
            .agent
            .get(&self.api_url())
            .query("action", "query")
            .query("format", "json")
            .query("prop", "extracts")
            .query("explaintext", "1")
            .query("titles", title);
        let Some(resp) = call(req, "extract", title)? else {
            return Ok(None);
        };
        let v: ExtractResponse = resp.into_json().map_err(|e| {
            AppError::new("FETCH_DECODE_FAILED", "Failed to decode extract response")
                .with_details(format!("title={title}; err={e}"))
        })?;
        let extract = v
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|p| p.extract)
            .filter(|t| !t.trim().is_empty());
        Ok(extract)
    }
}

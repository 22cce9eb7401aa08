use std::collections::BTreeSet;
use std::time::Duration;

use sciqa_core::domain::Document;
use sciqa_core::error::AppError;
use sciqa_core::normalize::{clean_document_text, normalize_cache_key};
use serde::{Deserialize, Serialize};

use super::store::DocumentCache;
use crate::knowledge::KnowledgeSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: Vec<String>,
    pub cached: Vec<String>,
    pub missing: Vec<String>,
}

/// Pulls articles for keywords into a `DocumentCache`, at most once per key.
pub struct DocumentFetcher<'a> {
    source: &'a dyn KnowledgeSource,
    cache: &'a DocumentCache,
    delay: Duration,
}

impl<'a> DocumentFetcher<'a> {
    pub fn new(source: &'a dyn KnowledgeSource, cache: &'a DocumentCache, delay: Duration) -> Self {
        Self {
            source,
            cache,
            delay,
        }
    }

    /// Fetch every keyword not already cached.
    ///
    /// Misses (no title, no content, unusable key) are logged and skipped; only
    /// source or disk failures abort.
    pub fn fetch_all<S: AsRef<str>>(&self, keywords: &[S]) -> Result<FetchSummary, AppError> {
        let mut summary = FetchSummary::default();
        let mut seen = BTreeSet::new();

        for keyword in keywords.iter().map(|k| k.as_ref()) {
            let key = normalize_cache_key(keyword);
            if key.is_empty() {
                tracing::warn!(keyword, "keyword has no usable cache key; skipping");
                summary.missing.push(keyword.to_string());
                continue;
            }
            if !seen.insert(key.clone()) {
                continue;
            }
            if self.cache.contains(&key) {
                tracing::debug!(keyword, key = %key, "document already cached");
                summary.cached.push(key);
                continue;
            }

            match self.fetch_one(keyword, &key)? {
                Some(doc) => {
                    let path = self.cache.put(&doc)?;
                    tracing::info!(keyword, title = %doc.title, path = %path.display(), "saved document");
                    summary.fetched.push(key);
                }
                None => {
                    tracing::warn!(keyword, "no article found; skipping");
                    summary.missing.push(keyword.to_string());
                }
            }
        }

        tracing::info!(
            fetched = summary.fetched.len(),
            cached = summary.cached.len(),
            missing = summary.missing.len(),
            "document fetch finished"
        );
        Ok(summary)
    }

    fn fetch_one(&self, keyword: &str, key: &str) -> Result<Option<Document>, AppError> {
        let title = self.source.resolve_title(keyword)?;
        self.pause();
        let Some(title) = title else {
            return Ok(None);
        };

        let content = self.source.fetch_content(&title)?;
        self.pause();
        let Some(content) = content else {
            return Ok(None);
        };

        let body = clean_document_text(&content);
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(Document {
            key: key.to_string(),
            title,
            body,
        }))
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

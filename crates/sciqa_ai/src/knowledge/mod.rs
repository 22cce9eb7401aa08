use sciqa_core::error::AppError;

/// External article source used to ground answers.
///
/// Both lookups return `Ok(None)` for a miss (no such page, non-success status);
/// `Err` is reserved for the service being unreachable or returning garbage.
pub trait KnowledgeSource {
    /// Resolve a free-form keyword to the canonical article title.
    fn resolve_title(&self, keyword: &str) -> Result<Option<String>, AppError>;

    /// Fetch the full plain-text body for a canonical title.
    fn fetch_content(&self, title: &str) -> Result<Option<String>, AppError>;
}

pub mod wikipedia;

pub use wikipedia::WikipediaSource;

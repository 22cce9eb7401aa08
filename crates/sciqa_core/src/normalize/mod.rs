pub mod cache_key;
pub mod text;

pub use cache_key::normalize_cache_key;
pub use text::{clean_document_text, truncate_chars};

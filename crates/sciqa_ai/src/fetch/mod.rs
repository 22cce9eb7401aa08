pub mod fetcher;
pub mod store;

pub use fetcher::{DocumentFetcher, FetchSummary};
pub use store::DocumentCache;

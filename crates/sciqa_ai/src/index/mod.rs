pub mod chunking;
pub mod model;
pub mod store;

pub use chunking::Chunker;
pub use model::{Chunk, IndexEntry, IndexStatus, InsertSummary, RetrievedChunk};
pub use store::VectorIndex;

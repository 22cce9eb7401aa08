pub mod audit;
pub mod choice;
pub mod domain;
pub mod error;
pub mod eval;
pub mod ingest;
pub mod keywords;
pub mod normalize;

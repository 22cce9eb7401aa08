use std::path::PathBuf;

use clap::Parser;
use sciqa_ai::pipeline::{PipelineConfig, PipelinePaths};

/// Answer multiple-choice science questions using retrieval-augmented generation.
#[derive(Debug, Parser)]
#[command(name = "sciqa", version)]
pub struct Cli {
    /// CSV dataset with columns prompt,A,B,C,D,E and optional answer
    #[arg(long, env = "SCIQA_DATASET")]
    pub dataset: PathBuf,

    /// Number of questions to use (-1 = all)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub num_questions: i64,

    /// Model used for keyword extraction
    #[arg(long, env = "SCIQA_KW_MODEL", default_value = "gemma3:1b")]
    pub kw_model: String,

    /// Model used to generate answers
    #[arg(long, env = "SCIQA_ANSWER_MODEL", default_value = "gemma3:1b")]
    pub answer_model: String,

    /// Model used for embeddings
    #[arg(long, env = "SCIQA_EMBED_MODEL", default_value = "nomic-embed-text")]
    pub embed_model: String,

    /// Show the answer choices to the keyword model too
    #[arg(long)]
    pub kw_from_choices: bool,

    /// Chunk size in characters
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,

    /// Maximum characters of retrieved context given to the answer model
    #[arg(long, default_value_t = 2000)]
    pub max_context: usize,

    /// Reuse keywords from the keyword cache instead of generating them
    #[arg(long)]
    pub kw_from_cache: bool,

    /// Do not contact the knowledge source; index only what is already cached
    #[arg(long)]
    pub skip_fetch: bool,

    /// Answer without retrieved context
    #[arg(long)]
    pub skip_retrieval: bool,

    /// Only write answer prompts (without context) and ground truth; call no model
    #[arg(long)]
    pub export_prompts_only: bool,

    /// Pause after every knowledge-source request, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub fetch_delay_ms: u64,

    /// Ollama server
    #[arg(long, env = "SCIQA_OLLAMA_URL", default_value = "http://127.0.0.1:11434")]
    pub ollama_url: String,

    /// Wikipedia language edition
    #[arg(long, default_value = "en")]
    pub wiki_lang: String,

    /// Directory holding keyword cache, documents, index and run output
    #[arg(long, env = "SCIQA_WORK_DIR", default_value = ".sciqa")]
    pub work_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            kw_model: self.kw_model.clone(),
            answer_model: self.answer_model.clone(),
            embed_model: self.embed_model.clone(),
            kw_from_choices: self.kw_from_choices,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            max_context_chars: self.max_context,
            fetch_delay_ms: self.fetch_delay_ms,
            keywords_from_cache: self.kw_from_cache,
            skip_fetch: self.skip_fetch,
            skip_retrieval: self.skip_retrieval,
            export_prompts_only: self.export_prompts_only,
        }
    }

    pub fn paths(&self) -> PipelinePaths {
        PipelinePaths::from_work_dir(&self.work_dir)
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables for one batch run. Defaults match the CLI defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub kw_model: String,
    pub answer_model: String,
    pub embed_model: String,
    /// Show the five choices to the keyword model as well as the question.
    pub kw_from_choices: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_context_chars: usize,
    /// Pause after every knowledge-source request.
    pub fetch_delay_ms: u64,

    // Stage switches.
    pub keywords_from_cache: bool,
    pub skip_fetch: bool,
    pub skip_retrieval: bool,
    /// Write context-free answer prompts and ground truth, then stop without
    /// calling any service.
    pub export_prompts_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kw_model: "gemma3:1b".to_string(),
            answer_model: "gemma3:1b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            kw_from_choices: false,
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            max_context_chars: 2000,
            fetch_delay_ms: 2000,
            keywords_from_cache: false,
            skip_fetch: false,
            skip_retrieval: false,
            export_prompts_only: false,
        }
    }
}

/// On-disk locations shared across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelinePaths {
    pub keywords_file: PathBuf,
    pub docs_dir: PathBuf,
    pub index_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelinePaths {
    pub fn from_work_dir(work_dir: &Path) -> Self {
        Self {
            keywords_file: work_dir.join("keywords.txt"),
            docs_dir: work_dir.join("docs"),
            index_dir: work_dir.join("index"),
            output_dir: work_dir.join("output"),
        }
    }
}

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::Letter;
use crate::error::AppError;

/// Line placed between entries of the prompt and response logs.
pub const ENTRY_SEPARATOR: &str = "- - - - - - - - - - - - - - - - - - - -";

pub const PROMPTS_FILE: &str = "prompts.txt";
pub const RESPONSES_FILE: &str = "responses.txt";
pub const PREDICTIONS_FILE: &str = "predictions.txt";
pub const SUMMARY_FILE: &str = "run_summary.json";
pub const GROUND_TRUTH_FILE: &str = "correct_answers.txt";

/// Writes the per-run audit artifacts. Each write replaces the whole file.
#[derive(Debug, Clone)]
pub struct AuditWriter {
    dir: PathBuf,
}

impl AuditWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::new("AUDIT_WRITE_FAILED", "Failed to create audit output directory")
                .with_details(format!("path={}; err={}", self.dir.display(), e))
        })?;
        let path = self.dir.join(name);
        fs::write(&path, contents).map_err(|e| {
            AppError::new("AUDIT_WRITE_FAILED", "Failed to write audit artifact")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        Ok(path)
    }

    pub fn write_prompts(&self, prompts: &[String]) -> Result<PathBuf, AppError> {
        self.write(PROMPTS_FILE, &join_entries(prompts))
    }

    pub fn write_responses(&self, responses: &[String]) -> Result<PathBuf, AppError> {
        self.write(RESPONSES_FILE, &join_entries(responses))
    }

    pub fn write_predictions(&self, predictions: &[Letter]) -> Result<PathBuf, AppError> {
        self.write(PREDICTIONS_FILE, &format_predictions(predictions))
    }

    /// One slot per question; questions without an answer leave their slot empty.
    pub fn write_ground_truth(&self, truth: &[Option<Letter>]) -> Result<PathBuf, AppError> {
        let line = truth
            .iter()
            .map(|t| t.map(|l| l.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        self.write(GROUND_TRUTH_FILE, &line)
    }

    pub fn write_summary<T: Serialize>(&self, summary: &T) -> Result<PathBuf, AppError> {
        let json = serde_json::to_string_pretty(summary).map_err(|e| {
            AppError::new("AUDIT_WRITE_FAILED", "Failed to encode run summary")
                .with_details(e.to_string())
        })?;
        self.write(SUMMARY_FILE, &json)
    }
}

pub fn join_entries(entries: &[String]) -> String {
    let sep = format!("\n{ENTRY_SEPARATOR}\n");
    let mut out = entries.join(&sep);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

pub fn format_predictions(predictions: &[Letter]) -> String {
    predictions
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of `join_entries`, used to read logs back for inspection.
pub fn split_entries(text: &str) -> Vec<String> {
    let sep = format!("\n{ENTRY_SEPARATOR}\n");
    let body = text.strip_suffix('\n').unwrap_or(text);
    if body.is_empty() {
        return Vec::new();
    }
    body.split(sep.as_str()).map(|s| s.to_string()).collect()
}

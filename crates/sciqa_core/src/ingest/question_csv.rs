use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Letter, QuestionItem};
use crate::error::AppError;

const CHOICE_COLUMNS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Validated questions in dataset order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QuestionBank {
    items: Vec<QuestionItem>,
}

impl QuestionBank {
    pub fn new(items: Vec<QuestionItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[QuestionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep the first `n` questions; a negative limit keeps everything.
    pub fn limit(mut self, n: i64) -> Self {
        if n >= 0 {
            self.items.truncate(n as usize);
        }
        self
    }

    /// A run needs at least one question; header-only files and a zero limit end here.
    pub fn require_questions(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::new(
                "DATASET_EMPTY",
                "Dataset has no questions to answer",
            ));
        }
        Ok(())
    }

    /// Ground truth for every question, or `None` if any question lacks one.
    pub fn ground_truth(&self) -> Option<Vec<Letter>> {
        self.items.iter().map(|q| q.answer()).collect()
    }

    /// Stable sha256 over ids, questions and choices, recorded in run summaries.
    /// It identifies the dataset a run used; keyword caches are not checked against it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for q in self.items.iter() {
            hasher.update(q.id().as_bytes());
            hasher.update([0u8]);
            hasher.update(q.question().as_bytes());
            for c in q.choices() {
                hasher.update([0u8]);
                hasher.update(c.as_bytes());
            }
            hasher.update([b'\n']);
        }
        hex::encode(hasher.finalize())
    }
}

fn get<'a>(
    row: &'a csv::StringRecord,
    headers: &'a csv::StringRecord,
    header_name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .position(|h| h.trim() == header_name)
        .and_then(|idx| row.get(idx))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Parse a dataset with columns `prompt,A,B,C,D,E` and optional `answer` / `id`.
///
/// Any ground-truth value outside `A..E` aborts the load.
pub fn load_question_bank_csv(csv_text: &str) -> Result<QuestionBank, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| {
            AppError::new("DATASET_HEADERS_FAILED", "Failed to read dataset CSV headers")
                .with_details(e.to_string())
        })?
        .clone();

    for required in std::iter::once("prompt").chain(CHOICE_COLUMNS) {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(AppError::new(
                "DATASET_COLUMN_MISSING",
                "Dataset CSV is missing a required column",
            )
            .with_details(format!("column={required}")));
        }
    }

    let mut items = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row = result.map_err(|e| {
            AppError::new("DATASET_PARSE_FAILED", "Failed to parse dataset CSV row")
                .with_details(format!("row={row_idx}; err={e}"))
        })?;

        let question = get(&row, &headers, "prompt").ok_or_else(|| {
            AppError::new("DATASET_FIELD_MISSING", "Question text is empty")
                .with_details(format!("row={row_idx}"))
        })?;
        let choices = CHOICE_COLUMNS
            .iter()
            .map(|col| get(&row, &headers, col).unwrap_or("").to_string())
            .collect::<Vec<_>>();
        let answer = match get(&row, &headers, "answer") {
            Some(raw) => Some(raw.parse::<Letter>().map_err(|e| {
                AppError::new(
                    "DATASET_ANSWER_INVALID",
                    "Ground-truth answer must be one of A, B, C, D, E",
                )
                .with_details(format!("row={row_idx}; {}", e.details.unwrap_or_default()))
            })?),
            None => None,
        };
        let id = get(&row, &headers, "id")
            .map(|s| s.to_string())
            .unwrap_or_else(|| row_idx.to_string());

        items.push(QuestionItem::new(id, question, choices, answer)?);
    }

    tracing::debug!(count = items.len(), "loaded question bank");
    Ok(QuestionBank::new(items))
}

pub fn load_question_bank(path: &Path) -> Result<QuestionBank, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::new("DATASET_READ_FAILED", "Failed to read dataset file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    load_question_bank_csv(&text)
}

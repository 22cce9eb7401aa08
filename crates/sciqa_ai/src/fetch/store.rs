use std::fs;
use std::path::PathBuf;

use sciqa_core::domain::Document;
use sciqa_core::error::AppError;

/// Directory of fetched articles, one `<key>.txt` per normalized keyword.
///
/// File layout: title on the first line, a blank line, then the processed body.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    root: PathBuf,
}

impl DocumentCache {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    fn doc_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.txt"))
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::new("DOCS_STORE_FAILED", "Failed to create document cache directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.doc_path(key).is_file()
    }

    pub fn put(&self, doc: &Document) -> Result<PathBuf, AppError> {
        if doc.key.is_empty() {
            return Err(AppError::new("DOCS_KEY_INVALID", "Document cache key is empty")
                .with_details(format!("title={}", doc.title)));
        }
        self.ensure_dirs()?;
        let path = self.doc_path(&doc.key);
        fs::write(&path, format!("{}\n\n{}", doc.title, doc.body)).map_err(|e| {
            AppError::new("DOCS_STORE_FAILED", "Failed to write cached document")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        Ok(path)
    }

    /// `Ok(None)` when the key has never been fetched.
    pub fn get(&self, key: &str) -> Result<Option<Document>, AppError> {
        if !self.contains(key) {
            return Ok(None);
        }
        let path = self.doc_path(key);
        let raw = fs::read_to_string(&path).map_err(|e| {
            AppError::new("DOCS_STORE_FAILED", "Failed to read cached document")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let (title, body) = match raw.split_once("\n\n") {
            Some((t, b)) => (t, b),
            None => (raw.trim_end_matches('\n'), ""),
        };
        Ok(Some(Document {
            key: key.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }))
    }

    /// All cached keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, AppError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root).map_err(|e| {
            AppError::new("DOCS_STORE_FAILED", "Failed to list document cache")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })?;
        let mut keys = Vec::new();
        for ent in entries.flatten() {
            let path = ent.path();
            if path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

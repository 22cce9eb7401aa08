use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use sciqa_core::error::AppError;
use sha2::{Digest, Sha256};

use super::model::{Chunk, IndexEntry, IndexStatus, InsertSummary, RetrievedChunk};
use crate::embeddings::Embedder;
use crate::retrieve::similarity;

/// Directory-backed embedding index keyed by the sha256 of each chunk's text.
///
/// Identical chunk text is embedded and stored once no matter how often it is
/// inserted. The whole collection lives in memory and is rewritten on each insert.
pub struct VectorIndex<'a> {
    root: PathBuf,
    model: String,
    embedder: &'a dyn Embedder,
    entries: BTreeMap<String, IndexEntry>,
    dims: Option<u32>,
}

pub fn chunk_id(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

impl<'a> VectorIndex<'a> {
    /// Load the collection under `root`, discarding it if it was built with another model.
    pub fn open(root: PathBuf, embedder: &'a dyn Embedder, model: &str) -> Result<Self, AppError> {
        let mut index = Self {
            root,
            model: model.to_string(),
            embedder,
            entries: BTreeMap::new(),
            dims: None,
        };
        index.ensure_dirs()?;

        let status = index.read_status()?;
        match status.model.as_deref() {
            Some(m) if m != model => {
                tracing::warn!(
                    stored_model = m,
                    model,
                    "index was built with a different embedding model; starting empty"
                );
            }
            _ => {
                index.entries = index
                    .read_entries()?
                    .into_iter()
                    .map(|e| (e.id.clone(), e))
                    .collect();
                index.dims = status.dims;
            }
        }
        tracing::debug!(entries = index.entries.len(), path = %index.root.display(), "opened vector index");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            model: Some(self.model.clone()),
            dims: self.dims,
            entry_count: self.entries.len() as u32,
        }
    }

    fn status_path(&self) -> PathBuf {
        self.root.join("index_status.json")
    }

    fn entries_path(&self) -> PathBuf {
        self.root.join("index_entries.json")
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to create index directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })
    }

    fn read_status(&self) -> Result<IndexStatus, AppError> {
        let path = self.status_path();
        if !path.exists() {
            return Ok(IndexStatus::default());
        }
        let bytes = fs::read(&path).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to read index status")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to decode index status")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    fn read_entries(&self) -> Result<Vec<IndexEntry>, AppError> {
        let path = self.entries_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to read index entries")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to decode index entries")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        self.ensure_dirs()?;
        let entries = self.entries.values().collect::<Vec<_>>();
        let json = serde_json::to_vec(&entries).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to encode index entries")
                .with_details(e.to_string())
        })?;
        let path = self.entries_path();
        fs::write(&path, json).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to write index entries")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;

        let status = serde_json::to_string_pretty(&self.status()).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to encode index status")
                .with_details(e.to_string())
        })?;
        let path = self.status_path();
        fs::write(&path, status).map_err(|e| {
            AppError::new("INDEX_STORE_FAILED", "Failed to write index status")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    fn embed_checked(&mut self, text: &str) -> Result<Vec<f32>, AppError> {
        let v = self.embedder.embed(&self.model, text)?;
        let this_dims = v.len() as u32;
        match self.dims {
            Some(d) if d != this_dims => Err(AppError::new(
                "INDEX_DIMS_MISMATCH",
                "Embedding dimension does not match the index",
            )
            .with_details(format!("expected={d}; got={this_dims}"))),
            Some(_) => Ok(v),
            None => {
                self.dims = Some(this_dims);
                Ok(v)
            }
        }
    }

    /// Embed and store chunks from `source`. Chunks whose text is already present
    /// are counted as duplicates and not re-embedded.
    pub fn insert(&mut self, source: &str, chunks: &[Chunk]) -> Result<InsertSummary, AppError> {
        let mut summary = InsertSummary::default();
        for chunk in chunks {
            let id = chunk_id(&chunk.text);
            if self.entries.contains_key(&id) {
                summary.duplicates += 1;
                continue;
            }
            let vector = self.embed_checked(&chunk.text).map_err(|e| {
                let retryable = e.retryable;
                AppError::new(e.code, e.message)
                    .with_details(format!(
                        "source={source}; ordinal={}; {}",
                        chunk.ordinal,
                        e.details.unwrap_or_default()
                    ))
                    .with_retryable(retryable)
            })?;
            self.entries.insert(
                id.clone(),
                IndexEntry {
                    id,
                    source: source.to_string(),
                    text: chunk.text.clone(),
                    vector,
                },
            );
            summary.inserted += 1;
        }

        if summary.inserted > 0 {
            self.persist()?;
        }
        tracing::debug!(
            source,
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            "indexed chunks"
        );
        Ok(summary)
    }

    /// The `k` stored chunks most similar to `text`, best first; ties by id.
    ///
    /// An empty index or `k == 0` yields an empty result without calling the
    /// embedder. Asking for more than is stored returns everything.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedChunk>, AppError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let qv = self.embedder.embed(&self.model, text)?;
        if let Some(d) = self.dims {
            if qv.len() as u32 != d {
                return Err(AppError::new(
                    "INDEX_DIMS_MISMATCH",
                    "Query embedding dims do not match index dims",
                )
                .with_details(format!("index_dims={d}; query_dims={}", qv.len())));
            }
        }
        let qnorm = similarity::l2_norm(&qv);
        if qnorm == 0.0 {
            tracing::warn!("query embedding has zero norm; nothing can match");
            return Ok(Vec::new());
        }

        let mut hits: Vec<(&IndexEntry, f32)> = Vec::new();
        for entry in self.entries.values() {
            let vnorm = similarity::l2_norm(&entry.vector);
            if vnorm == 0.0 {
                continue;
            }
            let score = similarity::cosine_similarity(&qv, &entry.vector, qnorm, vnorm);
            hits.push((entry, score));
        }

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.id.cmp(&b.0.id))
        });
        hits.truncate(k);

        Ok(hits
            .into_iter()
            .map(|(e, score)| RetrievedChunk {
                id: e.id.clone(),
                source: e.source.clone(),
                text: e.text.clone(),
                score,
            })
            .collect())
    }
}

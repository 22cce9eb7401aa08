use std::collections::BTreeSet;
use std::time::Duration;

use sciqa_core::audit::AuditWriter;
use sciqa_core::choice::{parse_choice, resolve_choice};
use sciqa_core::domain::{KeywordSet, Letter};
use sciqa_core::error::AppError;
use sciqa_core::eval;
use sciqa_core::ingest::QuestionBank;
use sciqa_core::keywords::KeywordCacheFile;
use sciqa_core::normalize::normalize_cache_key;
use serde::{Deserialize, Serialize};

use crate::answer::{answer_prompt, AnswerGenerator};
use crate::fetch::{DocumentCache, DocumentFetcher, FetchSummary};
use crate::index::{Chunker, InsertSummary, VectorIndex};
use crate::keywords::KeywordExtractor;
use crate::retrieve::ContextAssembler;

mod config;
mod services;

pub use config::{PipelineConfig, PipelinePaths};
pub use services::Services;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOutcome {
    pub id: String,
    pub keywords: Vec<String>,
    pub context_chars: usize,
    pub prediction: Letter,
    pub defaulted: bool,
    pub truth: Option<Letter>,
}

/// Everything a run produced, written to `run_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub dataset_fingerprint: String,
    pub config: PipelineConfig,
    pub question_count: usize,
    pub fetch: Option<FetchSummary>,
    pub indexed: InsertSummary,
    pub index_entries: usize,
    pub outcomes: Vec<QuestionOutcome>,
    pub predictions: Vec<Letter>,
    pub defaulted_count: usize,
    pub accuracy: Option<f64>,
}

/// Single sequential orchestrator for keywords, fetch, indexing, answering and scoring.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    paths: &'a PipelinePaths,
    services: &'a Services,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, paths: &'a PipelinePaths, services: &'a Services) -> Self {
        Self {
            config,
            paths,
            services,
        }
    }

    pub fn run(&self, bank: &QuestionBank) -> Result<RunReport, AppError> {
        bank.require_questions()?;
        if self.config.export_prompts_only {
            return self.export_prompts(bank);
        }

        // Fail on bad chunk settings before any service is called.
        let chunker = Chunker::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let docs = DocumentCache::open(self.paths.docs_dir.clone());

        tracing::info!(questions = bank.len(), "generating keywords");
        let keyword_sets = self.keywords_stage(bank)?;

        let fetch = if self.config.skip_fetch {
            tracing::info!("skipping document fetch");
            None
        } else {
            tracing::info!("downloading documents");
            Some(self.fetch_stage(&docs, &keyword_sets)?)
        };

        let mut index = if self.config.skip_retrieval {
            tracing::info!("skipping retrieval; answering without context");
            None
        } else {
            Some(VectorIndex::open(
                self.paths.index_dir.clone(),
                self.services.embedder.as_ref(),
                &self.config.embed_model,
            )?)
        };

        let indexed = match index.as_mut() {
            Some(i) => {
                tracing::info!("chunking and embedding documents");
                self.index_stage(i, &docs, &chunker, &keyword_sets)?
            }
            None => InsertSummary::default(),
        };

        tracing::info!("answering questions");
        let outcomes = self.answer_stage(bank, index.as_ref(), &keyword_sets)?;

        let predictions = outcomes.iter().map(|o| o.prediction).collect::<Vec<_>>();
        let defaulted_count = outcomes.iter().filter(|o| o.defaulted).count();
        if defaulted_count > 0 {
            tracing::warn!(defaulted = defaulted_count, "some predictions used the default letter");
        }

        let accuracy = match bank.ground_truth() {
            Some(truth) => {
                tracing::info!("evaluating predictions");
                Some(eval::accuracy(&predictions, &truth)?)
            }
            None => {
                tracing::warn!("dataset has questions without ground truth; skipping evaluation");
                None
            }
        };
        if let Some(acc) = accuracy {
            tracing::info!(accuracy = acc, "accuracy");
        }

        let report = RunReport {
            dataset_fingerprint: bank.fingerprint(),
            config: self.config.clone(),
            question_count: bank.len(),
            fetch,
            indexed,
            index_entries: index.as_ref().map_or(0, |i| i.len()),
            outcomes,
            predictions,
            defaulted_count,
            accuracy,
        };
        let audit = AuditWriter::new(self.paths.output_dir.clone());
        audit.write_predictions(&report.predictions)?;
        audit.write_summary(&report)?;
        Ok(report)
    }

    /// Prompts with empty context for scoring with external tools.
    fn export_prompts(&self, bank: &QuestionBank) -> Result<RunReport, AppError> {
        let prompts = bank
            .items()
            .iter()
            .map(|q| answer_prompt(q.question(), q.choices(), ""))
            .collect::<Vec<_>>();
        let truth = bank.items().iter().map(|q| q.answer()).collect::<Vec<_>>();

        let audit = AuditWriter::new(self.paths.output_dir.clone());
        let path = audit.write_prompts(&prompts)?;
        audit.write_ground_truth(&truth)?;
        tracing::info!(prompts = prompts.len(), path = %path.display(), "exported prompts; no model was called");

        let report = RunReport {
            dataset_fingerprint: bank.fingerprint(),
            config: self.config.clone(),
            question_count: bank.len(),
            fetch: None,
            indexed: InsertSummary::default(),
            index_entries: 0,
            outcomes: Vec::new(),
            predictions: Vec::new(),
            defaulted_count: 0,
            accuracy: None,
        };
        audit.write_summary(&report)?;
        Ok(report)
    }

    fn keywords_stage(&self, bank: &QuestionBank) -> Result<Vec<KeywordSet>, AppError> {
        let cache = KeywordCacheFile::new(self.paths.keywords_file.clone());
        let sets = if self.config.keywords_from_cache {
            tracing::info!(path = %cache.path().display(), "loading keywords from cache");
            cache.load(bank.len())?
        } else {
            let extractor = KeywordExtractor::new(
                self.services.llm.as_ref(),
                &self.config.kw_model,
                self.config.kw_from_choices,
            );
            let sets = extractor.extract_all(bank.items())?;
            cache.save(&sets)?;
            sets
        };

        // A blank cache line gets the same fallback as an empty model reply.
        Ok(sets
            .into_iter()
            .zip(bank.items())
            .map(|(set, q)| {
                if set.is_empty() {
                    tracing::warn!(id = q.id(), "no keywords for question; searching with the question text");
                    KeywordSet::new([q.question()])
                } else {
                    set
                }
            })
            .collect())
    }

    fn fetch_stage(&self, docs: &DocumentCache, sets: &[KeywordSet]) -> Result<FetchSummary, AppError> {
        let keywords = sets.iter().flat_map(|s| s.iter().cloned()).collect::<Vec<_>>();
        let fetcher = DocumentFetcher::new(
            self.services.knowledge.as_ref(),
            docs,
            Duration::from_millis(self.config.fetch_delay_ms),
        );
        fetcher.fetch_all(keywords.as_slice())
    }

    fn index_stage(
        &self,
        index: &mut VectorIndex<'_>,
        docs: &DocumentCache,
        chunker: &Chunker,
        sets: &[KeywordSet],
    ) -> Result<InsertSummary, AppError> {
        let mut total = InsertSummary::default();
        let mut seen = BTreeSet::new();
        for keyword in sets.iter().flat_map(|s| s.iter()) {
            let key = normalize_cache_key(keyword);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let Some(doc) = docs.get(&key)? else {
                tracing::debug!(keyword = %keyword, "no cached document to index");
                continue;
            };
            let chunks = chunker.split(&doc.body);
            let s = index.insert(&doc.key, &chunks)?;
            total.inserted += s.inserted;
            total.duplicates += s.duplicates;
        }
        tracing::info!(
            inserted = total.inserted,
            duplicates = total.duplicates,
            entries = index.len(),
            "index updated"
        );
        Ok(total)
    }

    fn answer_stage(
        &self,
        bank: &QuestionBank,
        index: Option<&VectorIndex<'_>>,
        sets: &[KeywordSet],
    ) -> Result<Vec<QuestionOutcome>, AppError> {
        let assembler = ContextAssembler::new(self.config.top_k, self.config.max_context_chars);
        let generator = AnswerGenerator::new(self.services.llm.as_ref(), &self.config.answer_model);

        let mut prompts = Vec::with_capacity(bank.len());
        let mut responses = Vec::with_capacity(bank.len());
        let mut outcomes = Vec::with_capacity(bank.len());

        for (q, keywords) in bank.items().iter().zip(sets) {
            let context = match index {
                Some(i) => assembler.assemble(i, q.question())?.text,
                None => String::new(),
            };
            let generated = generator.generate(q, &context)?;
            let resolved = resolve_choice(&parse_choice(&generated.response));
            tracing::debug!(id = q.id(), prediction = %resolved.letter, defaulted = resolved.defaulted, "answered");

            outcomes.push(QuestionOutcome {
                id: q.id().to_string(),
                keywords: keywords.as_slice().to_vec(),
                context_chars: context.chars().count(),
                prediction: resolved.letter,
                defaulted: resolved.defaulted,
                truth: q.answer(),
            });
            prompts.push(generated.prompt);
            responses.push(generated.response);
        }

        let audit = AuditWriter::new(self.paths.output_dir.clone());
        audit.write_prompts(&prompts)?;
        audit.write_responses(&responses)?;
        Ok(outcomes)
    }
}

use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use sciqa_ai::embeddings::Embedder;
use sciqa_ai::fetch::DocumentCache;
use sciqa_ai::knowledge::KnowledgeSource;
use sciqa_ai::llm::Llm;
use sciqa_ai::pipeline::{Pipeline, PipelineConfig, PipelinePaths, Services};
use sciqa_core::audit::{
    split_entries, GROUND_TRUTH_FILE, PREDICTIONS_FILE, PROMPTS_FILE, RESPONSES_FILE, SUMMARY_FILE,
};
use sciqa_core::domain::{Document, KeywordSet, Letter};
use sciqa_core::error::AppError;
use sciqa_core::ingest::{load_question_bank_csv, QuestionBank};
use sciqa_core::keywords::KeywordCacheFile;

const CSV: &str = "prompt,A,B,C,D,E,answer
Which organelle produces most of the ATP in a cell?,Nucleus,Ribosome,Mitochondrion,Golgi apparatus,Lysosome,C
What force keeps planets in orbit around the Sun?,Gravity,Friction,Magnetism,Tension,Buoyancy,A
Which particle carries a negative electric charge?,Electron,Proton,Neutron,Photon,Gluon,A
";

// Matched against the question line so retrieved context cannot trigger them.
const ORGANELLE_Q: &str = "Question: Which organelle";
const PLANETS_Q: &str = "Question: What force";

/// Replies by question: a correct answer, a wrong one and an unparseable one.
struct ScriptedLlm {
    calls: Rc<Cell<usize>>,
}

impl Llm for ScriptedLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.calls.set(self.calls.get() + 1);
        if prompt.contains("Output only the keyword(s)") {
            return Ok(if prompt.contains(ORGANELLE_Q) {
                "Mitochondrion".to_string()
            } else if prompt.contains(PLANETS_Q) {
                "Gravity, Orbit".to_string()
            } else {
                "Electron".to_string()
            });
        }
        let reply = if prompt.contains(ORGANELLE_Q) {
            "The context says mitochondria make ATP.\nAnswer: C"
        } else if prompt.contains(PLANETS_Q) {
            "Friction seems plausible.\nAnswer: B"
        } else {
            "I cannot decide."
        };
        Ok(reply.to_string())
    }
}

/// Letter-frequency vectors: deterministic and good enough to rank.
struct LetterBagEmbedder {
    calls: Rc<Cell<usize>>,
}

impl Embedder for LetterBagEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        self.calls.set(self.calls.get() + 1);
        let mut v = vec![0.0f32; 26];
        for c in input.chars().filter(|c| c.is_ascii_alphabetic()) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(v)
    }
}

/// Every document is pre-cached, so any lookup is a bug.
struct OfflineSource;

impl KnowledgeSource for OfflineSource {
    fn resolve_title(&self, keyword: &str) -> Result<Option<String>, AppError> {
        Err(AppError::new("FETCH_SOURCE_UNREACHABLE", "offline").with_details(keyword.to_string()))
    }

    fn fetch_content(&self, title: &str) -> Result<Option<String>, AppError> {
        Err(AppError::new("FETCH_SOURCE_UNREACHABLE", "offline").with_details(title.to_string()))
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    paths: PipelinePaths,
    bank: QuestionBank,
    llm_calls: Rc<Cell<usize>>,
    embed_calls: Rc<Cell<usize>>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = PipelinePaths::from_work_dir(dir.path());
        Self {
            _dir: dir,
            paths,
            bank: load_question_bank_csv(CSV).expect("bank"),
            llm_calls: Rc::new(Cell::new(0)),
            embed_calls: Rc::new(Cell::new(0)),
        }
    }

    fn seed_caches(&self) {
        KeywordCacheFile::new(self.paths.keywords_file.clone())
            .save(&[
                KeywordSet::new(["Mitochondrion"]),
                KeywordSet::new(["Gravity", "Orbit"]),
                KeywordSet::new(["Electron"]),
            ])
            .expect("seed keywords");

        let docs = DocumentCache::open(self.paths.docs_dir.clone());
        let articles = [
            ("mitochondrion", "Mitochondrion", "A mitochondrion is an organelle found in most cells.\nIt generates most of the cell's supply of adenosine triphosphate (ATP)."),
            ("gravity", "Gravity", "Gravity is a fundamental interaction which causes mutual attraction between all things with mass.\nIt keeps the planets in orbit around the Sun."),
            ("orbit", "Orbit", "An orbit is the curved trajectory of an object such as a planet around a star."),
            ("electron", "Electron", "The electron is a subatomic particle whose electric charge is negative one elementary charge."),
        ];
        for (key, title, body) in articles {
            docs.put(&Document {
                key: key.to_string(),
                title: title.to_string(),
                body: body.to_string(),
            })
            .expect("seed doc");
        }
    }

    fn services(&self) -> Services {
        Services::new(
            Box::new(ScriptedLlm {
                calls: self.llm_calls.clone(),
            }),
            Box::new(LetterBagEmbedder {
                calls: self.embed_calls.clone(),
            }),
            Box::new(OfflineSource),
        )
    }
}

fn cached_config() -> PipelineConfig {
    PipelineConfig {
        keywords_from_cache: true,
        chunk_size: 1000,
        chunk_overlap: 200,
        top_k: 2,
        max_context_chars: 1000,
        fetch_delay_ms: 0,
        ..PipelineConfig::default()
    }
}

#[test]
fn cached_run_predicts_scores_and_is_repeatable() {
    let h = Harness::new();
    h.seed_caches();
    let config = cached_config();
    let services = h.services();
    let pipeline = Pipeline::new(&config, &h.paths, &services);

    let first = pipeline.run(&h.bank).expect("first run");
    assert_eq!(first.predictions, vec![Letter::C, Letter::B, Letter::A]);
    assert_eq!(first.defaulted_count, 1);
    let acc = first.accuracy.expect("accuracy");
    assert!((0.0..=1.0).contains(&acc));
    assert!((acc - 2.0 / 3.0).abs() < 1e-9);

    // Only answer generation talks to the model when keywords are cached.
    assert_eq!(h.llm_calls.get(), 3);
    let fetch = first.fetch.clone().expect("fetch summary");
    assert!(fetch.fetched.is_empty());
    assert_eq!(fetch.cached.len(), 4);
    assert_eq!(first.indexed.inserted, 4);
    assert_eq!(first.index_entries, 4);
    for outcome in &first.outcomes {
        assert!(outcome.context_chars > 0);
        assert!(outcome.context_chars <= 1000);
    }

    let second = pipeline.run(&h.bank).expect("second run");
    assert_eq!(second.predictions, first.predictions);
    assert_eq!(second.indexed.inserted, 0);
    assert_eq!(second.indexed.duplicates, 4);
    assert_eq!(second.index_entries, 4);
}

#[test]
fn run_writes_audit_artifacts() {
    let h = Harness::new();
    h.seed_caches();
    let config = cached_config();
    let services = h.services();
    let report = Pipeline::new(&config, &h.paths, &services)
        .run(&h.bank)
        .expect("run");

    let out = &h.paths.output_dir;
    let prompts = fs::read_to_string(out.join(PROMPTS_FILE)).expect("prompts");
    let responses = fs::read_to_string(out.join(RESPONSES_FILE)).expect("responses");
    assert_eq!(split_entries(&prompts).len(), 3);
    assert_eq!(split_entries(&responses)[2], "I cannot decide.");
    assert_eq!(
        fs::read_to_string(out.join(PREDICTIONS_FILE)).expect("predictions"),
        "C,B,A"
    );

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).expect("summary"))
            .expect("summary json");
    assert_eq!(summary["question_count"], 3);
    assert_eq!(summary["dataset_fingerprint"], report.dataset_fingerprint.as_str());
}

#[test]
fn extracts_keywords_when_not_cached() {
    let h = Harness::new();
    h.seed_caches();
    fs::remove_file(&h.paths.keywords_file).expect("drop keyword cache");
    let config = PipelineConfig {
        keywords_from_cache: false,
        ..cached_config()
    };
    let services = h.services();
    let report = Pipeline::new(&config, &h.paths, &services)
        .run(&h.bank)
        .expect("run");

    assert_eq!(h.llm_calls.get(), 6);
    assert_eq!(report.outcomes[1].keywords, vec!["Gravity".to_string(), "Orbit".to_string()]);
    let saved = KeywordCacheFile::new(h.paths.keywords_file.clone())
        .load(3)
        .expect("keywords saved");
    assert_eq!(saved[0], KeywordSet::new(["Mitochondrion"]));
}

#[test]
fn skip_retrieval_answers_without_context() {
    let h = Harness::new();
    h.seed_caches();
    let config = PipelineConfig {
        skip_fetch: true,
        skip_retrieval: true,
        ..cached_config()
    };
    let services = h.services();
    let report = Pipeline::new(&config, &h.paths, &services)
        .run(&h.bank)
        .expect("run");

    assert_eq!(report.predictions.len(), 3);
    assert!(report.fetch.is_none());
    assert_eq!(report.index_entries, 0);
    assert!(report.outcomes.iter().all(|o| o.context_chars == 0));
    assert_eq!(h.embed_calls.get(), 0);
}

#[test]
fn invalid_chunking_fails_before_calling_services() {
    let h = Harness::new();
    h.seed_caches();
    let config = PipelineConfig {
        chunk_size: 100,
        chunk_overlap: 100,
        ..cached_config()
    };
    let services = h.services();
    let err = Pipeline::new(&config, &h.paths, &services)
        .run(&h.bank)
        .unwrap_err();
    assert_eq!(err.code, "CHUNK_CONFIG_INVALID");
    assert_eq!(h.llm_calls.get(), 0);
    assert_eq!(h.embed_calls.get(), 0);
}

#[test]
fn export_mode_writes_prompts_and_truth_without_services() {
    let h = Harness::new();
    let config = PipelineConfig {
        export_prompts_only: true,
        ..PipelineConfig::default()
    };
    let services = h.services();
    let report = Pipeline::new(&config, &h.paths, &services)
        .run(&h.bank)
        .expect("export");

    assert_eq!(h.llm_calls.get(), 0);
    assert_eq!(h.embed_calls.get(), 0);
    assert!(report.predictions.is_empty());
    assert_eq!(report.accuracy, None);
    assert!(!h.paths.keywords_file.exists());
    assert!(!h.paths.index_dir.exists());

    let out = &h.paths.output_dir;
    let prompts = split_entries(&fs::read_to_string(out.join(PROMPTS_FILE)).expect("prompts"));
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("Context: \n"));
    assert!(prompts[1].contains("Question: What force keeps planets in orbit around the Sun?"));
    assert_eq!(
        fs::read_to_string(out.join(GROUND_TRUTH_FILE)).expect("truth"),
        "C,A,A"
    );
    assert!(!out.join(PREDICTIONS_FILE).exists());
}

#[test]
fn empty_bank_is_rejected_before_any_stage() {
    let h = Harness::new();
    h.seed_caches();
    let config = cached_config();
    let services = h.services();
    let empty = load_question_bank_csv("prompt,A,B,C,D,E,answer\n").expect("header only");

    let err = Pipeline::new(&config, &h.paths, &services)
        .run(&empty)
        .unwrap_err();
    assert_eq!(err.code, "DATASET_EMPTY");
    assert_eq!(h.llm_calls.get(), 0);
    assert_eq!(h.embed_calls.get(), 0);
    assert!(!h.paths.index_dir.exists());
    assert!(!h.paths.output_dir.exists());
}

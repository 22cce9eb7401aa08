use std::process::ExitCode;

use clap::Parser;
use sciqa_ai::ollama::OllamaClient;
use sciqa_ai::pipeline::{Pipeline, RunReport, Services};
use sciqa_core::error::AppError;
use sciqa_core::ingest::load_question_bank;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::Cli;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sciqa=debug,sciqa_ai=debug,sciqa_core=debug"
    } else {
        "sciqa=info,sciqa_ai=info,sciqa_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn run(cli: &Cli) -> Result<RunReport, AppError> {
    let config = cli.pipeline_config();
    let paths = cli.paths();

    tracing::info!(path = %cli.dataset.display(), "loading dataset");
    let bank = load_question_bank(&cli.dataset)?.limit(cli.num_questions);
    tracing::info!(questions = bank.len(), "dataset loaded");
    bank.require_questions()?;

    let ollama = OllamaClient::new(&cli.ollama_url)?;
    if !config.export_prompts_only {
        if let Err(e) = ollama.health_check() {
            tracing::warn!(error = %e, "Ollama health check failed; generation calls will likely fail");
        }
    }
    let services = Services::ollama_wikipedia(ollama, &cli.wiki_lang);

    let report = Pipeline::new(&config, &paths, &services).run(&bank)?;
    drop(services);
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            match report.accuracy {
                _ if report.config.export_prompts_only => println!(
                    "exported {} prompts to {}",
                    report.question_count,
                    cli.paths().output_dir.display()
                ),
                Some(acc) => println!(
                    "accuracy: {acc:.4} ({} questions, {} defaulted)",
                    report.question_count, report.defaulted_count
                ),
                None => println!(
                    "answered {} questions ({} defaulted); no ground truth to score",
                    report.question_count, report.defaulted_count
                ),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = %e.code, details = ?e.details, retryable = e.retryable, "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

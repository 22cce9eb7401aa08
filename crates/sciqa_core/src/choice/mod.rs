use serde::{Deserialize, Serialize};

use crate::domain::Letter;

pub const ANSWER_PREFIX: &str = "Answer:";

/// Letter used when a response cannot be parsed.
pub const DEFAULT_LETTER: Letter = Letter::A;

/// Outcome of parsing a raw model response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedChoice {
    Answered { letter: Letter },
    Malformed { raw: String },
}

/// A prediction after the default policy was applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedChoice {
    pub letter: Letter,
    pub defaulted: bool,
}

/// Strict parser for the `Answer: <letter>` contract.
///
/// Only the last non-empty line is inspected. It must start with `Answer:`
/// and the first character after the prefix (whitespace trimmed) must be `A`..`E`.
pub fn parse_choice(response: &str) -> ParsedChoice {
    let malformed = || ParsedChoice::Malformed {
        raw: response.to_string(),
    };

    let Some(last) = response.lines().map(str::trim).rfind(|l| !l.is_empty()) else {
        return malformed();
    };
    let Some(rest) = last.strip_prefix(ANSWER_PREFIX) else {
        return malformed();
    };
    match rest.trim().chars().next().and_then(Letter::from_char) {
        Some(letter) => ParsedChoice::Answered { letter },
        None => malformed(),
    }
}

/// Apply the default-letter policy. Malformed responses become `A` and are logged.
pub fn resolve_choice(parsed: &ParsedChoice) -> ResolvedChoice {
    match parsed {
        ParsedChoice::Answered { letter } => ResolvedChoice {
            letter: *letter,
            defaulted: false,
        },
        ParsedChoice::Malformed { raw } => {
            let tail: String = raw
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("")
                .chars()
                .take(120)
                .collect();
            tracing::warn!(
                fallback = %DEFAULT_LETTER,
                last_line = %tail,
                "response has no parseable answer line; using default letter"
            );
            ResolvedChoice {
                letter: DEFAULT_LETTER,
                defaulted: true,
            }
        }
    }
}

/// Parse and resolve in one step.
pub fn extract_choice(response: &str) -> ResolvedChoice {
    resolve_choice(&parse_choice(response))
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// One of the five answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
}

impl Letter {
    pub const ALL: [Letter; 5] = [Letter::A, Letter::B, Letter::C, Letter::D, Letter::E];

    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Letter {
    type Err = AppError;

    /// Exactly one of `A`..`E` after trimming; anything else is a validation error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let mut chars = t.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::from_char(c).ok_or_else(|| invalid_letter(t)),
            _ => Err(invalid_letter(t)),
        }
    }
}

fn invalid_letter(raw: &str) -> AppError {
    AppError::new("VALIDATION_LETTER_INVALID", "Letter must be one of A, B, C, D, E")
        .with_details(format!("value={raw:?}"))
}

/// A validated multiple-choice question. Built only through `QuestionItem::new`,
/// which enforces the five-choice invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionItem {
    id: String,
    question: String,
    choices: [String; 5],
    answer: Option<Letter>,
}

impl QuestionItem {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        choices: Vec<String>,
        answer: Option<Letter>,
    ) -> Result<Self, AppError> {
        let id = id.into();
        let n = choices.len();
        let choices: [String; 5] = choices.try_into().map_err(|_| {
            AppError::new(
                "VALIDATION_CHOICE_COUNT",
                "Question must have exactly 5 choices",
            )
            .with_details(format!("id={id}; got={n}"))
        })?;
        Ok(Self {
            id,
            question: question.into(),
            choices,
            answer,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[String; 5] {
        &self.choices
    }

    pub fn choice(&self, letter: Letter) -> &str {
        &self.choices[letter.index()]
    }

    pub fn answer(&self) -> Option<Letter> {
        self.answer
    }
}

/// Ordered keywords extracted for one question.
///
/// Keywords are never empty and never contain commas or line breaks, so a set
/// always serializes to exactly one comma-joined line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Collapses whitespace, turns commas and line breaks into spaces, and drops
    /// keywords left empty.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| {
                    k.as_ref()
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|w| !w.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

/// A fetched knowledge-source article as stored in the document cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub title: String,
    pub body: String,
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::KeywordSet;
use crate::error::AppError;

/// Split a raw model reply on commas and line breaks, trimming and dropping
/// empty tokens.
pub fn parse_keyword_reply(reply: &str) -> KeywordSet {
    KeywordSet::new(reply.split(|c| c == ',' || c == '\n' || c == '\r'))
}

/// Flat keyword cache: one line per question, keywords joined by commas.
#[derive(Debug, Clone)]
pub struct KeywordCacheFile {
    path: PathBuf,
}

impl KeywordCacheFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Overwrites the whole file.
    pub fn save(&self, sets: &[KeywordSet]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new("KEYWORDS_CACHE_WRITE_FAILED", "Failed to create keyword cache directory")
                    .with_details(format!("path={}; err={}", parent.display(), e))
            })?;
        }
        let mut out = String::new();
        for set in sets {
            out.push_str(&set.as_slice().join(","));
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(|e| {
            AppError::new("KEYWORDS_CACHE_WRITE_FAILED", "Failed to write keyword cache")
                .with_details(format!("path={}; err={}", self.path.display(), e))
        })?;
        tracing::debug!(path = %self.path.display(), lines = sets.len(), "saved keyword cache");
        Ok(())
    }

    /// Load exactly `expected` lines. Fewer lines than questions is a validation
    /// error; trailing extra lines are ignored.
    pub fn load(&self, expected: usize) -> Result<Vec<KeywordSet>, AppError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            AppError::new("KEYWORDS_CACHE_READ_FAILED", "Failed to read keyword cache")
                .with_details(format!("path={}; err={}", self.path.display(), e))
        })?;
        let sets = text
            .lines()
            .take(expected)
            .map(parse_keyword_reply)
            .collect::<Vec<_>>();
        if sets.len() < expected {
            return Err(AppError::new(
                "KEYWORDS_CACHE_MISMATCH",
                "Keyword cache has fewer lines than questions",
            )
            .with_details(format!(
                "path={}; expected={}; got={}",
                self.path.display(),
                expected,
                sets.len()
            )));
        }
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_keyword_reply;

    #[test]
    fn reply_is_split_and_trimmed() {
        let k = parse_keyword_reply(" Photosynthesis ,  , Chlorophyll,\n");
        assert_eq!(
            k.as_slice(),
            &["Photosynthesis".to_string(), "Chlorophyll".to_string()]
        );
        assert!(parse_keyword_reply(" , ,").is_empty());
    }

    #[test]
    fn reply_lines_are_separate_keywords() {
        let k = parse_keyword_reply("Gravity\nOrbit\r\nKepler's laws");
        assert_eq!(
            k.as_slice(),
            &[
                "Gravity".to_string(),
                "Orbit".to_string(),
                "Kepler's laws".to_string()
            ]
        );
    }
}

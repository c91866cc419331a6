use std::sync::Arc;

use crate::cache::WordListCache;
use crate::error::CheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub word: String,
    pub used: bool,
}

/// Answers "has this word been an answer before?"
///
/// Stateless per call; duplicate suppression belongs to the caller.
#[derive(Clone)]
pub struct AnswerChecker {
    cache: Arc<WordListCache>,
    word_length: usize,
}

impl AnswerChecker {
    pub fn new(cache: Arc<WordListCache>, word_length: usize) -> Self {
        Self { cache, word_length }
    }

    pub async fn check(&self, word: &str) -> Result<Verdict, CheckError> {
        let word = word.trim().to_lowercase();

        if word.chars().count() != self.word_length || !word.chars().all(char::is_alphabetic) {
            return Err(CheckError::InvalidWord {
                word,
                expected: self.word_length,
            });
        }

        let words = self.cache.load().await?;
        let used = words.contains(&word);
        tracing::info!(
            word = %word,
            "Word {}",
            if used {
                "has been used before"
            } else {
                "has not been used before"
            }
        );

        Ok(Verdict { word, used })
    }
}

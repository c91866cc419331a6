use async_trait::async_trait;
use turtle_core::AnswerChecker;

/// Outcome of one check, as seen by the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Checked { word: String, used: bool },
    Failed { word: String, error: String },
}

impl CheckResult {
    pub fn word(&self) -> &str {
        match self {
            CheckResult::Checked { word, .. } | CheckResult::Failed { word, .. } => word,
        }
    }
}

/// Anything that can tell the page whether a word was used.
/// Errors are folded into [`CheckResult::Failed`].
#[async_trait]
pub trait WordCheck: Send + Sync {
    async fn check_word(&self, word: &str) -> CheckResult;
}

#[async_trait]
impl WordCheck for AnswerChecker {
    async fn check_word(&self, word: &str) -> CheckResult {
        match self.check(word).await {
            Ok(verdict) => CheckResult::Checked {
                word: verdict.word,
                used: verdict.used,
            },
            Err(e) => {
                tracing::error!(word = %word, phase = "check", "Failed to check word: {e}");
                CheckResult::Failed {
                    word: word.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }
}

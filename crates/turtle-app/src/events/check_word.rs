use std::sync::Arc;

use tokio::sync::oneshot;
use turtle_core::AnswerChecker;
use turtle_types::{CheckData, CheckReply};

use crate::state::AppState;

pub async fn handle_check_word(
    state: Arc<AppState>,
    checker: &AnswerChecker,
    word: String,
    reply: oneshot::Sender<CheckReply>,
) -> anyhow::Result<()> {
    tracing::debug!(word = %word, "Checking word for page");

    let response = match checker.check(&word).await {
        Ok(verdict) => CheckReply::Checked(CheckData {
            used: verdict.used,
            word: verdict.word,
        }),
        Err(e) => {
            tracing::error!(word = %word, phase = "check", "Error checking word: {e}");
            CheckReply::Failed {
                error: e.to_string(),
            }
        }
    };

    state.status.checks.write().await.record(&word, &response);

    if reply.send(response).is_err() {
        tracing::debug!(word = %word, "Page went away before the reply");
    }

    Ok(())
}

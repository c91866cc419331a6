use std::sync::Arc;

use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use turtle_core::AnswerChecker;

use crate::bridge::BackgroundEnvelope;
use crate::state::AppState;

pub mod check_word;
pub mod content_ready;

use check_word::handle_check_word;
use content_ready::handle_content_ready;

/// Background service loop: answers page requests until cancelled or every
/// page client is gone
pub async fn event_loop(
    state: Arc<AppState>,
    checker: Arc<AnswerChecker>,
    requests: AsyncReceiver<BackgroundEnvelope>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("Background service waiting for requests");
    loop {
        let envelope = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Background service stopping");
                break;
            }
            envelope = requests.recv() => match envelope {
                Ok(envelope) => envelope,
                Err(_) => {
                    tracing::info!("All page clients closed");
                    break;
                }
            },
        };

        tracing::debug!(request = ?envelope.request(), "Received message from page");
        handle_events(state.clone(), &checker, envelope);
    }

    Ok(())
}

fn handle_events(state: Arc<AppState>, checker: &Arc<AnswerChecker>, envelope: BackgroundEnvelope) {
    match envelope {
        BackgroundEnvelope::CheckWord { word, reply } => {
            // A slow corpus load must not hold up other requests
            let checker = Arc::clone(checker);
            tokio::spawn(async move {
                if let Err(e) = handle_check_word(state, &checker, word, reply).await {
                    tracing::error!("Check word handler failed: {e}");
                }
            });
        }
        BackgroundEnvelope::ContentScriptReady { reply } => {
            tokio::spawn(async move {
                if let Err(e) = handle_content_ready(state, reply).await {
                    tracing::error!("Ready handler failed: {e}");
                }
            });
        }
    }
}

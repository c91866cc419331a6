use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::oneshot;
use turtle_types::Ack;

use crate::state::AppState;

pub async fn handle_content_ready(state: Arc<AppState>, reply: oneshot::Sender<Ack>) -> anyhow::Result<()> {
    let observing = state.observing.load(Ordering::SeqCst);
    tracing::info!(observing, "Content script ready");

    if reply.send(Ack::Done).is_err() {
        tracing::debug!("Page went away before the ready ack");
    }
    Ok(())
}

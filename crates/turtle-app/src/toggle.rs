use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use turtle_types::{Ack, Badge, PageRequest};

use crate::page::PageConnection;
use crate::state::AppState;

/// The on/off switch the user presses, plus the badge that reflects it
#[derive(Clone)]
pub struct ActivationToggle {
    state: Arc<AppState>,
}

impl ActivationToggle {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn badge(&self) -> Badge {
        *self.state.badge.read().await
    }

    pub fn is_observing(&self) -> bool {
        self.state.observing.load(Ordering::SeqCst)
    }

    async fn set_badge(&self, badge: Badge) {
        *self.state.badge.write().await = badge;
        tracing::debug!(badge = badge.text(), color = badge.color(), "Badge updated");
    }

    /// Flip observing and deliver the matching directive to `page`.
    ///
    /// A failed delivery gets one retry after the page's receiver is
    /// re-established. Returns the resulting badge.
    pub async fn toggle(&self, page: &dyn PageConnection) -> Badge {
        let (is_game, retry_delay) = {
            let config = self.state.config.read().await;
            (
                config.network.is_game_page(page.url()),
                Duration::from_millis(config.network.reconnect_delay_ms),
            )
        };

        if !is_game {
            tracing::info!(url = %page.url(), "Not on a supported Wordle page");
            self.set_badge(Badge::NotApplicable).await;
            return Badge::NotApplicable;
        }

        let observing = !self.state.observing.fetch_xor(true, Ordering::SeqCst);
        let badge = if observing { Badge::On } else { Badge::Off };
        self.set_badge(badge).await;

        let request = if observing {
            PageRequest::StartObserving
        } else {
            PageRequest::StopObserving
        };

        match page.send(request.clone()).await {
            Ok(ack) => return self.settle(&request, ack, badge).await,
            Err(e) => tracing::warn!("Failed to communicate with page: {e}"),
        }

        if let Err(e) = page.reinject().await {
            tracing::error!("Failed to re-establish page receiver: {e}");
            return self.fail().await;
        }

        tokio::time::sleep(retry_delay).await;
        match page.send(request.clone()).await {
            Ok(ack) => {
                tracing::info!("Communicated with page after re-establishing it");
                self.settle(&request, ack, badge).await
            }
            Err(e) => {
                tracing::error!("Still failed to communicate with page: {e}");
                self.fail().await
            }
        }
    }

    /// Observing can't continue on a page that isn't the game
    pub async fn on_tab_activated(&self, url: &str) {
        let is_game = self.state.config.read().await.network.is_game_page(url);
        if !is_game {
            self.state.observing.store(false, Ordering::SeqCst);
            self.set_badge(Badge::NotApplicable).await;
        }
    }

    /// A delivered `Ack::Failed` is final; it does not get the re-inject retry
    async fn settle(&self, request: &PageRequest, ack: Ack, badge: Badge) -> Badge {
        match ack {
            Ack::Done => {
                match request {
                    PageRequest::StartObserving => tracing::info!("Started observing Wordle"),
                    PageRequest::StopObserving => tracing::info!("Stopped observing Wordle"),
                }
                badge
            }
            Ack::Failed { error } => {
                tracing::error!(?request, "Page could not apply directive: {error}");
                self.fail().await
            }
        }
    }

    async fn fail(&self) -> Badge {
        self.state.observing.store(false, Ordering::SeqCst);
        self.set_badge(Badge::Error).await;
        Badge::Error
    }
}

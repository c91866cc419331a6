use std::sync::Arc;

use kanal::AsyncReceiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use turtle_core::{AnswerChecker, HttpCorpusSource, WordListCache};
use turtle_dom::Document;

use crate::board::GameBoard;
use crate::bridge::{BackgroundClient, BackgroundEnvelope, background_channel};
use crate::events::event_loop;
use crate::io::command_io;
use crate::page::Tab;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub page_to_background: (BackgroundClient, AsyncReceiver<BackgroundEnvelope>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            page_to_background: background_channel(capacity),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, channel_capacity: usize) -> Self {
        Self {
            channels: ChannelSet::new(channel_capacity),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub async fn spawn_tasks(
        &self,
        url: String,
        answer: &str,
    ) -> anyhow::Result<JoinSet<anyhow::Result<()>>> {
        let config = self.state.config.read().await.clone();
        let mut tasks = JoinSet::new();

        // Background service
        let source = HttpCorpusSource::new(&config.network)?;
        let cache = Arc::new(WordListCache::new(Arc::new(source)));
        let checker = Arc::new(AnswerChecker::new(cache, config.observer.word_length));
        tasks.spawn(event_loop(
            self.state.clone(),
            checker,
            self.channels.page_to_background.1.clone(),
            self.cancel_token.child_token(),
        ));

        // Game page with its agent
        let document = Document::new();
        let board = GameBoard::new(&document, answer);
        let tab = Arc::new(Tab::new(
            url,
            document,
            config,
            self.channels.page_to_background.0.clone(),
            self.cancel_token.child_token(),
        ));
        tab.inject().await?;

        // Stdin commands
        tasks.spawn(command_io(
            self.state.clone(),
            board,
            tab,
            self.cancel_token.clone(),
        ));

        Ok(tasks)
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use kanal::AsyncReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use turtle_config::Config;
use turtle_dom::Document;
use turtle_types::{Ack, PageRequest};

use crate::bridge::{BackgroundClient, BridgeError, PageClient, PageEnvelope, page_channel};
use crate::observer::ObservationController;
use crate::presenter::FeedbackPresenter;

/// A page the background can send directives to
#[async_trait]
pub trait PageConnection: Send + Sync {
    fn url(&self) -> &str;

    async fn send(&self, request: PageRequest) -> Result<Ack, BridgeError>;

    /// Replace the page's receiver with a fresh agent
    async fn reinject(&self) -> Result<(), BridgeError>;
}

/// Page context event loop: applies start/stop directives and runs the
/// observation cycle
pub async fn page_loop(
    document: Document,
    config: Config,
    background: BackgroundClient,
    directives: AsyncReceiver<PageEnvelope>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let presenter = FeedbackPresenter::new(document.clone(), config.feedback.clone());
    let controller = ObservationController::new(
        document,
        config.observer.clone(),
        presenter,
        Arc::new(background.clone()),
    );
    let mut controller = match controller {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("Page agent cannot observe: {e}");
            return refuse_directives(directives, cancel, e.to_string()).await;
        }
    };

    // The background might not be listening yet
    tokio::spawn(async move {
        if let Err(e) = background.announce_ready().await {
            tracing::debug!("Ready announcement not delivered: {e}");
        }
    });
    tracing::info!("Wordle Turtle content script loaded");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            directive = directives.recv() => match directive {
                Ok(envelope) => handle_directive(&mut controller, envelope),
                Err(_) => break,
            },
            Some(event) = controller.next_event() => controller.handle(event),
        }
    }

    tracing::debug!("Page agent exiting");
    Ok(())
}

fn handle_directive(controller: &mut ObservationController, envelope: PageEnvelope) {
    tracing::debug!(request = ?envelope.request, "Received directive from background");
    match envelope.request {
        PageRequest::StartObserving => controller.start(),
        PageRequest::StopObserving => controller.stop(),
    }
    if envelope.reply.send(Ack::Done).is_err() {
        tracing::debug!("Background stopped waiting for the ack");
    }
}

/// Answer every directive with `error` until cancelled
async fn refuse_directives(
    directives: AsyncReceiver<PageEnvelope>,
    cancel: CancellationToken,
    error: String,
) -> anyhow::Result<()> {
    loop {
        let envelope = tokio::select! {
            _ = cancel.cancelled() => break,
            directive = directives.recv() => match directive {
                Ok(envelope) => envelope,
                Err(_) => break,
            },
        };
        tracing::warn!(request = ?envelope.request, "Refusing directive: {error}");
        let ack = Ack::Failed {
            error: error.clone(),
        };
        if envelope.reply.send(ack).is_err() {
            tracing::debug!("Background stopped waiting for the ack");
        }
    }
    Ok(())
}

struct PageAgent {
    client: PageClient,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PageAgent {
    fn shutdown(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// A game page hosting at most one page agent at a time
pub struct Tab {
    url: String,
    document: Document,
    config: Config,
    background: BackgroundClient,
    cancel: CancellationToken,
    agent: Mutex<Option<PageAgent>>,
}

impl Tab {
    /// The tab starts without an agent; call [`Tab::inject`] to attach one
    pub fn new(
        url: impl Into<String>,
        document: Document,
        config: Config,
        background: BackgroundClient,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url: url.into(),
            document,
            config,
            background,
            cancel,
            agent: Mutex::new(None),
        }
    }

    pub async fn is_injected(&self) -> bool {
        self.agent.lock().await.is_some()
    }

    /// Start a fresh page agent, shutting down any previous one
    pub async fn inject(&self) -> Result<(), BridgeError> {
        if self.cancel.is_cancelled() {
            return Err(BridgeError::ReceiverGone);
        }

        let (client, directives) = page_channel(self.config.channel_capacity);
        let cancel = self.cancel.child_token();
        let task = tokio::spawn({
            let document = self.document.clone();
            let config = self.config.clone();
            let background = self.background.clone();
            let cancel = cancel.clone();
            async move {
                if let Err(e) = page_loop(document, config, background, directives, cancel).await {
                    tracing::error!("Page agent failed: {e}");
                }
            }
        });

        let previous = self.agent.lock().await.replace(PageAgent {
            client,
            cancel,
            task,
        });
        if let Some(previous) = previous {
            previous.shutdown();
        }
        tracing::info!(url = %self.url, "Page agent injected");
        Ok(())
    }

    pub async fn close(&self) {
        self.cancel.cancel();
        if let Some(agent) = self.agent.lock().await.take() {
            agent.shutdown();
        }
    }
}

#[async_trait]
impl PageConnection for Tab {
    fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: PageRequest) -> Result<Ack, BridgeError> {
        let client = self.agent.lock().await.as_ref().map(|a| a.client.clone());
        match client {
            Some(client) => client.send(request).await,
            None => Err(BridgeError::ReceiverGone),
        }
    }

    async fn reinject(&self) -> Result<(), BridgeError> {
        self.inject().await
    }
}

//! Request/reply channels between the page context and the background.
//!
//! Every request carries its own oneshot for the reply, so a reply can only
//! ever reach the request that asked for it.

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::oneshot;
use turtle_types::{Ack, BackgroundRequest, CheckReply, PageRequest};

use crate::check::{CheckResult, WordCheck};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("receiving end does not exist")]
    ReceiverGone,
    #[error("receiver dropped the request without replying")]
    ReplyDropped,
}

/// Page → background
#[derive(Debug)]
pub enum BackgroundEnvelope {
    CheckWord {
        word: String,
        reply: oneshot::Sender<CheckReply>,
    },
    ContentScriptReady {
        reply: oneshot::Sender<Ack>,
    },
}

impl BackgroundEnvelope {
    pub fn request(&self) -> BackgroundRequest {
        match self {
            BackgroundEnvelope::CheckWord { word, .. } => {
                BackgroundRequest::CheckWord { word: word.clone() }
            }
            BackgroundEnvelope::ContentScriptReady { .. } => BackgroundRequest::ContentScriptReady,
        }
    }
}

/// Background → page
#[derive(Debug)]
pub struct PageEnvelope {
    pub request: PageRequest,
    pub reply: oneshot::Sender<Ack>,
}

pub fn background_channel(capacity: usize) -> (BackgroundClient, AsyncReceiver<BackgroundEnvelope>) {
    let (tx, rx) = kanal::bounded_async(capacity);
    (BackgroundClient { tx }, rx)
}

pub fn page_channel(capacity: usize) -> (PageClient, AsyncReceiver<PageEnvelope>) {
    let (tx, rx) = kanal::bounded_async(capacity);
    (PageClient { tx }, rx)
}

#[derive(Clone)]
pub struct BackgroundClient {
    tx: AsyncSender<BackgroundEnvelope>,
}

impl BackgroundClient {
    pub async fn request_check(&self, word: &str) -> Result<CheckReply, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BackgroundEnvelope::CheckWord {
                word: word.to_string(),
                reply,
            })
            .await
            .map_err(|_| BridgeError::ReceiverGone)?;
        rx.await.map_err(|_| BridgeError::ReplyDropped)
    }

    pub async fn announce_ready(&self) -> Result<Ack, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BackgroundEnvelope::ContentScriptReady { reply })
            .await
            .map_err(|_| BridgeError::ReceiverGone)?;
        rx.await.map_err(|_| BridgeError::ReplyDropped)
    }
}

#[async_trait]
impl WordCheck for BackgroundClient {
    async fn check_word(&self, word: &str) -> CheckResult {
        match self.request_check(word).await {
            Ok(CheckReply::Checked(data)) => CheckResult::Checked {
                word: data.word,
                used: data.used,
            },
            Ok(CheckReply::Failed { error }) => CheckResult::Failed {
                word: word.to_string(),
                error,
            },
            Err(e) => {
                tracing::error!(word = %word, phase = "bridge", "Failed to reach background: {e}");
                CheckResult::Failed {
                    word: word.to_string(),
                    error: "Communication error".to_string(),
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct PageClient {
    tx: AsyncSender<PageEnvelope>,
}

impl PageClient {
    pub async fn send(&self, request: PageRequest) -> Result<Ack, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PageEnvelope { request, reply })
            .await
            .map_err(|_| BridgeError::ReceiverGone)?;
        rx.await.map_err(|_| BridgeError::ReplyDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turtle_types::CheckData;

    #[tokio::test]
    async fn check_reply_reaches_its_request() {
        let (client, rx) = background_channel(4);

        let server = tokio::spawn(async move {
            while let Ok(envelope) = rx.recv().await {
                match envelope {
                    BackgroundEnvelope::CheckWord { word, reply } => {
                        let _ = reply.send(CheckReply::Checked(CheckData {
                            used: word == "mango",
                            word,
                        }));
                    }
                    BackgroundEnvelope::ContentScriptReady { reply } => {
                        let _ = reply.send(Ack::Done);
                    }
                }
            }
        });

        let (a, b) = tokio::join!(client.check_word("mango"), client.check_word("mince"));
        assert_eq!(
            a,
            CheckResult::Checked {
                word: "mango".to_string(),
                used: true
            }
        );
        assert_eq!(
            b,
            CheckResult::Checked {
                word: "mince".to_string(),
                used: false
            }
        );
        assert_eq!(client.announce_ready().await, Ok(Ack::Done));

        drop(client);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn missing_receiver_is_a_communication_error() {
        let (client, rx) = background_channel(4);
        drop(rx);

        assert_eq!(
            client.request_check("crane").await,
            Err(BridgeError::ReceiverGone)
        );
        assert_eq!(
            client.check_word("crane").await,
            CheckResult::Failed {
                word: "crane".to_string(),
                error: "Communication error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn dropped_envelope_is_reported() {
        let (client, rx) = page_channel(4);
        tokio::spawn(async move {
            let envelope = rx.recv().await.unwrap();
            assert_eq!(envelope.request, PageRequest::StartObserving);
            drop(envelope);
        });

        assert_eq!(
            client.send(PageRequest::StartObserving).await,
            Err(BridgeError::ReplyDropped)
        );
    }
}

//! Messages exchanged between the page context and the background context.
//!
//! Every message kind is a variant of a closed enum tagged by `action` on the
//! wire, so a receiver matches them exhaustively.

use serde::{Deserialize, Serialize};

/// Directives sent from the background to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    StartObserving,
    StopObserving,
}

/// Requests sent from the page to the background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundRequest {
    CheckWord { word: String },
    ContentScriptReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckData {
    pub used: bool,
    pub word: String,
}

/// Reply to [`BackgroundRequest::CheckWord`]
///
/// Wire form is `{"success": true, "data": {..}}` or
/// `{"success": false, "error": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireCheckReply", try_from = "WireCheckReply")]
pub enum CheckReply {
    Checked(CheckData),
    Failed { error: String },
}

#[derive(Serialize, Deserialize)]
struct WireCheckReply {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<CheckData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<CheckReply> for WireCheckReply {
    fn from(reply: CheckReply) -> Self {
        match reply {
            CheckReply::Checked(data) => WireCheckReply {
                success: true,
                data: Some(data),
                error: None,
            },
            CheckReply::Failed { error } => WireCheckReply {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<WireCheckReply> for CheckReply {
    type Error = String;

    fn try_from(wire: WireCheckReply) -> Result<Self, Self::Error> {
        match (wire.success, wire.data) {
            (true, Some(data)) => Ok(CheckReply::Checked(data)),
            (true, None) => Err("successful check reply without data".to_string()),
            (false, _) => Ok(CheckReply::Failed {
                error: wire.error.unwrap_or_else(|| "Unknown error".to_string()),
            }),
        }
    }
}

/// Acknowledgement of a [`PageRequest`] or of the ready announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireAck", try_from = "WireAck")]
pub enum Ack {
    Done,
    Failed { error: String },
}

#[derive(Serialize, Deserialize)]
struct WireAck {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<Ack> for WireAck {
    fn from(ack: Ack) -> Self {
        match ack {
            Ack::Done => WireAck {
                success: true,
                error: None,
            },
            Ack::Failed { error } => WireAck {
                success: false,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<WireAck> for Ack {
    type Error = String;

    fn try_from(wire: WireAck) -> Result<Self, Self::Error> {
        if wire.success {
            Ok(Ack::Done)
        } else {
            Ok(Ack::Failed {
                error: wire.error.unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }
}

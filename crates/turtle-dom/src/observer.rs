use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::document::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// A child was appended to or removed from the target
    ChildList,
    /// The target's own text changed
    CharacterData,
    Attributes { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
}

/// What an observer wants to hear about
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub character_data: bool,
    pub attributes: bool,
    /// Restrict attribute records to these names
    pub attribute_filter: Option<Vec<String>>,
    /// Include descendants of the root, not just the root itself
    pub subtree: bool,
}

impl ObserveOptions {
    pub(crate) fn wants(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes { name } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f == name))
            }
        }
    }
}

pub(crate) struct Registration {
    pub(crate) id: u64,
    pub(crate) root: NodeId,
    pub(crate) options: ObserveOptions,
    pub(crate) tx: UnboundedSender<MutationRecord>,
}

/// Live subscription to mutations under one root.
///
/// Dropping the observer disconnects it.
pub struct MutationObserver {
    id: u64,
    document: Document,
    rx: UnboundedReceiver<MutationRecord>,
    connected: bool,
}

impl MutationObserver {
    pub(crate) fn new(id: u64, document: Document, rx: UnboundedReceiver<MutationRecord>) -> Self {
        Self {
            id,
            document,
            rx,
            connected: true,
        }
    }

    /// Next record, or `None` once disconnected and drained
    pub async fn recv(&mut self) -> Option<MutationRecord> {
        self.rx.recv().await
    }

    /// Drain whatever is already queued without waiting
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.rx.try_recv() {
            records.push(record);
        }
        records
    }

    /// Registration id, for [`Document::disconnect_observer`]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            self.document.disconnect_observer(self.id);
            self.connected = false;
        }
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

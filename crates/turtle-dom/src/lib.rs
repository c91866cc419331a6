//! In-memory document tree observed by the page agent.
//!
//! Elements carry a tag, attributes (`id` and `class` included) and their own
//! text. Every change is reported to the [`MutationObserver`]s whose root
//! contains the changed node.

mod document;
mod observer;
mod selector;

pub use document::{Document, NodeId};
pub use observer::{MutationKind, MutationObserver, MutationRecord, ObserveOptions};
pub use selector::{Selector, SelectorError};

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use turtle_dom::{Document, NodeId, ObserveOptions};

/// Trailing-edge debounce over the mutations of one subtree.
///
/// Every qualifying mutation pushes the deadline to `window` after it; the
/// callback runs once the subtree has been quiet for a full window.
pub struct MutationDebouncer {
    document: Document,
    observer_id: u64,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MutationDebouncer {
    /// Observe `root` for child list changes, text changes and changes of
    /// `state_attribute`
    pub fn attach<F>(
        document: &Document,
        root: NodeId,
        state_attribute: &str,
        window: Duration,
        on_fire: F,
    ) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let mut observer = document.observe(
            root,
            ObserveOptions {
                child_list: true,
                character_data: true,
                attributes: true,
                attribute_filter: Some(vec![state_attribute.to_string()]),
                subtree: true,
            },
        );
        let observer_id = observer.id();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                let fire_at = deadline.unwrap_or_else(Instant::now);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    record = observer.recv() => match record {
                        Some(record) => {
                            tracing::trace!(?record, "Qualifying mutation");
                            deadline = Some(Instant::now() + window);
                        }
                        None => break,
                    },
                    _ = sleep_until(fire_at), if deadline.is_some() => {
                        deadline = None;
                        if !token.is_cancelled() {
                            on_fire();
                        }
                    }
                }
            }
            observer.disconnect();
        });

        Self {
            document: document.clone(),
            observer_id,
            cancel,
            task: Some(task),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.task.is_some()
    }

    /// Cancel any pending fire and stop observing. No-op when already detached.
    pub fn detach(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.cancel.cancel();
        self.document.disconnect_observer(self.observer_id);
        task.abort();
        tracing::debug!("Mutation debouncer detached");
    }
}

impl Drop for MutationDebouncer {
    fn drop(&mut self) {
        self.detach();
    }
}

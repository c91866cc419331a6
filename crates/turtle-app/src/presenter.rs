use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use turtle_config::feedback::FeedbackConfig;
use turtle_dom::{Document, NodeId};
use turtle_types::Severity;

pub const TOAST_ID: &str = "wordle-turtle-feedback";
pub const MARKER_CLASS: &str = "wordle-turtle-active";
pub const MARKER_WORD_ATTRIBUTE: &str = "data-wordle-word";
pub const MARKER_STATUS_ATTRIBUTE: &str = "data-wordle-status";

#[derive(Default)]
struct ToastState {
    /// Bumped by every toast and hide; a dismissal only acts on its own epoch
    epoch: u64,
    dismiss: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub severity: String,
    pub visible: bool,
}

/// What the page currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterSnapshot {
    pub marker: Option<(String, String)>,
    pub toast: Option<ToastView>,
}

/// Renders check outcomes into the page: a persistent marker on the body for
/// used words and a toast that dismisses itself.
pub struct FeedbackPresenter {
    document: Document,
    config: FeedbackConfig,
    toast: Arc<Mutex<ToastState>>,
}

impl FeedbackPresenter {
    pub fn new(document: Document, config: FeedbackConfig) -> Self {
        Self {
            document,
            config,
            toast: Arc::new(Mutex::new(ToastState::default())),
        }
    }

    pub fn show_result(&self, word: &str, used: bool) {
        tracing::info!(word = %word, used, "Showing check result");
        if used {
            self.apply_marker(word, "used");
            self.toast(
                &format!("\"{}\" has been used before!", word.to_uppercase()),
                Severity::Warning,
            );
        } else {
            self.clear();
            self.toast(
                &format!("\"{}\" looks good!", word.to_uppercase()),
                Severity::Success,
            );
        }
    }

    pub fn show_error(&self, word: &str, error: &str) {
        tracing::error!(word = %word, phase = "present", "Failed to check word: {error}");
        self.clear();
        self.toast("Unable to verify word", Severity::Error);
    }

    /// Remove the persistent marker
    pub fn clear(&self) {
        let body = self.document.body();
        self.document.remove_class(body, MARKER_CLASS);
        self.document.remove_attribute(body, MARKER_WORD_ATTRIBUTE);
        self.document.remove_attribute(body, MARKER_STATUS_ATTRIBUTE);
    }

    fn apply_marker(&self, word: &str, status: &str) {
        self.clear();
        let body = self.document.body();
        self.document.add_class(body, MARKER_CLASS);
        self.document.set_attribute(body, MARKER_WORD_ATTRIBUTE, word);
        self.document.set_attribute(body, MARKER_STATUS_ATTRIBUTE, status);
        tracing::debug!(word = %word, status, "Special styling applied");
    }

    /// Fade the current toast out without waiting for its timer
    pub fn hide_toast(&self) {
        let mut state = lock(&self.toast);
        state.epoch += 1;
        if let Some(dismiss) = state.dismiss.take() {
            dismiss.abort();
        }
        if let Some(el) = self.document.get_element_by_id(TOAST_ID) {
            self.document.set_attribute(el, "data-visible", "false");
        }
    }

    /// Show `message`, replacing any toast on screen and its pending dismissal
    pub fn toast(&self, message: &str, severity: Severity) {
        let mut state = lock(&self.toast);
        state.epoch += 1;
        let epoch = state.epoch;
        if let Some(previous) = state.dismiss.take() {
            previous.abort();
        }

        let el = self.toast_element();
        self.document.set_text(el, message);
        self.document
            .set_attribute(el, "data-severity", severity.as_str());
        self.document.set_attribute(el, "data-color", severity.color());
        self.document.set_attribute(el, "data-visible", "true");

        state.dismiss = Some(tokio::spawn(dismiss_after(
            self.document.clone(),
            Arc::clone(&self.toast),
            epoch,
            el,
            Duration::from_millis(self.config.toast_ms),
            Duration::from_millis(self.config.fade_ms),
        )));
    }

    fn toast_element(&self) -> NodeId {
        if let Some(el) = self.document.get_element_by_id(TOAST_ID) {
            return el;
        }
        let el = self.document.create_element("div");
        self.document.set_attribute(el, "id", TOAST_ID);
        self.document.append_child(self.document.body(), el);
        el
    }

    pub fn snapshot(&self) -> PresenterSnapshot {
        let body = self.document.body();
        let marker = if self.document.has_class(body, MARKER_CLASS) {
            Some((
                self.document
                    .attribute(body, MARKER_WORD_ATTRIBUTE)
                    .unwrap_or_default(),
                self.document
                    .attribute(body, MARKER_STATUS_ATTRIBUTE)
                    .unwrap_or_default(),
            ))
        } else {
            None
        };

        let toast = self.document.get_element_by_id(TOAST_ID).map(|el| ToastView {
            message: self.document.text_content(el),
            severity: self
                .document
                .attribute(el, "data-severity")
                .unwrap_or_default(),
            visible: self.document.attribute(el, "data-visible").as_deref() == Some("true"),
        });

        PresenterSnapshot { marker, toast }
    }
}

impl Drop for FeedbackPresenter {
    fn drop(&mut self) {
        if let Some(dismiss) = lock(&self.toast).dismiss.take() {
            dismiss.abort();
        }
    }
}

fn lock(state: &Mutex<ToastState>) -> MutexGuard<'_, ToastState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn dismiss_after(
    document: Document,
    state: Arc<Mutex<ToastState>>,
    epoch: u64,
    el: NodeId,
    visible_for: Duration,
    fade: Duration,
) {
    tokio::time::sleep(visible_for).await;
    {
        let state = lock(&state);
        if state.epoch != epoch {
            return;
        }
        document.set_attribute(el, "data-visible", "false");
    }

    tokio::time::sleep(fade).await;
    {
        let state = lock(&state);
        if state.epoch != epoch {
            return;
        }
        document.remove(el);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presenter() -> FeedbackPresenter {
        FeedbackPresenter::new(Document::new(), FeedbackConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn used_word_sets_marker_and_warns() {
        let presenter = presenter();
        presenter.show_result("mango", true);

        let snapshot = presenter.snapshot();
        assert_eq!(
            snapshot.marker,
            Some(("mango".to_string(), "used".to_string()))
        );
        let toast = snapshot.toast.unwrap();
        assert_eq!(toast.message, "\"MANGO\" has been used before!");
        assert_eq!(toast.severity, "warning");
        assert!(toast.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_word_clears_marker() {
        let presenter = presenter();
        presenter.show_result("mango", true);
        presenter.show_result("mince", false);

        let snapshot = presenter.snapshot();
        assert_eq!(snapshot.marker, None);
        assert_eq!(snapshot.toast.unwrap().severity, "success");
    }

    #[tokio::test(start_paused = true)]
    async fn error_clears_marker() {
        let presenter = presenter();
        presenter.show_result("mango", true);
        presenter.show_error("mango", "HTTP 503");

        let snapshot = presenter.snapshot();
        assert_eq!(snapshot.marker, None);
        let toast = snapshot.toast.unwrap();
        assert_eq!(toast.message, "Unable to verify word");
        assert_eq!(toast.severity, "error");
    }

    #[tokio::test(start_paused = true)]
    async fn toast_fades_then_is_removed() {
        let presenter = presenter();
        presenter.toast("Wordle Turtle is now active!", Severity::Success);

        tokio::time::sleep(Duration::from_millis(4001)).await;
        assert!(!presenter.snapshot().toast.unwrap().visible);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(presenter.snapshot().toast, None);
    }

    #[tokio::test(start_paused = true)]
    async fn new_toast_replaces_pending_dismissal() {
        let presenter = presenter();
        presenter.toast("first", Severity::Info);
        tokio::time::sleep(Duration::from_millis(3000)).await;
        presenter.toast("second", Severity::Info);

        // The first toast's timer would have fired here
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let toast = presenter.snapshot().toast.unwrap();
        assert_eq!(toast.message, "second");
        assert!(toast.visible);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(presenter.snapshot().toast, None);
    }

    #[tokio::test(start_paused = true)]
    async fn hide_toast_keeps_element_hidden() {
        let presenter = presenter();
        presenter.toast("\"MANGO\" looks good!", Severity::Success);
        presenter.hide_toast();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let toast = presenter.snapshot().toast.unwrap();
        assert!(!toast.visible);
    }
}

use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinHandle;
use turtle_config::observer::ObserverConfig;
use turtle_dom::{Document, NodeId, Selector, SelectorError};
use turtle_types::Severity;

use crate::check::{CheckResult, WordCheck};
use crate::debouncer::MutationDebouncer;
use crate::presenter::FeedbackPresenter;
use crate::scanner::TileScanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Debounce window elapsed, or the startup delay did
    Fire { generation: u64 },
    Checked { generation: u64, result: CheckResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Inactive,
    Active,
}

#[derive(Default)]
struct ObserverSession {
    active: bool,
    last_checked_word: String,
    /// Bumped on every start and stop; async results carry the value they were issued under
    generation: u64,
    debouncer: Option<MutationDebouncer>,
    startup_timer: Option<JoinHandle<()>>,
}

/// Owns the start/stop lifecycle and the scan → check → present cycle.
///
/// Events are processed one at a time through [`ObservationController::handle`],
/// so two cycles never interleave.
pub struct ObservationController {
    document: Document,
    config: ObserverConfig,
    roots: Vec<Selector>,
    scanner: TileScanner,
    checker: Arc<dyn WordCheck>,
    presenter: FeedbackPresenter,
    session: ObserverSession,
    events_tx: AsyncSender<ControllerEvent>,
    events_rx: AsyncReceiver<ControllerEvent>,
}

impl ObservationController {
    pub fn new(
        document: Document,
        config: ObserverConfig,
        presenter: FeedbackPresenter,
        checker: Arc<dyn WordCheck>,
    ) -> Result<Self, SelectorError> {
        let roots = config
            .root_selectors
            .iter()
            .map(|s| Selector::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        let scanner = TileScanner::new(&config)?;
        let (events_tx, events_rx) = kanal::unbounded_async();

        Ok(Self {
            document,
            config,
            roots,
            scanner,
            checker,
            presenter,
            session: ObserverSession::default(),
            events_tx,
            events_rx,
        })
    }

    pub fn state(&self) -> ObserverState {
        if self.session.active {
            ObserverState::Active
        } else {
            ObserverState::Inactive
        }
    }

    pub fn last_checked_word(&self) -> &str {
        &self.session.last_checked_word
    }

    pub fn presenter(&self) -> &FeedbackPresenter {
        &self.presenter
    }

    /// Most specific observation root present in the page, else the body
    pub fn find_root(&self) -> NodeId {
        for (selector, source) in self.roots.iter().zip(&self.config.root_selectors) {
            if let Some(root) = self.document.query_selector(selector) {
                tracing::debug!("Observing root matched by `{source}`");
                return root;
            }
        }
        tracing::warn!("No game container found, observing the whole body");
        self.document.body()
    }

    pub fn start(&mut self) {
        if self.session.active {
            tracing::debug!("Observer already active, restarting");
            self.reset_session();
        }

        self.session.generation += 1;
        self.session.active = true;
        let generation = self.session.generation;

        let root = self.find_root();
        let tx = self.events_tx.clone();
        self.session.debouncer = Some(MutationDebouncer::attach(
            &self.document,
            root,
            &self.config.state_attribute,
            Duration::from_millis(self.config.debounce_ms),
            move || {
                if let Err(e) = tx.try_send(ControllerEvent::Fire { generation }) {
                    tracing::warn!("Failed to queue debounced scan: {e}");
                }
            },
        ));

        // First scan does not wait for a mutation
        let tx = self.events_tx.clone();
        let delay = Duration::from_millis(self.config.startup_delay_ms);
        self.session.startup_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(ControllerEvent::Fire { generation }).await.is_err() {
                tracing::debug!("Controller gone before the startup scan");
            }
        }));

        tracing::info!(generation, "Wordle Turtle observer started");
        self.presenter
            .toast("Wordle Turtle is now active!", Severity::Success);
    }

    pub fn stop(&mut self) {
        self.reset_session();

        tracing::info!("Wordle Turtle observer stopped");
        self.presenter
            .toast("Wordle Turtle is now inactive", Severity::Info);
    }

    /// Everything `stop` does except the notification
    fn reset_session(&mut self) {
        self.teardown();
        self.presenter.clear();
        self.session.last_checked_word.clear();
    }

    fn teardown(&mut self) {
        self.session.active = false;
        self.session.generation += 1;
        if let Some(mut debouncer) = self.session.debouncer.take() {
            debouncer.detach();
        }
        if let Some(timer) = self.session.startup_timer.take() {
            timer.abort();
        }
    }

    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.recv().await.ok()
    }

    pub fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Fire { generation } => {
                if self.session.active && generation == self.session.generation {
                    self.run_cycle();
                } else {
                    tracing::debug!(generation, "Ignoring scan from a finished session");
                }
            }
            ControllerEvent::Checked { generation, result } => {
                self.apply_result(generation, result);
            }
        }
    }

    fn run_cycle(&mut self) {
        let candidate = self
            .scanner
            .scan(&self.document)
            .filter(|c| c.len() == self.config.word_length);

        let Some(candidate) = candidate else {
            if !self.session.last_checked_word.is_empty() {
                tracing::debug!("Guess no longer complete, clearing feedback");
                self.presenter.clear();
                self.presenter.hide_toast();
                self.session.last_checked_word.clear();
            }
            return;
        };

        if candidate.as_str() == self.session.last_checked_word {
            tracing::debug!(word = %candidate.as_str(), "Word already checked");
            return;
        }

        // Set before the check resolves so repeated fires do not re-check
        let word = candidate.into_word();
        self.session.last_checked_word = word.clone();

        let checker = Arc::clone(&self.checker);
        let tx = self.events_tx.clone();
        let generation = self.session.generation;
        tracing::debug!(word = %word, "Checking word");
        tokio::spawn(async move {
            let result = checker.check_word(&word).await;
            if tx
                .send(ControllerEvent::Checked { generation, result })
                .await
                .is_err()
            {
                tracing::debug!(word = %word, "Controller gone before check finished");
            }
        });
    }

    fn apply_result(&mut self, generation: u64, result: CheckResult) {
        if !self.session.active || generation != self.session.generation {
            tracing::debug!(word = %result.word(), "Discarding result from a finished session");
            return;
        }
        if result.word() != self.session.last_checked_word {
            tracing::debug!(word = %result.word(), "Discarding result for a superseded word");
            return;
        }

        match result {
            CheckResult::Checked { word, used } => self.presenter.show_result(&word, used),
            CheckResult::Failed { word, error } => self.presenter.show_error(&word, &error),
        }
    }
}

impl Drop for ObservationController {
    fn drop(&mut self) {
        self.teardown();
    }
}

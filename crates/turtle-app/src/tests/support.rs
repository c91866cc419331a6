use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until};
use turtle_config::Config;
use turtle_core::{AnswerChecker, CorpusSource, UsedWordSet, WordListCache, WordListError};
use turtle_dom::Document;

use crate::board::GameBoard;
use crate::check::{CheckResult, WordCheck};
use crate::observer::ObservationController;
use crate::presenter::FeedbackPresenter;

/// Corpus source for caches that are already loaded
pub struct Offline;

#[async_trait]
impl CorpusSource for Offline {
    async fn fetch(&self) -> Result<String, WordListError> {
        Err(WordListError::Fetch("offline".to_string()))
    }
}

pub fn answer_checker(used: &[&str]) -> Arc<AnswerChecker> {
    let cache = WordListCache::preloaded(Arc::new(Offline), UsedWordSet::from_words(used));
    Arc::new(AnswerChecker::new(Arc::new(cache), 5))
}

/// Records every word it is asked about and answers after `delay`
pub struct ScriptedCheck {
    used: Vec<String>,
    delay: Duration,
    failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCheck {
    pub fn new(used: &[&str]) -> Self {
        Self {
            used: used.iter().map(|w| w.to_string()).collect(),
            delay: Duration::ZERO,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, error: &str) -> Self {
        self.failure = Some(error.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WordCheck for ScriptedCheck {
    async fn check_word(&self, word: &str) -> CheckResult {
        self.calls.lock().unwrap().push(word.to_string());
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            Some(error) => CheckResult::Failed {
                word: word.to_string(),
                error: error.clone(),
            },
            None => CheckResult::Checked {
                word: word.to_string(),
                used: self.used.iter().any(|w| w == word),
            },
        }
    }
}

pub fn controller(document: &Document, checker: Arc<dyn WordCheck>) -> ObservationController {
    let config = Config::default();
    let presenter = FeedbackPresenter::new(document.clone(), config.feedback);
    ObservationController::new(document.clone(), config.observer, presenter, checker).unwrap()
}

pub fn type_word(board: &mut GameBoard, word: &str) {
    for letter in word.chars() {
        assert!(board.type_letter(letter));
    }
}

/// Process controller events as they arrive for `period` of (paused) time
pub async fn settle(controller: &mut ObservationController, period: Duration) {
    let deadline = Instant::now() + period;
    loop {
        tokio::select! {
            Some(event) = controller.next_event() => controller.handle(event),
            _ = sleep_until(deadline) => break,
        }
    }
}

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::WordListError;
use crate::parser::parse_word_list;
use crate::source::CorpusSource;

/// Previously used answers, lowercased
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UsedWordSet {
    words: HashSet<String>,
}

impl UsedWordSet {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    /// Terminal for the session
    Failed,
}

type LoadOutcome = Result<Arc<UsedWordSet>, WordListError>;

enum Slot {
    Unloaded,
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Loaded(Arc<UsedWordSet>),
    Failed(WordListError),
}

enum Role {
    Leader(watch::Sender<Option<LoadOutcome>>),
    Waiter(watch::Receiver<Option<LoadOutcome>>),
}

/// Lazily loaded used-word set shared by every checker.
///
/// The first caller fetches and parses; callers arriving meanwhile wait on the
/// same outcome; later callers get the cached set or the cached error.
/// A waiter whose leader is dropped becomes the next leader.
pub struct WordListCache {
    source: Arc<dyn CorpusSource>,
    slot: Mutex<Slot>,
}

impl WordListCache {
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::Unloaded),
        }
    }

    /// Cache that never touches the source
    pub fn preloaded(source: Arc<dyn CorpusSource>, words: UsedWordSet) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::Loaded(Arc::new(words))),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> LoadState {
        match &*self.slot() {
            Slot::Unloaded => LoadState::Unloaded,
            Slot::Loading(_) => LoadState::Loading,
            Slot::Loaded(_) => LoadState::Loaded,
            Slot::Failed(_) => LoadState::Failed,
        }
    }

    /// Number of cached words, 0 until loaded
    pub fn len(&self) -> usize {
        match &*self.slot() {
            Slot::Loaded(words) => words.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn load(&self) -> LoadOutcome {
        loop {
            let role = {
                let mut slot = self.slot();
                match &*slot {
                    Slot::Loaded(words) => return Ok(Arc::clone(words)),
                    Slot::Failed(e) => return Err(e.clone()),
                    Slot::Loading(rx) => Role::Waiter(rx.clone()),
                    Slot::Unloaded => {
                        let (tx, rx) = watch::channel(None);
                        *slot = Slot::Loading(rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Waiter(rx) => {
                    tracing::debug!("Word list is loading, waiting for the pending load");
                    match wait_for_outcome(rx).await {
                        // Leader went away; take over the load
                        Err(WordListError::Cancelled) => continue,
                        outcome => return outcome,
                    }
                }
                Role::Leader(tx) => {
                    let guard = LoadGuard {
                        cache: self,
                        tx: Some(tx),
                    };
                    let outcome = self.fetch_and_parse().await;
                    return guard.complete(outcome);
                }
            }
        }
    }

    async fn fetch_and_parse(&self) -> LoadOutcome {
        let html = self.source.fetch().await?;
        let words = UsedWordSet::from_words(parse_word_list(&html)?);
        tracing::info!("Loaded {} previously used answers", words.len());
        Ok(Arc::new(words))
    }
}

async fn wait_for_outcome(mut rx: watch::Receiver<Option<LoadOutcome>>) -> LoadOutcome {
    loop {
        let current = rx.borrow_and_update().clone();
        if let Some(outcome) = current {
            return outcome;
        }
        if rx.changed().await.is_err() {
            let last = rx.borrow().clone();
            return last.unwrap_or(Err(WordListError::Cancelled));
        }
    }
}

/// Publishes the leader's outcome. If the leader is dropped mid-load the
/// cache returns to `Unloaded` and waiters start over.
struct LoadGuard<'a> {
    cache: &'a WordListCache,
    tx: Option<watch::Sender<Option<LoadOutcome>>>,
}

impl LoadGuard<'_> {
    fn complete(mut self, outcome: LoadOutcome) -> LoadOutcome {
        *self.cache.slot() = match &outcome {
            Ok(words) => Slot::Loaded(Arc::clone(words)),
            Err(e) => {
                tracing::error!(phase = "load", "Word list unavailable: {e}");
                Slot::Failed(e.clone())
            }
        };
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome.clone()));
        }
        outcome
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!("Word list load dropped before completion");
            *self.cache.slot() = Slot::Unloaded;
            tx.send_replace(Some(Err(WordListError::Cancelled)));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::task::JoinSet;

    use super::*;

    struct FakeSource {
        fetches: AtomicUsize,
        delay: Duration,
        response: Result<String, WordListError>,
    }

    impl FakeSource {
        fn new(response: Result<String, WordListError>) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                delay: Duration::from_millis(200),
                response,
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CorpusSource for FakeSource {
        async fn fetch(&self) -> Result<String, WordListError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.response.clone()
        }
    }

    fn corpus(words: &[&str]) -> String {
        format!("<div id=\"alphalist\">{}</div>", words.join("<br>"))
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let source = FakeSource::new(Ok(corpus(&["MANGO", "Cigar"])));
        let cache = Arc::new(WordListCache::new(source.clone()));

        let mut tasks = JoinSet::new();
        for _ in 0..10 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.load().await });
        }

        let mut sets = Vec::new();
        while let Some(result) = tasks.join_next().await {
            sets.push(result.unwrap().unwrap());
        }

        assert_eq!(source.fetches(), 1);
        assert_eq!(sets.len(), 10);
        assert!(sets.iter().all(|s| Arc::ptr_eq(s, &sets[0])));
        assert!(sets[0].contains("mango"));
        assert!(sets[0].contains("CIGAR"));
        assert_eq!(cache.state(), LoadState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_set_is_served_from_memory() {
        let source = FakeSource::new(Ok(corpus(&["board"])));
        let cache = WordListCache::new(source.clone());

        cache.load().await.unwrap();
        cache.load().await.unwrap();

        assert_eq!(source.fetches(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_see_the_same_error() {
        let source = FakeSource::new(Err(WordListError::Status(503)));
        let cache = Arc::new(WordListCache::new(source.clone()));

        let mut tasks = JoinSet::new();
        for _ in 0..5 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.load().await });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap_err(), WordListError::Status(503));
        }
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_sticky() {
        let source = FakeSource::new(Err(WordListError::Fetch("connection refused".into())));
        let cache = WordListCache::new(source.clone());

        assert!(cache.load().await.is_err());
        assert_eq!(cache.state(), LoadState::Failed);
        assert!(matches!(cache.load().await, Err(WordListError::Fetch(_))));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_container_is_a_parse_error() {
        let source = FakeSource::new(Ok("<html><body>maintenance</body></html>".to_string()));
        let cache = WordListCache::new(source);

        assert!(matches!(cache.load().await, Err(WordListError::Parse(_))));
        assert_eq!(cache.state(), LoadState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_leader_releases_the_slot() {
        let source = FakeSource::new(Ok(corpus(&["crane"])));
        let cache = WordListCache::new(source.clone());

        let aborted = tokio::time::timeout(Duration::from_millis(50), cache.load()).await;
        assert!(aborted.is_err());
        assert_eq!(cache.state(), LoadState::Unloaded);

        assert!(cache.load().await.unwrap().contains("crane"));
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_takes_over_from_dropped_leader() {
        let source = FakeSource::new(Ok(corpus(&["crane"])));
        let cache = Arc::new(WordListCache::new(source.clone()));

        let leader = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.load().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let waiter = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.load().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.state(), LoadState::Loading);

        leader.abort();
        let words = waiter.await.unwrap().unwrap();

        assert!(words.contains("crane"));
        assert_eq!(source.fetches(), 2);
        assert_eq!(cache.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn preloaded_cache_never_fetches() {
        let source = FakeSource::new(Err(WordListError::Status(500)));
        let cache = WordListCache::preloaded(source.clone(), UsedWordSet::from_words(["mince"]));

        assert!(cache.load().await.unwrap().contains("mince"));
        assert_eq!(source.fetches(), 0);
    }
}

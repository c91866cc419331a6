use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;
use turtle_types::CheckReply;

/// Counters for the checks answered by the background
#[derive(Clone, Debug, Default)]
pub struct CheckStatus {
    pub check_count: u64,
    pub used_count: u64,
    pub error_count: u64,
    pub last_word: Option<String>,
    pub last_check_time: Option<SystemTime>,
}

impl CheckStatus {
    pub fn record(&mut self, word: &str, reply: &CheckReply) {
        self.check_count += 1;
        match reply {
            CheckReply::Checked(data) if data.used => self.used_count += 1,
            CheckReply::Checked(_) => {}
            CheckReply::Failed { .. } => self.error_count += 1,
        }
        self.last_word = Some(word.to_string());
        self.last_check_time = Some(SystemTime::now());
    }
}

/// Application status
pub struct AppStatus {
    pub checks: Arc<RwLock<CheckStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            checks: Arc::new(RwLock::new(CheckStatus::default())),
        }
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}

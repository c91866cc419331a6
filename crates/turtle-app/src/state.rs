use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;
use turtle_config::Config;
use turtle_types::Badge;

use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Whether the user last asked the page to observe
    pub observing: AtomicBool,
    pub badge: RwLock<Badge>,
    pub status: AppStatus,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            observing: AtomicBool::new(false),
            badge: RwLock::new(Badge::default()),
            status: AppStatus::new(),
        }
    }
}

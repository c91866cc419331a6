use std::env;

use serde::{Deserialize, Serialize};

fn default_toast_ms() -> u64 {
    4000
}

fn default_fade_ms() -> u64 {
    300
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FeedbackConfig {
    /// How long a toast stays visible
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    /// Fade-out duration before the toast element is removed
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            toast_ms: default_toast_ms(),
            fade_ms: default_fade_ms(),
        }
    }
}

impl FeedbackConfig {
    pub fn new() -> Self {
        let toast_ms = env::var("TOAST_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_toast_ms);

        Self {
            toast_ms,
            ..Self::default()
        }
    }
}

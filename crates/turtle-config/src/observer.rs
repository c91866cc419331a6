use std::env;

use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    500
}

fn default_startup_delay_ms() -> u64 {
    500
}

fn default_word_length() -> usize {
    5
}

fn default_tile_selector() -> String {
    ".Tile-module_tile__UWEHN".to_string()
}

fn default_state_attribute() -> String {
    "data-state".to_string()
}

fn default_pending_state() -> String {
    "tbd".to_string()
}

fn default_root_selectors() -> Vec<String> {
    vec![
        ".App-module_game__yruqo".to_string(),
        "[role=\"img\"]".to_string(),
        "game-app".to_string(),
    ]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ObserverConfig {
    /// Quiet period after the last mutation before a scan runs
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Delay of the first scan after starting
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    #[serde(default = "default_word_length")]
    pub word_length: usize,
    #[serde(default = "default_tile_selector")]
    pub tile_selector: String,
    /// Attribute carrying the tile evaluation state
    #[serde(default = "default_state_attribute")]
    pub state_attribute: String,
    /// Evaluation state of tiles in the row being typed
    #[serde(default = "default_pending_state")]
    pub pending_state: String,
    /// Candidate observation roots, most specific first. The body is the last resort.
    #[serde(default = "default_root_selectors")]
    pub root_selectors: Vec<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            startup_delay_ms: default_startup_delay_ms(),
            word_length: default_word_length(),
            tile_selector: default_tile_selector(),
            state_attribute: default_state_attribute(),
            pending_state: default_pending_state(),
            root_selectors: default_root_selectors(),
        }
    }
}

impl ObserverConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        let debounce_ms = env::var("DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.debounce_ms);

        let startup_delay_ms = env::var("STARTUP_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.startup_delay_ms);

        Self {
            debounce_ms,
            startup_delay_ms,
            ..defaults
        }
    }
}

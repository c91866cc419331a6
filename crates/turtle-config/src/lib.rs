use std::env;

use serde::{Deserialize, Serialize};

use self::feedback::FeedbackConfig;
use self::network::NetworkConfig;
use self::observer::ObserverConfig;

pub mod feedback;
pub mod network;
pub mod observer;

fn default_channel_capacity() -> usize {
    64
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub observer: ObserverConfig,
    pub feedback: FeedbackConfig,

    /// Capacity of the channels between the page and the background
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            observer: ObserverConfig::default(),
            feedback: FeedbackConfig::default(),
            channel_capacity: default_channel_capacity(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let channel_capacity = env::var("CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64); // 64 in-flight messages default

        let log_json = env::var("TURTLE_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Config {
            network: NetworkConfig::new(),
            observer: ObserverConfig::new(),
            feedback: FeedbackConfig::new(),

            channel_capacity,
            log_json,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }

    /// Background color of the toast
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Success => "#22c55e",
            Severity::Warning => "#f59e0b",
            Severity::Error => "#ef4444",
            Severity::Info => "#3b82f6",
        }
    }
}

/// Activation badge shown next to the toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Badge {
    On,
    #[default]
    Off,
    /// Page is not a game page
    NotApplicable,
    Error,
}

impl Badge {
    pub fn text(&self) -> &'static str {
        match self {
            Badge::On => "ON",
            Badge::Off => "OFF",
            Badge::NotApplicable => "N/A",
            Badge::Error => "ERR",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Badge::On => "#22c55e",
            Badge::Off | Badge::Error => "#ef4444",
            Badge::NotApplicable => "#666666",
        }
    }
}

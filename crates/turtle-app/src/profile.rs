use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use turtle_config::Config;

/// Profile picked up from the working directory when no path is given
pub const DEFAULT_PROFILE: &str = "turtle.json";

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    pub value: Config,
}

fn load_profile(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path).with_context(|| format!("opening profile {}", path.display()))?;
    let reader = BufReader::new(file);
    let profile: Profile = serde_json::from_reader(reader)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    tracing::info!(profile = %profile.name, "Loaded profile from {}", path.display());
    Ok(profile.value)
}

/// Load the profile at `path`, else `turtle.json` if present, else the
/// environment and built-in defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return load_profile(path);
    }

    let default = Path::new(DEFAULT_PROFILE);
    if default.exists() {
        load_profile(default)
    } else {
        Ok(Config::new())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn explicit_profile_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("turtle-profile-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"name": "fast", "value": {"observer": {"debounce_ms": 100}}}"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.observer.debounce_ms, 100);
        assert_eq!(config.feedback.toast_ms, 4000);
    }

    #[test]
    fn missing_profile_is_an_error() {
        let path = std::env::temp_dir().join("turtle-profile-does-not-exist.json");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("opening profile"));
    }
}

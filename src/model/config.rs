use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum task text length, in characters
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
    /// Quiet period before pending changes are written
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    /// Name of the storage slot holding the task document
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Largest document the storage slot accepts
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
    /// How long TUI notifications stay visible
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_text_len: default_max_text_len(),
            save_debounce_ms: default_save_debounce_ms(),
            storage_key: default_storage_key(),
            quota_bytes: default_quota_bytes(),
            toast_ms: default_toast_ms(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

fn default_max_text_len() -> usize {
    140
}

fn default_save_debounce_ms() -> u64 {
    250
}

fn default_storage_key() -> String {
    "eisenhower_matrix_v1".to_string()
}

/// Same order of magnitude as a browser's per-origin local storage
fn default_quota_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_toast_ms() -> u64 {
    2500
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme overrides: color name -> "#RRGGBB"
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_text_len, 140);
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
        assert_eq!(config.storage_key, "eisenhower_matrix_v1");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: Config = toml::from_str(
            r##"
max_text_len = 80

[ui.colors]
highlight = "#FF0000"
"##,
        )
        .unwrap();
        assert_eq!(config.max_text_len, 80);
        assert_eq!(config.save_debounce_ms, 250);
        assert_eq!(config.ui.colors.get("highlight").map(String::as_str), Some("#FF0000"));
    }
}

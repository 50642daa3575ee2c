use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

use crate::state::Theme;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variables searched for the API key, highest priority first.
pub const API_KEY_VARS: [&str; 9] = [
    "API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "VITE_API_KEY",
    "VITE_GEMINI_API_KEY",
    "NEXT_PUBLIC_API_KEY",
    "NEXT_PUBLIC_GEMINI_API_KEY",
    "REACT_APP_API_KEY",
    "REACT_APP_GEMINI_API_KEY",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub theme: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme.as_deref().and_then(Theme::from_str)
    }

    /// Where mood and journal history live.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
        Ok(base.join("askdoc"))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("askdoc").join("config.json"))
    }
}

/// First non-empty value among [`API_KEY_VARS`], else the non-empty fallback.
pub fn resolve_api_key_with<F>(lookup: F, fallback: Option<String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .chain(fallback)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_non_empty_variable_wins() {
        let vars = env(&[
            ("API_KEY", "  "),
            ("VITE_API_KEY", "vite-key"),
            ("REACT_APP_API_KEY", "react-key"),
        ]);
        let key = resolve_api_key_with(|name| vars.get(name).cloned(), None);
        assert_eq!(key.as_deref(), Some("vite-key"));
    }

    #[test]
    fn test_priority_order() {
        let vars = env(&[("GEMINI_API_KEY", "gemini"), ("API_KEY", "plain")]);
        let key = resolve_api_key_with(|name| vars.get(name).cloned(), None);
        assert_eq!(key.as_deref(), Some("plain"));
    }

    #[test]
    fn test_config_key_is_last_resort() {
        let key = resolve_api_key_with(|_| None, Some("from-config".to_string()));
        assert_eq!(key.as_deref(), Some("from-config"));

        let vars = env(&[("GOOGLE_API_KEY", "google")]);
        let key = resolve_api_key_with(|name| vars.get(name).cloned(), Some("cfg".to_string()));
        assert_eq!(key.as_deref(), Some("google"));
    }

    #[test]
    fn test_no_key_anywhere() {
        assert_eq!(resolve_api_key_with(|_| None, None), None);
        assert_eq!(resolve_api_key_with(|_| None, Some(String::new())), None);
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.theme(), None);

        let config: Config =
            serde_json::from_str(r#"{"model":"gemini-2.0-flash","theme":"light"}"#).unwrap();
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.theme(), Some(Theme::Light));
    }
}

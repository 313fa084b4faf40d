use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use arcana_core::DEFAULT_MODEL;

/// Server settings loaded from an optional yaml file. API keys never live
/// here; they come from the environment via the providers' `from_env`
/// constructors so a config file can be committed safely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_path: String,
    pub model: String,
    pub gemini_api_base: String,
    pub tts_api_base: String,
    pub identity_api_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".into(),
            database_path: "arcana.db".into(),
            model: DEFAULT_MODEL.into(),
            gemini_api_base: arcana_provider::gemini::GEMINI_API_BASE.into(),
            tts_api_base: arcana_speech::google::TTS_API_BASE.into(),
            identity_api_base: arcana_auth::firebase::IDENTITY_API_BASE.into(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

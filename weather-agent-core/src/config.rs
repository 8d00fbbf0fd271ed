use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Top-level configuration stored on disk. Environment variables
/// (`OPENAI_API_KEY`, `OPENAI_MODEL`, `TELEGRAM_BOT_TOKEN`) override the
/// file, so the agent also runs without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API key used by every model call in a pipeline run.
    pub openai_api_key: Option<String>,

    /// Chat model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Telegram bot token; only required for `weather-agent bot`.
    pub telegram_bot_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            telegram_bot_token: None,
        }
    }
}

impl Config {
    /// Load config from disk (or start from defaults if the file doesn't
    /// exist yet), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;

        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.overlay(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup; the environment in
    /// production, an arbitrary map in tests.
    fn overlay(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = Some(token);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-agent", "weather-agent")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenAI API key configured.\n\
                 Hint: run `weather-agent configure` or set OPENAI_API_KEY."
            )
        })
    }

    pub fn require_telegram_bot_token(&self) -> Result<&str> {
        self.telegram_bot_token.as_deref().ok_or_else(|| {
            anyhow!(
                "No Telegram bot token configured.\n\
                 Hint: run `weather-agent configure` or set TELEGRAM_BOT_TOKEN."
            )
        })
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_interpret::{LlmSettings, Provider};

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    /// Empty means the provider's default model
    pub model: String,
    /// Override for proxies or OpenAI-compatible servers
    pub base_url: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub currency_symbol: String,
    /// IANA name used to decide what "today" is
    pub timezone: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: Provider::default().default_model().to_string(),
            base_url: None,
            temperature: 0.0,
            request_timeout_secs: Some(30),
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl LlmSection {
    pub fn settings(&self) -> LlmSettings {
        let model = self.model.trim();
        LlmSettings {
            provider: self.provider,
            model: if model.is_empty() {
                self.provider.default_model().to_string()
            } else {
                model.to_string()
            },
            base_url: self.base_url.clone().filter(|u| !u.trim().is_empty()),
            temperature: self.temperature,
            timeout: self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Missing file means defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.display
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {}", cfg.display.timezone))?;
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

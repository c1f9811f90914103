use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use triage_core::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub defaults: DefaultsSection,
    pub advisor: AdvisorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    /// Preset used when no custom weights are stored.
    pub strategy: String,
    pub consider_weekends: bool,
    /// IANA zone that decides what "today" is.
    pub timezone: String,
    pub user: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            strategy: "smart_balance".to_string(),
            consider_weekends: true,
            timezone: "UTC".to_string(),
            user: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSection {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    /// Env var holding the API key. Empty means the provider default.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AdvisorSection {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: String::new(),
            api_key_env: String::new(),
            temperature: 0.2,
            timeout_secs: 10,
        }
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.defaults.strategy, "smart_balance");
        assert_eq!(cfg.advisor.timeout_secs, 10);
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "[defaults]\ntimezone = \"America/Chicago\"\n\n[engine.tiers]\ncritical = 0.95\n",
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.defaults.timezone, "America/Chicago");
        assert!(cfg.defaults.consider_weekends);
        assert_eq!(cfg.engine.tiers.critical, 0.95);
        assert_eq!(cfg.engine.tiers.high, 0.7);
    }

    #[test]
    fn init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path()).unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.advisor.provider, "openai");
    }
}

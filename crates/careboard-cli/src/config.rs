use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    pub format: Option<String>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".careboard");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all() -> Result<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(&path)?;
    let cfg: ConfigFile = toml::from_str(&content)?;
    Ok(cfg)
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let all = load_all()?;
    Ok(all
        .into_iter()
        .find(|(k, _)| k == profile)
        .map(|(_, v)| v)
        .unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all()?;
    all.insert(
        profile.to_string(),
        ProfileConfig {
            base_url: config.base_url.clone(),
            format: config.format.clone(),
        },
    );
    let content = toml::to_string_pretty(&all)?;
    fs::write(config_path()?, content)?;
    Ok(())
}

/// Flag beats env beats config file; `--mock` needs no URL at all.
pub fn resolve_base_url(cli_base_url: &Option<String>, profile: &str) -> Result<Option<String>> {
    if let Some(url) = cli_base_url {
        return Ok(Some(url.clone()));
    }
    let cfg = load_profile(profile)?;
    Ok(cfg.base_url)
}

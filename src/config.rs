// hccli - CLI for the Honeycomb API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error(
        "API key is required; pass --api-key, set HONEYCOMB_API_KEY, or run `hccli configure --key <key>`"
    )]
    MissingApiKey,
    #[error("timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Command-line values that take precedence over anything on disk.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".hccli.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("HCCLI_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("hccli").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

/// Merges flags over the project file over the user file and fills in
/// defaults, producing the one client configuration for this invocation.
pub fn resolve(cwd: &Path, overrides: Overrides) -> Result<ClientConfig> {
    let mut merged = load(cwd)?;

    if let Some(key) = overrides.api_key {
        merged.api_key = Some(key);
    }
    if let Some(url) = overrides.api_url {
        merged.api_url = Some(url);
    }
    if let Some(secs) = overrides.timeout_secs {
        merged.timeout_secs = Some(secs);
    }

    let api_key = merged
        .api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let base_url = merged
        .api_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = match merged.timeout_secs {
        Some(0) => return Err(ConfigError::ZeroTimeout.into()),
        Some(secs) => Duration::from_secs(secs),
        None => DEFAULT_TIMEOUT,
    };

    Ok(ClientConfig {
        api_key,
        base_url,
        timeout,
    })
}

/// The merged configuration with the key replaced by a mask, for display.
pub fn masked(config: &Config) -> Config {
    let mut masked = config.clone();
    if masked.api_key.is_some() {
        masked.api_key = Some("*****".into());
    }
    masked
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        api_key: local.api_key.or(user.api_key),
        api_url: local.api_url.or(user.api_url),
        timeout_secs: local.timeout_secs.or(user.timeout_secs),
    }
}

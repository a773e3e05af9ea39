//! Server list: YAML stored under the XDG config dir:
//! $XDG_CONFIG_HOME/monday/config.yml (fallback ~/.config/monday/config.yml).
//! `MONDAY_CONFIG` names the file directly and wins over both.

use monday_agent::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{error, info};

const APP_DIR: &str = "monday";
const CONFIG_FILE: &str = "config.yml";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate a home directory for the config file")]
    NoHome,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    #[serde(rename = "ip")]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl ServerEntry {
    /// Unset or zero means the default port; `None` when out of range.
    pub fn effective_port(&self) -> Option<u16> {
        match self.port {
            None | Some(0) => Some(DEFAULT_PORT),
            Some(p) => u16::try_from(p).ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    /// Per-fetch deadline in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ServerList {
    /// `MONDAY_TIMEOUT_SECS`, then the file's `timeout`, then 10s.
    pub fn fetch_timeout(&self) -> Duration {
        env::var("MONDAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .or(self.timeout)
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = non_empty_var("XDG_CONFIG_HOME") {
        return Ok(xdg.join(APP_DIR));
    }
    dirs_next::home_dir()
        .map(|home| home.join(".config").join(APP_DIR))
        .ok_or(ConfigError::NoHome)
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    match non_empty_var("MONDAY_CONFIG") {
        Some(path) => Ok(path),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// Create the config file (and its directory) if absent. Returns whether
/// the file was created; calling it again is a no-op.
pub fn ensure(path: &Path) -> Result<bool, ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load(path: &Path) -> Result<ServerList, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// An empty (or comment-only) document is an empty server list.
pub fn parse(text: &str) -> Result<ServerList, serde_yaml::Error> {
    let blank = text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(ServerList::default());
    }
    Ok(serde_yaml::from_str::<Option<ServerList>>(text)?.unwrap_or_default())
}

/// Locate, create if needed and load the server list. Failures are logged
/// and yield an empty list.
pub fn discover() -> ServerList {
    let path = match config_path() {
        Ok(path) => path,
        Err(e) => {
            error!("{e}");
            return ServerList::default();
        }
    };
    match ensure(&path) {
        Ok(true) => info!("created empty config at {}", path.display()),
        Ok(false) => {}
        Err(e) => error!("config setup failed: {e}"),
    }
    let list = load(&path).unwrap_or_else(|e| {
        error!("config unreadable: {e}");
        ServerList::default()
    });
    if list.servers.is_empty() {
        info!("no servers configured in {}", path.display());
    }
    list
}

//! Instance configuration: a YAML list of servers plus environment overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yml";
const TOKEN_ENV_PREFIX: &str = "ARGONAUT_TOKEN_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parse: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One server the client can connect to.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

impl Instance {
    /// Env var consulted for this instance's token, e.g. `ARGONAUT_TOKEN_PROD_EU`.
    pub fn token_env_var(&self) -> String {
        let suffix: String =
            self.name.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' }).collect();
        format!("{}{}", TOKEN_ENV_PREFIX, suffix)
    }

    /// Base URL with a scheme; bare `host:port` gets `https://`.
    pub fn base_url(&self) -> String {
        let url = self.url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl Config {
    /// Read, parse, apply env token overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io { path: path.to_path_buf(), source: e },
        })?;
        let mut cfg = Self::parse(&text)?;
        cfg.apply_env_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        info!(path = %path.display(), instances = cfg.instances.len(), "config: loaded");
        Ok(cfg)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Replace tokens from `ARGONAUT_TOKEN_<NAME>`; `lookup` abstracts the environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for inst in self.instances.iter_mut() {
            let var = inst.token_env_var();
            if let Some(tok) = lookup(&var).filter(|t| !t.is_empty()) {
                debug!(instance = %inst.name, var = %var, "config: token from env");
                inst.token = tok;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::Invalid("no instances configured".into()));
        }
        for (i, inst) in self.instances.iter().enumerate() {
            let label = if inst.name.is_empty() { format!("#{}", i) } else { inst.name.clone() };
            if inst.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("instance {}: url is required", label)));
            }
            if inst.token.is_empty() {
                return Err(ConfigError::Invalid(format!("instance {}: token is required", label)));
            }
        }
        Ok(())
    }

    /// Instance by name, or the first one when `name` is `None`.
    pub fn instance(&self, name: Option<&str>) -> Option<&Instance> {
        match name {
            Some(n) => self.instances.iter().find(|i| i.name == n),
            None => self.instances.first(),
        }
    }

    pub fn needs_selection(&self) -> bool { self.instances.len() > 1 }
}

/// HTTP client tuning read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self { Self { timeout_secs: 30 } }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("ARGONAUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(ApiConfig::default().timeout_secs);
        Self { timeout_secs }
    }
}

/// Header text describing the connected server and, on the tree screen, the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceInfo {
    pub url: String,
    pub name: String,
    pub app: Option<AppInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub health: String,
    pub sync: String,
}

impl InstanceInfo {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self { url: url.into(), name: name.into(), app: None }
    }

    pub fn for_instance(inst: &Instance) -> Self { Self::new(inst.url.clone(), inst.name.clone()) }

    pub fn with_app(mut self, name: impl Into<String>, health: impl Into<String>, sync: impl Into<String>) -> Self {
        self.app = Some(AppInfo { name: name.into(), health: health.into(), sync: sync.into() });
        self
    }
}

impl fmt::Display for InstanceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "URL: {}\nName: {}", self.url, self.name)?;
        if let Some(app) = self.app.as_ref().filter(|a| !a.name.is_empty()) {
            write!(f, "\nApp: {}", app.name)?;
            if !app.health.is_empty() {
                write!(f, " (Health: {})", app.health)?;
            }
            if !app.sync.is_empty() {
                write!(f, " (Sync: {})", app.sync)?;
            }
        }
        Ok(())
    }
}

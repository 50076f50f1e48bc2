//! Argonaut server API surface.
//!
//! Frontends (TUI, CLI) depend on the [`ArgoApi`] trait only. [`HttpApi`] talks to a
//! live server over REST; [`MockApi`] serves canned data for tests.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use argonaut_core::{Application, ResourceRecord};
use serde::{Deserialize, Serialize};

pub mod config;
mod http;
mod mock;
pub mod wire;

pub use config::{ApiConfig, Config, ConfigError, Instance, InstanceInfo};
pub use http::HttpApi;
pub use mock::MockApi;

/// API errors. Payloads are plain strings so errors can cross task and process boundaries.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("decode: {0}")]
    Decode(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("config: {0}")]
    Config(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// How hard the server should re-read application sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefreshKind {
    #[default]
    Normal,
    Hard,
}

impl RefreshKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshKind::Normal => "normal",
            RefreshKind::Hard => "hard",
        }
    }
}

impl fmt::Display for RefreshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RefreshKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(RefreshKind::Normal),
            "hard" => Ok(RefreshKind::Hard),
            other => Err(format!("unknown refresh kind: {}", other)),
        }
    }
}

/// Server operations used by the frontends.
#[async_trait::async_trait]
pub trait ArgoApi: Send + Sync {
    /// All applications visible to the configured token.
    async fn list_applications(&self) -> ApiResult<Vec<Application>>;

    /// Resource records for one application, with per-resource sync status joined in.
    async fn resource_tree(&self, app: &str) -> ApiResult<Vec<ResourceRecord>>;

    async fn sync_application(&self, app: &str) -> ApiResult<()>;

    async fn delete_application(&self, app: &str) -> ApiResult<()>;

    async fn refresh_application(&self, app: &str, kind: RefreshKind) -> ApiResult<()>;
}

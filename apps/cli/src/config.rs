//! Uploader configuration management.
//!
//! Settings live in a single JSON file:
//! - Linux/macOS: `$XDG_CONFIG_HOME/cfupload/config.json` (or `~/.config/...`)
//! - Windows:     `%APPDATA%\cfupload\config.json`
//!
//! `CFUPLOAD_SPACE_ID`, `CFUPLOAD_CMA_TOKEN` and `CFUPLOAD_MODEL_ID`
//! override the file values when set and non-empty.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use cfupload_cma_client::RemoteCredentials;
use cfupload_cma_client::client::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPLOAD_BASE};
use cfupload_publish::PollPolicy;
use serde::{Deserialize, Serialize};

pub const ENV_SPACE_ID: &str = "CFUPLOAD_SPACE_ID";
pub const ENV_CMA_TOKEN: &str = "CFUPLOAD_CMA_TOKEN";
pub const ENV_MODEL_ID: &str = "CFUPLOAD_MODEL_ID";

/// Uploader configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Contentful space ID.
    #[serde(default)]
    pub space_id: String,

    /// Content Management API token.
    #[serde(default)]
    pub cma_token: String,

    /// Content model ID for image entries.
    #[serde(default)]
    pub model_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_backoff: Option<f64>,

    /// Per-request deadline for API calls and image downloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl UploaderConfig {
    /// Loads configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Like [`load_from`](Self::load_from), but an unparseable file is an error.
    ///
    /// Commands that rewrite the file load it this way.
    pub fn load_strict(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid configuration file", path.display()))
    }

    /// Saves configuration to `path` with owner-only permissions.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, &json)?;
        set_permissions_0600(path);

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Applies credential overrides from the environment.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.space_id, ENV_SPACE_ID);
        set(&mut self.cma_token, ENV_CMA_TOKEN);
        set(&mut self.model_id, ENV_MODEL_ID);
        self
    }

    pub fn credentials(&self) -> RemoteCredentials {
        RemoteCredentials::new(
            self.space_id.trim(),
            self.cma_token.trim(),
            self.model_id.trim(),
        )
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn upload_base(&self) -> &str {
        self.upload_base.as_deref().unwrap_or(DEFAULT_UPLOAD_BASE)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Poll policy with any configured overrides applied.
    pub fn poll_policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::default();
        if let Some(attempts) = self.poll_attempts {
            policy.attempts = attempts;
        }
        if let Some(ms) = self.poll_interval_ms {
            policy.interval = Duration::from_millis(ms);
        }
        if let Some(backoff) = self.poll_backoff {
            policy.backoff = backoff;
        }
        policy
    }

    /// Copy safe to print: the token is masked.
    pub fn redacted(&self) -> Self {
        Self {
            cma_token: mask_token(&self.cma_token),
            ..self.clone()
        }
    }
}

/// Keeps the last four characters of a token.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    config_base_dir().join("cfupload").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}

//! Process-wide configuration, read once at startup.
//!
//! Server settings come from an optional `feedbox.toml`; the tracker
//! credential and target repository come from the environment. Both are
//! built into plain structs that the server hands to request workers by
//! reference.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::app_dirs;

/// Default filename for server settings inside the `.feedbox` directory.
pub const CONFIG_FILE_NAME: &str = "feedbox.toml";
/// Environment variable holding the GitHub token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Environment variable holding the target repository owner.
pub const OWNER_ENV: &str = "GITHUB_REPO_OWNER";
/// Environment variable holding the target repository name.
pub const REPO_ENV: &str = "GITHUB_REPO_NAME";
/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "FEEDBOX_BIND";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are absent or blank.
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnv { names: Vec<&'static str> },
    /// A value was present but unusable.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the settings file.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The default settings location could not be resolved.
    #[error(transparent)]
    AppDir(#[from] app_dirs::AppDirError),
}

/// HTTP server settings persisted in `feedbox.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
    #[serde(default = "default_repo_details_path")]
    pub repo_details_path: String,
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Value of `Access-Control-Allow-Origin` on every response.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            submit_path: default_submit_path(),
            repo_details_path: default_repo_details_path(),
            api_base: default_api_base(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl ServerSettings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(BIND_ENV).filter(|value| !value.trim().is_empty()) {
            self.bind_addr = bind.trim().to_string();
        }
    }

    /// Check paths and the API base before the server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("submit_path", &self.submit_path),
            ("repo_details_path", &self.repo_details_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("`{path}` must start with '/'"),
                });
            }
        }
        if self.submit_path == self.repo_details_path {
            return Err(ConfigError::Invalid {
                field: "repo_details_path",
                reason: "must differ from submit_path".to_string(),
            });
        }
        let url = Url::parse(&self.api_base).map_err(|err| ConfigError::Invalid {
            field: "api_base",
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "api_base",
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(())
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_submit_path() -> String {
    "/submit-feedback".to_string()
}

fn default_repo_details_path() -> String {
    "/repo-details".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_allowed_origin() -> String {
    "*".to_string()
}

/// Credential and target repository for the issue tracker.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}

impl TrackerConfig {
    /// Read the tracker configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the tracker configuration from an arbitrary key lookup.
    ///
    /// Blank values count as missing; every missing name is reported.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let token = read(TOKEN_ENV);
        let owner = read(OWNER_ENV);
        let repo = read(REPO_ENV);
        let (Some(token), Some(owner), Some(repo)) = (token.clone(), owner.clone(), repo.clone())
        else {
            let names = [(TOKEN_ENV, token), (OWNER_ENV, owner), (REPO_ENV, repo)]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
            return Err(ConfigError::MissingEnv { names });
        };
        check_slug_part(OWNER_ENV, &owner)?;
        check_slug_part(REPO_ENV, &repo)?;
        Ok(Self { token, owner, repo })
    }

    /// `owner/repo` slug used in API paths and logs.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn check_slug_part(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if valid && value != "." && value != ".." {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        reason: format!("`{value}` is not a valid GitHub name"),
    })
}

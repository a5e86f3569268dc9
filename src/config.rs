//! Configuration module for loopia-dns
//!
//! This module handles loading and validating configuration from files and environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::constants::{
    DEFAULT_TIMEOUT_SECS, ENV_ENDPOINT, ENV_PASSWORD, ENV_TIMEOUT, ENV_USERNAME,
    LOOPIA_DEFAULT_ENDPOINT, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
use crate::error::{Error, Result};

//==============================================================================
// Config
//==============================================================================

/// Connection configuration for the Loopia API
///
/// The password is wrapped in `Zeroizing` so it is cleared from memory when
/// dropped, and is never printed by `Debug`.
///
/// # Configuration Loading Priority
///
/// 1. Environment variables (highest priority)
/// 2. Config file (TOML)
/// 3. Defaults (lowest priority)
#[derive(Clone, ZeroizeOnDrop)]
pub struct Config {
    /// Loopia API username (e.g. "user@loopiaapi")
    #[zeroize(skip)]
    pub username: String,
    /// Loopia API password
    #[zeroize(skip)]
    pub password: Zeroizing<String>,
    /// XML-RPC endpoint
    ///
    /// Default: the production Loopia endpoint. Overridden mainly for testing.
    #[zeroize(skip)]
    pub endpoint: String,
    /// HTTP request timeout
    ///
    /// Default: 30 seconds
    #[zeroize(skip)]
    pub timeout: Duration,
    /// Enable verbose logging
    #[zeroize(skip)]
    pub verbose: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Builds a validated configuration from explicit values
    ///
    /// `endpoint` falls back to the production endpoint when `None` or empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the username or password is empty or the
    /// endpoint is not an http(s) URL.
    pub fn new(username: &str, password: &str, endpoint: Option<&str>) -> Result<Self> {
        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .unwrap_or(LOOPIA_DEFAULT_ENDPOINT);
        let config = Self {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verbose: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from file and environment variables
    ///
    /// # Environment Variables
    ///
    /// - `LOOPIA_USERNAME` - API username
    /// - `LOOPIA_PASSWORD` - API password
    /// - `LOOPIA_ENDPOINT` - endpoint override
    /// - `LOOPIA_TIMEOUT` - request timeout in seconds
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load_from_file(config_path)?;
        Self::override_with_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file, defaulting missing fields
    fn load_from_file(config_path: Option<PathBuf>) -> Result<Self> {
        let mut username = String::new();
        let mut password = String::new();
        let mut endpoint = LOOPIA_DEFAULT_ENDPOINT.to_string();
        let mut timeout = DEFAULT_TIMEOUT_SECS;
        let mut verbose = false;

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                let toml_config: TomlConfig = toml::from_str(&content)
                    .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))?;

                username = toml_config.username.unwrap_or_default();
                password = toml_config.password.unwrap_or_default();
                if let Some(v) = toml_config.endpoint.filter(|v| !v.is_empty()) {
                    endpoint = v;
                }
                timeout = toml_config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
                verbose = toml_config.verbose.unwrap_or(false);
            }
        }

        Ok(Self {
            username,
            password: Zeroizing::new(password),
            endpoint,
            timeout: Duration::from_secs(timeout),
            verbose,
        })
    }

    /// Overrides configuration values with non-empty environment variables
    fn override_with_env(config: &mut Self) -> Result<()> {
        if let Ok(v) = env::var(ENV_USERNAME) {
            if !v.is_empty() {
                config.username = v;
            }
        }
        if let Ok(v) = env::var(ENV_PASSWORD) {
            if !v.is_empty() {
                config.password = Zeroizing::new(v);
            }
        }
        if let Ok(v) = env::var(ENV_ENDPOINT) {
            if !v.is_empty() {
                config.endpoint = v;
            }
        }
        if let Ok(v) = env::var(ENV_TIMEOUT) {
            if !v.is_empty() {
                let secs: u64 = v
                    .trim()
                    .parse()
                    .map_err(|_| Error::config(format!("Invalid {} value: {}", ENV_TIMEOUT, v)))?;
                config.timeout = Duration::from_secs(secs);
            }
        }
        Ok(())
    }

    /// Ensures credentials are present and the endpoint and timeout are usable
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::config(format!("Missing {}", ENV_USERNAME)));
        }
        if self.password.as_str().is_empty() {
            return Err(Error::config(format!("Missing {}", ENV_PASSWORD)));
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("Invalid endpoint {}: {}", self.endpoint, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config(format!(
                "endpoint must use http or https, got: {}",
                url.scheme()
            )));
        }

        let timeout_secs = self.timeout.as_secs();
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(Error::config(format!(
                "timeout must be between {} and {} seconds, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, timeout_secs
            )));
        }

        Ok(())
    }
}

/// TOML configuration file structure
#[derive(Debug, serde::Deserialize)]
struct TomlConfig {
    username: Option<String>,
    password: Option<String>,
    endpoint: Option<String>,
    timeout: Option<u64>,
    verbose: Option<bool>,
}

//==============================================================================
// Tests
//==============================================================================

//! Configuration types for DNS-01 challenge handling
//!
//! The core only needs a resolved [`Credentials`] value. Loading it from a
//! credentials file lives here so that every host reads the same formats:
//!
//! - certbot INI style: `dns_hetzner_api_token = <token>`
//! - JSON: `{"api_token": "<token>"}` or `{"token": "<token>"}`
//! - plain text: the whole file is the token

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Keys accepted for the API token in INI credential files
const TOKEN_KEYS: &[&str] = &["dns_hetzner_api_token", "hetzner_api_token", "api_token"];

/// Default seconds to wait for DNS propagation after `perform`
pub const DEFAULT_PROPAGATION_SECONDS: u64 = 60;

/// Provider credentials
///
/// The Debug implementation never exposes the token.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// API token
    /// ⚠️ NEVER log this value
    pub api_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from a token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
        }
    }

    /// Validate the credentials
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::config("API token cannot be empty"));
        }
        Ok(())
    }

    /// Load credentials from a file
    ///
    /// Warns when the file is readable by group or others.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(|e| {
                Error::config(format!(
                    "Failed to read credentials file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let mode = metadata.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                tracing::warn!(
                    path = %path.display(),
                    mode = format!("{:o}", mode),
                    "Credentials file is accessible by other users (should be 0600 or 0400)"
                );
            }
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read credentials file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Parse credentials file content
    pub fn parse(content: &str) -> Result<Self> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(Error::config("Credentials file is empty"));
        }

        let credentials = if trimmed.starts_with('{') {
            Self::parse_json(trimmed)?
        } else {
            match Self::parse_ini(trimmed) {
                Ok(credentials) => credentials,
                Err(_) if is_plain_token(trimmed) => {
                    tracing::debug!("Loaded credentials as plain text token");
                    Self::new(trimmed)
                }
                Err(e) => return Err(e),
            }
        };

        credentials.validate()?;
        Ok(credentials)
    }

    fn parse_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct TokenFormat {
            api_token: Option<String>,
            token: Option<String>,
        }

        let parsed: TokenFormat = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid JSON credentials: {}", e)))?;

        parsed
            .api_token
            .or(parsed.token)
            .map(Self::new)
            .ok_or_else(|| Error::config("JSON credentials must contain 'api_token' or 'token'"))
    }

    fn parse_ini(content: &str) -> Result<Self> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            if TOKEN_KEYS.contains(&key.trim()) {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                tracing::debug!(key = key.trim(), "Loaded credentials from INI file");
                return Ok(Self::new(value));
            }
        }

        Err(Error::config(format!(
            "Missing API token; expected one of: {}",
            TOKEN_KEYS.join(", ")
        )))
    }
}

/// Whether `content` is a bare token rather than a mis-keyed `key = value` line
///
/// Base64 tokens may end in `=` padding, so only an `=` before the padding
/// counts as a key separator.
fn is_plain_token(content: &str) -> bool {
    !content.contains(|c: char| c.is_whitespace() || c == ':')
        && !content.trim_end_matches('=').contains('=')
}

/// Hook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Provider credentials
    pub credentials: Credentials,

    /// Seconds to wait after `perform` so the record can propagate
    #[serde(default = "default_propagation_seconds")]
    pub propagation_seconds: u64,

    /// Override for the provider API base URL
    #[serde(default)]
    pub api_base: Option<String>,
}

impl PluginConfig {
    /// Create a configuration with defaults
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            propagation_seconds: default_propagation_seconds(),
            api_base: None,
        }
    }

    /// Set the propagation delay
    pub fn with_propagation_seconds(mut self, seconds: u64) -> Self {
        self.propagation_seconds = seconds;
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;

        if let Some(ref base) = self.api_base
            && !base.starts_with("https://")
            && !base.starts_with("http://")
        {
            return Err(Error::config(format!(
                "API base URL must use HTTP or HTTPS scheme. Got: {}",
                base
            )));
        }

        if self.propagation_seconds > 3600 {
            return Err(Error::config(format!(
                "Propagation delay must be at most 3600 seconds. Got: {}",
                self.propagation_seconds
            )));
        }

        Ok(())
    }
}

fn default_propagation_seconds() -> u64 {
    DEFAULT_PROPAGATION_SECONDS
}

use std::fmt;

use thiserror::Error;

pub const ENV_HOST: &str = "TECHNITIUM_HOST";
pub const ENV_TOKEN: &str = "TECHNITIUM_TOKEN";
pub const ENV_USERNAME: &str = "TECHNITIUM_USERNAME";
pub const ENV_PASSWORD: &str = "TECHNITIUM_PASSWORD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing host: set TECHNITIUM_HOST or pass --host")]
    MissingHost,
    #[error("missing credentials: provide a token or both username and password")]
    MissingCredentials,
}

/// Connection settings for one Technitium server. Empty strings count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub host: Option<String>, // "http://127.0.0.1:5380"
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// How the client obtains its session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    Token(&'a str),
    Login { username: &'a str, password: &'a str },
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |v: &Option<String>| v.as_ref().map(|_| "<hidden>");
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("token", &hidden(&self.token))
            .field("username", &self.username)
            .field("password", &hidden(&self.password))
            .finish()
    }
}

impl ProviderConfig {
    /// Read the `TECHNITIUM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            host: get(ENV_HOST),
            token: get(ENV_TOKEN),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
        }
    }

    /// Values set in `explicit` win over the ones in `self`.
    pub fn with_overrides(self, explicit: ProviderConfig) -> Self {
        let pick = |explicit: Option<String>, base: Option<String>| {
            explicit.filter(|v| !v.is_empty()).or(base)
        };
        Self {
            host: pick(explicit.host, self.host),
            token: pick(explicit.token, self.token),
            username: pick(explicit.username, self.username),
            password: pick(explicit.password, self.password),
        }
    }

    pub fn host(&self) -> Result<&str, ConfigError> {
        self.host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHost)
    }

    /// A token wins; otherwise username and password are both required.
    pub fn credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }
        if let Some(token) = non_empty(&self.token) {
            return Ok(Credentials::Token(token));
        }
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Ok(Credentials::Login { username, password }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

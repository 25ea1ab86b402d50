//! Supabase connection settings.
//!
//! The project URL and the anon key come from `VITE_SUPABASE_URL` and
//! `VITE_SUPABASE_ANON_KEY`. Both are validated before a client is built;
//! the anon key is public, but a service-role key must never end up here.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::Ipv6Addr;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const URL_VAR: &str = "VITE_SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "VITE_SUPABASE_ANON_KEY";
pub const SKIP_DOTENV_VAR: &str = "SUPAENV_SKIP_DOTENV";

const SECRET_KEY_PREFIX: &str = "sb_secret_";
const SERVICE_ROLE: &str = "service_role";
const REDACTED_PREFIX_LEN: usize = 8;

/// Errors raised while reading or validating the connection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid Supabase URL `{value}`: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("unsupported URL scheme `{scheme}` (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("Supabase URL `{value}` has no host")]
    MissingHost { value: String },
    #[error("Supabase URL `{value}` must not carry a query string or fragment")]
    UnexpectedUrlParts { value: String },
    #[error("invalid anon key: {reason}")]
    InvalidKey { reason: &'static str },
    #[error("refusing a privileged key as the anon key (role `{role}`)")]
    PrivilegedKey { role: String },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

/// Claims carried by a JWT-style anon key. Decoded without verifying the
/// signature, so treat them as hints only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyClaims {
    pub role: Option<String>,
    #[serde(rename = "ref")]
    pub project_ref: Option<String>,
    pub iss: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl KeyClaims {
    /// Returns `None` for keys that are not three-segment JWTs, such as the
    /// newer `sb_publishable_*` keys.
    pub fn decode(key: &str) -> Option<Self> {
        let mut parts = key.split('.');
        let (Some(_), Some(payload), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

/// Non-fatal problems worth surfacing at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    ExpiredKey { expired_at: DateTime<Utc> },
    ProjectMismatch { url_ref: String, key_ref: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::ExpiredKey { expired_at } => {
                write!(f, "anon key expired at {}", expired_at.to_rfc3339())
            }
            ConfigWarning::ProjectMismatch { url_ref, key_ref } => write!(
                f,
                "anon key belongs to project '{}' but the URL points at '{}'",
                key_ref, url_ref
            ),
        }
    }
}

/// Validated project URL and anon key.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    url: String,
    anon_key: String,
    project_ref: String,
}

impl SupabaseConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let (url, project_ref) = validate_url(url)?;
        let anon_key = validate_key(anon_key)?;
        Ok(Self {
            url,
            anon_key,
            project_ref,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source. Empty values count as
    /// missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, URL_VAR)?;
        let anon_key = required(&lookup, ANON_KEY_VAR)?;
        Self::new(&url, &anon_key)
    }

    /// Reads the settings from a dotenv-format file without touching the
    /// process environment. Keys the file lacks fall back to the
    /// environment.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let vars = read_env_file(path)?;
        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// First DNS label of the host, e.g. `abcdefgh` for
    /// `https://abcdefgh.supabase.co`.
    pub fn project_ref(&self) -> &str {
        &self.project_ref
    }

    pub fn redacted_key(&self) -> String {
        redact(&self.anon_key)
    }

    pub fn claims(&self) -> Option<KeyClaims> {
        KeyClaims::decode(&self.anon_key)
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        self.warnings_at(Utc::now())
    }

    pub fn warnings_at(&self, now: DateTime<Utc>) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let Some(claims) = self.claims() else {
            return warnings;
        };

        if claims.is_expired_at(now)
            && let Some(expired_at) = claims.expires_at()
        {
            warnings.push(ConfigWarning::ExpiredKey { expired_at });
        }

        // Only hosted projects encode the ref in the hostname.
        if self.is_hosted()
            && let Some(key_ref) = claims.project_ref
            && key_ref != self.project_ref
        {
            warnings.push(ConfigWarning::ProjectMismatch {
                url_ref: self.project_ref.clone(),
                key_ref,
            });
        }

        warnings
    }

    fn is_hosted(&self) -> bool {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with(".supabase.co")))
            .unwrap_or(false)
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &self.redacted_key())
            .field("project_ref", &self.project_ref)
            .finish()
    }
}

/// Parses a dotenv-format file into key/value pairs. A missing or
/// malformed file is an error.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Loads `./.env` into the process environment. A missing file is fine.
pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os(SKIP_DOTENV_VAR).is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }
    Ok(())
}

pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(REDACTED_PREFIX_LEN).collect();
    if prefix.len() == secret.len() {
        "***".to_string()
    } else {
        format!("{}***", prefix)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar { key })
}

fn validate_url(raw: &str) -> Result<(String, String), ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingVar { key: URL_VAR });
    }

    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        value: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            });
        }
    }

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConfigError::MissingHost {
            value: trimmed.to_string(),
        })?;

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ConfigError::UnexpectedUrlParts {
            value: trimmed.to_string(),
        });
    }

    let project_ref = project_ref_for_host(host);
    Ok((parsed.as_str().trim_end_matches('/').to_string(), project_ref))
}

/// First DNS label of a hostname. IPv6 literals have no labels, so their
/// segments are joined with `-` to keep the ref usable in storage keys.
fn project_ref_for_host(host: &str) -> String {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']'))
        && let Ok(ip) = inner.parse::<Ipv6Addr>()
    {
        return ip
            .segments()
            .iter()
            .map(|s| format!("{:x}", s))
            .collect::<Vec<_>>()
            .join("-");
    }
    host.split('.').next().unwrap_or(host).to_string()
}

fn validate_key(raw: &str) -> Result<String, ConfigError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(ConfigError::MissingVar { key: ANON_KEY_VAR });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidKey {
            reason: "key contains whitespace",
        });
    }
    if key.starts_with(SECRET_KEY_PREFIX) {
        return Err(ConfigError::PrivilegedKey {
            role: "secret".to_string(),
        });
    }
    if let Some(role) = KeyClaims::decode(key).and_then(|c| c.role)
        && role == SERVICE_ROLE
    {
        return Err(ConfigError::PrivilegedKey { role });
    }
    Ok(key.to_string())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::routes::Route;
use crate::session::guard::GuardPolicy;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_CREDENTIAL_PATH: &str = ".folio/credentials.json";
const DEFAULT_STATUS_RESET_MS: u64 = 3000;

/// Console configuration loaded from environment variables.
/// Every variable has a default; malformed values fail at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub credential_path: PathBuf,
    pub guard_policy: GuardPolicy,
    /// Whether `POST /portfolio/sync` carries the bearer credential.
    pub sync_requires_auth: bool,
    /// How long a success/error badge stays up before reverting to idle.
    pub status_reset: Duration,
    pub catch_all: Route,
    /// `None` means requests may hang as long as the backend does.
    pub http_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: optional_env("FOLIO_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            credential_path: optional_env("FOLIO_CREDENTIAL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIAL_PATH)),
            guard_policy: match optional_env("FOLIO_GUARD_POLICY") {
                Some(raw) => parse_guard_policy(&raw)?,
                None => GuardPolicy::Strict,
            },
            sync_requires_auth: match optional_env("FOLIO_SYNC_REQUIRES_AUTH") {
                Some(raw) => parse_bool(&raw)
                    .context("FOLIO_SYNC_REQUIRES_AUTH must be true or false")?,
                None => true,
            },
            status_reset: Duration::from_millis(
                optional_env("FOLIO_STATUS_RESET_MS")
                    .map(|raw| raw.parse::<u64>())
                    .transpose()
                    .context("FOLIO_STATUS_RESET_MS must be a number of milliseconds")?
                    .unwrap_or(DEFAULT_STATUS_RESET_MS),
            ),
            catch_all: match optional_env("FOLIO_CATCH_ALL") {
                Some(raw) => parse_catch_all(&raw)?,
                None => Route::Home,
            },
            http_timeout: optional_env("HTTP_TIMEOUT_SECS")
                .map(|raw| raw.parse::<u64>())
                .transpose()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?
                .map(Duration::from_secs),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its default.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Config {
            api_url: api_url.into(),
            credential_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH),
            guard_policy: GuardPolicy::Strict,
            sync_requires_auth: true,
            status_reset: Duration::from_millis(DEFAULT_STATUS_RESET_MS),
            catch_all: Route::Home,
            http_timeout: None,
            rust_log: "info".to_string(),
        }
    }

    pub fn uses_tls(&self) -> bool {
        self.api_url.starts_with("https://")
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_guard_policy(raw: &str) -> Result<GuardPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(GuardPolicy::Strict),
        "baseline" => Ok(GuardPolicy::Baseline),
        other => bail!("FOLIO_GUARD_POLICY must be 'strict' or 'baseline', got '{other}'"),
    }
}

fn parse_catch_all(raw: &str) -> Result<Route> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "home" => Ok(Route::Home),
        "login" => Ok(Route::Login),
        other => bail!("FOLIO_CATCH_ALL must be 'home' or 'login', got '{other}'"),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guard_policy_case_insensitive() {
        assert_eq!(parse_guard_policy("STRICT").unwrap(), GuardPolicy::Strict);
        assert_eq!(parse_guard_policy(" baseline ").unwrap(), GuardPolicy::Baseline);
        assert!(parse_guard_policy("lenient").is_err());
    }

    #[test]
    fn test_parse_catch_all_targets() {
        assert_eq!(parse_catch_all("home").unwrap(), Route::Home);
        assert_eq!(parse_catch_all("Login").unwrap(), Route::Login);
        assert!(parse_catch_all("dev").is_err());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("yes").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_with_api_url_defaults() {
        let config = Config::with_api_url("https://example.com/api");
        assert!(config.uses_tls());
        assert!(config.sync_requires_auth);
        assert_eq!(config.status_reset, Duration::from_millis(3000));
        assert_eq!(config.guard_policy, GuardPolicy::Strict);
        assert!(config.http_timeout.is_none());
    }
}

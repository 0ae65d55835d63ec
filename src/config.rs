use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Fallback for `REQUEST_TIMEOUT_SECS`.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// AppConfig
///
/// Holds the client's entire configuration state. Loaded once at startup and
/// never mutated afterwards; every component that needs a setting receives a
/// clone through the `AppContext`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the REST data store (json-server in local development).
    pub api_base_url: String,
    // Directory holding the persisted session record.
    pub session_dir: PathBuf,
    // Per-request timeout applied by the HTTP Data Client.
    pub request_timeout: Duration,
    // Location fragment the navigator starts from. Empty means login.
    pub start_fragment: String,
    // Runtime environment marker. Controls log format and fail-fast rules.
    pub env: Env,
}

/// Env
///
/// Runtime context: local development against a json-server on localhost, or a
/// production deployment where every endpoint must be configured explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration used by tests and local scaffolding.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            session_dir: PathBuf::from(".session"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            start_fragment: String::new(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables.
    ///
    /// # Panics
    /// Panics in `production` when `API_BASE_URL` is missing, so the client never
    /// starts pointed at a developer's localhost.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
            }
        };

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            // Trailing slashes would double up when collection paths are joined.
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_dir: env::var("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".session")),
            request_timeout: Duration::from_secs(request_timeout),
            start_fragment: env::var("START_FRAGMENT").unwrap_or_default(),
            env,
        }
    }
}

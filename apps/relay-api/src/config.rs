use std::str::FromStr;
use std::time::Duration;

/// Relay configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the Gemini API (`GOOGLE_API_KEY`).
    pub google_api_key: String,
    /// Model used for AI replies.
    pub gemini_model: String,
    /// Gemini API origin, overridable for tests and proxies.
    pub gemini_api_url: String,
    /// Upper bound on a single AI reply.
    pub generation_timeout: Duration,
    /// Port the HTTP/WebSocket server binds to.
    pub port: u16,
}

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            google_api_key: var("GOOGLE_API_KEY")
                .unwrap_or_else(|| panic!("GOOGLE_API_KEY env var is required")),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: var("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            generation_timeout: Duration::from_secs(parse_or(
                var("GENERATION_TIMEOUT_SECS"),
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )),
            port: parse_or(var("PORT"), DEFAULT_PORT),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

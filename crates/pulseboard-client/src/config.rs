use std::str::FromStr;
use std::time::Duration;

use url::Url;

/// When the resolver reaches for synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// Query the API and fall back when it is unavailable.
    #[default]
    Auto,
    /// Never touch the network; serve synthetic data only.
    Always,
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(FallbackMode::Auto),
            "always" | "demo" => Ok(FallbackMode::Always),
            other => Err(format!("invalid PULSEBOARD_FALLBACK value: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base, always ending in `/` so relative joins stay under it.
    pub api_url: Url,
    pub request_timeout: Duration,
    pub fallback: FallbackMode,
    /// How often the refresh scheduler checks for due domains.
    pub refresh_tick: Duration,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self, String> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            request_timeout: Duration::from_millis(10_000),
            fallback: FallbackMode::Auto,
            refresh_tick: Duration::from_millis(1_000),
        })
    }

    pub fn from_env() -> Result<Self, String> {
        let api_url = std::env::var("PULSEBOARD_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/v1".to_string());
        let mut cfg = Self::new(&api_url)?;
        cfg.request_timeout = Duration::from_millis(env_millis(
            "PULSEBOARD_REQUEST_TIMEOUT_MS",
            10_000,
        )?);
        cfg.fallback = std::env::var("PULSEBOARD_FALLBACK")
            .map(|v| v.parse())
            .unwrap_or(Ok(FallbackMode::Auto))?;
        cfg.refresh_tick = Duration::from_millis(
            env_millis("PULSEBOARD_REFRESH_TICK_MS", 1_000)?.clamp(50, 60_000),
        );
        Ok(cfg)
    }
}

fn env_millis(key: &str, default: u64) -> Result<u64, String> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn parse_base_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| format!("invalid API url {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported API url scheme: {other}")),
    }
}

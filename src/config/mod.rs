// Service configuration - layered loading with figment
//
// Sources, highest precedence first:
// 1. Environment variables (`TITLE_API_*`, nested keys split on `__`)
// 2. Bare `PORT`, for platforms that inject it
// 3. TOML config file (if `TITLE_API_CONFIG_FILE` is set)
// 4. Built-in defaults
//
// Strategies are normally overridden from the TOML file as an ordered
// `[[strategies]]` array; the order there is the fallback order.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::lookup::extractors::DEFAULT_OEMBED_ENDPOINT;
use crate::lookup::strategy::{default_strategies, StrategyDescriptor};

mod validation;

pub use validation::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port. `TITLE_API_PORT`, falling back to `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route serving title lookups.
    #[serde(default = "default_lookup_path")]
    pub lookup_path: String,

    /// Cache time-to-live in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// cookies.txt attached by strategies with `use_cookies = true`.
    #[serde(default)]
    pub cookies_path: Option<PathBuf>,

    /// SOCKS5/HTTP proxy handed to yt-dlp and the oEmbed client.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Hosts (and their subdomains) accepted in the `url` parameter.
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// yt-dlp binary; auto-detected when unset.
    #[serde(default)]
    pub ytdlp_path: Option<String>,

    /// Interpreter for the python backend. Defaults to `$YTDLP_PYTHON` or `python3`.
    #[serde(default = "default_python_cmd")]
    pub python_cmd: String,

    #[serde(default = "default_oembed_endpoint")]
    pub oembed_endpoint: String,

    /// Cap on diagnostic text kept per failure, in characters.
    #[serde(default = "default_max_diagnostic_len")]
    pub max_diagnostic_len: usize,

    /// Ordered fallback strategies.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyDescriptor>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_lookup_path() -> String {
    "/title".into()
}

fn default_cache_ttl_ms() -> u64 {
    3_600_000 // 1 hour
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["youtube.com".into(), "youtu.be".into()]
}

fn default_python_cmd() -> String {
    std::env::var("YTDLP_PYTHON").unwrap_or_else(|_| "python3".into())
}

fn default_oembed_endpoint() -> String {
    DEFAULT_OEMBED_ENDPOINT.into()
}

fn default_max_diagnostic_len() -> usize {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            lookup_path: default_lookup_path(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cookies_path: None,
            proxy: None,
            allowed_hosts: default_allowed_hosts(),
            ytdlp_path: None,
            python_cmd: default_python_cmd(),
            oembed_endpoint: default_oembed_endpoint(),
            max_diagnostic_len: default_max_diagnostic_len(),
            strategies: default_strategies(),
        }
    }
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TITLE_API_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::raw().only(&["port"])).merge(
            Env::prefixed("TITLE_API_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The configured cookies file, if it actually exists.
    pub fn usable_cookies_path(&self) -> Option<PathBuf> {
        let path = self.cookies_path.as_ref()?;
        if path.exists() {
            Some(path.clone())
        } else {
            tracing::warn!(
                path = %path.display(),
                "cookies file not found; continuing without cookies"
            );
            None
        }
    }
}

// Strategy descriptors - declarative ways of asking an extractor for a title
//
// A strategy is data only: flags, cookie policy and a deadline. Turning it
// into a concrete invocation is a pure function of (url, descriptor, env),
// so strategies can be added, removed or reordered from configuration
// without touching the orchestrator.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::ValidationError;

lazy_static::lazy_static! {
    static ref URL_RE: Regex =
        Regex::new(r"^(?i)https?://([^/?#@\s:]+)(?::\d{1,5})?(?:[/?#]\S*)?$").unwrap();
}

/// Which extraction mechanism a strategy drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Native `yt-dlp` binary
    #[default]
    Cli,
    /// `python3 -m yt_dlp`
    Python,
    /// Public oEmbed metadata endpoint
    Oembed,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Python => write!(f, "python"),
            Self::Oembed => write!(f, "oembed"),
        }
    }
}

/// Host allowlist applied to every inbound URL
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_hosts: Vec<String>,
}

impl UrlPolicy {
    pub fn new(allowed_hosts: &[String]) -> Self {
        Self {
            allowed_hosts: allowed_hosts
                .iter()
                .map(|h| h.trim().trim_start_matches('.').to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Accepts `http(s)://<host>/...` where host equals an allowed host or is a subdomain of one
    pub fn validate(&self, url: &str) -> Result<(), ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        let host = URL_RE
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidUrl(url.to_string()))?;

        let allowed = self
            .allowed_hosts
            .iter()
            .any(|allowed| {
                host == *allowed || host.ends_with(&format!(".{}", allowed))
            });

        if allowed {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedHost(host))
        }
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new(&["youtube.com".to_string(), "youtu.be".to_string()])
    }
}

/// Process-wide inputs every strategy may draw on
#[derive(Debug, Clone, Default)]
pub struct InvocationEnv {
    pub policy: UrlPolicy,
    /// cookies.txt for strategies that opt into cookies
    pub cookies_path: Option<PathBuf>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
}

/// Concrete, ready-to-run request for one extractor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Name of the strategy that produced this invocation
    pub strategy: String,
    pub kind: ExtractorKind,
    pub url: String,
    /// yt-dlp arguments, URL last
    pub args: Vec<String>,
    pub cookies: Option<PathBuf>,
}

/// One configured way of attempting title extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    /// Unique within the ordered strategy list
    pub name: String,
    #[serde(default)]
    pub backend: ExtractorKind,
    /// Wall-clock budget for the whole attempt
    pub timeout_ms: u64,
    /// yt-dlp `--socket-timeout` (seconds)
    #[serde(default)]
    pub socket_timeout_secs: Option<u32>,
    /// yt-dlp `--retries`
    #[serde(default)]
    pub retries: Option<u32>,
    /// yt-dlp `--limit-rate`, e.g. "512K"
    #[serde(default)]
    pub rate_limit: Option<String>,
    /// Attach cookies.txt when one is configured
    #[serde(default)]
    pub use_cookies: bool,
    /// YouTube player client (android, web, tv)
    #[serde(default)]
    pub player_client: Option<String>,
    /// Passed through verbatim before the URL
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl StrategyDescriptor {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the concrete invocation for `url`.
    ///
    /// The URL is re-checked here even though the HTTP layer validates it,
    /// because the orchestrator is usable outside the HTTP path.
    pub fn build_invocation(
        &self,
        url: &str,
        env: &InvocationEnv,
    ) -> Result<InvocationSpec, ValidationError> {
        env.policy.validate(url)?;
        let url = url.trim();

        let mut args = vec![
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--print".to_string(),
            "%(title)s".to_string(),
        ];

        if let Some(secs) = self.socket_timeout_secs {
            args.push("--socket-timeout".to_string());
            args.push(secs.to_string());
        }

        if let Some(retries) = self.retries {
            args.push("--retries".to_string());
            args.push(retries.to_string());
        }

        if let Some(rate) = &self.rate_limit {
            args.push("--limit-rate".to_string());
            args.push(rate.clone());
        }

        if let Some(client) = &self.player_client {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        let cookies = if self.use_cookies {
            env.cookies_path.clone()
        } else {
            None
        };
        if let Some(path) = &cookies {
            args.push("--cookies".to_string());
            args.push(path.display().to_string());
        }

        if let Some(proxy) = &env.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.extend(self.extra_args.iter().cloned());
        args.push(url.to_string());

        Ok(InvocationSpec {
            strategy: self.name.clone(),
            kind: self.backend,
            url: url.to_string(),
            args,
            cookies,
        })
    }
}

/// Ordered default set: fastest/most restrictive first, most tolerant last
pub fn default_strategies() -> Vec<StrategyDescriptor> {
    vec![
        StrategyDescriptor {
            name: "fast".to_string(),
            backend: ExtractorKind::Cli,
            timeout_ms: 8_000,
            socket_timeout_secs: Some(5),
            retries: Some(0),
            rate_limit: Some("512K".to_string()),
            use_cookies: false,
            player_client: Some("android".to_string()),
            extra_args: Vec::new(),
        },
        StrategyDescriptor {
            name: "default".to_string(),
            backend: ExtractorKind::Cli,
            timeout_ms: 15_000,
            socket_timeout_secs: Some(10),
            retries: Some(1),
            rate_limit: None,
            use_cookies: true,
            player_client: Some("web".to_string()),
            extra_args: Vec::new(),
        },
        StrategyDescriptor {
            name: "fallback".to_string(),
            backend: ExtractorKind::Cli,
            timeout_ms: 25_000,
            socket_timeout_secs: Some(20),
            retries: Some(3),
            rate_limit: None,
            use_cookies: false,
            player_client: Some("tv,web".to_string()),
            extra_args: vec![
                "--force-ipv4".to_string(),
                "--no-check-certificates".to_string(),
                "--ignore-config".to_string(),
            ],
        },
    ]
}

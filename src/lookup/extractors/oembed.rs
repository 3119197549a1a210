// oEmbed TitleExtractor - asks the public oEmbed endpoint for metadata
//
// No external process at all; only public videos resolve this way.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::TitleExtractor;
use crate::lookup::errors::ExtractError;
use crate::lookup::strategy::InvocationSpec;
use crate::lookup::utils::{normalize_title, truncate_diagnostic};

pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

/// HTTP-based title extractor
pub struct OEmbedTitleExtractor {
    client: reqwest::Client,
    endpoint: String,
    max_diagnostic_len: usize,
}

impl OEmbedTitleExtractor {
    pub fn new(
        endpoint: impl Into<String>,
        proxy: Option<&str>,
        max_diagnostic_len: usize,
    ) -> Result<Self, ExtractError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                ExtractError::Http(format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| {
                ExtractError::Http(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            max_diagnostic_len,
        })
    }
}

#[async_trait]
impl TitleExtractor for OEmbedTitleExtractor {
    fn name(&self) -> &'static str {
        "oembed"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn extract_title(&self, invocation: &InvocationSpec) -> Result<String, ExtractError> {
        debug!(strategy = %invocation.strategy, endpoint = %self.endpoint, "querying oEmbed");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", invocation.url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                ExtractError::Http(truncate_diagnostic(&e.to_string(), self.max_diagnostic_len))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                ExtractError::Http(format!("Failed to read body: {}", e))
            })?;

        if !status.is_success() {
            return Err(ExtractError::Http(truncate_diagnostic(
                &format!("HTTP {}: {}", status, body),
                self.max_diagnostic_len,
            )));
        }

        let parsed: OEmbedResponse = serde_json::from_str(&body).map_err(|e| {
            ExtractError::Parse(truncate_diagnostic(
                &format!("Invalid JSON: {}", e),
                self.max_diagnostic_len,
            ))
        })?;

        parsed
            .title
            .as_deref()
            .and_then(normalize_title)
            .ok_or(ExtractError::EmptyTitle)
    }
}

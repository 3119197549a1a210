// Error types for title lookup

use thiserror::Error;

use super::extractors::diagnostics::{diagnose_error, BlockingReason};

/// Rejection of an inbound URL before any extraction work is spawned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No `url` was supplied, or it was blank
    #[error("Missing 'url' query parameter.")]
    MissingUrl,

    /// The value is not an http(s) URL with a host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Well-formed URL whose host is not in the allowed set
    #[error("Unsupported host: {0}")]
    UnsupportedHost(String),
}

/// Failure of a single extraction attempt
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The strategy's deadline passed and the extraction was cancelled
    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The extractor ran but produced no usable title
    #[error("empty title")]
    EmptyTitle,

    /// yt-dlp or python not found in system
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Non-zero exit or I/O error while running the extractor
    #[error("execution error: {0}")]
    Execution(String),

    /// Output could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// Metadata endpoint returned an error or was unreachable
    #[error("http error: {0}")]
    Http(String),

    /// URL rejected by the strategy before invocation
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// No backend registered for the strategy's extractor kind
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl ExtractError {
    /// Short machine-readable tag used in response details
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::EmptyTitle => "empty_title",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::Execution(_) => "execution",
            Self::Parse(_) => "parse",
            Self::Http(_) => "http",
            Self::Invalid(_) => "invalid_url",
            Self::BackendUnavailable(_) => "backend_unavailable",
        }
    }

    /// Raw diagnostic text, when the error carries one
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::ToolNotFound(msg)
            | Self::Execution(msg)
            | Self::Parse(msg)
            | Self::Http(msg)
            | Self::BackendUnavailable(msg) => Some(msg),
            Self::Timeout { .. } | Self::EmptyTitle | Self::Invalid(_) => None,
        }
    }

    /// Blocking reason inferred from the diagnostic text
    pub fn diagnosis(&self) -> Option<BlockingReason> {
        match self {
            Self::Timeout { .. } => Some(BlockingReason::NetworkTimeout),
            _ => self.diagnostic().and_then(diagnose_error),
        }
    }

    /// True for our own deadline and for network timeouts reported by the tool
    pub fn is_timeout_like(&self) -> bool {
        matches!(self.diagnosis(), Some(BlockingReason::NetworkTimeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_mentions_timeout() {
        let err = ExtractError::Timeout { timeout_ms: 8000 };
        assert_eq!(err.to_string(), "timeout after 8000ms");
        assert!(err.is_timeout_like());
    }

    #[test]
    fn test_tool_reported_timeout_is_timeout_like() {
        let err = ExtractError::Execution("ERROR: Read timed out.".to_string());
        assert!(err.is_timeout_like());
        assert_eq!(err.kind(), "execution");
    }

    #[test]
    fn test_generic_failure_is_not_timeout_like() {
        let err = ExtractError::Execution("ERROR: Video unavailable".to_string());
        assert!(!err.is_timeout_like());
        assert_eq!(err.diagnosis(), Some(BlockingReason::VideoUnavailable));
        assert!(!ExtractError::EmptyTitle.is_timeout_like());
    }

    #[test]
    fn test_validation_error_wraps() {
        let err: ExtractError = ValidationError::MissingUrl.into();
        assert_eq!(err.kind(), "invalid_url");
        assert!(err.diagnosis().is_none());
    }
}

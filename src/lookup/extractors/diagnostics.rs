// Failure diagnostics - classifies extractor error output
//
// Analyzes raw error text to determine:
// - Why the video metadata could not be read (age gate, geo block, ...)
// - Whether the failure is a network timeout
// - Whether a cookie-bearing strategy might succeed where this one failed

use serde::{Deserialize, Serialize};

/// Reasons why a title lookup might be refused upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Geographic restriction
    GeoBlocked,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// Network timeout (soft IP block or slow upstream)
    NetworkTimeout,

    /// Generic/unknown failure
    Unknown,
}

impl BlockingReason {
    /// Check if cookies might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden | Self::AgeRestricted | Self::BotDetection | Self::PrivateVideo
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::AgeRestricted => "Age-restricted content",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Geographic restriction",
            Self::RateLimited => "Rate limited",
            Self::BotDetection => "Bot detection triggered",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown failure",
        }
    }
}

/// Analyze error message and return blocking reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Check patterns in order of specificity

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age_verification")
    {
        return Some(BlockingReason::AgeRestricted);
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
        || lower.contains("video is unavailable")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
    {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("confirm you're not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
    {
        return Some(BlockingReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}

// Data models for title lookup

use serde::Serialize;

use super::errors::ExtractError;
use super::extractors::diagnostics::BlockingReason;

/// Result of running one strategy once
#[derive(Debug, Clone)]
pub enum AttemptResult {
    Success {
        title: String,
        elapsed_ms: u64,
    },
    Failure {
        strategy: String,
        error: ExtractError,
        elapsed_ms: u64,
    },
}

/// A recorded failure of a single strategy, kept individually inspectable
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    pub strategy: String,
    pub error: ExtractError,
    pub elapsed_ms: u64,
}

impl StrategyFailure {
    pub fn reason(&self) -> String {
        self.error.to_string()
    }

    pub fn diagnosis(&self) -> Option<BlockingReason> {
        self.error.diagnosis()
    }

    /// Serializable view used in response bodies
    pub fn detail(&self) -> FailureDetail {
        FailureDetail {
            strategy: self.strategy.clone(),
            reason: self.reason(),
            kind: self.error.kind(),
            diagnosis: self.diagnosis().map(|d| d.description()),
            elapsed_ms: self.elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetail {
    pub strategy: String,
    pub reason: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<&'static str>,
    pub elapsed_ms: u64,
}

/// Outcome of a whole lookup request
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success {
        title: String,
        /// `None` when served from cache
        strategy_used: Option<String>,
        /// 1-based index of the winning strategy, 0 on cache hit
        attempts_made: usize,
        from_cache: bool,
        /// Strategies that failed before the winning one
        failures: Vec<StrategyFailure>,
        total_elapsed_ms: u64,
    },
    Failure {
        attempts_made: usize,
        failures: Vec<StrategyFailure>,
        total_elapsed_ms: u64,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        match self {
            Self::Success { total_elapsed_ms, .. } | Self::Failure { total_elapsed_ms, .. } => {
                *total_elapsed_ms
            }
        }
    }

    pub fn failures(&self) -> &[StrategyFailure] {
        match self {
            Self::Success { failures, .. } | Self::Failure { failures, .. } => failures,
        }
    }

    /// True when timeout-like failures make up at least half of all failures
    pub fn timeout_dominant(&self) -> bool {
        let failures = self.failures();
        if failures.is_empty() {
            return false;
        }
        let timeouts = failures.iter().filter(|f| f.error.is_timeout_like()).count();
        timeouts * 2 >= failures.len()
    }
}

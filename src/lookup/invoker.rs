// Extractor invoker - runs one invocation under one authoritative deadline
//
// The deadline is the only cancellation primitive: when it fires, the
// extraction future is dropped, which kills any spawned process or aborts
// the in-flight HTTP request. A result that would have arrived later can
// never be observed, so it can never be cached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::errors::ExtractError;
use super::extractors::TitleExtractor;
use super::models::AttemptResult;
use super::strategy::{ExtractorKind, InvocationSpec};
use super::utils::normalize_title;

/// Dispatches invocations to the backend registered for their kind
#[derive(Clone, Default)]
pub struct Invoker {
    extractors: HashMap<ExtractorKind, Arc<dyn TitleExtractor>>,
}

impl Invoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(
        mut self,
        kind: ExtractorKind,
        extractor: Arc<dyn TitleExtractor>,
    ) -> Self {
        self.extractors.insert(kind, extractor);
        self
    }

    /// Registered backends, in a stable order
    pub fn extractors(&self) -> Vec<(ExtractorKind, Arc<dyn TitleExtractor>)> {
        let mut list: Vec<_> = self
            .extractors
            .iter()
            .map(|(kind, ext)| (*kind, Arc::clone(ext)))
            .collect();
        list.sort_by_key(|(kind, _)| kind.to_string());
        list
    }

    pub async fn invoke(&self, spec: &InvocationSpec, timeout: Duration) -> AttemptResult {
        let started = Instant::now();

        let result = match self.extractors.get(&spec.kind) {
            None => Err(ExtractError::BackendUnavailable(format!(
                "no extractor registered for backend '{}'",
                spec.kind
            ))),
            Some(extractor) => {
                match tokio::time::timeout(timeout, extractor.extract_title(spec)).await {
                    Ok(Ok(raw)) => normalize_title(&raw).ok_or(ExtractError::EmptyTitle),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(ExtractError::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(title) => AttemptResult::Success { title, elapsed_ms },
            Err(error) => AttemptResult::Failure {
                strategy: spec.strategy.clone(),
                error,
                elapsed_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl TitleExtractor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn extract_title(
            &self,
            _invocation: &InvocationSpec,
        ) -> Result<String, ExtractError> {
            Ok(self.0.to_string())
        }
    }

    fn spec(kind: ExtractorKind) -> InvocationSpec {
        InvocationSpec {
            strategy: "fast".to_string(),
            kind,
            url: "https://youtu.be/abc".to_string(),
            args: Vec::new(),
            cookies: None,
        }
    }

    #[tokio::test]
    async fn test_output_is_normalized() {
        let invoker =
            Invoker::new().with_extractor(ExtractorKind::Cli, Arc::new(Fixed(" A \n  B ")));
        match invoker.invoke(&spec(ExtractorKind::Cli), Duration::from_secs(1)).await {
            AttemptResult::Success { title, .. } => assert_eq!(title, "A"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_whitespace_output_is_failure() {
        let invoker = Invoker::new().with_extractor(ExtractorKind::Cli, Arc::new(Fixed(" \t\n")));
        match invoker.invoke(&spec(ExtractorKind::Cli), Duration::from_secs(1)).await {
            AttemptResult::Failure { strategy, error, .. } => {
                assert_eq!(strategy, "fast");
                assert!(matches!(error, ExtractError::EmptyTitle));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unregistered_backend() {
        let invoker = Invoker::new().with_extractor(ExtractorKind::Cli, Arc::new(Fixed("x")));
        let result = invoker.invoke(&spec(ExtractorKind::Oembed), Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            AttemptResult::Failure { error: ExtractError::BackendUnavailable(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_extractors_listing() {
        let invoker = Invoker::new()
            .with_extractor(ExtractorKind::Python, Arc::new(Fixed("x")))
            .with_extractor(ExtractorKind::Cli, Arc::new(Fixed("y")));
        let kinds: Vec<_> = invoker.extractors().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, [ExtractorKind::Cli, ExtractorKind::Python]);
    }
}

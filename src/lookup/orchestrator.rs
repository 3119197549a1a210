// Fallback orchestrator - cache first, then strategies strictly in order
//
// Each strategy is attempted at most once per request. The first success is
// written through to the cache; if every strategy fails, all failures are
// returned individually, in the order they happened.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use super::cache::TitleCache;
use super::errors::ExtractError;
use super::invoker::Invoker;
use super::models::{AttemptResult, FetchOutcome, StrategyFailure};
use super::strategy::{InvocationEnv, StrategyDescriptor};

pub struct TitleOrchestrator {
    strategies: Vec<StrategyDescriptor>,
    invoker: Invoker,
    cache: Arc<TitleCache>,
    env: InvocationEnv,
}

impl TitleOrchestrator {
    pub fn new(
        strategies: Vec<StrategyDescriptor>,
        invoker: Invoker,
        cache: Arc<TitleCache>,
        env: InvocationEnv,
    ) -> Self {
        Self {
            strategies,
            invoker,
            cache,
            env,
        }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn cache(&self) -> &TitleCache {
        &self.cache
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn env(&self) -> &InvocationEnv {
        &self.env
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_title(&self, url: &str) -> FetchOutcome {
        let started = Instant::now();

        if let Some(title) = self.cache.get(url) {
            debug!("cache hit");
            return FetchOutcome::Success {
                title,
                strategy_used: None,
                attempts_made: 0,
                from_cache: true,
                failures: Vec::new(),
                total_elapsed_ms: started.elapsed().as_millis() as u64,
            };
        }

        let mut failures: Vec<StrategyFailure> = Vec::new();

        for (index, strategy) in self.strategies.iter().enumerate() {
            let spec = match strategy.build_invocation(url, &self.env) {
                Ok(spec) => spec,
                Err(e) => {
                    // Every strategy shares the same URL policy, so the rest would reject it too
                    warn!(strategy = %strategy.name, error = %e, "rejected URL before invocation");
                    failures.push(StrategyFailure {
                        strategy: strategy.name.clone(),
                        error: ExtractError::Invalid(e),
                        elapsed_ms: 0,
                    });
                    break;
                }
            };

            info!(
                strategy = %strategy.name,
                attempt = index + 1,
                timeout_ms = strategy.timeout_ms,
                "trying strategy"
            );

            match self.invoker.invoke(&spec, strategy.timeout()).await {
                AttemptResult::Success { title, elapsed_ms } => {
                    info!(strategy = %strategy.name, elapsed_ms, "strategy succeeded");
                    self.cache.put(url, &title);
                    return FetchOutcome::Success {
                        title,
                        strategy_used: Some(strategy.name.clone()),
                        attempts_made: index + 1,
                        from_cache: false,
                        failures,
                        total_elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                }
                AttemptResult::Failure {
                    strategy: name,
                    error,
                    elapsed_ms,
                } => {
                    warn!(strategy = %name, elapsed_ms, error = %error, "strategy failed");
                    self.log_hint(strategy, &error);
                    failures.push(StrategyFailure {
                        strategy: name,
                        error,
                        elapsed_ms,
                    });
                }
            }
        }

        warn!(attempts = failures.len(), "all strategies exhausted");
        FetchOutcome::Failure {
            attempts_made: failures.len(),
            failures,
            total_elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn log_hint(&self, strategy: &StrategyDescriptor, error: &ExtractError) {
        let Some(reason) = error.diagnosis() else {
            return;
        };
        if reason.cookies_might_help() && !strategy.use_cookies {
            if self.env.cookies_path.is_some() {
                debug!(reason = reason.description(), "a cookie-bearing strategy may succeed");
            } else {
                debug!(
                    reason = reason.description(),
                    "no cookies configured; set cookies_path to help with gated videos"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::extractors::TitleExtractor;
    use crate::lookup::strategy::{ExtractorKind, InvocationSpec};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[derive(Clone, Copy)]
    enum Behavior {
        Title(&'static str),
        Fail(&'static str),
        Hang,
    }

    /// Sets its flag when dropped, i.e. when the hanging extraction is cancelled
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Scripted {
        behaviors: HashMap<String, Behavior>,
        calls: Mutex<HashMap<String, usize>>,
        released: Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(script: &[(&str, Behavior)]) -> Arc<Self> {
            Arc::new(Self {
                behaviors: script.iter().map(|(n, b)| (n.to_string(), *b)).collect(),
                ..Default::default()
            })
        }

        fn calls(&self, strategy: &str) -> usize {
            self.calls.lock().get(strategy).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().values().sum()
        }
    }

    #[async_trait]
    impl TitleExtractor for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn extract_title(&self, invocation: &InvocationSpec) -> Result<String, ExtractError> {
            *self.calls.lock().entry(invocation.strategy.clone()).or_insert(0) += 1;
            match self.behaviors.get(&invocation.strategy) {
                Some(Behavior::Title(t)) => Ok(t.to_string()),
                Some(Behavior::Fail(reason)) => Err(ExtractError::Execution(reason.to_string())),
                Some(Behavior::Hang) => {
                    let _guard = DropFlag(Arc::clone(&self.released));
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                None => Err(ExtractError::Execution("unscripted".to_string())),
            }
        }
    }

    fn strategy(name: &str, timeout_ms: u64) -> StrategyDescriptor {
        StrategyDescriptor {
            name: name.to_string(),
            backend: ExtractorKind::Cli,
            timeout_ms,
            socket_timeout_secs: None,
            retries: None,
            rate_limit: None,
            use_cookies: false,
            player_client: None,
            extra_args: Vec::new(),
        }
    }

    fn orchestrator(names: &[&str], extractor: Arc<Scripted>) -> TitleOrchestrator {
        let strategies = names.iter().map(|n| strategy(n, 1_000)).collect();
        TitleOrchestrator::new(
            strategies,
            Invoker::new().with_extractor(ExtractorKind::Cli, extractor),
            Arc::new(TitleCache::new(Duration::from_secs(3600))),
            InvocationEnv::default(),
        )
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let ext = Scripted::new(&[
            ("A", Behavior::Fail("r1")),
            ("B", Behavior::Fail("r2")),
            ("C", Behavior::Title("Rick Astley - Never Gonna Give You Up")),
        ]);
        let orch = orchestrator(&["A", "B", "C"], Arc::clone(&ext));

        match orch.fetch_title(URL).await {
            FetchOutcome::Success {
                title,
                strategy_used,
                attempts_made,
                from_cache,
                failures,
                ..
            } => {
                assert_eq!(title, "Rick Astley - Never Gonna Give You Up");
                assert_eq!(strategy_used.as_deref(), Some("C"));
                assert_eq!(attempts_made, 3);
                assert!(!from_cache);
                let seen: Vec<_> = failures
                    .iter()
                    .map(|f| (f.strategy.as_str(), f.reason()))
                    .collect();
                assert_eq!(
                    seen,
                    [
                        ("A", "execution error: r1".to_string()),
                        ("B", "execution error: r2".to_string())
                    ]
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            orch.cache().get(URL).as_deref(),
            Some("Rick Astley - Never Gonna Give You Up")
        );
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let ext = Scripted::new(&[
            ("A", Behavior::Title("T")),
            ("B", Behavior::Title("other")),
        ]);
        let orch = orchestrator(&["A", "B"], Arc::clone(&ext));

        let outcome = orch.fetch_title(URL).await;
        match outcome {
            FetchOutcome::Success {
                attempts_made,
                strategy_used,
                ..
            } => {
                assert_eq!(attempts_made, 1);
                assert_eq!(strategy_used.as_deref(), Some("A"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(ext.calls("A"), 1);
        assert_eq!(ext.calls("B"), 0);
    }

    #[tokio::test]
    async fn test_hanging_strategy_times_out_and_is_released() {
        let ext = Scripted::new(&[
            ("slow", Behavior::Hang),
            ("ok", Behavior::Title("Recovered")),
        ]);
        let orch = TitleOrchestrator::new(
            vec![strategy("slow", 50), strategy("ok", 1_000)],
            Invoker::new().with_extractor(
                ExtractorKind::Cli,
                Arc::clone(&ext) as Arc<dyn TitleExtractor>,
            ),
            Arc::new(TitleCache::new(Duration::from_secs(3600))),
            InvocationEnv::default(),
        );

        let started = Instant::now();
        let outcome = orch.fetch_title(URL).await;

        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].strategy, "slow");
        assert!(failures[0].reason().contains("timeout"));
        assert!(failures[0].elapsed_ms < 50 + 500);
        assert!(started.elapsed() < Duration::from_millis(50 + 500));
        assert!(ext.released.load(Ordering::SeqCst));
        assert!(matches!(outcome, FetchOutcome::Success { ref title, .. } if title == "Recovered"));
    }

    #[tokio::test]
    async fn test_empty_title_falls_through_and_is_not_cached() {
        let ext = Scripted::new(&[
            ("blank", Behavior::Title("  \n\t ")),
            ("real", Behavior::Title("Real")),
        ]);
        let orch = orchestrator(&["blank", "real"], Arc::clone(&ext));

        let outcome = orch.fetch_title(URL).await;
        assert!(matches!(outcome, FetchOutcome::Success { attempts_made: 2, .. }));
        assert!(matches!(outcome.failures()[0].error, ExtractError::EmptyTitle));

        let only_blank = Scripted::new(&[("blank", Behavior::Title("   "))]);
        let orch = orchestrator(&["blank"], only_blank);
        let outcome = orch.fetch_title(URL).await;
        assert!(!outcome.is_success());
        assert!(orch.cache().get(URL).is_none());
        assert!(orch.cache().is_empty());
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_every_reason() {
        let ext = Scripted::new(&[
            ("A", Behavior::Fail("r1")),
            ("B", Behavior::Fail("r2")),
            ("C", Behavior::Fail("r3")),
        ]);
        let orch = orchestrator(&["A", "B", "C"], Arc::clone(&ext));

        match orch.fetch_title(URL).await {
            FetchOutcome::Failure {
                attempts_made,
                failures,
                ..
            } => {
                assert_eq!(attempts_made, 3);
                let seen: Vec<_> = failures
                    .iter()
                    .map(|f| {
                        (
                            f.strategy.as_str(),
                            f.error.diagnostic().unwrap_or_default(),
                        )
                    })
                    .collect();
                assert_eq!(seen, [("A", "r1"), ("B", "r2"), ("C", "r3")]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(orch.cache().is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_every_strategy() {
        let ext = Scripted::new(&[("A", Behavior::Title("fresh"))]);
        let orch = orchestrator(&["A"], Arc::clone(&ext));
        orch.cache().put(URL, "cached title");

        let outcome = orch.fetch_title(URL).await;
        assert_eq!(ext.total_calls(), 0);
        match outcome {
            FetchOutcome::Success {
                title,
                strategy_used,
                attempts_made,
                from_cache,
                ..
            } => {
                assert_eq!(title, "cached title");
                assert!(strategy_used.is_none());
                assert_eq!(attempts_made, 0);
                assert!(from_cache);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_is_written_through() {
        let ext = Scripted::new(&[
            ("A", Behavior::Fail("nope")),
            ("B", Behavior::Title("Second")),
        ]);
        let orch = orchestrator(&["A", "B"], Arc::clone(&ext));

        assert!(orch.fetch_title(URL).await.is_success());
        let again = orch.fetch_title(URL).await;
        assert!(matches!(again, FetchOutcome::Success { from_cache: true, .. }));
        assert_eq!(ext.calls("A"), 1);
        assert_eq!(ext.calls("B"), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_extractor() {
        let ext = Scripted::new(&[("A", Behavior::Title("T"))]);
        let orch = orchestrator(&["A", "B"], Arc::clone(&ext));

        let outcome = orch.fetch_title("https://example.com/video").await;
        assert_eq!(ext.total_calls(), 0);
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].error.kind(), "invalid_url");
    }

    #[tokio::test]
    async fn test_instances_do_not_share_cache() {
        let first = orchestrator(&["A"], Scripted::new(&[("A", Behavior::Title("One"))]));
        let second = orchestrator(&["A"], Scripted::new(&[("A", Behavior::Fail("down"))]));

        assert!(first.fetch_title(URL).await.is_success());
        assert!(!second.fetch_title(URL).await.is_success());
    }
}

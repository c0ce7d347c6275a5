mod error;
#[cfg(test)]
pub mod mock;
mod model;
pub mod strategy;
mod traits;

use std::{sync::Arc, time::Duration};

pub use error::*;
pub use model::*;
pub use traits::ResolutionStrategy;

use crate::{config::AppConfig, platform::ShareUrl, service::http::HttpClient};

use strategy::{ExtractorStrategy, HeadlessStrategy, PageScrapeStrategy, RestLookupStrategy};

/// Runs resolution strategies in priority order until one yields media.
#[derive(Clone)]
pub struct Resolver {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
    attempt_timeout: Duration,
}

impl Resolver {
    pub fn new(strategies: Vec<Arc<dyn ResolutionStrategy>>, attempt_timeout: Duration) -> Self {
        Self {
            strategies,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &AppConfig, http: Arc<dyn HttpClient>) -> Self {
        info!("Initializing resolver");

        let strategies = config
            .resolver
            .strategies
            .iter()
            .map(|kind| -> Arc<dyn ResolutionStrategy> {
                info!("Registering strategy: {}", kind);
                match kind {
                    StrategyKind::RestLookup => {
                        Arc::new(RestLookupStrategy::new(Arc::clone(&http), config.rest_api.clone()))
                    }
                    StrategyKind::PageScrape => Arc::new(PageScrapeStrategy::new(Arc::clone(&http))),
                    StrategyKind::Extractor => Arc::new(ExtractorStrategy::new(
                        config.tools.ytdlp.clone(),
                        config.tools.cookies_file.clone(),
                        config.resolver.attempt_timeout,
                    )),
                    StrategyKind::Headless => Arc::new(HeadlessStrategy::new(
                        config.tools.chrome.clone(),
                        config.resolver.attempt_timeout,
                    )),
                }
            })
            .collect();

        info!("Resolver initialized");
        Self::new(strategies, config.resolver.attempt_timeout)
    }

    pub fn strategies(&self) -> &[Arc<dyn ResolutionStrategy>] {
        &self.strategies
    }

    /// Validates the input before any strategy runs; strategy errors never
    /// escape, only exhaustion of the whole chain does.
    pub async fn resolve(&self, input: &str) -> Result<Resolution, ResolveError> {
        let share_url = ShareUrl::parse(input)?;
        info!("Resolving {} post {}", share_url.identifier().platform(), share_url);

        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name().to_string();

            match self.run_attempt(strategy, &share_url).await {
                Ok(reference) => {
                    info!("Strategy {} resolved {}", name, share_url);
                    return Ok(Resolution {
                        share_url,
                        reference: reference.with_source(&name),
                        failures,
                    });
                }
                Err(reason) => {
                    warn!("Strategy {} failed for {}: {}", name, share_url, reason);
                    failures.push(StrategyFailure { strategy: name, reason });
                }
            }
        }

        error!("All {} strategies failed for {}", failures.len(), share_url);
        Err(ResolveError::Exhausted { attempts: failures })
    }

    async fn run_attempt(
        &self,
        strategy: &Arc<dyn ResolutionStrategy>,
        share_url: &ShareUrl,
    ) -> Result<MediaReference, String> {
        let task_strategy = Arc::clone(strategy);
        let task_url = share_url.clone();
        let mut handle = tokio::spawn(async move { task_strategy.attempt(&task_url).await });

        match tokio::time::timeout(self.attempt_timeout, &mut handle).await {
            Err(_) => {
                handle.abort();
                Err(format!("timed out after {:?}", self.attempt_timeout))
            }
            Ok(Err(join_error)) if join_error.is_panic() => Err("strategy panicked".to_string()),
            Ok(Err(join_error)) => Err(format!("strategy task failed: {}", join_error)),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Ok(Ok(None))) => Err("no media found".to_string()),
            Ok(Ok(Ok(Some(reference)))) if !reference.is_resolved() => {
                Err("returned neither video nor thumbnail".to_string())
            }
            Ok(Ok(Ok(Some(reference)))) => Ok(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::mock::{MockStrategy, Outcome};
    use super::*;

    const REEL: &str = "https://www.instagram.com/reel/ABC123/";

    fn resolver(strategies: &[&MockStrategy]) -> Resolver {
        Resolver::new(
            strategies
                .iter()
                .map(|s| -> Arc<dyn ResolutionStrategy> { Arc::new((*s).clone()) })
                .collect(),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_first_success_wins_and_short_circuits() {
        let failing = MockStrategy::new("rest_lookup", Outcome::Fail);
        let first = MockStrategy::new("page_scrape", Outcome::thumb("https://cdn/a.jpg"));
        let second = MockStrategy::new("extractor", Outcome::thumb("https://cdn/b.jpg"));

        let resolution = resolver(&[&failing, &first, &second]).resolve(REEL).await.unwrap();

        assert_eq!(resolution.reference.source_strategy, "page_scrape");
        assert_eq!(resolution.reference.thumbnail_url.as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_source_strategy_is_stamped_by_resolver() {
        let lying = MockStrategy::new(
            "headless",
            Outcome::Succeed(MediaReference {
                video_url: Some("https://cdn/v.mp4".into()),
                source_strategy: "something_else".into(),
                ..Default::default()
            }),
        );

        let resolution = resolver(&[&lying]).resolve(REEL).await.unwrap();
        assert_eq!(resolution.reference.source_strategy, "headless");
    }

    #[tokio::test]
    async fn test_every_failure_mode_is_contained() {
        let strategies = [
            MockStrategy::new("fail", Outcome::Fail),
            MockStrategy::new("nothing", Outcome::Nothing),
            MockStrategy::new("empty", Outcome::Empty),
            MockStrategy::new("hang", Outcome::Hang),
            MockStrategy::new("panic", Outcome::Panic),
        ];
        let refs: Vec<&MockStrategy> = strategies.iter().collect();

        let err = resolver(&refs).resolve(REEL).await.unwrap_err();

        match err {
            ResolveError::Exhausted { attempts } => {
                let names: Vec<_> = attempts.iter().map(|a| a.strategy.as_str()).collect();
                assert_eq!(names, vec!["fail", "nothing", "empty", "hang", "panic"]);
                assert!(attempts[3].reason.contains("timed out"));
                assert_eq!(attempts[4].reason, "strategy panicked");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        for strategy in &strategies {
            assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_invalid_input_invokes_no_strategy() {
        let strategy = MockStrategy::new("rest_lookup", Outcome::thumb("https://cdn/a.jpg"));
        let resolver = resolver(&[&strategy]);

        for input in ["", "   ", "https://www.youtube.com/watch?v=abc", "https://www.instagram.com/someone/"] {
            let err = resolver.resolve(input).await.unwrap_err();
            assert!(matches!(err, ResolveError::InvalidInput(_)), "input {:?}", input);
        }
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let err = Resolver::new(Vec::new(), Duration::from_secs(1))
            .resolve(REEL)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Exhausted { ref attempts } if attempts.is_empty()));
    }
}

//! Top-level coordinator for one aggregation run.
//!
//! Fans out to every requested provider at once, waits at most the global
//! deadline, merges whatever settled, then runs relevance filtering and
//! categorization. Only total data loss (no posts and at least one failure)
//! is surfaced as an error.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use sift_core::{AppConfig, Platform, Post, ProviderFailure, QueryContext, RunReport};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::categorizer::{Categorizer, DEFAULT_BUCKET_CAP, DEFAULT_MAX_POSTS};
use crate::classifier::{resolve_briefing, Classifier, HistoricalHints};
use crate::diagnostics::no_results_diagnostic;
use crate::error::{AggregateError, ProviderError};
use crate::providers::ProviderSet;
use crate::relevance::{RelevanceFilter, DEFAULT_BATCH_PAUSE, DEFAULT_BATCH_SIZE};

/// Global wait bound for the provider fan-out.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(45);
/// Retry hint attached to [`AggregateError::ServiceUnavailable`].
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Tunables for an [`Aggregator`].
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub deadline: Duration,
    pub retry_after_secs: u64,
    pub relevance_batch_size: usize,
    pub relevance_batch_pause: Duration,
    pub categorize_max_posts: usize,
    pub bucket_cap: usize,
    pub hints: Option<HistoricalHints>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            relevance_batch_size: DEFAULT_BATCH_SIZE,
            relevance_batch_pause: DEFAULT_BATCH_PAUSE,
            categorize_max_posts: DEFAULT_MAX_POSTS,
            bucket_cap: DEFAULT_BUCKET_CAP,
            hints: None,
        }
    }
}

impl AggregatorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            deadline: Duration::from_secs(config.aggregate_deadline_secs),
            retry_after_secs: config.retry_after_secs,
            relevance_batch_size: config.relevance_batch_size,
            relevance_batch_pause: Duration::from_millis(config.relevance_batch_pause_ms),
            categorize_max_posts: config.categorize_max_posts,
            bucket_cap: config.bucket_cap,
            hints: None,
        }
    }

    /// Attach relevance hints; empty hints are ignored.
    #[must_use]
    pub fn with_hints(mut self, hints: HistoricalHints) -> Self {
        self.hints = (!hints.is_empty()).then_some(hints);
        self
    }
}

/// What the provider fan-out produced before the deadline.
#[derive(Debug, Default)]
struct Collected {
    posts: BTreeMap<Platform, Vec<Post>>,
    failures: Vec<ProviderFailure>,
}

/// Runs the full pipeline for one query at a time. Holds no per-run state.
pub struct Aggregator {
    providers: ProviderSet,
    classifier: Option<Arc<dyn Classifier>>,
    relevance: RelevanceFilter,
    categorizer: Categorizer,
    deadline: Duration,
    retry_after_secs: u64,
}

impl Aggregator {
    #[must_use]
    pub fn new(
        providers: ProviderSet,
        classifier: Option<Arc<dyn Classifier>>,
        settings: AggregatorSettings,
    ) -> Self {
        let mut relevance = RelevanceFilter::new(classifier.clone())
            .with_batch_size(settings.relevance_batch_size)
            .with_batch_pause(settings.relevance_batch_pause);
        if let Some(hints) = settings.hints {
            relevance = relevance.with_hints(hints);
        }
        let categorizer = Categorizer::new(classifier.clone())
            .with_max_posts(settings.categorize_max_posts)
            .with_bucket_cap(settings.bucket_cap);

        Self {
            providers,
            classifier,
            relevance,
            categorizer,
            deadline: settings.deadline,
            retry_after_secs: settings.retry_after_secs,
        }
    }

    /// Run one aggregation for `context`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::ServiceUnavailable`] when no provider
    /// returned a post and at least one failed or timed out.
    pub async fn aggregate(&self, context: &QueryContext) -> Result<RunReport, AggregateError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("aggregate", %run_id, query = context.query());
        self.run(context, run_id).instrument(span).await
    }

    async fn run(&self, context: &QueryContext, run_id: Uuid) -> Result<RunReport, AggregateError> {
        let started = Instant::now();
        let query = context.query();
        let time_filter = context.time_filter();

        let collected = self.collect(context).await;
        let requested = context.platforms().len();
        let succeeded = collected.posts.len();
        #[allow(clippy::cast_precision_loss)]
        let success_rate = succeeded as f64 / requested as f64;
        tracing::info!(succeeded, requested, success_rate, "provider fan-out complete");

        let failures = collected.failures;
        let merged: Vec<Post> = collected.posts.into_values().flatten().collect();

        if merged.is_empty() && !failures.is_empty() {
            let diagnostic = no_results_diagnostic(query, time_filter, 0, &failures);
            tracing::warn!(
                failures = failures.len(),
                retry_after_secs = self.retry_after_secs,
                "no posts retrieved; service unavailable"
            );
            return Err(AggregateError::ServiceUnavailable {
                failures,
                retry_after_secs: self.retry_after_secs,
                diagnostic: Box::new(diagnostic),
            });
        }

        let posts = dedup_by_id(merged);
        let total_posts = posts.len();

        let briefing = if posts.is_empty() {
            String::new()
        } else {
            resolve_briefing(self.classifier.as_deref(), query).await
        };
        let relevant = self.relevance.filter_relevant(posts, query, &briefing).await;
        let mut report = self
            .categorizer
            .categorize(relevant, query, &briefing, Some(total_posts))
            .await;

        let total_results = report.total_categorized();
        if total_results == 0 {
            report.no_results_diagnostic = Some(no_results_diagnostic(
                query,
                time_filter,
                total_posts,
                &failures,
            ));
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(total_posts, total_results, duration_ms, "aggregation complete");

        Ok(RunReport {
            run_id,
            report,
            total_posts,
            total_results,
            duration_ms,
            errors: (!failures.is_empty()).then_some(failures),
        })
    }

    /// Query every requested provider concurrently, stopping at the deadline.
    ///
    /// Calls still running at the deadline are dropped and recorded as
    /// timeouts; results that settled before it are kept.
    async fn collect(&self, context: &QueryContext) -> Collected {
        let mut collected = Collected::default();
        let mut pending: BTreeSet<Platform> = BTreeSet::new();
        let mut calls = FuturesUnordered::new();
        let (query, language, time_filter) =
            (context.query(), context.language(), context.time_filter());

        for &platform in context.platforms() {
            let Some(provider) = self.providers.get(platform) else {
                let error = ProviderError::NotConfigured(platform);
                tracing::warn!(%platform, error = %error, "provider search failed");
                collected.failures.push(ProviderFailure {
                    platform,
                    message: error.to_string(),
                });
                continue;
            };
            pending.insert(platform);
            calls.push(async move {
                let started = Instant::now();
                let result = provider.search(query, language, time_filter).await;
                (platform, result, started.elapsed())
            });
        }

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        while !calls.is_empty() {
            tokio::select! {
                Some((platform, result, elapsed)) = calls.next() => {
                    pending.remove(&platform);
                    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                    match result {
                        Ok(posts) => {
                            tracing::info!(%platform, count = posts.len(), elapsed_ms, "provider search succeeded");
                            collected.posts.insert(platform, posts);
                        }
                        Err(e) => {
                            tracing::warn!(%platform, error = %e, elapsed_ms, "provider search failed");
                            collected.failures.push(ProviderFailure {
                                platform,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                () = &mut deadline => break,
            }
        }

        let deadline_secs = self.deadline.as_secs();
        for platform in pending {
            tracing::warn!(%platform, deadline_secs, "provider search timed out");
            collected.failures.push(ProviderFailure {
                platform,
                message: format!("timed out after {deadline_secs}s"),
            });
        }

        collected.failures.sort_by_key(|failure| failure.platform);
        collected
    }
}

/// Keep the first occurrence of each post id, preserving order.
fn dedup_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(posts.len());
    let before = posts.len();
    let unique: Vec<Post> = posts
        .into_iter()
        .filter(|post| seen.insert(post.id.clone()))
        .collect();
    if unique.len() < before {
        tracing::debug!(removed = before - unique.len(), "dropped duplicate posts");
    }
    unique
}

#[cfg(test)]
mod tests {
    use sift_core::Platform;

    use super::*;
    use crate::testing::{ids, post};

    #[test]
    fn dedup_keeps_first_seen_order() {
        let posts = vec![
            post("reddit_1", Platform::Reddit, "a", 1),
            post("x_1", Platform::X, "b", 1),
            post("reddit_1", Platform::Reddit, "dup", 9),
            post("youtube_1", Platform::Youtube, "c", 1),
            post("x_1", Platform::X, "dup", 9),
        ];
        let unique = dedup_by_id(posts);
        assert_eq!(ids(&unique), vec!["reddit_1", "x_1", "youtube_1"]);
        assert_eq!(unique[0].content, "a");
    }

    #[test]
    fn settings_follow_config_values() {
        let config = AppConfig {
            env: sift_core::Environment::Test,
            log_level: "debug".to_string(),
            aggregate_deadline_secs: 5,
            retry_after_secs: 30,
            relevance_batch_size: 20,
            relevance_batch_pause_ms: 250,
            categorize_max_posts: 80,
            bucket_cap: 10,
            provider_timeout_secs: 5,
            user_agent: "test".to_string(),
            classifier_api_key: None,
            classifier_base_url: "http://localhost".to_string(),
            classifier_model: "m".to_string(),
            classifier_timeout_secs: 5,
            reddit_client_id: None,
            reddit_client_secret: None,
            reddit_user_agent: "test".to_string(),
            twitter_auth_token: None,
            twitter_ct0: None,
            youtube_enabled: false,
        };
        let settings = AggregatorSettings::from_config(&config);
        assert_eq!(settings.deadline, Duration::from_secs(5));
        assert_eq!(settings.relevance_batch_pause, Duration::from_millis(250));
        assert_eq!(settings.retry_after_secs, 30);
        assert_eq!(settings.bucket_cap, 10);
    }

    #[test]
    fn empty_hints_are_dropped() {
        let settings = AggregatorSettings::default().with_hints(HistoricalHints::default());
        assert!(settings.hints.is_none());
    }
}

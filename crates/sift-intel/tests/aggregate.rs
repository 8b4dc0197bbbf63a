//! End-to-end aggregation runs against scripted providers and classifiers.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sift_core::{DiagnosticKind, Platform, Post, QueryContext, TimeFilter};
use sift_intel::{
    AggregateError, Aggregator, AggregatorSettings, Classifier, ClassifierError, ClassifierItem,
    HistoricalHints, IntentIndices, Provider, ProviderError, ProviderSet,
};

struct ScriptedProvider {
    platform: Platform,
    delay: Duration,
    outcome: Result<Vec<Post>, String>,
}

impl ScriptedProvider {
    fn ok(platform: Platform, delay_secs: u64, posts: Vec<Post>) -> Self {
        Self {
            platform,
            delay: Duration::from_secs(delay_secs),
            outcome: Ok(posts),
        }
    }

    fn failing(platform: Platform, delay_secs: u64, message: &str) -> Self {
        Self {
            platform,
            delay: Duration::from_secs(delay_secs),
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn search(
        &self,
        _query: &str,
        _language: &str,
        _time_filter: TimeFilter,
    ) -> Result<Vec<Post>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.outcome.clone().map_err(ProviderError::Auth)
    }
}

/// Counts every call. Relevance keeps everything unless `reject_all`; intent always fails.
#[derive(Default)]
struct CountingClassifier {
    calls: AtomicUsize,
    reject_all: bool,
}

#[async_trait]
impl Classifier for CountingClassifier {
    async fn filter_relevance(
        &self,
        batch: &[ClassifierItem],
        _query: &str,
        _briefing: &str,
        _hints: Option<&HistoricalHints>,
    ) -> Result<BTreeSet<usize>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_all {
            Ok(BTreeSet::new())
        } else {
            Ok(batch.iter().map(|item| item.index).collect())
        }
    }

    async fn categorize_intent(
        &self,
        _items: &[ClassifierItem],
        _query: &str,
        _briefing: &str,
    ) -> Result<IntentIndices, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClassifierError::EmptyReply)
    }

    async fn semantic_briefing(&self, _query: &str) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Coffee brewing at home and in cafes.".to_string())
    }
}

fn post(platform: Platform, native_id: &str, content: &str) -> Post {
    Post {
        id: platform.post_id(native_id),
        content: content.to_string(),
        platform,
        source: "test".to_string(),
        engagement: 3,
        timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        url: format!("https://example.com/{native_id}"),
    }
}

fn context(platforms: &[Platform]) -> QueryContext {
    QueryContext::new("coffee", platforms.iter().copied(), "en", TimeFilter::Week).unwrap()
}

fn aggregator(providers: ProviderSet, classifier: Option<Arc<dyn Classifier>>) -> Aggregator {
    Aggregator::new(providers, classifier, AggregatorSettings::default())
}

#[tokio::test(start_paused = true)]
async fn deadline_keeps_settled_results_and_records_the_straggler() {
    let providers = ProviderSet::new()
        .with(ScriptedProvider::ok(
            Platform::Reddit,
            10,
            vec![
                post(Platform::Reddit, "1", "My grinder is broken"),
                post(Platform::Reddit, "2", "How do I make cold brew?"),
            ],
        ))
        .with(ScriptedProvider::ok(
            Platform::X,
            50,
            vec![post(Platform::X, "1", "late post")],
        ))
        .with(ScriptedProvider::failing(Platform::Youtube, 5, "quota exceeded"));

    let started = tokio::time::Instant::now();
    let report = aggregator(providers, None)
        .aggregate(&context(&Platform::ALL))
        .await
        .expect("partial results are not an error");

    assert_eq!(started.elapsed(), Duration::from_secs(45));
    assert_eq!(report.total_posts, 2);
    let errors = report.errors.expect("failures are reported");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].platform, Platform::X);
    assert_eq!(errors[0].message, "timed out after 45s");
    assert_eq!(errors[1].platform, Platform::Youtube);
    assert!(errors[1].message.contains("quota exceeded"));
}

#[tokio::test(start_paused = true)]
async fn all_providers_failing_is_service_unavailable_without_classifying() {
    let providers = ProviderSet::new()
        .with(ScriptedProvider::failing(Platform::Reddit, 1, "401"))
        .with(ScriptedProvider::failing(Platform::X, 2, "bird exited 1"))
        .with(ScriptedProvider::failing(Platform::Youtube, 3, "503"));
    let classifier = Arc::new(CountingClassifier::default());

    let err = aggregator(providers, Some(Arc::clone(&classifier) as Arc<dyn Classifier>))
        .aggregate(&context(&Platform::ALL))
        .await
        .expect_err("zero posts with failures must fail");

    match err {
        AggregateError::ServiceUnavailable {
            failures,
            retry_after_secs,
            diagnostic,
        } => {
            assert_eq!(failures.len(), 3);
            assert_eq!(retry_after_secs, 60);
            assert_eq!(diagnostic.kind, DiagnosticKind::SourceErrors);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn timeouts_alone_count_as_total_failure() {
    let providers = ProviderSet::new().with(ScriptedProvider::ok(Platform::Reddit, 100, vec![]));

    let err = aggregator(providers, None)
        .aggregate(&context(&[Platform::Reddit]))
        .await
        .expect_err("a timed-out sole provider yields nothing");

    let AggregateError::ServiceUnavailable { failures, .. } = err else {
        panic!("expected service unavailable");
    };
    assert_eq!(failures[0].message, "timed out after 45s");
}

#[tokio::test(start_paused = true)]
async fn duplicate_ids_are_counted_once() {
    let providers = ProviderSet::new()
        .with(ScriptedProvider::ok(
            Platform::Reddit,
            1,
            vec![
                post(Platform::Reddit, "1", "first copy is broken"),
                post(Platform::Reddit, "2", "How do I brew?"),
                post(Platform::Reddit, "1", "second copy"),
            ],
        ))
        .with(ScriptedProvider::ok(
            Platform::X,
            2,
            vec![post(Platform::X, "1", "Cold brew is going viral")],
        ));

    let report = aggregator(providers, None)
        .aggregate(&context(&[Platform::Reddit, Platform::X]))
        .await
        .unwrap();

    assert_eq!(report.total_posts, 3);
    assert!(report.errors.is_none());
    let all: Vec<&Post> = report
        .report
        .pain_points
        .iter()
        .chain(&report.report.trending_ideas)
        .chain(&report.report.content_ideas)
        .collect();
    let first = all.iter().find(|p| p.id == "reddit_1").unwrap();
    assert_eq!(first.content, "first copy is broken");
}

#[tokio::test(start_paused = true)]
async fn unregistered_platform_is_reported_as_a_failure() {
    let providers = ProviderSet::new().with(ScriptedProvider::ok(
        Platform::Reddit,
        1,
        vec![post(Platform::Reddit, "1", "Espresso machine keeps failing")],
    ));

    let report = aggregator(providers, None)
        .aggregate(&context(&[Platform::Reddit, Platform::Youtube]))
        .await
        .unwrap();

    let errors = report.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].platform, Platform::Youtube);
    assert_eq!(errors[0].message, "no provider configured for youtube");
}

#[tokio::test(start_paused = true)]
async fn everything_filtered_out_attaches_a_diagnostic() {
    let providers = ProviderSet::new().with(ScriptedProvider::ok(
        Platform::Reddit,
        1,
        vec![
            post(Platform::Reddit, "1", "Jaguar the car is broken"),
            post(Platform::Reddit, "2", "Jaguar the cat"),
        ],
    ));
    let classifier = Arc::new(CountingClassifier {
        reject_all: true,
        ..CountingClassifier::default()
    });

    let report = aggregator(providers, Some(classifier as Arc<dyn Classifier>))
        .aggregate(&context(&[Platform::Reddit]))
        .await
        .unwrap();

    assert_eq!(report.total_posts, 2);
    assert_eq!(report.total_results, 0);
    assert_eq!(report.report.relevance_analysis.excluded_irrelevant_posts, 2);
    let diagnostic = report.report.no_results_diagnostic.unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::AllFilteredOut);
}

#[tokio::test(start_paused = true)]
async fn nothing_found_is_not_an_error() {
    let providers = ProviderSet::new().with(ScriptedProvider::ok(Platform::Youtube, 1, vec![]));

    let report = aggregator(providers, None)
        .aggregate(&context(&[Platform::Youtube]))
        .await
        .unwrap();

    assert_eq!(report.total_posts, 0);
    assert_eq!(
        report.report.no_results_diagnostic.unwrap().kind,
        DiagnosticKind::NothingFound
    );
}

#[tokio::test(start_paused = true)]
async fn fresh_posts_without_keywords_are_not_reported_as_filtered_out() {
    let fresh: Vec<Post> = (0..3)
        .map(|i| Post {
            engagement: 0,
            ..post(Platform::Reddit, &i.to_string(), "espresso")
        })
        .collect();
    let providers = ProviderSet::new().with(ScriptedProvider::ok(Platform::Reddit, 1, fresh));

    let report = aggregator(providers, None)
        .aggregate(&context(&[Platform::Reddit]))
        .await
        .unwrap();

    assert_eq!(report.total_results, 3);
    assert!(report.report.no_results_diagnostic.is_none());
    assert_eq!(report.report.pain_points.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn report_serializes_run_metadata() {
    let providers = ProviderSet::new().with(ScriptedProvider::ok(
        Platform::Reddit,
        1,
        vec![post(Platform::Reddit, "1", "Why is my latte bitter?")],
    ));

    let report = aggregator(providers, None)
        .aggregate(&context(&[Platform::Reddit]))
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!(json.get("runId").is_some());
    assert_eq!(json["totalPosts"], 1);
    assert_eq!(json["totalResults"], 1);
    assert!(json.get("painPoints").is_some());
    assert!(json.get("errors").is_none());
}

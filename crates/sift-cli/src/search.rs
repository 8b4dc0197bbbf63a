//! `search` command: build the collaborators, run one aggregation, print it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use sift_core::{AppConfig, NoResultsDiagnostic, Platform, Post, QueryContext, RunReport, TimeFilter};
use sift_intel::{
    AggregateError, Aggregator, AggregatorSettings, ChatClassifier, Classifier, HistoricalHints,
    ProviderSet,
};

/// Posts listed per bucket in text output.
const LISTED_PER_BUCKET: usize = 10;
const LINE_CHARS: usize = 100;

#[derive(Debug)]
pub(crate) struct SearchRequest {
    pub(crate) query: String,
    pub(crate) platforms: Vec<Platform>,
    pub(crate) language: String,
    pub(crate) time_filter: TimeFilter,
    pub(crate) hints: Option<PathBuf>,
    pub(crate) json: bool,
}

pub(crate) fn load_hints(path: &Path) -> anyhow::Result<HistoricalHints> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read hints file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("hints file {} is not valid JSON", path.display()))
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn Classifier>>> {
    let Some(api_key) = config.classifier_api_key.as_deref() else {
        tracing::info!("classifier api key not set; using keyword heuristics only");
        return Ok(None);
    };
    let classifier = ChatClassifier::with_base_url(
        api_key,
        &config.classifier_model,
        config.classifier_timeout_secs,
        &config.classifier_base_url,
    )?;
    Ok(Some(Arc::new(classifier)))
}

/// Run one aggregation and print the report.
///
/// # Errors
///
/// Returns an error if no provider is configured, the query is invalid, the
/// hints file cannot be read, or every provider failed. In the last case the
/// no-results diagnostic is printed first.
pub(crate) async fn run_search(config: &AppConfig, request: SearchRequest) -> anyhow::Result<()> {
    let providers = ProviderSet::from_config(config)?;
    if providers.is_empty() {
        anyhow::bail!("no providers configured; set reddit or twitter credentials or enable youtube");
    }

    let platforms: Vec<Platform> = if request.platforms.is_empty() {
        providers.platforms().collect()
    } else {
        request.platforms
    };
    let context = QueryContext::new(
        &request.query,
        platforms,
        &request.language,
        request.time_filter,
    )
    .map_err(AggregateError::from)?;

    let mut settings = AggregatorSettings::from_config(config);
    if let Some(path) = request.hints.as_deref() {
        settings = settings.with_hints(load_hints(path)?);
    }

    let aggregator = Aggregator::new(providers, build_classifier(config)?, settings);

    match aggregator.aggregate(&context).await {
        Ok(report) => {
            if request.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(context.query(), &report));
            }
            Ok(())
        }
        Err(AggregateError::ServiceUnavailable {
            failures,
            retry_after_secs,
            diagnostic,
        }) => {
            if request.json {
                let body = serde_json::json!({
                    "error": "service_unavailable",
                    "retryAfterSecs": retry_after_secs,
                    "errors": failures,
                    "noResultsDiagnostic": diagnostic,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", render_diagnostic(&diagnostic));
            }
            anyhow::bail!(
                "no posts retrieved from {} failing provider(s); retry in {retry_after_secs}s",
                failures.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn one_line(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default().trim();
    if first.chars().count() > LINE_CHARS {
        let mut cut: String = first.chars().take(LINE_CHARS).collect();
        cut.push('…');
        cut
    } else {
        first.to_string()
    }
}

fn write_bucket(out: &mut String, title: &str, posts: &[Post]) {
    let _ = writeln!(out, "\n{title} ({})", posts.len());
    for post in posts.iter().take(LISTED_PER_BUCKET) {
        let _ = writeln!(
            out,
            "  - [{} {} | {}] {}",
            post.platform,
            post.source,
            post.engagement,
            one_line(&post.content)
        );
        let _ = writeln!(out, "    {}", post.url);
    }
    if posts.len() > LISTED_PER_BUCKET {
        let _ = writeln!(out, "  … {} more", posts.len() - LISTED_PER_BUCKET);
    }
}

pub(crate) fn render_report(query: &str, report: &RunReport) -> String {
    let mut out = format!(
        "Results for \"{query}\": {} categorized from {} posts in {} ms\n",
        report.total_results, report.total_posts, report.duration_ms
    );

    let analysis = &report.report.relevance_analysis;
    let _ = writeln!(
        out,
        "Relevance: {} relevant, {} excluded, score {:.2}",
        analysis.total_relevant_posts, analysis.excluded_irrelevant_posts, analysis.relevance_score
    );

    write_bucket(&mut out, "Pain points", &report.report.pain_points);
    write_bucket(&mut out, "Trending ideas", &report.report.trending_ideas);
    write_bucket(&mut out, "Content ideas", &report.report.content_ideas);

    if let Some(errors) = &report.errors {
        out.push_str("\nSource errors:\n");
        for failure in errors {
            let _ = writeln!(out, "  - {failure}");
        }
    }

    if let Some(diagnostic) = &report.report.no_results_diagnostic {
        out.push('\n');
        out.push_str(&render_diagnostic(diagnostic));
    }
    out
}

pub(crate) fn render_diagnostic(diagnostic: &NoResultsDiagnostic) -> String {
    let mut out = format!("{}\n{}\n", diagnostic.title, diagnostic.message);
    if !diagnostic.reasons.is_empty() {
        out.push_str("\nPossible reasons:\n");
        for reason in &diagnostic.reasons {
            let _ = writeln!(out, "  - {reason}");
        }
    }
    if !diagnostic.suggestions.is_empty() {
        out.push_str("\nTry:\n");
        for suggestion in &diagnostic.suggestions {
            let _ = writeln!(out, "  - {suggestion}");
        }
    }
    let _ = writeln!(out, "\nTip: {}", diagnostic.tip);
    out
}

//! Run-level output types.

use serde::{Deserialize, Serialize};

use crate::diagnostic::NoResultsDiagnostic;
use crate::post::{Platform, Post};

/// A provider that failed or did not settle before the deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub platform: Platform,
    pub message: String,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.platform, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceAnalysis {
    pub total_relevant_posts: usize,
    /// In `0.0..=1.0`.
    pub relevance_score: f64,
    pub excluded_irrelevant_posts: usize,
}

/// Posts sorted into the three intent buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedReport {
    pub pain_points: Vec<Post>,
    pub trending_ideas: Vec<Post>,
    pub content_ideas: Vec<Post>,
    pub relevance_analysis: RelevanceAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_results_diagnostic: Option<NoResultsDiagnostic>,
}

impl CategorizedReport {
    /// Number of posts across all buckets.
    #[must_use]
    pub fn total_categorized(&self) -> usize {
        self.pain_points.len() + self.trending_ideas.len() + self.content_ideas.len()
    }
}

/// The sole externally visible artifact of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: uuid::Uuid,
    #[serde(flatten)]
    pub report: CategorizedReport,
    /// Deduplicated posts fetched, before relevance filtering.
    pub total_posts: usize,
    /// Posts across all buckets.
    pub total_results: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProviderFailure>>,
}

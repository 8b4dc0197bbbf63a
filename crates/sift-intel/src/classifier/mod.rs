//! Classifier contract and the AI-backed implementation.
//!
//! A [`Classifier`] judges topical relevance and intent for numbered batches
//! of posts. Callers own every fallback: [`crate::RelevanceFilter`] fails open
//! and [`crate::Categorizer`] re-scores with the local lexicon.

mod chat;
mod prompt;
mod reply;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_core::{Platform, Post};

use crate::error::ClassifierError;

pub use chat::ChatClassifier;

/// Maximum characters of post content sent to the classifier.
pub const EXCERPT_CHARS: usize = 300;

/// One numbered line of a classifier batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierItem {
    /// 1-based position inside the batch.
    pub index: usize,
    pub platform: Platform,
    pub source: String,
    pub engagement: u64,
    pub excerpt: String,
}

impl ClassifierItem {
    /// Number `posts` from 1 in order.
    #[must_use]
    pub fn batch<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Vec<Self> {
        posts
            .into_iter()
            .enumerate()
            .map(|(i, post)| Self {
                index: i + 1,
                platform: post.platform,
                source: post.source.clone(),
                engagement: post.engagement,
                excerpt: excerpt(&post.content),
            })
            .collect()
    }
}

fn excerpt(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        flat
    } else {
        let mut cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        cut.push('…');
        cut
    }
}

/// 1-based indices per intent bucket, validated against the batch length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentIndices {
    pub pain_points: Vec<usize>,
    pub trending_ideas: Vec<usize>,
    pub content_ideas: Vec<usize>,
}

/// Past rating feedback, used read-only to calibrate relevance judgments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalHints {
    /// Snippets users rated as on-topic for similar queries.
    #[serde(default)]
    pub relevant: Vec<String>,
    /// Snippets users rated as off-topic.
    #[serde(default)]
    pub irrelevant: Vec<String>,
}

impl HistoricalHints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relevant.is_empty() && self.irrelevant.is_empty()
    }
}

/// AI-backed relevance and intent judgment.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Return the 1-based indices in `batch` that are relevant to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] on transport failure or a reply that does
    /// not validate.
    async fn filter_relevance(
        &self,
        batch: &[ClassifierItem],
        query: &str,
        briefing: &str,
        hints: Option<&HistoricalHints>,
    ) -> Result<BTreeSet<usize>, ClassifierError>;

    /// Sort each item into exactly one intent bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] on transport failure or a reply that does
    /// not validate.
    async fn categorize_intent(
        &self,
        items: &[ClassifierItem],
        query: &str,
        briefing: &str,
    ) -> Result<IntentIndices, ClassifierError>;

    /// Short description of what `query` means and which domain it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] when no briefing could be produced.
    async fn semantic_briefing(&self, query: &str) -> Result<String, ClassifierError>;
}

/// Briefing used whenever the classifier cannot produce one.
#[must_use]
pub fn generic_briefing(query: &str) -> String {
    format!(
        "\"{query}\" is the topic being researched. Treat content as relevant only when it \
         discusses this topic itself, not when it merely shares a word with it."
    )
}

/// Ask the classifier for a briefing, substituting the generic one on failure.
pub async fn resolve_briefing(classifier: Option<&dyn Classifier>, query: &str) -> String {
    let Some(classifier) = classifier else {
        return generic_briefing(query);
    };
    match classifier.semantic_briefing(query).await {
        Ok(briefing) => briefing,
        Err(e) => {
            tracing::warn!(error = %e, "semantic briefing failed; using generic briefing");
            generic_briefing(query)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn post(content: &str) -> Post {
        Post {
            id: "reddit_1".to_string(),
            content: content.to_string(),
            platform: Platform::Reddit,
            source: "r/coffee".to_string(),
            engagement: 7,
            timestamp: Utc::now(),
            url: String::new(),
        }
    }

    #[test]
    fn batch_numbers_from_one() {
        let posts = [post("a"), post("b")];
        let items = ClassifierItem::batch(&posts);
        assert_eq!(items[0].index, 1);
        assert_eq!(items[1].index, 2);
        assert_eq!(items[1].source, "r/coffee");
        assert_eq!(items[1].engagement, 7);
    }

    #[test]
    fn excerpt_flattens_whitespace_and_truncates() {
        assert_eq!(excerpt("line one\n\n  line two"), "line one line two");
        let long = "x".repeat(EXCERPT_CHARS + 50);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
    }

    #[tokio::test]
    async fn missing_classifier_uses_generic_briefing() {
        let briefing = resolve_briefing(None, "cold brew").await;
        assert_eq!(briefing, generic_briefing("cold brew"));
        assert!(briefing.contains("cold brew"));
    }
}

//! Intent categorization of relevant posts.
//!
//! The classifier sorts a platform-interleaved sample into pain points,
//! trending ideas and content ideas. When it is absent or its reply fails
//! validation, the keyword [`lexicon`] scores every post instead. Either way
//! [`repair`] then guarantees no bucket is left empty while others have posts.

mod lexicon;
mod repair;

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use sift_core::{CategorizedReport, Platform, Post, RelevanceAnalysis};

use crate::classifier::{Classifier, ClassifierItem, IntentIndices};

/// Most posts sent to the classifier in one categorization call.
pub const DEFAULT_MAX_POSTS: usize = 100;
/// Per-bucket cap on the heuristic path.
pub const DEFAULT_BUCKET_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bucket {
    PainPoints,
    TrendingIdeas,
    ContentIdeas,
}

impl Bucket {
    /// Evaluation order; also the tie-break priority.
    pub(crate) const ALL: [Self; 3] = [Self::PainPoints, Self::TrendingIdeas, Self::ContentIdeas];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::PainPoints => "pain_points",
            Self::TrendingIdeas => "trending_ideas",
            Self::ContentIdeas => "content_ideas",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Buckets {
    pub(crate) pain_points: Vec<Post>,
    pub(crate) trending_ideas: Vec<Post>,
    pub(crate) content_ideas: Vec<Post>,
}

impl Buckets {
    pub(crate) fn get(&self, bucket: Bucket) -> &Vec<Post> {
        match bucket {
            Bucket::PainPoints => &self.pain_points,
            Bucket::TrendingIdeas => &self.trending_ideas,
            Bucket::ContentIdeas => &self.content_ideas,
        }
    }

    pub(crate) fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Post> {
        match bucket {
            Bucket::PainPoints => &mut self.pain_points,
            Bucket::TrendingIdeas => &mut self.trending_ideas,
            Bucket::ContentIdeas => &mut self.content_ideas,
        }
    }

    fn total(&self) -> usize {
        self.pain_points.len() + self.trending_ideas.len() + self.content_ideas.len()
    }
}

/// Assigns each relevant post to one intent bucket.
pub struct Categorizer {
    classifier: Option<Arc<dyn Classifier>>,
    max_posts: usize,
    bucket_cap: usize,
}

impl Categorizer {
    #[must_use]
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            classifier,
            max_posts: DEFAULT_MAX_POSTS,
            bucket_cap: DEFAULT_BUCKET_CAP,
        }
    }

    #[must_use]
    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.max_posts = max_posts.max(1);
        self
    }

    #[must_use]
    pub fn with_bucket_cap(mut self, bucket_cap: usize) -> Self {
        self.bucket_cap = bucket_cap.max(1);
        self
    }

    /// Categorize `relevant` for `query`.
    ///
    /// `pre_filter_total` is the post count before relevance filtering; when
    /// given, `excludedIrrelevantPosts` reports the difference.
    pub async fn categorize(
        &self,
        relevant: Vec<Post>,
        query: &str,
        briefing: &str,
        pre_filter_total: Option<usize>,
    ) -> CategorizedReport {
        let input_count = relevant.len();
        let excluded = pre_filter_total.map_or(0, |total| total.saturating_sub(input_count));

        if relevant.is_empty() {
            return CategorizedReport {
                relevance_analysis: RelevanceAnalysis {
                    total_relevant_posts: 0,
                    relevance_score: 0.0,
                    excluded_irrelevant_posts: excluded,
                },
                ..CategorizedReport::default()
            };
        }

        let classified = match self.classifier.as_deref() {
            Some(classifier) => self.classify(classifier, &relevant, query, briefing).await,
            None => None,
        };

        let (mut buckets, relevance_score) = if let Some(buckets) = classified {
            (buckets, 1.0)
        } else {
            let buckets = lexicon::categorize(relevant, self.bucket_cap);
            let kept = buckets.total();
            tracing::debug!(input_count, kept, "heuristic categorization complete");
            (buckets, ratio(kept, input_count))
        };

        let moved = repair::ensure_non_empty(&mut buckets, input_count);

        tracing::info!(
            input_count,
            pain_points = buckets.pain_points.len(),
            trending_ideas = buckets.trending_ideas.len(),
            content_ideas = buckets.content_ideas.len(),
            repaired = moved,
            "categorization complete"
        );

        CategorizedReport {
            pain_points: buckets.pain_points,
            trending_ideas: buckets.trending_ideas,
            content_ideas: buckets.content_ideas,
            relevance_analysis: RelevanceAnalysis {
                total_relevant_posts: input_count,
                relevance_score,
                excluded_irrelevant_posts: excluded,
            },
            no_results_diagnostic: None,
        }
    }

    /// Classifier path. `None` means the caller should fall back to the lexicon.
    async fn classify(
        &self,
        classifier: &dyn Classifier,
        relevant: &[Post],
        query: &str,
        briefing: &str,
    ) -> Option<Buckets> {
        let sample = interleave_sample(relevant, self.max_posts);
        let items = ClassifierItem::batch(sample.iter().map(|&pos| &relevant[pos]));

        let indices = match classifier.categorize_intent(&items, query, briefing).await {
            Ok(indices) => indices,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    sample = items.len(),
                    "intent classification failed; using keyword heuristic"
                );
                return None;
            }
        };

        let mut positions = classified_positions(&sample, &indices);

        if sample.len() < relevant.len() {
            let mut in_sample = vec![false; relevant.len()];
            for &pos in &sample {
                in_sample[pos] = true;
            }
            let average = lexicon::average_engagement(relevant);
            for (pos, post) in relevant.iter().enumerate() {
                if !in_sample[pos] {
                    positions[slot(lexicon::bucket_for(post, average))].push(pos);
                }
            }
            tracing::debug!(
                unsampled = relevant.len() - sample.len(),
                "scored posts beyond the classifier sample"
            );
        }

        let buckets = collect_positions(relevant, positions);
        tracing::debug!(classified = buckets.total(), "intent classification complete");
        Some(buckets)
    }
}

fn slot(bucket: Bucket) -> usize {
    match bucket {
        Bucket::PainPoints => 0,
        Bucket::TrendingIdeas => 1,
        Bucket::ContentIdeas => 2,
    }
}

/// Positions in `relevant` chosen per bucket, from sample-relative 1-based indices.
fn classified_positions(sample: &[usize], indices: &IntentIndices) -> [Vec<usize>; 3] {
    [
        &indices.pain_points,
        &indices.trending_ideas,
        &indices.content_ideas,
    ]
    .map(|chosen| {
        chosen
            .iter()
            .filter_map(|&index| index.checked_sub(1).and_then(|i| sample.get(i)).copied())
            .collect::<Vec<usize>>()
    })
}

/// Materialize bucket positions, each bucket ordered as in `relevant`.
fn collect_positions(relevant: &[Post], positions: [Vec<usize>; 3]) -> Buckets {
    let mut buckets = Buckets::default();
    for (bucket, mut chosen) in Bucket::ALL.into_iter().zip(positions) {
        chosen.sort_unstable();
        chosen.dedup();
        buckets
            .get_mut(bucket)
            .extend(chosen.into_iter().map(|pos| relevant[pos].clone()));
    }
    buckets
}

/// Positions of at most `max` posts, taken round-robin across platforms so
/// the classifier never sees them grouped. Per-platform order is preserved.
fn interleave_sample(posts: &[Post], max: usize) -> Vec<usize> {
    let mut queues: BTreeMap<Platform, VecDeque<usize>> = BTreeMap::new();
    for (pos, post) in posts.iter().enumerate() {
        queues.entry(post.platform).or_default().push_back(pos);
    }

    let limit = max.min(posts.len());
    let mut sample = Vec::with_capacity(limit);
    while sample.len() < limit {
        for queue in queues.values_mut() {
            if sample.len() == limit {
                break;
            }
            if let Some(pos) = queue.pop_front() {
                sample.push(pos);
            }
        }
    }
    sample
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
#[path = "categorizer_test.rs"]
mod tests;

//! Batch-wise removal of off-topic posts.

use std::sync::Arc;
use std::time::Duration;

use sift_core::Post;

use crate::classifier::{Classifier, ClassifierItem, HistoricalHints};

/// Posts per classifier call.
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Pause between consecutive batches to respect the classifier's rate limits.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Drops posts the classifier judges irrelevant to the query.
///
/// Batches run strictly one after another. A batch whose classifier call
/// fails is kept whole, and with no classifier the filter is a no-op.
pub struct RelevanceFilter {
    classifier: Option<Arc<dyn Classifier>>,
    batch_size: usize,
    batch_pause: Duration,
    hints: Option<HistoricalHints>,
}

impl RelevanceFilter {
    #[must_use]
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: DEFAULT_BATCH_PAUSE,
            hints: None,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_batch_pause(mut self, batch_pause: Duration) -> Self {
        self.batch_pause = batch_pause;
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: HistoricalHints) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Keep only posts relevant to `query`, in their original order.
    pub async fn filter_relevant(&self, posts: Vec<Post>, query: &str, briefing: &str) -> Vec<Post> {
        let Some(classifier) = self.classifier.as_deref() else {
            tracing::debug!(count = posts.len(), "no classifier configured; skipping relevance filter");
            return posts;
        };

        let total = posts.len();
        let batch_count = total.div_ceil(self.batch_size);
        let mut kept = Vec::with_capacity(total);
        let mut remaining = posts.into_iter();

        for batch_no in 0..batch_count {
            if batch_no > 0 && !self.batch_pause.is_zero() {
                tokio::time::sleep(self.batch_pause).await;
            }

            let batch: Vec<Post> = remaining.by_ref().take(self.batch_size).collect();
            let items = ClassifierItem::batch(&batch);

            match classifier
                .filter_relevance(&items, query, briefing, self.hints.as_ref())
                .await
            {
                Ok(relevant) => {
                    let before = batch.len();
                    kept.extend(
                        batch
                            .into_iter()
                            .enumerate()
                            .filter(|(i, _)| relevant.contains(&(i + 1)))
                            .map(|(_, post)| post),
                    );
                    tracing::debug!(
                        batch = batch_no + 1,
                        batches = batch_count,
                        size = before,
                        relevant = relevant.len(),
                        "relevance batch classified"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        batch = batch_no + 1,
                        batches = batch_count,
                        size = batch.len(),
                        error = %e,
                        "relevance classification failed; keeping whole batch"
                    );
                    kept.extend(batch);
                }
            }
        }

        tracing::info!(
            total,
            relevant = kept.len(),
            excluded = total - kept.len(),
            "relevance filtering complete"
        );
        kept
    }
}

#[cfg(test)]
#[path = "relevance_test.rs"]
mod tests;

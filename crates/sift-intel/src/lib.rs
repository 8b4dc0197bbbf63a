//! Aggregation and classification pipeline.
//!
//! [`Aggregator`] fans a query out to the configured [`Provider`]s under a
//! global deadline, drops off-topic posts with the [`RelevanceFilter`], and
//! sorts the rest into intent buckets with the [`Categorizer`]. Every
//! classifier-backed step has a local fallback, so only total provider
//! failure surfaces as an error.

pub mod categorizer;
pub mod classifier;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod relevance;

#[cfg(test)]
mod testing;

pub use categorizer::Categorizer;
pub use classifier::{ChatClassifier, Classifier, ClassifierItem, HistoricalHints, IntentIndices};
pub use diagnostics::no_results_diagnostic;
pub use error::{AggregateError, ClassifierError, ProviderError};
pub use orchestrator::{Aggregator, AggregatorSettings};
pub use providers::{Provider, ProviderSet, RedditProvider, TwitterProvider, YoutubeProvider};
pub use relevance::RelevanceFilter;

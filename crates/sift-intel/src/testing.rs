//! Test doubles shared by unit tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sift_core::{Platform, Post};

use crate::classifier::{Classifier, ClassifierItem, HistoricalHints, IntentIndices};
use crate::error::ClassifierError;

type RelevanceFn =
    dyn Fn(usize, &[ClassifierItem]) -> Result<BTreeSet<usize>, ClassifierError> + Send + Sync;
type IntentFn = dyn Fn(&[ClassifierItem]) -> Result<IntentIndices, ClassifierError> + Send + Sync;

/// Classifier whose answers come from closures; records every call.
pub(crate) struct FakeClassifier {
    relevance: Box<RelevanceFn>,
    intent: Box<IntentFn>,
    briefing: Option<String>,
    pub(crate) relevance_batches: Mutex<Vec<usize>>,
    pub(crate) intent_batches: Mutex<Vec<usize>>,
    pub(crate) hints_seen: Mutex<Vec<bool>>,
}

impl FakeClassifier {
    /// Everything relevant, intent and briefing unavailable.
    pub(crate) fn new() -> Self {
        Self {
            relevance: Box::new(|_, items| Ok(items.iter().map(|i| i.index).collect())),
            intent: Box::new(|_| Err(ClassifierError::EmptyReply)),
            briefing: None,
            relevance_batches: Mutex::new(Vec::new()),
            intent_batches: Mutex::new(Vec::new()),
            hints_seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_relevance(
        mut self,
        f: impl Fn(usize, &[ClassifierItem]) -> Result<BTreeSet<usize>, ClassifierError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.relevance = Box::new(f);
        self
    }

    pub(crate) fn with_intent(
        mut self,
        f: impl Fn(&[ClassifierItem]) -> Result<IntentIndices, ClassifierError> + Send + Sync + 'static,
    ) -> Self {
        self.intent = Box::new(f);
        self
    }

    pub(crate) fn with_briefing(mut self, briefing: &str) -> Self {
        self.briefing = Some(briefing.to_string());
        self
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn filter_relevance(
        &self,
        batch: &[ClassifierItem],
        _query: &str,
        _briefing: &str,
        hints: Option<&HistoricalHints>,
    ) -> Result<BTreeSet<usize>, ClassifierError> {
        let call = {
            let mut calls = self.relevance_batches.lock().unwrap();
            calls.push(batch.len());
            calls.len() - 1
        };
        self.hints_seen.lock().unwrap().push(hints.is_some());
        (self.relevance)(call, batch)
    }

    async fn categorize_intent(
        &self,
        items: &[ClassifierItem],
        _query: &str,
        _briefing: &str,
    ) -> Result<IntentIndices, ClassifierError> {
        self.intent_batches.lock().unwrap().push(items.len());
        (self.intent)(items)
    }

    async fn semantic_briefing(&self, _query: &str) -> Result<String, ClassifierError> {
        self.briefing.clone().ok_or(ClassifierError::EmptyReply)
    }
}

pub(crate) fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub(crate) fn post(id: &str, platform: Platform, content: &str, engagement: u64) -> Post {
    Post {
        id: id.to_string(),
        content: content.to_string(),
        platform,
        source: format!("{platform}-source"),
        engagement,
        timestamp: fixed_time(),
        url: format!("https://example.com/{id}"),
    }
}

/// `n` neutral reddit posts with ids `p0..pn`.
pub(crate) fn posts(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| post(&format!("p{i}"), Platform::Reddit, &format!("post number {i}"), 1))
        .collect()
}

pub(crate) fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

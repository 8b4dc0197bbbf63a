//! Validation of classifier replies into typed results.
//!
//! Anything that does not match the expected shape is rejected with a
//! [`ClassifierError`] so callers can apply their fallback instead of acting
//! on ambiguous data.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::IntentIndices;
use crate::error::ClassifierError;

const MAX_BRIEFING_CHARS: usize = 600;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"));

#[derive(Deserialize)]
struct RelevanceReply {
    relevant: Vec<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentReply {
    pain_points: Vec<usize>,
    trending_ideas: Vec<usize>,
    content_ideas: Vec<usize>,
}

/// Strip code fences and any prose around the outermost JSON object.
fn extract_json(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some(inner) = CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

fn decode<T: DeserializeOwned>(raw: &str, context: &'static str) -> Result<T, ClassifierError> {
    if raw.trim().is_empty() {
        return Err(ClassifierError::EmptyReply);
    }
    serde_json::from_str(extract_json(raw))
        .map_err(|source| ClassifierError::Malformed { context, source })
}

fn check_range(index: usize, len: usize) -> Result<usize, ClassifierError> {
    if (1..=len).contains(&index) {
        Ok(index)
    } else {
        Err(ClassifierError::IndexOutOfRange { index, len })
    }
}

pub(super) fn parse_relevance(raw: &str, len: usize) -> Result<BTreeSet<usize>, ClassifierError> {
    let reply: RelevanceReply = decode(raw, "relevance reply")?;
    reply
        .relevant
        .into_iter()
        .map(|index| check_range(index, len))
        .collect()
}

pub(super) fn parse_intent(raw: &str, len: usize) -> Result<IntentIndices, ClassifierError> {
    let reply: IntentReply = decode(raw, "intent reply")?;

    // An item listed in several buckets stays in the first: pain, trending, content.
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut bucket = |indices: Vec<usize>| -> Result<Vec<usize>, ClassifierError> {
        let mut kept = Vec::with_capacity(indices.len());
        for index in indices {
            if claimed.insert(check_range(index, len)?) {
                kept.push(index);
            }
        }
        kept.sort_unstable();
        Ok(kept)
    };

    Ok(IntentIndices {
        pain_points: bucket(reply.pain_points)?,
        trending_ideas: bucket(reply.trending_ideas)?,
        content_ideas: bucket(reply.content_ideas)?,
    })
}

pub(super) fn parse_briefing(raw: &str) -> Result<String, ClassifierError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ClassifierError::EmptyReply);
    }
    Ok(text.chars().take(MAX_BRIEFING_CHARS).collect())
}

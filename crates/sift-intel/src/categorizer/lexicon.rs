//! Keyword scorer used when the classifier is unavailable.
//!
//! Every post gets three non-negative scores; it goes to the bucket with the
//! highest one, ties resolved pain > trending > content. A post with no signal
//! at all ties at zero and lands in pain points. Pure function of its input,
//! so repeated runs produce identical buckets.

use sift_core::Post;

use super::{Bucket, Buckets};

const PAIN_WORDS: &[&str] = &[
    "problem", "problems", "issue", "issues", "broken", "bug", "bugs", "fail", "failed",
    "failing", "failure", "error", "errors", "worst", "terrible", "awful", "horrible",
    "complaint", "expensive", "overpriced", "slow", "stuck", "difficult", "confusing",
    "can't", "cannot", "doesn't", "won't", "struggle", "struggling", "nightmare", "waste",
    "scam", "refund", "useless", "disappointing", "annoying", "frustrating", "crashes",
];

/// Emotional language; each hit adds a pain-only bonus on top of the keyword score.
const EMOTIONAL_WORDS: &[&str] = &[
    "hate", "angry", "furious", "frustrated", "annoyed", "upset", "disappointed", "sick",
    "tired", "ugh", "rant", "fed", "regret", "worried", "scared", "stressed",
];

const TREND_WORDS: &[&str] = &[
    "trending", "viral", "popular", "hype", "hyped", "everyone", "new", "launch",
    "launched", "announced", "announcing", "breaking", "growing", "booming", "exploding",
    "huge", "massive", "insane", "amazing", "love", "loving", "obsessed", "gamechanger",
    "top", "best", "record", "skyrocketing", "craze",
];

const CONTENT_WORDS: &[&str] = &[
    "how", "what", "why", "which", "guide", "tutorial", "tips", "tip", "advice",
    "recommend", "recommendations", "recommendation", "help", "learn", "learning",
    "beginner", "beginners", "explain", "question", "anyone", "should", "ideas",
    "suggestions", "steps", "resources", "eli5",
];

const KEYWORD_WEIGHT: f64 = 2.0;
const EMOTION_WEIGHT: f64 = 1.5;
const QUESTION_WEIGHT: f64 = 1.5;
const PAIN_ENGAGEMENT_WEIGHT: f64 = 0.3;
const TREND_ENGAGEMENT_WEIGHT: f64 = 0.5;
const CONTENT_ENGAGEMENT_WEIGHT: f64 = 0.3;
const ABOVE_AVERAGE_BONUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Scores {
    pub(super) pain: f64,
    pub(super) trending: f64,
    pub(super) content: f64,
}

impl Scores {
    pub(super) fn bucket(self) -> Bucket {
        if self.pain >= self.trending && self.pain >= self.content {
            Bucket::PainPoints
        } else if self.trending >= self.content {
            Bucket::TrendingIdeas
        } else {
            Bucket::ContentIdeas
        }
    }
}

fn count_hits(words: &[String], dictionary: &[&str]) -> f64 {
    let hits = words
        .iter()
        .filter(|w| dictionary.contains(&w.as_str()))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let hits = hits as f64;
    hits
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
                .replace('\u{2019}', "'")
        })
        .filter(|word| !word.is_empty())
        .collect()
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn score_post(post: &Post, average_engagement: f64) -> Scores {
    let words = tokenize(&post.content);
    let engagement = post.engagement as f64;
    let boost = (engagement + 1.0).ln();
    let questions = post.content.matches('?').count() as f64;

    let trend_bonus = if engagement > 2.0 * average_engagement {
        ABOVE_AVERAGE_BONUS
    } else {
        0.0
    };

    Scores {
        pain: KEYWORD_WEIGHT * count_hits(&words, PAIN_WORDS)
            + EMOTION_WEIGHT * count_hits(&words, EMOTIONAL_WORDS)
            + PAIN_ENGAGEMENT_WEIGHT * boost,
        trending: KEYWORD_WEIGHT * count_hits(&words, TREND_WORDS)
            + TREND_ENGAGEMENT_WEIGHT * boost
            + trend_bonus,
        content: KEYWORD_WEIGHT * count_hits(&words, CONTENT_WORDS)
            + QUESTION_WEIGHT * questions
            + CONTENT_ENGAGEMENT_WEIGHT * boost,
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn average_engagement(posts: &[Post]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let total: f64 = posts.iter().map(|p| p.engagement as f64).sum();
    total / posts.len() as f64
}

pub(super) fn bucket_for(post: &Post, average_engagement: f64) -> Bucket {
    score_post(post, average_engagement).bucket()
}

/// Full offline categorization: assign, rank by engagement, cap each bucket.
pub(super) fn categorize(posts: Vec<Post>, bucket_cap: usize) -> Buckets {
    let average = average_engagement(&posts);
    let mut buckets = Buckets::default();
    for post in posts {
        buckets.get_mut(bucket_for(&post, average)).push(post);
    }
    for bucket in Bucket::ALL {
        let list = buckets.get_mut(bucket);
        list.sort_by(|a, b| b.engagement.cmp(&a.engagement));
        list.truncate(bucket_cap);
    }
    buckets
}

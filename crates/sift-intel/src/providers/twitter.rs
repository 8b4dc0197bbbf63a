//! X (Twitter) search provider via the `bird` CLI.
//!
//! Invokes `bird search "{query} lang:{xx} since:{date}" --json -n 50
//! --auth-token ... --ct0 ...` as a subprocess.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sift_core::{Platform, Post, TimeFilter};

use super::{retain_within_window, Provider};
use crate::error::ProviderError;

const DEFAULT_BINARY: &str = "bird";
const MAX_RESULTS: usize = 50;

#[derive(Deserialize)]
struct BirdTweet {
    id: String,
    text: String,
    author: BirdAuthor,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "likeCount", default)]
    like_count: u64,
    #[serde(rename = "retweetCount", default)]
    retweet_count: u64,
    #[serde(rename = "replyCount", default)]
    reply_count: u64,
}

#[derive(Deserialize)]
struct BirdAuthor {
    username: String,
}

/// X provider backed by the `bird` CLI and browser cookies.
pub struct TwitterProvider {
    auth_token: String,
    ct0: String,
    binary: String,
}

impl TwitterProvider {
    #[must_use]
    pub fn new(auth_token: &str, ct0: &str) -> Self {
        Self {
            auth_token: auth_token.to_string(),
            ct0: ct0.to_string(),
            binary: DEFAULT_BINARY.to_string(),
        }
    }

    /// Use a different executable instead of `bird` on `PATH`.
    #[must_use]
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }
}

/// Build the search expression passed to `bird`.
fn build_search_query(
    query: &str,
    language: &str,
    time_filter: TimeFilter,
    now: DateTime<Utc>,
) -> String {
    let mut search = format!("{query} lang:{language}");
    if let Some(cutoff) = time_filter.cutoff(now) {
        search.push_str(&format!(" since:{}", cutoff.format("%Y-%m-%d")));
    }
    search
}

/// `bird` emits either RFC 3339 or the classic Twitter timestamp format.
fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_bird_output(stdout: &[u8], now: DateTime<Utc>) -> Result<Vec<Post>, ProviderError> {
    let tweets: Vec<BirdTweet> =
        serde_json::from_slice(stdout).map_err(|e| ProviderError::Deserialize {
            context: "bird search output".to_string(),
            source: e,
        })?;

    let mut seen: HashSet<String> = HashSet::new();
    let posts = tweets
        .into_iter()
        .filter(|tweet| seen.insert(tweet.id.clone()))
        .filter(|tweet| !tweet.text.trim().is_empty())
        .map(|tweet| Post {
            id: Platform::X.post_id(&tweet.id),
            url: format!(
                "https://x.com/{}/status/{}",
                tweet.author.username, tweet.id
            ),
            source: format!("@{}", tweet.author.username),
            engagement: tweet
                .like_count
                .saturating_add(tweet.retweet_count)
                .saturating_add(tweet.reply_count),
            timestamp: tweet
                .created_at
                .as_deref()
                .and_then(parse_created_at)
                .unwrap_or(now),
            content: tweet.text,
            platform: Platform::X,
        })
        .collect();

    Ok(posts)
}

#[async_trait]
impl Provider for TwitterProvider {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn search(
        &self,
        query: &str,
        language: &str,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>, ProviderError> {
        let now = Utc::now();
        let search = build_search_query(query, language, time_filter, now);
        let limit = MAX_RESULTS.to_string();

        let output = tokio::process::Command::new(&self.binary)
            .args([
                "search",
                search.as_str(),
                "--json",
                "-n",
                limit.as_str(),
                "--auth-token",
                self.auth_token.as_str(),
                "--ct0",
                self.ct0.as_str(),
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProviderError::Subprocess(format!("bird subprocess error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Subprocess(format!(
                "bird search exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut posts = parse_bird_output(&output.stdout, now)?;
        retain_within_window(&mut posts, time_filter, now);

        tracing::debug!(count = posts.len(), "collected x posts");
        Ok(posts)
    }
}

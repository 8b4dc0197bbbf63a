//! Reddit listing conversion helpers.

use chrono::{DateTime, Utc};
use sift_core::{Platform, Post, TimeFilter};

use super::reddit::PostData;

const SELFTEXT_SNIPPET_CHARS: usize = 500;

/// Map a time filter onto Reddit's `t` search parameter.
///
/// Reddit has no 3- or 6-month window, so those search the past year and are
/// trimmed afterwards.
pub(super) fn time_param(time_filter: TimeFilter) -> &'static str {
    match time_filter {
        TimeFilter::Hour => "hour",
        TimeFilter::Day => "day",
        TimeFilter::Week => "week",
        TimeFilter::Month => "month",
        TimeFilter::ThreeMonths | TimeFilter::SixMonths | TimeFilter::Year => "year",
        TimeFilter::All => "all",
    }
}

fn usable_body(body: Option<&str>) -> Option<&str> {
    body.map(str::trim)
        .filter(|b| !b.is_empty() && *b != "[deleted]" && *b != "[removed]")
}

pub(super) fn to_post(data: &PostData) -> Option<Post> {
    let permalink = data.permalink.as_ref()?;
    let title = usable_body(data.title.as_deref())?;

    let content = match usable_body(data.selftext.as_deref()) {
        Some(body) => {
            let snippet: String = body.chars().take(SELFTEXT_SNIPPET_CHARS).collect();
            format!("{title}\n{snippet}")
        }
        None => title.to_string(),
    };

    let source = data
        .subreddit
        .as_deref()
        .map_or_else(|| "reddit".to_string(), |s| format!("r/{s}"));

    #[allow(clippy::cast_possible_truncation)]
    let timestamp = DateTime::<Utc>::from_timestamp(data.created_utc as i64, 0).unwrap_or_default();

    Some(Post {
        id: Platform::Reddit.post_id(&data.id),
        content,
        platform: Platform::Reddit,
        source,
        engagement: data.score.max(0).unsigned_abs() + data.num_comments,
        timestamp,
        url: format!("https://reddit.com{permalink}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(title: Option<&str>, selftext: Option<&str>) -> PostData {
        PostData {
            id: "abc123".to_string(),
            title: title.map(ToString::to_string),
            selftext: selftext.map(ToString::to_string),
            subreddit: Some("espresso".to_string()),
            score: 42,
            num_comments: 8,
            created_utc: 1_700_000_000.0,
            permalink: Some("/r/espresso/comments/abc123/grinder/".to_string()),
        }
    }

    #[test]
    fn converts_listing_entry_into_namespaced_post() {
        let post = to_post(&data(Some("Grinder keeps clogging"), Some("Any fixes?"))).unwrap();
        assert_eq!(post.id, "reddit_abc123");
        assert_eq!(post.source, "r/espresso");
        assert_eq!(post.engagement, 50);
        assert_eq!(post.content, "Grinder keeps clogging\nAny fixes?");
        assert_eq!(
            post.url,
            "https://reddit.com/r/espresso/comments/abc123/grinder/"
        );
        assert_eq!(post.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn removed_selftext_falls_back_to_title() {
        let post = to_post(&data(Some("Title only"), Some("[removed]"))).unwrap();
        assert_eq!(post.content, "Title only");
    }

    #[test]
    fn missing_title_is_skipped() {
        assert!(to_post(&data(None, Some("body"))).is_none());
        assert!(to_post(&data(Some("  "), Some("body"))).is_none());
    }

    #[test]
    fn negative_score_does_not_underflow_engagement() {
        let mut d = data(Some("Downvoted"), None);
        d.score = -30;
        let post = to_post(&d).unwrap();
        assert_eq!(post.engagement, 8);
    }

    #[test]
    fn long_windows_map_to_year() {
        assert_eq!(time_param(TimeFilter::ThreeMonths), "year");
        assert_eq!(time_param(TimeFilter::SixMonths), "year");
        assert_eq!(time_param(TimeFilter::Hour), "hour");
        assert_eq!(time_param(TimeFilter::All), "all");
    }
}

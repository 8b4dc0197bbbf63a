//! `YouTube` search feed provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sift_core::{Platform, Post, TimeFilter};

use super::{retain_within_window, Provider};
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const MAX_POSTS: usize = 50;

/// `YouTube` provider reading the public search Atom feed. Needs no credentials.
pub struct YoutubeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(user_agent, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Point the provider at a different host (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for YoutubeProvider {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn search(
        &self,
        query: &str,
        language: &str,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>, ProviderError> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/feeds/videos.xml?search_query={encoded}&hl={language}",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let mut posts = parse_feed(&body)?;
        retain_within_window(&mut posts, time_filter, Utc::now());

        tracing::debug!(count = posts.len(), "collected youtube posts");
        Ok(posts)
    }
}

#[derive(Default)]
struct Entry {
    video_id: String,
    title: String,
    description: String,
    author: String,
    published: String,
    views: u64,
}

impl Entry {
    fn into_post(self) -> Option<Post> {
        if self.video_id.is_empty() || self.title.is_empty() {
            return None;
        }
        let content = if self.description.is_empty() {
            self.title
        } else {
            format!("{}\n{}", self.title, self.description)
        };
        let timestamp = DateTime::parse_from_rfc3339(&self.published)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();
        Some(Post {
            id: Platform::Youtube.post_id(&self.video_id),
            url: format!("https://www.youtube.com/watch?v={}", self.video_id),
            content,
            platform: Platform::Youtube,
            source: if self.author.is_empty() {
                "youtube".to_string()
            } else {
                self.author
            },
            engagement: self.views,
            timestamp,
        })
    }
}

fn views_attr(e: &BytesStart<'_>) -> Option<u64> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"views")
        .and_then(|attr| String::from_utf8_lossy(attr.value.as_ref()).parse().ok())
}

fn parse_feed(xml: &str) -> Result<Vec<Post>, ProviderError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entry: Option<Entry> = None;
    let mut in_author = false;
    let mut current_tag = String::new();
    let mut posts = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "entry" => entry = Some(Entry::default()),
                    "author" => in_author = true,
                    "media:statistics" => {
                        if let (Some(current), Some(views)) = (entry.as_mut(), views_attr(&e)) {
                            current.views = views;
                        }
                    }
                    _ => {}
                }
                current_tag = name;
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"media:statistics" {
                    if let (Some(current), Some(views)) = (entry.as_mut(), views_attr(&e)) {
                        current.views = views;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = entry.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "yt:videoId" => current.video_id = text,
                        "title" => current.title = text,
                        "media:description" => current.description = text,
                        "published" => current.published = text,
                        "name" if in_author => current.author = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(post) = entry.take().and_then(Entry::into_post) {
                        posts.push(post);
                        if posts.len() >= MAX_POSTS {
                            break;
                        }
                    }
                }
                b"author" => in_author = false,
                _ => current_tag.clear(),
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProviderError::Xml(e)),
            _ => {}
        }
    }

    Ok(posts)
}

//! Reddit search provider (client-credentials OAuth).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use sift_core::{Platform, Post, TimeFilter};
use tokio::sync::Mutex;

use super::reddit_helpers::{time_param, to_post};
use super::{retain_within_window, Provider};
use crate::error::ProviderError;

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
const PAGE_LIMIT: usize = 100;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Child {
    pub(super) data: PostData,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostData {
    pub(super) id: String,
    pub(super) title: Option<String>,
    pub(super) selftext: Option<String>,
    pub(super) subreddit: Option<String>,
    #[serde(default)]
    pub(super) score: i64,
    #[serde(default)]
    pub(super) num_comments: u64,
    #[serde(default)]
    pub(super) created_utc: f64,
    pub(super) permalink: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Reddit API provider. The access token is cached internally and shared
/// by concurrent searches.
pub struct RedditProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    auth_base: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl RedditProvider {
    /// Create a provider pointed at the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Self::with_base_urls(
            client_id,
            client_secret,
            user_agent,
            timeout_secs,
            DEFAULT_AUTH_BASE,
            DEFAULT_API_BASE,
        )
    }

    /// Create a provider with custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        timeout_secs: u64,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            user_agent: user_agent.to_string(),
            auth_base: auth_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid token, exchanging credentials when the cache is empty
    /// or about to expire.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn fetch_token(&self) -> Result<CachedToken, ProviderError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .header("User-Agent", &self.user_agent)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Auth(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "reddit token response".to_string(),
                source: e,
            })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "reddit access token refreshed");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    async fn search_listing(
        &self,
        token: &str,
        query: &str,
        time_filter: TimeFilter,
    ) -> Result<Listing, ProviderError> {
        let url = format!("{}/search", self.api_base);
        let limit = PAGE_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", query),
                ("sort", "relevance"),
                ("t", time_param(time_filter)),
                ("limit", limit.as_str()),
                ("type", "link"),
                ("raw_json", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth("search rejected access token".to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: "reddit search listing".to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Provider for RedditProvider {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn search(
        &self,
        query: &str,
        _language: &str,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>, ProviderError> {
        let token = self.access_token().await?;
        let listing = match self.search_listing(&token, query, time_filter).await {
            Err(ProviderError::Auth(reason)) => {
                tracing::warn!(reason = %reason, "reddit token rejected, refreshing once");
                self.invalidate_token().await;
                let token = self.access_token().await?;
                self.search_listing(&token, query, time_filter).await?
            }
            other => other?,
        };

        let mut posts: Vec<Post> = listing
            .data
            .children
            .iter()
            .filter_map(|child| to_post(&child.data))
            .collect();

        // 3months/6months are fetched as `t=year`; trim to the real window here.
        retain_within_window(&mut posts, time_filter, chrono::Utc::now());

        tracing::debug!(count = posts.len(), "collected reddit posts");
        Ok(posts)
    }
}

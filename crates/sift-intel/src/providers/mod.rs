//! Content providers: one implementation per platform.
//!
//! The orchestrator only sees the [`Provider`] contract and looks providers
//! up by [`Platform`] in a [`ProviderSet`]; endpoints, auth, and pagination
//! stay inside each implementation.

mod reddit;
mod reddit_helpers;
mod twitter;
mod youtube;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sift_core::{AppConfig, Platform, Post, TimeFilter};

use crate::error::ProviderError;

pub use reddit::RedditProvider;
pub use twitter::TwitterProvider;
pub use youtube::YoutubeProvider;

/// Search capability of one content source.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The platform this provider serves. Used as its key in a [`ProviderSet`].
    fn platform(&self) -> Platform;

    /// Search the source for posts about `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on any transport, auth, or rate-limit problem.
    async fn search(
        &self,
        query: &str,
        language: &str,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>, ProviderError>;
}

/// Mapping from enabled platform to its provider instance.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: BTreeMap<Platform, Arc<dyn Provider>>,
}

impl ProviderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own platform, replacing any previous one.
    #[must_use]
    pub fn with(mut self, provider: impl Provider + 'static) -> Self {
        self.insert(Arc::new(provider));
        self
    }

    pub fn insert(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.platform(), provider);
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Provider>> {
        self.providers.get(&platform).cloned()
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.providers.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Build every provider the configuration has credentials for.
    ///
    /// Reddit needs a client id/secret pair, X needs `bird` cookies, and
    /// `YouTube` is enabled unless switched off.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let mut set = Self::new();

        if let Some((client_id, client_secret)) = config.reddit_credentials() {
            set.insert(Arc::new(RedditProvider::new(
                client_id,
                client_secret,
                &config.reddit_user_agent,
                config.provider_timeout_secs,
            )?));
        } else {
            tracing::debug!("reddit credentials not set; reddit provider disabled");
        }

        if let Some((auth_token, ct0)) = config.twitter_credentials() {
            set.insert(Arc::new(TwitterProvider::new(auth_token, ct0)));
        } else {
            tracing::debug!("twitter cookies not set; x provider disabled");
        }

        if config.youtube_enabled {
            set.insert(Arc::new(YoutubeProvider::new(
                &config.user_agent,
                config.provider_timeout_secs,
            )?));
        }

        Ok(set)
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}

/// Drop posts older than the time filter window.
pub(crate) fn retain_within_window(posts: &mut Vec<Post>, time_filter: TimeFilter, now: DateTime<Utc>) {
    if let Some(cutoff) = time_filter.cutoff(now) {
        posts.retain(|post| post.timestamp >= cutoff);
    }
}

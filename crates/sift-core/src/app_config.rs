#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub aggregate_deadline_secs: u64,
    pub retry_after_secs: u64,
    pub relevance_batch_size: usize,
    pub relevance_batch_pause_ms: u64,
    pub categorize_max_posts: usize,
    pub bucket_cap: usize,
    pub provider_timeout_secs: u64,
    pub user_agent: String,
    pub classifier_api_key: Option<String>,
    pub classifier_base_url: String,
    pub classifier_model: String,
    pub classifier_timeout_secs: u64,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
    pub youtube_enabled: bool,
}

impl AppConfig {
    /// Reddit credentials, only when both halves are present.
    #[must_use]
    pub fn reddit_credentials(&self) -> Option<(&str, &str)> {
        match (&self.reddit_client_id, &self.reddit_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// `bird` CLI cookies, only when both halves are present.
    #[must_use]
    pub fn twitter_credentials(&self) -> Option<(&str, &str)> {
        match (&self.twitter_auth_token, &self.twitter_ct0) {
            (Some(token), Some(ct0)) => Some((token.as_str(), ct0.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("aggregate_deadline_secs", &self.aggregate_deadline_secs)
            .field("retry_after_secs", &self.retry_after_secs)
            .field("relevance_batch_size", &self.relevance_batch_size)
            .field("relevance_batch_pause_ms", &self.relevance_batch_pause_ms)
            .field("categorize_max_posts", &self.categorize_max_posts)
            .field("bucket_cap", &self.bucket_cap)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "classifier_api_key",
                &self.classifier_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_base_url", &self.classifier_base_url)
            .field("classifier_model", &self.classifier_model)
            .field("classifier_timeout_secs", &self.classifier_timeout_secs)
            .field("reddit_client_id", &self.reddit_client_id)
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field(
                "twitter_auth_token",
                &self.twitter_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "twitter_ct0",
                &self.twitter_ct0.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_enabled", &self.youtube_enabled)
            .finish()
    }
}

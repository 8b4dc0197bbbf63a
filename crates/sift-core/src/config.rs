use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Read `.env` (if any) and then the process environment into an [`AppConfig`].
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Same as [`load_app_config`] but never touches `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Every variable has a default. Credentials are optional; leaving one out
/// disables the provider or classifier that needs it.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("SIFT_ENV", "development"))?;
    let log_level = or_default("SIFT_LOG_LEVEL", "info");

    let aggregate_deadline_secs = parse_u64("SIFT_AGGREGATE_DEADLINE_SECS", "45")?;
    let retry_after_secs = parse_u64("SIFT_RETRY_AFTER_SECS", "60")?;
    let relevance_batch_size = parse_usize("SIFT_RELEVANCE_BATCH_SIZE", "50")?;
    let relevance_batch_pause_ms = parse_u64("SIFT_RELEVANCE_BATCH_PAUSE_MS", "1000")?;
    let categorize_max_posts = parse_usize("SIFT_CATEGORIZE_MAX_POSTS", "100")?;
    let bucket_cap = parse_usize("SIFT_BUCKET_CAP", "50")?;
    let provider_timeout_secs = parse_u64("SIFT_PROVIDER_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("SIFT_USER_AGENT", "sift/0.1 (topic-intelligence)");

    let classifier_api_key = optional("SIFT_CLASSIFIER_API_KEY");
    let classifier_base_url = or_default("SIFT_CLASSIFIER_BASE_URL", "https://api.openai.com/v1");
    let classifier_model = or_default("SIFT_CLASSIFIER_MODEL", "gpt-4o-mini");
    let classifier_timeout_secs = parse_u64("SIFT_CLASSIFIER_TIMEOUT_SECS", "30")?;

    let reddit_client_id = optional("REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("REDDIT_CLIENT_SECRET");
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", &user_agent);

    let twitter_auth_token = optional("TWITTER_AUTH_TOKEN");
    let twitter_ct0 = optional("TWITTER_CT0");

    let youtube_enabled = parse_bool("SIFT_YOUTUBE_ENABLED", "true")?;

    Ok(AppConfig {
        env,
        log_level,
        aggregate_deadline_secs,
        retry_after_secs,
        relevance_batch_size,
        relevance_batch_pause_ms,
        categorize_max_posts,
        bucket_cap,
        provider_timeout_secs,
        user_agent,
        classifier_api_key,
        classifier_base_url,
        classifier_model,
        classifier_timeout_secs,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        twitter_auth_token,
        twitter_ct0,
        youtube_enabled,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SIFT_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

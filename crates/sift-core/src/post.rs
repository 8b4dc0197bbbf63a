//! The normalized unit flowing through the pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A content source the pipeline knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    X,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::X, Platform::Youtube];

    /// Stable lowercase key, also used as the `id` namespace prefix.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::X => "x",
            Platform::Youtube => "youtube",
        }
    }

    /// Build a platform-namespaced post id.
    #[must_use]
    pub fn post_id(self, native_id: &str) -> String {
        format!("{}_{native_id}", self.key())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Ok(Platform::Reddit),
            "x" | "twitter" => Ok(Platform::X),
            "youtube" => Ok(Platform::Youtube),
            other => Err(ValidationError::UnknownPlatform(other.to_string())),
        }
    }
}

/// A single piece of content returned by a provider. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Globally unique, prefixed with the platform key (`reddit_abc123`).
    pub id: String,
    /// Text body used for relevance and intent judgment.
    pub content: String,
    pub platform: Platform,
    /// Display label: community, channel, or handle.
    pub source: String,
    /// Provider-defined popularity score. Ranking and tie-break only.
    pub engagement: u64,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

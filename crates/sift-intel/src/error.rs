use sift_core::{NoResultsDiagnostic, Platform, ProviderFailure, ValidationError};
use thiserror::Error;

/// One content source was unreachable or misbehaved. Isolated to that source.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("subprocess error: {0}")]
    Subprocess(String),

    #[error("no provider configured for {0}")]
    NotConfigured(Platform),
}

/// The AI path is unusable. Always absorbed by a documented fallback.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("classifier reply was empty")]
    EmptyReply,

    #[error("classifier reply did not match {context}: {source}")]
    Malformed {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("classifier referenced item {index} but the batch has {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures surfaced to the caller of [`crate::Aggregator::aggregate`].
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("invalid query: {0}")]
    Validation(#[from] ValidationError),

    #[error("no posts retrieved and {} provider(s) failed; retry after {retry_after_secs}s", failures.len())]
    ServiceUnavailable {
        failures: Vec<ProviderFailure>,
        retry_after_secs: u64,
        diagnostic: Box<NoResultsDiagnostic>,
    },
}

//! Shared domain model and configuration for the sift workspace.

mod app_config;
mod config;
pub mod diagnostic;
pub mod post;
pub mod query;
pub mod report;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use diagnostic::{DiagnosticKind, NoResultsDiagnostic};
pub use post::{Platform, Post};
pub use query::{QueryContext, TimeFilter};
pub use report::{CategorizedReport, ProviderFailure, RelevanceAnalysis, RunReport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// A query context that cannot be run. Rejected before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("at least one platform must be requested")]
    NoPlatforms,

    #[error("unknown platform \"{0}\"")]
    UnknownPlatform(String),

    #[error("language must be a 2-letter code, got \"{0}\"")]
    InvalidLanguage(String),

    #[error("unknown time filter \"{0}\"")]
    UnknownTimeFilter(String),
}

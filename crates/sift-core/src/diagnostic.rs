use serde::{Deserialize, Serialize};

/// Display-facing explanation of why a run produced nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoResultsDiagnostic {
    /// Which branch of the diagnostic table produced this explanation.
    pub kind: DiagnosticKind,
    pub title: String,
    pub message: String,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
    pub tip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Nothing fetched and at least one provider failed.
    SourceErrors,
    /// Nothing fetched, no provider failed.
    NothingFound,
    /// Posts were fetched but none survived relevance filtering/categorization.
    AllFilteredOut,
}

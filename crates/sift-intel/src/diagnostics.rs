//! "Why no results" explanations.
//!
//! A pure lookup over three conditions: nothing fetched because sources
//! failed, nothing fetched at all, or posts fetched but none survived
//! classification. The nothing-found wording also depends on how narrow the
//! time window was.

use sift_core::{DiagnosticKind, NoResultsDiagnostic, ProviderFailure, TimeFilter};

/// How narrow the requested window is, for wording purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Narrow,
    Medium,
    Wide,
    Unbounded,
}

fn window(time_filter: TimeFilter) -> Window {
    match time_filter {
        TimeFilter::Hour | TimeFilter::Day | TimeFilter::Week => Window::Narrow,
        TimeFilter::Month | TimeFilter::ThreeMonths => Window::Medium,
        TimeFilter::SixMonths | TimeFilter::Year => Window::Wide,
        TimeFilter::All => Window::Unbounded,
    }
}

/// Build the explanation shown when a run has nothing to display.
#[must_use]
pub fn no_results_diagnostic(
    query: &str,
    time_filter: TimeFilter,
    total_fetched: usize,
    errors: &[ProviderFailure],
) -> NoResultsDiagnostic {
    if total_fetched == 0 && !errors.is_empty() {
        source_errors(query, errors)
    } else if total_fetched == 0 {
        nothing_found(query, time_filter)
    } else {
        all_filtered_out(query, time_filter, total_fetched)
    }
}

fn source_errors(query: &str, errors: &[ProviderFailure]) -> NoResultsDiagnostic {
    let mut reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
    reasons.push("No other source returned posts to fall back on".to_string());
    NoResultsDiagnostic {
        kind: DiagnosticKind::SourceErrors,
        title: "Sources unavailable".to_string(),
        message: format!(
            "We couldn't reach enough sources to search for \"{query}\". \
             This is a temporary problem with the content providers, not with your query."
        ),
        reasons,
        suggestions: vec![
            "Wait a minute and run the search again".to_string(),
            "Try fewer platforms to isolate the failing source".to_string(),
            "Check provider credentials if the same source keeps failing".to_string(),
        ],
        tip: "Provider outages are usually short; retrying shortly often succeeds.".to_string(),
    }
}

fn nothing_found(query: &str, time_filter: TimeFilter) -> NoResultsDiagnostic {
    let period = time_filter.describe();
    let (title, message, reasons, suggestions, tip) = match window(time_filter) {
        Window::Narrow => (
            "Not trending right now",
            format!("Nobody seems to have posted about \"{query}\" in {period}."),
            vec![
                format!("\"{query}\" may not be trending in {period}"),
                "Short time windows only capture very recent discussion".to_string(),
            ],
            vec![
                "Widen the time filter to the past month or longer".to_string(),
                "Try a broader or more common phrasing of the topic".to_string(),
            ],
            "Topics often have bursts of activity; a wider window catches past bursts.",
        ),
        Window::Medium => (
            "Little recent discussion",
            format!("We found no posts about \"{query}\" from {period}."),
            vec![
                "The topic may be niche or discussed under a different name".to_string(),
                format!("Activity for \"{query}\" may predate {period}"),
            ],
            vec![
                "Try the past year or all time".to_string(),
                "Use synonyms or the name people commonly use for it".to_string(),
            ],
            "Community slang often differs from official names.",
        ),
        Window::Wide | Window::Unbounded => (
            "No discussion found",
            format!("None of the searched platforms returned posts about \"{query}\" from {period}."),
            vec![
                "The topic may be too specific or spelled differently".to_string(),
                "The selected platforms may not cover this audience".to_string(),
            ],
            vec![
                "Check the spelling of the query".to_string(),
                "Search for the broader category instead".to_string(),
                "Enable additional platforms".to_string(),
            ],
            "Shorter queries of one or two words usually match more posts.",
        ),
    };
    NoResultsDiagnostic {
        kind: DiagnosticKind::NothingFound,
        title: title.to_string(),
        message,
        reasons,
        suggestions,
        tip: tip.to_string(),
    }
}

fn all_filtered_out(query: &str, time_filter: TimeFilter, total_fetched: usize) -> NoResultsDiagnostic {
    let mut suggestions = vec![
        format!("Add context to \"{query}\" so it can't be confused with unrelated topics"),
        "Try a more specific phrase".to_string(),
    ];
    if window(time_filter) == Window::Narrow {
        suggestions.push("Widen the time filter to find more on-topic posts".to_string());
    }
    NoResultsDiagnostic {
        kind: DiagnosticKind::AllFilteredOut,
        title: "No relevant posts".to_string(),
        message: format!(
            "We found {total_fetched} post(s) mentioning \"{query}\" in {}, but none were actually about it.",
            time_filter.describe()
        ),
        reasons: vec![
            "Posts matched the words of the query but discussed something else".to_string(),
            "Ambiguous terms pull in content from unrelated domains".to_string(),
        ],
        suggestions,
        tip: "Queries naming a product category or audience are easier to match precisely."
            .to_string(),
    }
}

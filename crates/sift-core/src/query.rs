//! Immutable input to one aggregation run.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::post::Platform;
use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFilter {
    #[serde(rename = "hour")]
    Hour,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeFilter {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::ThreeMonths => "3months",
            TimeFilter::SixMonths => "6months",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }

    /// Length of the window, `None` for [`TimeFilter::All`].
    #[must_use]
    pub fn window(self) -> Option<Duration> {
        match self {
            TimeFilter::Hour => Some(Duration::hours(1)),
            TimeFilter::Day => Some(Duration::days(1)),
            TimeFilter::Week => Some(Duration::weeks(1)),
            TimeFilter::Month => Some(Duration::days(30)),
            TimeFilter::ThreeMonths => Some(Duration::days(90)),
            TimeFilter::SixMonths => Some(Duration::days(180)),
            TimeFilter::Year => Some(Duration::days(365)),
            TimeFilter::All => None,
        }
    }

    /// Earliest timestamp inside the window relative to `now`.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }

    /// Human phrasing used in diagnostics ("the past week").
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            TimeFilter::Hour => "the past hour",
            TimeFilter::Day => "the past 24 hours",
            TimeFilter::Week => "the past week",
            TimeFilter::Month => "the past month",
            TimeFilter::ThreeMonths => "the past 3 months",
            TimeFilter::SixMonths => "the past 6 months",
            TimeFilter::Year => "the past year",
            TimeFilter::All => "all time",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TimeFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "3months" => Ok(TimeFilter::ThreeMonths),
            "6months" => Ok(TimeFilter::SixMonths),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(ValidationError::UnknownTimeFilter(other.to_string())),
        }
    }
}

/// Validated parameters for one run.
///
/// Construct through [`QueryContext::new`]; the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    query: String,
    platforms: BTreeSet<Platform>,
    language: String,
    time_filter: TimeFilter,
}

impl QueryContext {
    /// Validate and build a query context.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the query is blank, no platform is
    /// requested, or the language is not a 2-letter code.
    pub fn new(
        query: &str,
        platforms: impl IntoIterator<Item = Platform>,
        language: &str,
        time_filter: TimeFilter,
    ) -> Result<Self, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let platforms: BTreeSet<Platform> = platforms.into_iter().collect();
        if platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }

        let language = language.trim().to_ascii_lowercase();
        if language.len() != 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidLanguage(language));
        }

        Ok(Self {
            query: query.to_string(),
            platforms,
            language,
            time_filter,
        })
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn platforms(&self) -> &BTreeSet<Platform> {
        &self.platforms
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn time_filter(&self) -> TimeFilter {
        self.time_filter
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub name: String,
    /// Contributing artists joined with ", "
    pub artist: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub name: String,
    pub image: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub tracks: Vec<TrackSummary>,
    pub artists: Vec<ArtistSummary>,
    pub albums: Vec<AlbumSummary>,
    pub time_range: TimeRange,
}

/// Period selector for the top-items endpoints.
///
/// Unknown values are kept verbatim and forwarded to Spotify untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
    Other(String),
}

impl TimeRange {
    pub const KNOWN: [TimeRange; 3] = [
        TimeRange::ShortTerm,
        TimeRange::MediumTerm,
        TimeRange::LongTerm,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
            TimeRange::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TimeRange::ShortTerm => "Last 4 weeks",
            TimeRange::MediumTerm => "Last 6 months",
            TimeRange::LongTerm => "All time",
            TimeRange::Other(raw) => raw,
        }
    }
}

impl From<String> for TimeRange {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "short_term" => TimeRange::ShortTerm,
            "medium_term" => TimeRange::MediumTerm,
            "long_term" => TimeRange::LongTerm,
            _ => TimeRange::Other(raw),
        }
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.as_str().to_string()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string shared by `/stats` and `/export`
#[derive(Debug, Default, Deserialize)]
pub struct TimeRangeQuery {
    pub time_range: Option<TimeRange>,
}

impl TimeRangeQuery {
    pub fn resolve(self) -> TimeRange {
        self.time_range.unwrap_or_default()
    }
}

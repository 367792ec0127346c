// Fetch outcome carried from the data API through to the display layer
use serde::Serialize;

/// What happened when a collection was loaded. "No records" and
/// "could not fetch" are kept apart all the way to the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Loaded { data: T },
    Empty,
    FetchFailed { reason: String },
}

impl<T> Outcome<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::FetchFailed {
            reason: reason.into(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Loaded { data } => Outcome::Loaded { data: f(data) },
            Outcome::Empty => Outcome::Empty,
            Outcome::FetchFailed { reason } => Outcome::FetchFailed { reason },
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Loaded { data } => Some(data),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::FetchFailed { .. })
    }
}

impl<R> Outcome<Vec<R>> {
    pub fn from_records(records: Vec<R>) -> Self {
        if records.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Loaded { data: records }
        }
    }

    /// Records for joins and lookups; empty on any non-loaded outcome.
    pub fn records(&self) -> &[R] {
        match self {
            Outcome::Loaded { data } => data,
            _ => &[],
        }
    }
}

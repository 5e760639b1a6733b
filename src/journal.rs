use serde::Serialize;
use std::fmt;

/// A journal and its SCImago Journal Rank score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalRecord {
    title: String,
    sjr: f64,
}

impl JournalRecord {
    /// Construct a new `JournalRecord`.
    /// The title is trimmed and a non-finite score is stored as `0.0`.
    pub fn new(title: &str, sjr: f64) -> Self {
        JournalRecord {
            title: title.trim().to_owned(),
            sjr: if sjr.is_finite() { sjr } else { 0.0 },
        }
    }

    /// Get the journal title.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the SJR score.
    #[inline]
    pub fn sjr(&self) -> f64 {
        self.sjr
    }
}

impl fmt::Display for JournalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.sjr())
    }
}

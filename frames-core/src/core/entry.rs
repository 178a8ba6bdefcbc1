//! The journal entry ("frame") record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single journal entry.
///
/// Entries are immutable after creation except for `is_bookmarked`.
///
/// `picture` is only populated by single-entry reads (create, get, toggle);
/// listings leave it `None` and report presence through `has_picture`. The
/// payload is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub main: String,
    pub details: String,
    #[serde(skip)]
    pub picture: Option<Vec<u8>>,
    pub has_picture: bool,
    pub is_bookmarked: bool,
}

impl Entry {
    /// Returns this entry with the picture payload dropped.
    #[must_use]
    pub fn without_picture_data(mut self) -> Self {
        self.picture = None;
        self
    }

    /// Case-insensitive substring match against `main` or `details`.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.main.to_lowercase().contains(needle) || self.details.to_lowercase().contains(needle)
    }
}

//! Result type for bulk removal of entries.
//!
//! ```rust
//! use frames_core::DeleteResult;
//!
//! let result = DeleteResult {
//!     deleted_count: 2,
//!     affected_ids: vec!["a".to_string(), "b".to_string()],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("deletedCount"));
//! assert!(json.contains("affectedIds"));
//! ```

use serde::{Deserialize, Serialize};

/// The outcome of [`EntryStore::delete_all_entries`](super::store::EntryStore::delete_all_entries).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The total number of entries that were permanently removed.
    pub deleted_count: usize,

    /// IDs of all removed entries.
    pub affected_ids: Vec<String>,
}

//! Core library for Frames, a local-first journal of timestamped entries.
//!
//! The primary entry point is [`EntryStore`], which represents an open
//! journal database. All mutations go through `EntryStore` methods, and
//! subscribers are told about each committed change via [`StoreEvent`].
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    delete::DeleteResult,
    entry::Entry,
    error::{FramesError, Result},
    events::{StoreEvent, SubscriptionId},
    export::{
        export_entries, import_entries, peek_import, ExportEntries, ExportEntry, ExportError,
        ImportResult, ImportSummary, APP_VERSION,
    },
    grouping::{group_by_month, MonthGroup, MonthKey},
    picture::validate_picture,
    settings::{
        default_database_path, load_settings, load_settings_from, save_settings,
        save_settings_to, settings_file_path, StoreSettings,
    },
    storage::Storage,
    store::EntryStore,
};

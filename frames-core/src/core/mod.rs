//! Internal domain modules for the Frames core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod delete;
pub mod entry;
pub mod error;
pub mod events;
pub mod export;
pub mod grouping;
pub mod picture;
pub mod settings;
pub mod storage;
pub mod store;

#[doc(inline)]
pub use delete::DeleteResult;
#[doc(inline)]
pub use entry::Entry;
#[doc(inline)]
pub use error::{FramesError, Result};
#[doc(inline)]
pub use events::{StoreEvent, SubscriptionId};
#[doc(inline)]
pub use export::{
    export_entries, import_entries, peek_import, ExportEntries, ExportEntry, ExportError,
    ImportResult, ImportSummary, APP_VERSION,
};
#[doc(inline)]
pub use grouping::{group_by_month, MonthGroup, MonthKey};
#[doc(inline)]
pub use picture::validate_picture;
#[doc(inline)]
pub use settings::{
    default_database_path, load_settings, load_settings_from, save_settings, save_settings_to,
    settings_file_path, StoreSettings,
};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::EntryStore;

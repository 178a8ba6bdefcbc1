//! Journal export and import as `.zip` archives.
//!
//! An archive holds `entries.json` plus one `pictures/<id>.<ext>` file per
//! entry that has a picture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::core::picture::picture_extension;
use crate::{Entry, EntryStore, FramesError};

/// Version of the crate that wrote an archive.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Archive layout version understood by this build.
const FORMAT_VERSION: u32 = 1;

const ENTRIES_FILE: &str = "entries.json";

/// Top-level JSON structure in `entries.json`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntries {
    pub version: u32,
    pub app_version: String,
    pub entries: Vec<ExportEntry>,
}

/// One entry in `entries.json`. The picture lives in a separate archive file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub main: String,
    pub details: String,
    pub is_bookmarked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_file: Option<String>,
}

/// Metadata read from an archive without importing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub app_version: String,
    pub entry_count: usize,
    pub picture_count: usize,
}

/// Outcome of [`import_entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: usize,
    /// Entries whose ID already existed or that failed validation.
    pub skipped_count: usize,
}

/// Errors specific to export/import operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Store error: {0}")]
    Store(#[from] FramesError),
}

/// Writes every entry in `store` to a zip archive on `writer`.
///
/// Returns the number of entries written.
pub fn export_entries<W: Write + Seek>(store: &EntryStore, writer: W) -> Result<usize, ExportError> {
    let entries = store.list_entries()?;
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();

    let mut manifest = Vec::with_capacity(entries.len());
    for entry in entries {
        let picture = if entry.has_picture {
            store.get_picture(&entry.id)?
        } else {
            None
        };
        let picture_file = match picture {
            Some(bytes) => {
                let name = format!("pictures/{}.{}", entry.id, picture_extension(&bytes));
                zip.start_file(name.as_str(), options)?;
                zip.write_all(&bytes)?;
                Some(name)
            }
            None => None,
        };
        manifest.push(ExportEntry {
            id: entry.id,
            timestamp: entry.timestamp,
            main: entry.main,
            details: entry.details,
            is_bookmarked: entry.is_bookmarked,
            picture_file,
        });
    }

    let count = manifest.len();
    let export = ExportEntries {
        version: FORMAT_VERSION,
        app_version: APP_VERSION.to_string(),
        entries: manifest,
    };
    zip.start_file(ENTRIES_FILE, options)?;
    zip.write_all(serde_json::to_string_pretty(&export)?.as_bytes())?;
    zip.finish()?;

    log::info!("exported {count} entries");
    Ok(count)
}

/// Reads archive metadata without touching any store.
pub fn peek_import<R: Read + Seek>(reader: R) -> Result<ImportSummary, ExportError> {
    let mut archive = ZipArchive::new(reader)?;
    let export = read_manifest(&mut archive)?;
    Ok(ImportSummary {
        app_version: export.app_version,
        entry_count: export.entries.len(),
        picture_count: export
            .entries
            .iter()
            .filter(|e| e.picture_file.is_some())
            .count(),
    })
}

/// Imports an archive written by [`export_entries`] into `store`.
///
/// IDs, timestamps and bookmark flags are preserved. Entries whose ID is
/// already present are skipped. All accepted entries land in one transaction.
///
/// # Errors
///
/// Returns [`ExportError::InvalidFormat`] if the manifest is missing, has an
/// unsupported version, or references a picture that is not in the archive.
pub fn import_entries<R: Read + Seek>(
    store: &EntryStore,
    reader: R,
) -> Result<ImportResult, ExportError> {
    let mut archive = ZipArchive::new(reader)?;
    let export = read_manifest(&mut archive)?;

    let mut entries = Vec::with_capacity(export.entries.len());
    for record in export.entries {
        let picture = match &record.picture_file {
            Some(name) => Some(read_file(&mut archive, name)?),
            None => None,
        };
        entries.push(Entry {
            id: record.id,
            timestamp: record.timestamp,
            main: record.main,
            details: record.details,
            has_picture: picture.is_some(),
            picture,
            is_bookmarked: record.is_bookmarked,
        });
    }

    // Manifests list newest first; insert oldest first so timestamp ties keep
    // their listing order in the target store.
    entries.reverse();
    entries.sort_by_key(|e| e.timestamp);

    let (imported_count, skipped_count) = store.insert_existing(entries)?;
    log::info!("imported {imported_count} entries, skipped {skipped_count}");
    Ok(ImportResult {
        imported_count,
        skipped_count,
    })
}

fn read_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<ExportEntries, ExportError> {
    let bytes = read_file(archive, ENTRIES_FILE)?;
    let export: ExportEntries = serde_json::from_slice(&bytes)?;
    if export.version != FORMAT_VERSION {
        return Err(ExportError::InvalidFormat(format!(
            "unsupported archive version {}",
            export.version
        )));
    }
    Ok(export)
}

fn read_file<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>, ExportError> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => {
            ExportError::InvalidFormat(format!("missing {name} in archive"))
        }
        other => ExportError::Zip(other),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

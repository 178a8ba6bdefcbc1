//! The entry store: durable CRUD over journal entries backed by SQLite.

use crate::core::events::ListenerRegistry;
use crate::{
    group_by_month, load_settings, validate_picture, DeleteResult, Entry, FramesError,
    MonthGroup, Result, StoreEvent, StoreSettings, Storage, SubscriptionId,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Full row, picture bytes included.
const SELECT_ENTRY: &str = "SELECT id, timestamp, main, details, picture, picture IS NOT NULL, \
     is_bookmarked FROM entries";
/// Listing row: picture bytes stay in the database.
const SELECT_ENTRIES: &str = "SELECT id, timestamp, main, details, NULL, picture IS NOT NULL, \
     is_bookmarked FROM entries";
const NEWEST_FIRST: &str = "ORDER BY timestamp DESC, rowid DESC";

/// An open Frames journal backed by a SQLite database.
///
/// All operations take `&self`; the connection sits behind a `Mutex`, so
/// concurrent callers are serialized and a reader never sees a half-applied
/// mutation. Share it across threads with an `Arc`.
///
/// Every mutation runs in its own transaction and, once committed, is
/// announced to subscribers as a [`StoreEvent`].
pub struct EntryStore {
    storage: Mutex<Storage>,
    listeners: ListenerRegistry,
}

impl EntryStore {
    /// Creates a new journal database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::Database`] if the file cannot be created or the
    /// schema cannot be applied.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = Storage::create(&path)?;
        log::info!("created journal at {}", path.as_ref().display());
        Ok(Self::from_storage(storage))
    }

    /// Opens an existing journal database at `path`, migrating older layouts.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::InvalidStore`] if the file is not a Frames
    /// database, or [`FramesError::Database`] for any SQLite failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = Storage::open(&path)?;
        log::info!("opened journal at {}", path.as_ref().display());
        Ok(Self::from_storage(storage))
    }

    /// Opens the journal at `path`, creating it (and its parent directories)
    /// when the file does not exist yet.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::open(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::create(path)
    }

    /// Opens (or creates) the journal named by `settings`.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self> {
        Self::open_or_create(&settings.database_path)
    }

    /// Opens the journal named by the settings file, falling back to
    /// [`default_database_path`](crate::default_database_path).
    pub fn open_default() -> Result<Self> {
        Self::from_settings(&load_settings())
    }

    /// Opens a journal that lives only as long as this value.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_storage(Storage::open_in_memory()?))
    }

    fn from_storage(storage: Storage) -> Self {
        Self {
            storage: Mutex::new(storage),
            listeners: ListenerRegistry::default(),
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage.lock().map_err(|_| FramesError::LockPoisoned)
    }

    #[cfg(test)]
    pub(crate) fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        f(self.storage.lock().unwrap().connection())
    }

    /// Creates and persists a new entry stamped with the current time.
    ///
    /// The entry is visible to every subsequent query as soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::Validation`] if `main` and `details` are both
    /// empty or `picture` is not a decodable image; nothing is written in that
    /// case. Returns [`FramesError::Database`] if the INSERT fails.
    pub fn create_entry(
        &self,
        main: &str,
        details: &str,
        picture: Option<Vec<u8>>,
    ) -> Result<Entry> {
        self.create_entry_at(main, details, picture, Utc::now())
    }

    pub(crate) fn create_entry_at(
        &self,
        main: &str,
        details: &str,
        picture: Option<Vec<u8>>,
        at: DateTime<Utc>,
    ) -> Result<Entry> {
        if let Err(e) = validate_new_entry(main, details, picture.as_deref()) {
            log::warn!("rejected new entry: {e}");
            return Err(e);
        }

        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            // Stored precision is milliseconds.
            timestamp: timestamp_from_millis(at.timestamp_millis())?,
            main: main.to_string(),
            details: details.to_string(),
            has_picture: picture.is_some(),
            picture,
            is_bookmarked: false,
        };

        {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;
            insert_entry(&tx, &entry)?;
            tx.commit()?;
        }

        log::debug!("created entry {}", entry.id);
        self.listeners.emit(&StoreEvent::Created { id: entry.id.clone() });
        Ok(entry)
    }

    /// Fetches a single entry by ID.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::EntryNotFound`] if no entry has this ID.
    pub fn get_entry(&self, id: &str) -> Result<Entry> {
        let storage = self.storage()?;
        fetch_entry(storage.connection(), id)
    }

    /// Returns the picture payload of `id`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::EntryNotFound`] if no entry has this ID.
    pub fn get_picture(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let storage = self.storage()?;
        storage
            .connection()
            .query_row("SELECT picture FROM entries WHERE id = ?1", [id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| FramesError::EntryNotFound(id.to_string()))
    }

    /// Returns every entry, newest first, without picture bytes.
    ///
    /// Entries sharing a timestamp are ordered most recently inserted first.
    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let storage = self.storage()?;
        query_entries(storage.connection(), &format!("{SELECT_ENTRIES} {NEWEST_FIRST}"))
    }

    /// Returns bookmarked entries, in the same order as [`Self::list_entries`].
    pub fn list_bookmarked(&self) -> Result<Vec<Entry>> {
        let storage = self.storage()?;
        query_entries(
            storage.connection(),
            &format!("{SELECT_ENTRIES} WHERE is_bookmarked != 0 {NEWEST_FIRST}"),
        )
    }

    /// Returns entries whose `main` or `details` contain `query`, ignoring case.
    ///
    /// An empty query returns the full listing. Matching is done in Rust
    /// rather than with SQL `LIKE`, which only folds ASCII case.
    pub fn search_entries(&self, query: &str) -> Result<Vec<Entry>> {
        let entries = self.list_entries()?;
        if query.is_empty() {
            return Ok(entries);
        }
        let needle = query.to_lowercase();
        Ok(entries
            .into_iter()
            .filter(|e| e.matches_lowercase(&needle))
            .collect())
    }

    /// Returns all entries grouped by calendar month in `tz`, newest month first.
    pub fn list_grouped_by_month<Tz>(&self, tz: &Tz) -> Result<Vec<MonthGroup>>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Ok(group_by_month(self.list_entries()?, tz))
    }

    /// Returns the number of stored entries.
    pub fn count_entries(&self) -> Result<usize> {
        let storage = self.storage()?;
        let count: i64 =
            storage
                .connection()
                .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Flips the bookmark flag of `id` and returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::EntryNotFound`] if no entry has this ID; the
    /// store is left unchanged.
    pub fn toggle_bookmark(&self, id: &str) -> Result<Entry> {
        let entry = {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;

            let current: Option<bool> = tx
                .query_row(
                    "SELECT is_bookmarked FROM entries WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            let current = current.ok_or_else(|| FramesError::EntryNotFound(id.to_string()))?;

            tx.execute(
                "UPDATE entries SET is_bookmarked = ?1 WHERE id = ?2",
                rusqlite::params![!current, id],
            )?;
            let entry = fetch_entry(&tx, id)?;
            tx.commit()?;
            entry
        };

        log::debug!("entry {} bookmarked = {}", entry.id, entry.is_bookmarked);
        self.listeners.emit(&StoreEvent::BookmarkToggled {
            id: entry.id.clone(),
            is_bookmarked: entry.is_bookmarked,
        });
        Ok(entry)
    }

    /// Permanently removes the entry `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::EntryNotFound`] if no entry has this ID,
    /// including when it was already deleted.
    pub fn delete_entry(&self, id: &str) -> Result<()> {
        {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;
            let removed = tx.execute("DELETE FROM entries WHERE id = ?1", [id])?;
            // DELETE on a missing row succeeds with zero changes.
            if removed == 0 {
                return Err(FramesError::EntryNotFound(id.to_string()));
            }
            tx.commit()?;
        }

        log::debug!("deleted entry {id}");
        self.listeners.emit(&StoreEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    /// Removes every entry. Irreversible; meant for resets and debugging.
    pub fn delete_all_entries(&self) -> Result<DeleteResult> {
        let result = {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;
            let affected_ids: Vec<String> = {
                let mut stmt = tx.prepare("SELECT id FROM entries")?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                ids
            };
            tx.execute("DELETE FROM entries", [])?;
            tx.commit()?;
            DeleteResult {
                deleted_count: affected_ids.len(),
                affected_ids,
            }
        };

        log::info!("cleared journal ({} entries removed)", result.deleted_count);
        self.listeners.emit(&StoreEvent::Cleared {
            deleted_count: result.deleted_count,
        });
        Ok(result)
    }

    /// Registers `listener` to be called after every committed mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Inserts fully-formed entries in one transaction, keeping their IDs and
    /// timestamps. Entries whose ID already exists, or that break the entry
    /// invariants, are skipped.
    ///
    /// Returns `(imported, skipped)`.
    pub(crate) fn insert_existing(&self, entries: Vec<Entry>) -> Result<(usize, usize)> {
        let (mut imported, mut skipped) = (0, 0);
        {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;
            for entry in &entries {
                let exists: bool = tx.query_row(
                    "SELECT COUNT(*) FROM entries WHERE id = ?1",
                    [&entry.id],
                    |row| row.get::<_, i64>(0).map(|count| count > 0),
                )?;
                if exists {
                    log::warn!("skipping import of {}: id already present", entry.id);
                    skipped += 1;
                    continue;
                }
                if let Err(e) =
                    validate_new_entry(&entry.main, &entry.details, entry.picture.as_deref())
                {
                    log::warn!("skipping import of {}: {e}", entry.id);
                    skipped += 1;
                    continue;
                }
                insert_entry(&tx, entry)?;
                imported += 1;
            }
            tx.commit()?;
        }

        if imported > 0 {
            self.listeners.emit(&StoreEvent::Imported { count: imported });
        }
        Ok((imported, skipped))
    }
}

/// Enforces the invariants a new entry must satisfy before it is written.
fn validate_new_entry(main: &str, details: &str, picture: Option<&[u8]>) -> Result<()> {
    if main.is_empty() && details.is_empty() {
        return Err(FramesError::Validation(
            "A frame needs a title or details".to_string(),
        ));
    }
    if let Some(bytes) = picture {
        validate_picture(bytes)?;
    }
    Ok(())
}

fn insert_entry(conn: &Connection, entry: &Entry) -> Result<()> {
    conn.execute(
        "INSERT INTO entries (id, timestamp, main, details, picture, is_bookmarked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            entry.id,
            entry.timestamp.timestamp_millis(),
            entry.main,
            entry.details,
            entry.picture,
            entry.is_bookmarked,
        ],
    )?;
    Ok(())
}

fn fetch_entry(conn: &Connection, id: &str) -> Result<Entry> {
    let row = conn
        .query_row(&format!("{SELECT_ENTRY} WHERE id = ?1"), [id], map_entry_row)
        .optional()?
        .ok_or_else(|| FramesError::EntryNotFound(id.to_string()))?;
    entry_from_row(row)
}

fn query_entries(conn: &Connection, sql: &str) -> Result<Vec<Entry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], map_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(entry_from_row).collect()
}

/// Raw column tuple extracted from an `entries` row.
type EntryRow = (String, i64, String, String, Option<Vec<u8>>, bool, bool);

fn map_entry_row(row: &rusqlite::Row) -> rusqlite::Result<EntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn entry_from_row(
    (id, millis, main, details, picture, has_picture, is_bookmarked): EntryRow,
) -> Result<Entry> {
    Ok(Entry {
        timestamp: timestamp_from_millis(millis)?,
        id,
        main,
        details,
        picture,
        has_picture,
        is_bookmarked,
    })
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| FramesError::InvalidStore(format!("timestamp out of range: {millis}")))
}

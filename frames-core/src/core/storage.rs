use crate::Result;
use rusqlite::Connection;
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'entries'",
            [],
            |row| row.get(0),
        )?;

        if table_count != 1 {
            return Err(crate::FramesError::InvalidStore(
                "Not a valid Frames database".to_string(),
            ));
        }

        // Migrate: the first release had no bookmark column
        let column_exists: bool = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('entries') WHERE name='is_bookmarked'",
            [],
            |row| row.get::<_, i64>(0).map(|count| count > 0),
        )?;

        if !column_exists {
            log::info!("migrating entries table: adding is_bookmarked column");
            conn.execute(
                "ALTER TABLE entries ADD COLUMN is_bookmarked INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn table_names(storage: &Storage) -> Vec<String> {
        storage
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        assert!(table_names(&storage).contains(&"entries".to_string()));
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();
        Storage::create(temp.path()).unwrap();

        let storage = Storage::open(temp.path()).unwrap();
        assert!(table_names(&storage).contains(&"entries".to_string()));
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "not a database").unwrap();

        assert!(Storage::open(temp.path()).is_err());
    }

    #[test]
    fn test_open_empty_sqlite_file_is_invalid_store() {
        let temp = NamedTempFile::new().unwrap();
        Connection::open(temp.path())
            .unwrap()
            .execute("CREATE TABLE unrelated (id INTEGER)", [])
            .unwrap();

        let result = Storage::open(temp.path());
        assert!(matches!(result, Err(crate::FramesError::InvalidStore(_))));
    }

    #[test]
    fn test_migration_adds_is_bookmarked_column() {
        let temp = NamedTempFile::new().unwrap();

        // Database written by a build without bookmarks
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute(
                "CREATE TABLE entries (
                    id TEXT PRIMARY KEY,
                    timestamp INTEGER NOT NULL,
                    main TEXT NOT NULL,
                    details TEXT NOT NULL,
                    picture BLOB
                )",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO entries (id, timestamp, main, details) VALUES ('old', 0, 'm', 'd')",
                [],
            )
            .unwrap();
        }

        let storage = Storage::open(temp.path()).unwrap();

        let flag: i64 = storage
            .connection()
            .query_row("SELECT is_bookmarked FROM entries WHERE id = 'old'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(flag, 0, "existing rows should default to not bookmarked");
    }
}

// Durable key-value storage backed by SQLite

use crate::storage::Storage;
use crate::task::now_ms;
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CURRENT_VERSION: u32 = 1;
const STORE_DIR: &str = ".taskmaster";

/// SQLite-backed [`Storage`] living in a `.taskmaster` directory
///
/// Holds an exclusive lock on the directory for as long as it is open, so
/// at most one process writes to a store at a time.
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
    _lock: File,
}

impl SqliteStorage {
    /// Open or create storage under `<path>/.taskmaster`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(STORE_DIR);

        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let lock = Self::acquire_lock(&base_path)?;

        let db_path = base_path.join("taskmaster.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let storage = Self {
            base_path,
            db,
            _lock: lock,
        };

        storage.create_schema()?;
        storage.create_gitignore()?;
        storage.write_version()?;

        info!(path = ?storage.base_path, "Opened task storage");
        Ok(storage)
    }

    /// Get the base path of this storage
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn acquire_lock(base_path: &Path) -> Result<File> {
        let lock_path = base_path.join("taskmaster.lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open lock file")?;

        file.try_lock_exclusive()
            .map_err(|e| eyre!("Store at {} is in use by another process: {}", base_path.display(), e))?;

        debug!(path = ?lock_path, "Acquired store lock");
        Ok(file)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> Result<()> {
        let gitignore_path = self.base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(
                gitignore_path,
                "taskmaster.db\ntaskmaster.db-shm\ntaskmaster.db-wal\ntaskmaster.lock\n",
            )?;
        }
        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(eyre!("Storage key cannot be empty"));
        }
        if key.len() > 64 {
            return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::validate_key(key)?;

        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()
            .with_context(|| format!("Failed to read key {}", key))?;

        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;

        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now_ms()],
            )
            .with_context(|| format!("Failed to write key {}", key))?;

        debug!(key, bytes = value.len(), "Wrote storage slot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Self::validate_key(key)?;

        self.db
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove key {}", key))?;

        Ok(())
    }
}

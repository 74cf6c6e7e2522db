/*!
 * Shared SQLite handle for the translation cache.
 *
 * A single connection sits behind a mutex; async callers hand closures to
 * `execute_async`, which runs them on tokio's blocking pool.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

const CACHE_FILE_NAME: &str = "translation_cache.db";
const APP_DIR_NAME: &str = "subtrans";

/// Where the cache lives
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Cloneable handle to the cache database
#[derive(Clone)]
pub struct DatabaseConnection {
    location: Location,
    conn: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the cache in the per-user data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the cache file at `path`, creating parent directories
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create cache directory {}", dir.display()))?;
        }

        info!("Opening translation cache at {}", path.display());
        let conn = Connection::open(&path)
            .with_context(|| format!("Cannot open cache database {}", path.display()))?;
        Self::prepared(conn, Location::File(path))
    }

    /// Throwaway cache that disappears with the handle
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory translation cache");
        let conn = Connection::open_in_memory().context("Cannot open in-memory cache database")?;
        Self::prepared(conn, Location::Memory)
    }

    fn prepared(conn: Connection, location: Location) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            location,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/subtrans/translation_cache.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("No data directory available for the translation cache"))?;
        Ok(base.join(APP_DIR_NAME).join(CACHE_FILE_NAME))
    }

    /// File path, or `:memory:` for in-memory caches
    pub fn path(&self) -> &Path {
        match &self.location {
            Location::File(path) => path,
            Location::Memory => Path::new(":memory:"),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == Location::Memory
    }

    /// Run `work` against the connection without blocking the async runtime
    pub async fn execute_async<F, T>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || work(&conn.lock()))
            .await
            .context("Cache database task panicked")?
    }

    /// Give freed pages back to the filesystem
    pub async fn vacuum(&self) -> Result<()> {
        self.execute_async(|conn| conn.execute_batch("VACUUM").map_err(Into::into))
            .await
    }
}

/*!
 * Cache schema and its migrations.
 *
 * Migrations are applied in order and tracked through SQLite's
 * `user_version` pragma, so a database only ever moves forward.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Each step brings the schema from version `index` to `index + 1`.
/// Times are unix milliseconds.
const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS translation_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text_hash TEXT NOT NULL UNIQUE,
        source_text TEXT NOT NULL,
        translated_text TEXT NOT NULL,
        source_language TEXT NOT NULL,
        target_language TEXT NOT NULL,
        engine TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        last_used_at INTEGER NOT NULL,
        usage_count INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX IF NOT EXISTS idx_cache_languages
        ON translation_cache(source_language, target_language);
    CREATE INDEX IF NOT EXISTS idx_cache_last_used
        ON translation_cache(last_used_at);
"#];

/// Version a fully migrated cache reports
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

/// Bring `conn` up to [`SCHEMA_VERSION`]
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // WAL keeps readers going while a batch writes; in-memory databases ignore it
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("Cannot switch cache database to WAL")?;

    let current = schema_version(conn)?;
    if current >= SCHEMA_VERSION {
        debug!("Cache schema at v{}", current);
        return Ok(());
    }

    info!("Migrating cache schema v{} -> v{}", current, SCHEMA_VERSION);
    for (step, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        let target = step as i64 + 1;
        conn.execute_batch(sql)
            .with_context(|| format!("Cache migration to v{} failed", target))?;
        conn.pragma_update(None, "user_version", target)?;
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("Cannot read cache schema version")
}

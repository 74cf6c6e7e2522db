/*!
 * Repository layer for the translation cache table.
 *
 * All SQL lives here. Callers deal in hashes, records and plain numbers.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{CacheRecord, CacheTableStats};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Cache key: SHA-256 over the trimmed text and the language pair
    pub fn hash_text(text: &str, source_language: &str, target_language: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}|{}|{}", text.trim(), source_language, target_language).as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Look up a translation and record the use
    pub async fn get_cached_translation(&self, text_hash: &str, now_ms: i64) -> Result<Option<String>> {
        let text_hash = text_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let result: Option<(i64, String)> = conn
                    .query_row(
                        "SELECT id, translated_text FROM translation_cache WHERE text_hash = ?1",
                        [&text_hash],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                if let Some((id, translated_text)) = result {
                    conn.execute(
                        "UPDATE translation_cache SET last_used_at = ?1, usage_count = usage_count + 1 WHERE id = ?2",
                        params![now_ms, id],
                    )?;
                    debug!("Cache hit for {}", &text_hash[..12.min(text_hash.len())]);
                    Ok(Some(translated_text))
                } else {
                    Ok(None)
                }
            })
            .await
    }

    /// Insert a translation, replacing every value field of an existing key
    pub async fn cache_translation(&self, record: &CacheRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_cache (
                        text_hash, source_text, translated_text, source_language, target_language,
                        engine, created_at, last_used_at, usage_count
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(text_hash) DO UPDATE SET
                        source_text = excluded.source_text,
                        translated_text = excluded.translated_text,
                        source_language = excluded.source_language,
                        target_language = excluded.target_language,
                        engine = excluded.engine,
                        created_at = excluded.created_at,
                        last_used_at = excluded.last_used_at,
                        usage_count = excluded.usage_count
                    "#,
                    params![
                        record.text_hash,
                        record.source_text,
                        record.translated_text,
                        record.source_language,
                        record.target_language,
                        record.engine,
                        record.created_at,
                        record.last_used_at,
                        record.usage_count,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Fetch a full record without touching its usage
    pub async fn get_record(&self, text_hash: &str) -> Result<Option<CacheRecord>> {
        let text_hash = text_hash.to_string();

        self.db
            .execute_async(move |conn| Self::get_record_sync(conn, &text_hash))
            .await
    }

    fn get_record_sync(conn: &Connection, text_hash: &str) -> Result<Option<CacheRecord>> {
        let record = conn
            .query_row(
                r#"
                SELECT id, text_hash, source_text, translated_text, source_language, target_language,
                       engine, created_at, last_used_at, usage_count
                FROM translation_cache WHERE text_hash = ?1
                "#,
                [text_hash],
                |row| {
                    Ok(CacheRecord {
                        id: row.get(0)?,
                        text_hash: row.get(1)?,
                        source_text: row.get(2)?,
                        translated_text: row.get(3)?,
                        source_language: row.get(4)?,
                        target_language: row.get(5)?,
                        engine: row.get(6)?,
                        created_at: row.get(7)?,
                        last_used_at: row.get(8)?,
                        usage_count: row.get(9)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Delete single-use entries last used before `cutoff_ms`
    pub async fn evict_unused_before(&self, cutoff_ms: i64) -> Result<usize> {
        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM translation_cache WHERE last_used_at < ?1 AND usage_count = 1",
                    [cutoff_ms],
                )?;
                Ok(deleted)
            })
            .await
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheTableStats> {
        self.db
            .execute_async(|conn| {
                let (total_entries, total_usage): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(usage_count), 0) FROM translation_cache",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                let mut stmt = conn.prepare(
                    r#"
                    SELECT target_language, COUNT(*) AS entries
                    FROM translation_cache
                    GROUP BY target_language
                    ORDER BY entries DESC, target_language ASC
                    "#,
                )?;
                let per_target_language = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
                let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;

                Ok(CacheTableStats {
                    total_entries,
                    total_usage,
                    per_target_language,
                    storage_size_bytes: page_count * page_size,
                })
            })
            .await
    }

    /// Clear the translation cache
    pub async fn clear_cache(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translation_cache", [])?;
                Ok(deleted)
            })
            .await
    }
}

//! SQLite-backed [`DocumentStore`]: one `documents` table, JSON bodies, transactional batch upserts.

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Statement};
use std::path::Path;

use crate::utils::config::DB_INSERT_BATCH_SIZE;

use super::{
    CLAIM_DOCUMENT_SQL, ClaimOutcome, Collection, Document, DocumentStore, UPSERT_DOCUMENT_SQL,
    open_db, open_db_in_memory,
};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wrap an already-open connection. Schema must already be applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Load one document body by key.
    pub fn get(&self, collection: Collection, key: &str) -> Result<Option<serde_json::Value>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                (collection.as_str(), key),
                |row| row.get(0),
            )
            .optional()
            .context("load document")?;
        body.map(|s| serde_json::from_str(&s).context("decode document body"))
            .transpose()
    }
}

/// Execute one upsert for a document (used by flush_batch).
fn execute_upsert(stmt: &mut Statement<'_>, collection: Collection, doc: &Document) -> Result<()> {
    stmt.execute((collection.as_str(), doc.key.as_str(), doc.body.to_string()))
        .with_context(|| format!("upsert {} document {}", collection, doc.key))?;
    Ok(())
}

/// Upsert one chunk through an already-prepared statement. Returns chunk length.
fn flush_batch(
    stmt: &mut Statement<'_>,
    collection: Collection,
    batch: &[Document],
) -> Result<usize> {
    for doc in batch {
        execute_upsert(stmt, collection, doc)?;
    }
    Ok(batch.len())
}

impl DocumentStore for SqliteStore {
    fn find_by_id(&self, collection: Collection, key: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE collection = ?1 AND key = ?2",
                (collection.as_str(), key),
                |_| Ok(()),
            )
            .optional()
            .context("look up document")?;
        Ok(found.is_some())
    }

    fn insert_one(&self, collection: Collection, doc: &Document) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached(UPSERT_DOCUMENT_SQL)
            .context("prepare upsert")?;
        execute_upsert(&mut stmt, collection, doc)
    }

    /// All-or-nothing: every chunk shares one transaction, rolled back on the first failure.
    fn insert_many(&self, collection: Collection, docs: &[Document]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin transaction")?;
        let mut stmt = tx.prepare(UPSERT_DOCUMENT_SQL).context("prepare upsert")?;
        let mut written = 0_usize;
        for chunk in docs.chunks(DB_INSERT_BATCH_SIZE) {
            written += flush_batch(&mut stmt, collection, chunk)?;
            debug!("{collection}: {written}/{} documents staged", docs.len());
        }
        drop(stmt);
        tx.commit().context("commit transaction")?;
        Ok(written)
    }

    fn claim(&self, collection: Collection, doc: &Document) -> Result<ClaimOutcome> {
        let changed = self
            .conn
            .execute(
                CLAIM_DOCUMENT_SQL,
                (collection.as_str(), doc.key.as_str(), doc.body.to_string()),
            )
            .with_context(|| format!("claim {} document {}", collection, doc.key))?;
        Ok(if changed == 0 {
            ClaimOutcome::AlreadyPresent
        } else {
            ClaimOutcome::Claimed
        })
    }

    fn count(&self, collection: Collection) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                [collection.as_str()],
                |row| row.get(0),
            )
            .with_context(|| format!("count {collection}"))?;
        Ok(n.max(0) as u64)
    }
}

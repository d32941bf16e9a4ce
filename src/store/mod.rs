//! Document store: collections of JSON documents keyed by string, backed by SQLite.

mod connection;
mod documents;

pub use connection::{open_db, open_db_in_memory};
pub use documents::SqliteStore;

use anyhow::{Context, Result};
use serde::Serialize;

/// Named collections the harvester writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tweets,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tweets => "tweets",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored document: primary key plus JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub key: String,
    pub body: serde_json::Value,
}

/// A typed record that lives in exactly one collection under its own key.
pub trait Record: Serialize {
    const COLLECTION: Collection;

    fn key(&self) -> String;

    fn to_document(&self) -> Result<Document> {
        let body = serde_json::to_value(self)
            .with_context(|| format!("serialize {} record {}", Self::COLLECTION, self.key()))?;
        Ok(Document {
            key: self.key(),
            body,
        })
    }
}

/// Outcome of [`DocumentStore::claim`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The key was absent and the document is now stored.
    Claimed,
    /// Another writer got there first; nothing was written.
    AlreadyPresent,
}

/// Store capability consumed by the filter, walker, harvester, and driver.
pub trait DocumentStore {
    /// True if a document with `key` exists in `collection`.
    fn find_by_id(&self, collection: Collection, key: &str) -> Result<bool>;

    /// Upsert one document.
    fn insert_one(&self, collection: Collection, doc: &Document) -> Result<()>;

    /// Upsert a batch. Returns the number of documents written.
    fn insert_many(&self, collection: Collection, docs: &[Document]) -> Result<usize>;

    /// Insert only if the key is absent, atomically.
    fn claim(&self, collection: Collection, doc: &Document) -> Result<ClaimOutcome>;

    /// Number of documents in `collection`.
    fn count(&self, collection: Collection) -> Result<u64>;
}

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Upsert statement for documents table.
pub(crate) const UPSERT_DOCUMENT_SQL: &str =
    "INSERT OR REPLACE INTO documents (collection, key, body) VALUES (?1, ?2, ?3)";

/// Claim statement: a no-op when the key already exists.
pub(crate) const CLAIM_DOCUMENT_SQL: &str =
    "INSERT OR IGNORE INTO documents (collection, key, body) VALUES (?1, ?2, ?3)";

/// Schema for the documents table.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, key)
);
"#;

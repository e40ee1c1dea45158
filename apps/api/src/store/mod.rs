//! Local Store: keyed JSON document collections over SQLite.
//!
//! Every record type implements [`Document`], which ties it to one
//! [`Collection`]. Reads and writes outside a [`StoreTx`] run on a pooled
//! connection and commit immediately; last write wins.

pub mod schema;
pub mod snapshot;

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use thiserror::Error;
use tracing::info;

pub use schema::{Collection, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Constraint violation: {collection} already contains id '{id}'")]
    Constraint { collection: Collection, id: String },

    #[error("No index on {collection}.{field}")]
    UnknownIndex { collection: Collection, field: String },

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A record owned by exactly one collection and keyed by its `id`.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

/// Value compared against an indexed field.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::Text(value.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        IndexValue::Text(value)
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        IndexValue::Integer(value)
    }
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Wraps `pool` and brings its schema up to [`SCHEMA_VERSION`].
    pub async fn open(pool: SqlitePool) -> StoreResult<Self> {
        let store = Store { pool };
        store.migrate_to(SCHEMA_VERSION).await?;
        Ok(store)
    }

    /// Fresh, migrated in-memory store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = crate::db::create_memory_pool().await?;
        Ok(Store::open(pool).await?)
    }

    pub async fn schema_version(&self) -> StoreResult<i64> {
        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    /// Applies every migration above the current version up to `target`,
    /// each one atomically together with its version bump.
    pub(crate) async fn migrate_to(&self, target: i64) -> StoreResult<()> {
        let current = self.schema_version().await?;
        if current > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchemaVersion {
                found: current,
                supported: SCHEMA_VERSION,
            });
        }

        for migration in schema::MIGRATIONS
            .iter()
            .filter(|m| m.version > current && m.version <= target)
        {
            let mut tx = self.pool.begin().await?;
            for statement in migration.statements {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            sqlx::query(&format!("PRAGMA user_version = {}", migration.version))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            info!("Store schema migrated to version {}", migration.version);
        }
        Ok(())
    }

    pub async fn get<D: Document>(&self, id: &str) -> StoreResult<Option<D>> {
        let mut conn = self.pool.acquire().await?;
        fetch_doc(&mut conn, id).await
    }

    /// Inserts a new record; fails with [`StoreError::Constraint`] if the id is taken.
    pub async fn add<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_doc(&mut conn, doc).await
    }

    /// Inserts or fully replaces the record with the same id.
    pub async fn put<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_doc(&mut conn, doc).await
    }

    /// Inserts all records or none of them.
    pub async fn bulk_add<D: Document>(&self, docs: &[D]) -> StoreResult<()> {
        let mut tx = self.transaction().await?;
        tx.bulk_add(docs).await?;
        tx.commit().await
    }

    /// Every record in primary-key order.
    pub async fn to_array<D: Document>(&self) -> StoreResult<Vec<D>> {
        let sql = format!("SELECT doc FROM {} ORDER BY id", D::COLLECTION.table());
        let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        decode_all(rows)
    }

    /// Starts a filtered read on a secondary index, e.g.
    /// `store.index::<Assessment>("jobId")?.equals(job_id)`.
    pub fn index<D: Document>(&self, field: &str) -> StoreResult<IndexQuery<'_, D>> {
        let field = D::COLLECTION
            .indexed_fields()
            .iter()
            .copied()
            .find(|f| *f == field)
            .ok_or_else(|| StoreError::UnknownIndex {
                collection: D::COLLECTION,
                field: field.to_string(),
            })?;
        Ok(IndexQuery {
            store: self,
            field,
            _doc: PhantomData,
        })
    }

    pub async fn clear<D: Document>(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        clear_collection(&mut conn, D::COLLECTION).await
    }

    pub async fn count<D: Document>(&self) -> StoreResult<usize> {
        count_collection(&self.pool, D::COLLECTION).await
    }

    /// Begins a multi-collection write. Nothing is visible to other readers
    /// until [`StoreTx::commit`]; dropping the handle rolls everything back.
    pub async fn transaction(&self) -> StoreResult<StoreTx> {
        Ok(StoreTx {
            tx: self.pool.begin().await?,
        })
    }
}

pub struct IndexQuery<'a, D> {
    store: &'a Store,
    field: &'static str,
    _doc: PhantomData<D>,
}

impl<'a, D: Document> IndexQuery<'a, D> {
    pub async fn equals(self, value: impl Into<IndexValue>) -> StoreResult<Vec<D>> {
        // `field` comes from the collection's static index list, never from the caller.
        let sql = format!(
            "SELECT doc FROM {} WHERE json_extract(doc, '$.{}') = ? ORDER BY id",
            D::COLLECTION.table(),
            self.field
        );
        let query = sqlx::query_scalar::<_, String>(&sql);
        let query = match value.into() {
            IndexValue::Text(text) => query.bind(text),
            IndexValue::Integer(number) => query.bind(number),
        };
        let rows = query.fetch_all(&self.store.pool).await?;
        decode_all(rows)
    }
}

/// An open write transaction spanning any number of collections.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx {
    pub async fn add<D: Document>(&mut self, doc: &D) -> StoreResult<()> {
        insert_doc(&mut self.tx, doc).await
    }

    pub async fn put<D: Document>(&mut self, doc: &D) -> StoreResult<()> {
        upsert_doc(&mut self.tx, doc).await
    }

    pub async fn bulk_add<D: Document>(&mut self, docs: &[D]) -> StoreResult<()> {
        for doc in docs {
            insert_doc(&mut self.tx, doc).await?;
        }
        Ok(())
    }

    pub async fn clear<D: Document>(&mut self) -> StoreResult<()> {
        clear_collection(&mut self.tx, D::COLLECTION).await
    }

    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn fetch_doc<D: Document>(conn: &mut SqliteConnection, id: &str) -> StoreResult<Option<D>> {
    let sql = format!("SELECT doc FROM {} WHERE id = ?", D::COLLECTION.table());
    let row: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
        .transpose()
}

async fn insert_doc<D: Document>(conn: &mut SqliteConnection, doc: &D) -> StoreResult<()> {
    let body = serde_json::to_string(doc)?;
    let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", D::COLLECTION.table());
    sqlx::query(&sql)
        .bind(doc.id())
        .bind(body)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Constraint {
                collection: D::COLLECTION,
                id: doc.id().to_string(),
            },
            _ => StoreError::Database(e),
        })?;
    Ok(())
}

async fn upsert_doc<D: Document>(conn: &mut SqliteConnection, doc: &D) -> StoreResult<()> {
    let body = serde_json::to_string(doc)?;
    let sql = format!(
        "INSERT INTO {} (id, doc) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
        D::COLLECTION.table()
    );
    sqlx::query(&sql)
        .bind(doc.id())
        .bind(body)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn clear_collection(conn: &mut SqliteConnection, collection: Collection) -> StoreResult<()> {
    sqlx::query(&format!("DELETE FROM {}", collection.table()))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn count_collection(pool: &SqlitePool, collection: Collection) -> StoreResult<usize> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", collection.table()))
        .fetch_one(pool)
        .await?;
    Ok(count as usize)
}

fn decode_all<D: Document>(rows: Vec<String>) -> StoreResult<Vec<D>> {
    rows.iter()
        .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
        .collect()
}

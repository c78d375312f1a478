#[cfg(feature = "mongo-store")]
pub mod mongodb;
pub mod memory;
#[cfg(feature = "rest-store")]
pub mod rest;

use std::{str::FromStr, sync::Arc};

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::dao::{
    query::{Filter, Query, Row, Table},
    storage::{StorageError, StorageResult},
};

/// Abstraction over the table-oriented backend holding every row of the service.
pub trait TableStore: Send + Sync {
    /// Rows of `query.table` matching the query.
    fn select(&self, query: Query) -> BoxFuture<'static, StorageResult<Vec<Row>>>;
    /// Insert `row`, returning it as stored (with `id` and `created_at` filled in).
    fn insert(&self, table: Table, row: Row) -> BoxFuture<'static, StorageResult<Row>>;
    /// Merge `patch` into every row matching `filters`, returning the updated rows.
    fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Row,
    ) -> BoxFuture<'static, StorageResult<Vec<Row>>>;
    /// Delete every row matching `filters`, returning how many were removed.
    fn delete(&self, table: Table, filters: Vec<Filter>) -> BoxFuture<'static, StorageResult<u64>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Fill in `id` and `created_at` for backends that do not generate them.
pub(crate) fn stamp(mut row: Row) -> Row {
    if row.get("id").is_none_or(Value::is_null) {
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    }
    if row.get("created_at").is_none_or(Value::is_null) {
        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".into());
        row.insert("created_at".into(), Value::String(now));
    }
    row
}

/// Backend selected with `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Rest,
    Mongo,
    Memory,
}

#[derive(Debug, Error)]
#[error("unknown storage backend `{0}` (expected rest, mongo or memory)")]
pub struct UnknownBackend(String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Backend::Rest),
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            "memory" => Ok(Backend::Memory),
            other => Err(UnknownBackend(other.to_owned())),
        }
    }
}

/// The requested backend was left out of this build.
#[derive(Debug, Error)]
#[error("storage backend `{0:?}` is not compiled in")]
pub struct BackendDisabled(Backend);

/// Open a store for `backend`, reading its settings from the environment.
pub async fn connect(backend: Backend) -> StorageResult<Arc<dyn TableStore>> {
    match backend {
        Backend::Memory => Ok(Arc::new(memory::MemoryStore::new())),
        #[cfg(feature = "rest-store")]
        Backend::Rest => {
            let config = self::rest::RestConfig::from_env()?;
            Ok(Arc::new(self::rest::RestTableStore::connect(config).await?))
        }
        #[cfg(feature = "mongo-store")]
        Backend::Mongo => {
            let config = self::mongodb::MongoConfig::from_env().await?;
            Ok(Arc::new(self::mongodb::MongoTableStore::connect(config).await?))
        }
        #[allow(unreachable_patterns)]
        other => {
            let err = BackendDisabled(other);
            Err(StorageError::unavailable(err.to_string(), err))
        }
    }
}

//! In-process table store used by tests and `STORAGE_BACKEND=memory` runs.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{TableStore, stamp};
use crate::dao::{
    query::{Filter, Query, Row, Table},
    storage::{StorageError, StorageResult},
};

/// Failure reported while the store is switched offline.
#[derive(Debug)]
pub struct Offline;

impl fmt::Display for Offline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory store is offline")
    }
}

impl std::error::Error for Offline {}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail (or succeed again) as an unreachable backend would.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(Offline.to_string(), Offline))
        } else {
            Ok(())
        }
    }
}

fn matches_all(filters: &[Filter], row: &Row) -> bool {
    filters.iter().all(|filter| filter.matches(row))
}

impl TableStore for MemoryStore {
    fn select(&self, query: Query) -> BoxFuture<'static, StorageResult<Vec<Row>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let tables = store.inner.tables.read().await;
            let rows = tables
                .get(&query.table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| query.matches(row))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            Ok(query.arrange(rows))
        })
    }

    fn insert(&self, table: Table, row: Row) -> BoxFuture<'static, StorageResult<Row>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let row = stamp(row);
            let mut tables = store.inner.tables.write().await;
            tables.entry(table).or_default().push(row.clone());
            Ok(row)
        })
    }

    fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Row,
    ) -> BoxFuture<'static, StorageResult<Vec<Row>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.inner.tables.write().await;
            let mut updated = Vec::new();
            for row in tables.entry(table).or_default().iter_mut() {
                if !matches_all(&filters, row) {
                    continue;
                }
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
            Ok(updated)
        })
    }

    fn delete(&self, table: Table, filters: Vec<Filter>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.inner.tables.write().await;
            let rows = tables.entry(table).or_default();
            let before = rows.len();
            rows.retain(|row| !matches_all(&filters, row));
            Ok((before - rows.len()) as u64)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test rows are objects"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Table::Fields, row(json!({"name": "Cancha 1"})))
            .await
            .unwrap();
        assert!(stored["id"].as_str().is_some());
        assert!(stored["created_at"].as_str().is_some());

        let rows = store.select(Query::from(Table::Fields)).await.unwrap();
        assert_eq!(rows, vec![stored]);
    }

    #[tokio::test]
    async fn update_and_delete_follow_filters() {
        let store = MemoryStore::new();
        for (player, paid) in [("a", false), ("b", false), ("c", true)] {
            store
                .insert(Table::Enrollments, row(json!({"player_id": player, "paid": paid})))
                .await
                .unwrap();
        }

        let updated = store
            .update(
                Table::Enrollments,
                vec![Filter::eq("paid", false)],
                row(json!({"paid": true})),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);

        let removed = store
            .delete(Table::Enrollments, vec![Filter::is_in("player_id", ["a", "c"])])
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let left = store
            .select(Query::from(Table::Enrollments).filter(Filter::eq("paid", true)))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["player_id"], "b");
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.select(Query::from(Table::Games)).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert!(store.health_check().await.is_err());

        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
    }
}

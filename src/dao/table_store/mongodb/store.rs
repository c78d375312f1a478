use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    convert::{
        document_to_row, filters_to_document, row_to_document, sort_document, value_to_bson,
    },
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{
    query::{Filter, Query, Row, Table},
    storage::StorageResult,
    table_store::{TableStore, stamp},
};

#[derive(Clone)]
pub struct MongoTableStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoTableStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        for table in Table::ALL {
            let index = IndexModel::builder()
                .keys(doc! {"id": 1})
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{}_id_idx", table.name())))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            self.collection(table)
                .await
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: table.name(),
                    index: "id",
                    source,
                })?;
        }

        Ok(())
    }

    async fn collection(&self, table: Table) -> Collection<Document> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<Document>(table.name())
    }

    async fn find(
        &self,
        table: Table,
        filter: Document,
        query: Option<&Query>,
    ) -> MongoResult<Vec<Row>> {
        let collection = self.collection(table).await;
        let mut action = collection.find(filter);
        if let Some(query) = query {
            if !query.order.is_empty() {
                action = action.sort(sort_document(&query.order));
            }
            if let Some(limit) = query.limit {
                action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
            }
        }

        let cursor = action.await.map_err(|source| MongoDaoError::Find {
            collection: table.name(),
            source,
        })?;
        let documents: Vec<Document> =
            cursor
                .try_collect()
                .await
                .map_err(|source| MongoDaoError::Find {
                    collection: table.name(),
                    source,
                })?;

        Ok(documents.into_iter().map(document_to_row).collect())
    }

    async fn select_rows(&self, query: Query) -> MongoResult<Vec<Row>> {
        let filter = filters_to_document(&query.filters);
        self.find(query.table, filter, Some(&query)).await
    }

    async fn insert_row(&self, table: Table, row: Row) -> MongoResult<Row> {
        let row = stamp(row);
        self.collection(table)
            .await
            .insert_one(row_to_document(&row))
            .await
            .map_err(|source| MongoDaoError::Insert {
                collection: table.name(),
                source,
            })?;
        Ok(row)
    }

    async fn update_rows(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Row,
    ) -> MongoResult<Vec<Row>> {
        let matching = self.find(table, filters_to_document(&filters), None).await?;
        let ids: Vec<Bson> = matching
            .iter()
            .filter_map(|row| row.get("id"))
            .map(value_to_bson)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let by_id = doc! { "id": { "$in": ids } };
        self.collection(table)
            .await
            .update_many(by_id.clone(), doc! { "$set": row_to_document(&patch) })
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: table.name(),
                source,
            })?;

        self.find(table, by_id, None).await
    }

    async fn delete_rows(&self, table: Table, filters: Vec<Filter>) -> MongoResult<u64> {
        let result = self
            .collection(table)
            .await
            .delete_many(filters_to_document(&filters))
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: table.name(),
                source,
            })?;
        Ok(result.deleted_count)
    }
}

impl TableStore for MongoTableStore {
    fn select(&self, query: Query) -> BoxFuture<'static, StorageResult<Vec<Row>>> {
        let store = self.clone();
        Box::pin(async move { store.select_rows(query).await.map_err(Into::into) })
    }

    fn insert(&self, table: Table, row: Row) -> BoxFuture<'static, StorageResult<Row>> {
        let store = self.clone();
        Box::pin(async move { store.insert_row(table, row).await.map_err(Into::into) })
    }

    fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Row,
    ) -> BoxFuture<'static, StorageResult<Vec<Row>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_rows(table, filters, patch)
                .await
                .map_err(Into::into)
        })
    }

    fn delete(&self, table: Table, filters: Vec<Filter>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.delete_rows(table, filters).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.reconnect().await?;
            store.ensure_indexes().await?;
            Ok(())
        })
    }
}

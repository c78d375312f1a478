use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::dao::{
    query::{Filter, Query, Row, Table},
    storage::StorageResult,
    table_store::TableStore,
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    params::{filter_params, select_params},
};

const REST_PREFIX: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone)]
pub struct RestTableStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestTableStore {
    /// Build the HTTP client and check that the backend answers.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::<str>::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.api_key {
            Some(ref key) => builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref()),
            None => builder,
        }
    }

    async fn send(path: &str, builder: RequestBuilder) -> RestResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status,
                body,
            })
        }
    }

    async fn rows(path: &str, builder: RequestBuilder) -> RestResult<Vec<Row>> {
        let response = Self::send(path, builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn ping(&self) -> RestResult<()> {
        let path = "";
        Self::send(path, self.request(Method::GET, path)).await?;
        Ok(())
    }
}

impl TableStore for RestTableStore {
    fn select(&self, query: Query) -> BoxFuture<'static, StorageResult<Vec<Row>>> {
        let store = self.clone();
        Box::pin(async move {
            let path = query.table.name();
            let builder = store
                .request(Method::GET, path)
                .query(&select_params(&query));
            Ok(Self::rows(path, builder).await?)
        })
    }

    fn insert(&self, table: Table, row: Row) -> BoxFuture<'static, StorageResult<Row>> {
        let store = self.clone();
        Box::pin(async move {
            let path = table.name();
            let builder = store
                .request(Method::POST, path)
                .header("Prefer", RETURN_REPRESENTATION)
                .json(&row);
            let inserted = Self::rows(path, builder).await?;
            inserted.into_iter().next().ok_or_else(|| {
                RestDaoError::EmptyInsert {
                    path: path.to_string(),
                }
                .into()
            })
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
            let path = table.name();
            let builder = store
                .request(Method::PATCH, path)
                .query(&filter_params(&filters))
                .header("Prefer", RETURN_REPRESENTATION)
                .json(&patch);
            Ok(Self::rows(path, builder).await?)
        })
    }

    fn delete(&self, table: Table, filters: Vec<Filter>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let path = table.name();
            let builder = store
                .request(Method::DELETE, path)
                .query(&filter_params(&filters))
                .header("Prefer", RETURN_REPRESENTATION);
            let removed = Self::rows(path, builder).await?;
            Ok(removed.len() as u64)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexOperation`
//! using the OpenSearch Rust client.

use std::collections::HashMap;

use async_trait::async_trait;
use opensearch::{
    http::{
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        StatusCode,
    },
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, DeleteByQueryParts, OpenSearch,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::SearchError;
use crate::interfaces::IndexOperation;
use crate::opensearch::index_config::build_index_body;
use crate::types::{BulkRequest, BulkResponse, DeleteByQueryRequest};
use search_indexer_shared::{Index, IndexType, Store};

/// OpenSearch index operation.
///
/// Resolved and created indices are cached by backend name for the lifetime
/// of the instance. When the configuration disables indexing, every call
/// fails with `SearchError::ConnectionDisabled` before any request is made.
///
/// # Example
///
/// ```ignore
/// let config = SearchIndexConfig::new("http://localhost:9200");
/// let types = vec![IndexType::new("product").with_field("price", FieldType::Double)];
/// let operation = OpenSearchIndexOperation::new(config, types)?;
///
/// let store = Store::new(1, "default");
/// let index = operation.create_index("catalog", &store).await?;
/// assert_eq!(index.name(), "catalog_default");
/// ```
pub struct OpenSearchIndexOperation {
    client: OpenSearch,
    config: SearchIndexConfig,
    types: Vec<IndexType>,
    indices: RwLock<HashMap<String, Index>>,
}

impl OpenSearchIndexOperation {
    /// Create a new OpenSearch index operation for the configured URL.
    ///
    /// # Arguments
    ///
    /// * `config` - Backend URL, enable switch, batch and shard settings
    /// * `types` - The document types every index is created with
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchIndexOperation)` - A new instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: SearchIndexConfig, types: Vec<IndexType>) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            enabled = config.enabled,
            batch_indexing_size = config.batch_indexing_size,
            types = types.len(),
            "Created OpenSearch index operation"
        );

        Ok(Self {
            client,
            config,
            types,
            indices: RwLock::new(HashMap::new()),
        })
    }

    fn ensure_enabled(&self) -> Result<(), SearchError> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(SearchError::ConnectionDisabled)
        }
    }

    fn build_index(&self, name: &str, identifier: &str) -> Index {
        Index::new(name, identifier, self.types.clone())
    }

    async fn cache_index(&self, index: Index) -> Index {
        self.indices
            .write()
            .await
            .insert(index.name().to_string(), index.clone());
        index
    }
}

/// Interpret the status of an index existence check.
///
/// Only 404 means the index is missing; any other failure is an error.
fn exists_from_status(index_name: &str, status: StatusCode) -> Result<bool, SearchError> {
    if status.is_success() {
        return Ok(true);
    }
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }

    let message = format!("Checking index {} failed with status {}", index_name, status);
    if status.is_server_error() {
        Err(SearchError::connection(message))
    } else {
        Err(SearchError::request(message))
    }
}

/// Gateway and availability statuses that mean the cluster cannot serve
/// requests at all.
fn is_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Pull `error.type` and `error.reason` out of an error response body.
fn error_details(body: &Value) -> (String, String) {
    let error_type = body["error"]["type"].as_str().unwrap_or("unknown").to_string();
    let reason = body["error"]["reason"]
        .as_str()
        .unwrap_or("Unknown error")
        .to_string();
    (error_type, reason)
}

#[async_trait]
impl IndexOperation for OpenSearchIndexOperation {
    fn batch_indexing_size(&self) -> usize {
        self.config.batch_indexing_size
    }

    /// Uses format: `{identifier}_{store_code}`.
    fn index_name(&self, identifier: &str, store: &Store) -> String {
        format!("{}_{}", identifier, store.code)
    }

    async fn index_exists(&self, index_name: &str) -> Result<bool, SearchError> {
        self.ensure_enabled()?;

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        exists_from_status(index_name, response.status_code())
    }

    #[instrument(skip(self, store), fields(store = %store.code))]
    async fn get_index_by_name(
        &self,
        identifier: &str,
        store: &Store,
    ) -> Result<Index, SearchError> {
        let name = self.index_name(identifier, store);

        if let Some(index) = self.indices.read().await.get(&name) {
            return Ok(index.clone());
        }

        if !self.index_exists(&name).await? {
            return Err(SearchError::index_not_found(name));
        }

        debug!(index = %name, "Resolved existing index");
        Ok(self.cache_index(self.build_index(&name, identifier)).await)
    }

    #[instrument(skip(self, store), fields(store = %store.code))]
    async fn create_index(&self, identifier: &str, store: &Store) -> Result<Index, SearchError> {
        self.ensure_enabled()?;

        let name = self.index_name(identifier, store);
        let body = build_index_body(&self.types, &self.config);

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body: Value = response.json().await.unwrap_or_default();
            let (error_type, reason) = error_details(&error_body);

            // Created concurrently by another process
            if status == StatusCode::BAD_REQUEST
                && error_type == "resource_already_exists_exception"
            {
                debug!(index = %name, "Index already exists");
            } else {
                error!(index = %name, status = %status, error_type = %error_type, reason = %reason, "Index creation failed");
                return Err(SearchError::index_creation(format!(
                    "Creating index {} failed with status {}: {}",
                    name, status, reason
                )));
            }
        } else {
            info!(index = %name, "Created index");
        }

        Ok(self.cache_index(self.build_index(&name, identifier)).await)
    }

    #[instrument(skip(self, request), fields(index = %request.index(), operation = request.operation().as_str(), count = request.len()))]
    async fn execute_bulk(&self, request: BulkRequest) -> Result<BulkResponse, SearchError> {
        self.ensure_enabled()?;

        if request.is_empty() {
            return Ok(BulkResponse::empty());
        }

        let body: Vec<JsonBody<Value>> = request
            .to_body_lines()
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(request.index()))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            let message = format!("Bulk request failed with status {}: {}", status, error_body);
            return Err(if is_unavailable(status) {
                SearchError::connection(message)
            } else {
                SearchError::bulk(message)
            });
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let bulk_response = BulkResponse::from_json(response_body, request.type_name())?;

        debug!(
            took = bulk_response.took(),
            items = bulk_response.items().len(),
            failed = bulk_response.failed_count(),
            "Bulk request completed"
        );

        Ok(bulk_response)
    }

    #[instrument(skip(self, index), fields(index = %index.name()))]
    async fn refresh_index(&self, index: &Index) -> Result<(), SearchError> {
        self.ensure_enabled()?;

        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index.name()]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = format!(
                "Refreshing index {} failed with status {}: {}",
                index.name(),
                status,
                error_body
            );
            return Err(if is_unavailable(status) {
                SearchError::connection(message)
            } else {
                SearchError::refresh(message)
            });
        }

        debug!("Index refreshed");
        Ok(())
    }

    #[instrument(skip(self, request), fields(index = %request.index, type_name = %request.type_name))]
    async fn delete_by_query(&self, request: DeleteByQueryRequest) -> Result<u64, SearchError> {
        self.ensure_enabled()?;

        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[request.index.as_str()]))
            .body(request.body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete by query failed");
            let message = format!("Delete by query failed with status {}: {}", status, error_body);
            return Err(if is_unavailable(status) {
                SearchError::connection(message)
            } else {
                SearchError::delete_by_query(message)
            });
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let deleted = response_body["deleted"].as_u64().unwrap_or(0);

        info!(deleted = deleted, "Deleted stale documents");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_indexer_shared::{Batch, TransactionKey};
    use serde_json::json;

    fn disabled_operation() -> OpenSearchIndexOperation {
        OpenSearchIndexOperation::new(SearchIndexConfig::disabled(), vec![IndexType::new("product")])
            .unwrap()
    }

    #[test]
    fn test_index_name() {
        let operation = disabled_operation();
        let store = Store::new(1, "default");

        assert_eq!(operation.index_name("catalog", &store), "catalog_default");
    }

    #[test]
    fn test_invalid_url() {
        let config = SearchIndexConfig::new("not a url");
        let result = OpenSearchIndexOperation::new(config, Vec::new());

        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
    }

    #[test]
    fn test_batch_indexing_size_from_config() {
        let config = SearchIndexConfig::disabled().with_batch_indexing_size(250);
        let operation = OpenSearchIndexOperation::new(config, Vec::new()).unwrap();

        assert_eq!(operation.batch_indexing_size(), 250);
    }

    #[tokio::test]
    async fn test_disabled_backend_rejects_every_call() {
        let operation = disabled_operation();
        let store = Store::new(1, "default");
        let index = Index::new("catalog_default", "catalog", Vec::new());

        let docs: Batch = vec![json!({ "id": 1 }).as_object().unwrap().clone()];
        let bulk = BulkRequest::add_documents("catalog_default", "product", docs, "id").unwrap();
        let delete = DeleteByQueryRequest::stale_documents(
            "catalog_default",
            "product",
            &TransactionKey::new("1"),
            &[],
        );

        assert!(matches!(
            operation.index_exists("catalog_default").await,
            Err(SearchError::ConnectionDisabled)
        ));
        assert!(matches!(
            operation.get_index_by_name("catalog", &store).await,
            Err(SearchError::ConnectionDisabled)
        ));
        assert!(matches!(
            operation.create_index("catalog", &store).await,
            Err(SearchError::ConnectionDisabled)
        ));
        assert!(matches!(
            operation.execute_bulk(bulk).await,
            Err(SearchError::ConnectionDisabled)
        ));
        assert!(matches!(
            operation.refresh_index(&index).await,
            Err(SearchError::ConnectionDisabled)
        ));
        assert!(matches!(
            operation.delete_by_query(delete).await,
            Err(SearchError::ConnectionDisabled)
        ));
    }

    #[test]
    fn test_exists_only_missing_on_not_found() {
        assert!(exists_from_status("catalog_default", StatusCode::OK).unwrap());
        assert!(!exists_from_status("catalog_default", StatusCode::NOT_FOUND).unwrap());

        let unavailable = exists_from_status("catalog_default", StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(unavailable, Err(SearchError::ConnectionError(_))));

        let forbidden = exists_from_status("catalog_default", StatusCode::FORBIDDEN);
        assert!(matches!(forbidden, Err(SearchError::RequestError(_))));
        let throttled = exists_from_status("catalog_default", StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(throttled, Err(SearchError::RequestError(_))));
    }

    #[test]
    fn test_unavailable_statuses() {
        assert!(is_unavailable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_unavailable(StatusCode::BAD_GATEWAY));
        assert!(is_unavailable(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_unavailable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_unavailable(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[test]
    fn test_error_details() {
        let body = json!({
            "error": { "type": "resource_already_exists_exception", "reason": "index exists" },
            "status": 400
        });

        let (error_type, reason) = error_details(&body);
        assert_eq!(error_type, "resource_already_exists_exception");
        assert_eq!(reason, "index exists");

        let (error_type, reason) = error_details(&json!({}));
        assert_eq!(error_type, "unknown");
        assert_eq!(reason, "Unknown error");
    }
}

//! Caching client over the generated static API
//!
//! Each distinct endpoint is retrieved at most once per client while it
//! stays cached. The cache lock is not held across the retrieval, so two
//! concurrent misses for one endpoint both retrieve and the later one
//! overwrites the earlier entry. Parsed artifacts are immutable, so this
//! only wastes a request.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, error};
use wyrd_common::layout::{record_endpoint, CATEGORIES_ENDPOINT, INDEX_ENDPOINT, STATS_ENDPOINT};
use wyrd_common::{CatalogArtifact, CategoriesArtifact, PhenomenonRecord, StatsArtifact};

use crate::error::RetrievalError;
use crate::filters::SearchFilters;
use crate::timeline::{timeline, TimelineEntry};
use crate::transport::{HttpTransport, Transport};

/// Client for one published API base URL
pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    cache: Mutex<HashMap<String, Value>>,
}

impl ApiClient {
    /// HTTP client for `base_url` (e.g. `https://example.org/api/v1`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, RetrievalError> {
        let base_url = base_url.into();
        let transport = HttpTransport::new().map_err(|reason| RetrievalError::Transport {
            endpoint: base_url.clone(),
            reason,
        })?;
        Ok(Self::with_transport(base_url, Box::new(transport)))
    }

    pub fn with_transport(base_url: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parsed JSON of `endpoint`, from cache when present
    pub async fn fetch(&self, endpoint: &str) -> Result<Value, RetrievalError> {
        if let Some(cached) = self.cache.lock().await.get(endpoint) {
            debug!(endpoint, "cache hit");
            return Ok(cached.clone());
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, url = %url, "cache miss, retrieving");

        let response = self.transport.get(&url).await.map_err(|reason| {
            error!("Error fetching {}: {}", endpoint, reason);
            RetrievalError::Transport {
                endpoint: endpoint.to_string(),
                reason,
            }
        })?;

        if !response.is_success() {
            error!("Error fetching {}: HTTP {}", endpoint, response.status);
            return Err(RetrievalError::Status {
                endpoint: endpoint.to_string(),
                status: response.status,
            });
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| RetrievalError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        self.cache.lock().await.insert(endpoint.to_string(), value.clone());
        Ok(value)
    }

    /// `fetch` decoded as a typed artifact
    ///
    /// A body that is JSON but not the expected shape is a decode error and
    /// stays cached as raw JSON.
    pub async fn fetch_as<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RetrievalError> {
        let value = self.fetch(endpoint).await?;
        serde_json::from_value(value).map_err(|e| RetrievalError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn get_all_phenomena(&self) -> Result<CatalogArtifact, RetrievalError> {
        self.fetch_as(INDEX_ENDPOINT).await
    }

    pub async fn get_phenomenon(&self, id: &str) -> Result<PhenomenonRecord, RetrievalError> {
        self.fetch_as(&record_endpoint(id)).await
    }

    pub async fn get_categories(&self) -> Result<CategoriesArtifact, RetrievalError> {
        self.fetch_as(CATEGORIES_ENDPOINT).await
    }

    pub async fn get_stats(&self) -> Result<StatsArtifact, RetrievalError> {
        self.fetch_as(STATS_ENDPOINT).await
    }

    /// Records matching `query` and every filter, in catalog order
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<PhenomenonRecord>, RetrievalError> {
        let catalog = self.get_all_phenomena().await?;
        Ok(catalog
            .phenomena
            .into_iter()
            .filter(|record| filters.matches(record, query))
            .collect())
    }

    /// Records whose category equals `category` exactly
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<PhenomenonRecord>, RetrievalError> {
        let catalog = self.get_all_phenomena().await?;
        Ok(catalog
            .phenomena
            .into_iter()
            .filter(|record| record.category == category)
            .collect())
    }

    /// Dated records ordered by first-reported year
    pub async fn get_timeline(&self) -> Result<Vec<TimelineEntry>, RetrievalError> {
        let catalog = self.get_all_phenomena().await?;
        Ok(timeline(&catalog))
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves fixed bodies and counts every request
    struct CountingTransport {
        routes: HashMap<String, TransportResponse>,
        requests: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse, String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.routes.get(url).cloned().unwrap_or(TransportResponse {
                status: 404,
                body: b"Not Found".to_vec(),
            }))
        }
    }

    fn catalog_body() -> Vec<u8> {
        let record = |id: &str, name: &str, region: &str| {
            json!({
                "id": id, "name": name, "category": "cryptid", "description": "",
                "aliases": [], "tags": [], "status": "unknown", "regions": [region],
                "origin": "", "first_reported": "Unknown",
                "danger_level": "unknown", "evidence_level": "unknown"
            })
        };
        json!({
            "version": "1.0.0",
            "generated": "2024-01-01T00:00:00.000Z",
            "total": 2,
            "phenomena": [
                record("loch-ness", "Loch Ness", "Scotland"),
                record("bigfoot", "Bigfoot", "USA")
            ]
        })
        .to_string()
        .into_bytes()
    }

    fn client() -> (ApiClient, Arc<AtomicUsize>) {
        let requests = Arc::new(AtomicUsize::new(0));
        let mut routes = HashMap::new();
        routes.insert(
            "http://test/api/v1/index.json".to_string(),
            TransportResponse {
                status: 200,
                body: catalog_body(),
            },
        );
        routes.insert(
            "http://test/api/v1/stats.json".to_string(),
            TransportResponse {
                status: 200,
                body: b"{ truncated".to_vec(),
            },
        );
        let transport = CountingTransport {
            routes,
            requests: requests.clone(),
        };
        (ApiClient::with_transport("http://test/api/v1/", Box::new(transport)), requests)
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let (client, requests) = client();

        let first = client.fetch("index.json").await.unwrap();
        let second = client.fetch("index.json").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert_eq!(client.cache_len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_retrieval() {
        let (client, requests) = client();

        client.fetch("index.json").await.unwrap();
        client.clear_cache().await;
        client.fetch("index.json").await.unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_cached() {
        let (client, requests) = client();

        let err = client.get_phenomenon("yeti").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.endpoint(), "yeti.json");

        client.get_phenomenon("yeti").await.unwrap_err();
        assert_eq!(requests.load(Ordering::SeqCst), 2);
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let (client, _) = client();
        assert!(matches!(
            client.get_stats().await,
            Err(RetrievalError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_examples() {
        let (client, requests) = client();

        let loch = client.search("loch", &SearchFilters::default()).await.unwrap();
        assert_eq!(loch.len(), 1);
        assert_eq!(loch[0].id, "loch-ness");

        let cryptids = client.search("", &SearchFilters::category("cryptid")).await.unwrap();
        assert_eq!(cryptids.len(), 2);

        let usa = client.search("", &SearchFilters::region("USA")).await.unwrap();
        assert_eq!(usa.len(), 1);
        assert_eq!(usa[0].id, "bigfoot");

        assert_eq!(client.get_by_category("cryptid").await.unwrap().len(), 2);
        assert!(client.get_by_category("Cryptid").await.unwrap().is_empty());

        // One catalog retrieval serves every search
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }
}

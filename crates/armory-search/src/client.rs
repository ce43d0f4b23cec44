//! HTTP client for the hosted search index's REST API.
//!
//! Wraps `reqwest` with the provider's header auth, typed error mapping,
//! and retry on transient failures. One client is index-agnostic: every
//! operation takes the index name, so staging and production indexes can
//! share a client.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use armory_core::AppConfig;

use crate::error::SearchError;
use crate::retry::retry_with_backoff;

/// Browse page size. The provider caps browse pages at 1000 objects.
const BROWSE_HITS_PER_PAGE: u32 = 1000;

/// Hard stop for the browse cursor loop, far past any plausible catalog.
const MAX_BROWSE_PAGES: usize = 200;

/// Client for the hosted search index.
///
/// Use [`SearchClient::new`] for the hosted service (the base URL derives
/// from the application id) or [`SearchClient::with_base_url`] to point at
/// a mock server in tests or a self-hosted deployment.
pub struct SearchClient {
    client: Client,
    app_id: String,
    admin_key: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SearchClient {
    /// Creates a client pointed at the provider's hosted endpoint for
    /// `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        app_id: &str,
        admin_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SearchError> {
        let base_url = format!("https://{app_id}-dsn.algolia.net");
        Self::with_base_url(
            app_id,
            admin_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            &base_url,
        )
    }

    /// Creates a client with an explicit base URL (wiremock, self-hosted).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        app_id: &str,
        admin_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            app_id: app_id.to_owned(),
            admin_key: admin_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// `SEARCH_HOST` overrides the derived base URL when set.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingCredentials`] when the application id
    /// or admin key is not configured, or [`SearchError::Http`] if the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        let app_id = config
            .search_app_id
            .as_deref()
            .ok_or(SearchError::MissingCredentials {
                var: "SEARCH_APP_ID",
            })?;
        let admin_key =
            config
                .search_admin_key
                .as_deref()
                .ok_or(SearchError::MissingCredentials {
                    var: "SEARCH_ADMIN_KEY",
                })?;

        match config.search_host.as_deref() {
            Some(host) => Self::with_base_url(
                app_id,
                admin_key,
                config.request_timeout_secs,
                config.search_max_retries,
                config.search_backoff_base_ms,
                host,
            ),
            None => Self::new(
                app_id,
                admin_key,
                config.request_timeout_secs,
                config.search_max_retries,
                config.search_backoff_base_ms,
            ),
        }
    }

    /// Runs a search query against `index`.
    ///
    /// A query with `hits_per_page: Some(0)` is the cheap way to read
    /// `nb_hits` without transferring documents.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Api`] on a non-2xx application response.
    /// - [`SearchError::RateLimited`] on HTTP 429 after retries.
    /// - [`SearchError::Http`] on network failure after retries.
    /// - [`SearchError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn query(
        &self,
        index: &str,
        params: &QueryParams,
    ) -> Result<QueryResponse, SearchError> {
        let url = self.endpoint(index, "query");
        let body = self.send(Method::POST, &url, params).await?;
        serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
            context: format!("query({index})"),
            source: e,
        })
    }

    /// Fetches one browse page of object summaries from `index`.
    ///
    /// Only `objectID` and `contentHash` are retrieved; reconciliation
    /// needs nothing else, and full documents would make browsing a 30k
    /// catalog expensive.
    ///
    /// # Errors
    ///
    /// Same error surface as [`SearchClient::query`].
    pub async fn browse(
        &self,
        index: &str,
        cursor: Option<&str>,
    ) -> Result<BrowseResponse, SearchError> {
        let url = self.endpoint(index, "browse");
        let params = BrowseParams {
            hits_per_page: BROWSE_HITS_PER_PAGE,
            attributes_to_retrieve: ["objectID", "contentHash"],
            cursor,
        };
        let body = self.send(Method::POST, &url, &params).await?;
        serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
            context: format!("browse({index})"),
            source: e,
        })
    }

    /// Walks the browse cursor until the index is exhausted and returns
    /// every object summary.
    ///
    /// # Errors
    ///
    /// Same error surface as [`SearchClient::browse`], plus
    /// [`SearchError::PaginationLimit`] if the cursor never terminates.
    pub async fn browse_all(&self, index: &str) -> Result<Vec<ObjectSummary>, SearchError> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_BROWSE_PAGES {
            let page = self.browse(index, cursor.as_deref()).await?;
            objects.extend(page.hits);
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(objects),
            }
        }

        Err(SearchError::PaginationLimit {
            max_pages: MAX_BROWSE_PAGES,
        })
    }

    /// Submits a batch of write operations to `index`.
    ///
    /// The caller chunks to the configured batch size; the provider
    /// rejects oversized requests outright.
    ///
    /// # Errors
    ///
    /// Same error surface as [`SearchClient::query`].
    pub async fn batch(
        &self,
        index: &str,
        requests: &[BatchRequest],
    ) -> Result<BatchResponse, SearchError> {
        let url = self.endpoint(index, "batch");
        let body = self
            .send(Method::POST, &url, &BatchPayload { requests })
            .await?;
        serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
            context: format!("batch({index})"),
            source: e,
        })
    }

    /// Replaces the index settings with `settings`.
    ///
    /// # Errors
    ///
    /// Same error surface as [`SearchClient::query`].
    pub async fn set_settings(&self, index: &str, settings: &Value) -> Result<(), SearchError> {
        let url = self.endpoint(index, "settings");
        self.send(Method::PUT, &url, settings).await?;
        Ok(())
    }

    /// Deletes every object in `index` while keeping its settings.
    ///
    /// Destructive; reached only through the flag-gated rebuild command.
    ///
    /// # Errors
    ///
    /// Same error surface as [`SearchClient::query`].
    pub async fn clear(&self, index: &str) -> Result<(), SearchError> {
        let url = self.endpoint(index, "clear");
        self.send(Method::POST, &url, &serde_json::json!({})).await?;
        Ok(())
    }

    fn endpoint(&self, index: &str, op: &str) -> String {
        format!("{}/1/indexes/{index}/{op}", self.base_url)
    }

    /// Sends one authenticated JSON request with retry on transient
    /// failures and maps the response to a JSON value or a typed error.
    async fn send<B>(&self, method: Method, url: &str, body: &B) -> Result<Value, SearchError>
    where
        B: Serialize,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            async move {
                let response = self
                    .client
                    .request(method, url)
                    .header("X-Algolia-API-Key", &self.admin_key)
                    .header("X-Algolia-Application-Id", &self.app_id)
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(10);
                    return Err(SearchError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    // The provider reports errors as {"message": ..., "status": ...}.
                    let message = response
                        .text()
                        .await
                        .ok()
                        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
                        .and_then(|v| {
                            v.get("message")
                                .and_then(Value::as_str)
                                .map(str::to_owned)
                        })
                        .unwrap_or_else(|| {
                            status.canonical_reason().unwrap_or("unknown error").to_owned()
                        });
                    return Err(SearchError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                let text = response.text().await?;
                serde_json::from_str(&text).map_err(|e| SearchError::Deserialize {
                    context: url.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Parameters for a search query. Fields left `None` fall back to the
/// index settings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
}

/// One page of search results. Hits stay untyped; callers that need
/// specific attributes pick them out of the JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(rename = "nbHits", default)]
    pub nb_hits: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(rename = "nbPages", default)]
    pub nb_pages: u32,
}

/// Identity and change-detection fields of one indexed object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectSummary {
    #[serde(rename = "objectID")]
    pub object_id: String,
    /// Absent on documents written by tooling that predates hashing.
    #[serde(rename = "contentHash", default)]
    pub content_hash: Option<String>,
}

/// One page of a browse walk. A `None` cursor means the walk is done.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowseResponse {
    #[serde(default)]
    pub hits: Vec<ObjectSummary>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(rename = "nbHits", default)]
    pub nb_hits: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowseParams<'a> {
    hits_per_page: u32,
    attributes_to_retrieve: [&'a str; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

/// Write actions accepted by the batch endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchAction {
    AddObject,
    UpdateObject,
    PartialUpdateObject,
    DeleteObject,
}

/// One operation inside a batch request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest {
    pub action: BatchAction,
    pub body: Value,
}

impl BatchRequest {
    /// Builds a full-document upsert.
    #[must_use]
    pub fn update_object(body: Value) -> Self {
        Self {
            action: BatchAction::UpdateObject,
            body,
        }
    }

    /// Builds a partial update; `body` must carry the `objectID`.
    #[must_use]
    pub fn partial_update(body: Value) -> Self {
        Self {
            action: BatchAction::PartialUpdateObject,
            body,
        }
    }

    /// Builds a deletion keyed on the object id.
    #[must_use]
    pub fn delete_object(object_id: &str) -> Self {
        Self {
            action: BatchAction::DeleteObject,
            body: serde_json::json!({ "objectID": object_id }),
        }
    }
}

#[derive(Serialize)]
struct BatchPayload<'a> {
    requests: &'a [BatchRequest],
}

/// Acknowledgement of a batch write.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Vec<String>,
    #[serde(rename = "taskID", default)]
    pub task_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SearchClient {
        SearchClient::with_base_url("APP123", "admin-key", 30, 0, 0, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn new_derives_base_url_from_app_id() {
        let client = SearchClient::new("APP123", "admin-key", 30, 0, 0)
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint("products", "browse"),
            "https://APP123-dsn.algolia.net/1/indexes/products/browse"
        );
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = test_client("http://localhost:8108/");
        assert_eq!(
            client.endpoint("products", "batch"),
            "http://localhost:8108/1/indexes/products/batch"
        );
    }

    #[test]
    fn batch_actions_serialize_to_camel_case() {
        let actions = [
            (BatchAction::AddObject, "\"addObject\""),
            (BatchAction::UpdateObject, "\"updateObject\""),
            (BatchAction::PartialUpdateObject, "\"partialUpdateObject\""),
            (BatchAction::DeleteObject, "\"deleteObject\""),
        ];
        for (action, expected) in actions {
            let json = serde_json::to_string(&action).expect("serialization failed");
            assert_eq!(json, expected);
        }
    }

    #[test]
    fn delete_request_carries_object_id_body() {
        let request = BatchRequest::delete_object("AAC17-22G5");
        let json = serde_json::to_value(&request).expect("serialization failed");
        assert_eq!(json["action"], "deleteObject");
        assert_eq!(json["body"]["objectID"], "AAC17-22G5");
    }

    #[test]
    fn query_params_skip_unset_fields() {
        let params = QueryParams {
            query: String::new(),
            hits_per_page: Some(0),
            ..QueryParams::default()
        };
        let json = serde_json::to_string(&params).expect("serialization failed");
        assert_eq!(json, "{\"query\":\"\",\"hitsPerPage\":0}");
    }

    #[test]
    fn browse_params_include_retrieval_filter() {
        let params = BrowseParams {
            hits_per_page: 1000,
            attributes_to_retrieve: ["objectID", "contentHash"],
            cursor: None,
        };
        let json = serde_json::to_value(&params).expect("serialization failed");
        assert_eq!(json["hitsPerPage"], 1000);
        assert_eq!(
            json["attributesToRetrieve"],
            serde_json::json!(["objectID", "contentHash"])
        );
        assert!(json.get("cursor").is_none());
    }
}

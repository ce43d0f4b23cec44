//! Integration tests for `SearchClient` using wiremock HTTP mocks.

use armory_search::reconcile;
use armory_search::{BatchRequest, ProductDoc, QueryParams, SearchClient, SearchError};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SearchClient {
    SearchClient::with_base_url("APP123", "admin-key", 30, 0, 0, base_url)
        .expect("client construction should not fail")
}

/// Same credentials, one retry, no backoff delay.
fn retrying_client(base_url: &str) -> SearchClient {
    SearchClient::with_base_url("APP123", "admin-key", 30, 1, 0, base_url)
        .expect("client construction should not fail")
}

fn make_doc(object_id: &str, hash: &str) -> ProductDoc {
    ProductDoc {
        object_id: object_id.to_owned(),
        sku: format!("SKU-{object_id}"),
        name: format!("Product {object_id}"),
        description: None,
        category: "Accessories".to_owned(),
        subcategory: None,
        manufacturer: None,
        mpn: None,
        upc: None,
        price_bronze: "19.99".to_owned(),
        price_gold: "17.99".to_owned(),
        price_platinum: "15.99".to_owned(),
        in_stock: true,
        quantity: 3,
        drop_shippable: true,
        requires_ffl: false,
        new_item: false,
        caliber: None,
        capacity: None,
        barrel_length: None,
        finish: None,
        frame_size: None,
        action_type: None,
        sight_type: None,
        tags: vec!["Accessories".to_owned()],
        image_name: None,
        state_restrictions: Vec::new(),
        content_hash: hash.to_owned(),
    }
}

#[tokio::test]
async fn query_sends_auth_headers_and_parses_counts() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "hits": [],
        "nbHits": 28411,
        "page": 0,
        "nbPages": 0
    });

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/query"))
        .and(header("X-Algolia-Application-Id", "APP123"))
        .and(header("X-Algolia-API-Key", "admin-key"))
        .and(body_json(serde_json::json!({"query": "", "hitsPerPage": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let params = QueryParams {
        query: String::new(),
        hits_per_page: Some(0),
        ..QueryParams::default()
    };
    let response = client
        .query("products", &params)
        .await
        .expect("should parse query response");

    assert_eq!(response.nb_hits, 28411);
    assert!(response.hits.is_empty());
}

#[tokio::test]
async fn browse_all_follows_the_cursor() {
    let server = MockServer::start().await;

    // The cursor-bearing mock is mounted first so it wins for page two.
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .and(body_partial_json(serde_json::json!({"cursor": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [{"objectID": "B2", "contentHash": "h2"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [
                {"objectID": "A1", "contentHash": "h1"},
                {"objectID": "LEGACY"}
            ],
            "cursor": "page-2"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let objects = client
        .browse_all("products")
        .await
        .expect("should walk both pages");

    assert_eq!(objects.len(), 3);
    assert_eq!(objects[0].object_id, "A1");
    assert_eq!(objects[0].content_hash.as_deref(), Some("h1"));
    assert_eq!(objects[1].content_hash, None);
    assert_eq!(objects[2].object_id, "B2");
}

#[tokio::test]
async fn batch_returns_acknowledged_object_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_partial_json(serde_json::json!({
            "requests": [{"action": "deleteObject", "body": {"objectID": "GONE"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "taskID": 42,
            "objectIDs": ["GONE"]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .batch("products", &[BatchRequest::delete_object("GONE")])
        .await
        .expect("should parse batch response");

    assert_eq!(response.object_ids, vec!["GONE"]);
    assert_eq!(response.task_id, 42);
}

#[tokio::test]
async fn set_settings_puts_the_canonical_document() {
    let server = MockServer::start().await;
    let settings = armory_search::index_settings();

    Mock::given(method("PUT"))
        .and(path("/1/indexes/products/settings"))
        .and(body_json(&settings))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updatedAt": "2026-08-01T00:00:00.000Z",
            "taskID": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .set_settings("products", &settings)
        .await
        .expect("settings push should succeed");
}

#[tokio::test]
async fn clear_posts_to_the_clear_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updatedAt": "2026-08-01T00:00:00.000Z",
            "taskID": 9
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .clear("products")
        .await
        .expect("clear should succeed");
}

#[tokio::test]
async fn application_errors_carry_the_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/missing/query"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Index missing does not exist",
            "status": 404
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query("missing", &QueryParams::default()).await;

    match result {
        Err(SearchError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Index missing does not exist");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limits_surface_the_retry_after_value() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/query"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_json(serde_json::json!({"message": "Too many requests", "status": 429})),
        )
        .mount(&server)
        .await;

    // Zero retries so the 429 comes straight back.
    let client = test_client(&server.uri());
    let result = client.query("products", &QueryParams::default()).await;

    assert!(
        matches!(result, Err(SearchError::RateLimited { retry_after_secs: 7 })),
        "expected RateLimited {{ 7 }}, got: {result:?}"
    );
}

#[tokio::test]
async fn server_errors_are_retried_then_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/query"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [],
            "nbHits": 1,
            "page": 0,
            "nbPages": 1
        })))
        .mount(&server)
        .await;

    let client = retrying_client(&server.uri());
    let response = client
        .query("products", &QueryParams::default())
        .await
        .expect("second attempt should succeed");

    assert_eq!(response.nb_hits, 1);
}

#[tokio::test]
async fn apply_chunks_writes_to_the_batch_size() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "taskID": 1,
            "objectIDs": []
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let docs = vec![
        make_doc("A1", "h1"),
        make_doc("B2", "h2"),
        make_doc("C3", "h3"),
    ];
    let deletes = vec!["GONE".to_owned()];

    // Three docs at batch size two make two upsert batches; the deletion
    // rides in a third.
    let report = reconcile::apply(&client, "products", &docs, &deletes, 2, 0).await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 0);
    assert_eq!(report.upserted, 3);
    assert_eq!(report.deleted, 1);
    assert!(!report.all_failed());
}

#[tokio::test]
async fn apply_counts_failed_batches_and_continues() {
    let server = MockServer::start().await;

    // First batch request fails hard; the rest succeed.
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Record is too big",
            "status": 400
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "taskID": 2,
            "objectIDs": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let docs = vec![make_doc("A1", "h1"), make_doc("B2", "h2")];

    let report = reconcile::apply(&client, "products", &docs, &[], 1, 0).await;

    assert_eq!(report.batches, 2);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.upserted, 1);
    assert!(!report.all_failed());
}

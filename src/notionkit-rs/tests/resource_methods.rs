//! Resource method behavior over an in-memory transport.

use std::sync::{Arc, Mutex};

use notionkit::{
    Client, ClientConfig, HeaderMap, Method, NotionError, OutboundRequest, PageParent,
    RawResponse, Transport, API_KEY_ENV,
};
use serde_json::json;

#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        _headers: &HeaderMap,
        request: OutboundRequest,
    ) -> anyhow::Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(RawResponse::new(200, r#"{"object":"page"}"#))
    }
}

fn client(transport: Arc<RecordingTransport>) -> Client {
    let config = ClientConfig::builder()
        .api_key("secret_test")
        .build()
        .unwrap();
    Client::with_transport(config, transport).unwrap()
}

#[tokio::test]
async fn test_create_page_without_parent_sends_nothing() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client(transport.clone());

    let err = client
        .create_page(None, None, json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        NotionError::InvalidParameters("parent database id or page id required".to_string())
    );
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_create_page_under_page_parent() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client(transport.clone());

    client
        .create_page(None, Some("pg_1"), json!({"title": []}))
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url.as_str(), "https://api.notion.com/v1/pages");
    assert_eq!(
        requests[0].body,
        Some(json!({
            "parent": {"page_id": "pg_1"},
            "properties": {"title": []},
            "children": [],
        }))
    );
}

#[tokio::test]
async fn test_create_page_under_typed_parent() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client(transport.clone());

    client
        .create_page_under(&PageParent::DatabaseId("db_1".to_string()), json!({}))
        .await
        .unwrap();

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["parent"], json!({"database_id": "db_1"}));
}

#[tokio::test]
async fn test_invalid_ids_send_nothing() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client(transport.clone());

    let err = client.retrieve_page("").await.unwrap_err();
    assert!(matches!(err, NotionError::InvalidParameters(_)));

    let err = client.retrieve_database("../admin").await.unwrap_err();
    assert!(matches!(err, NotionError::InvalidParameters(_)));

    let err = client
        .update_page("pg/1", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, NotionError::InvalidParameters(_)));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_executor_is_reachable_for_other_endpoints() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client(transport.clone());
    let query = json!({"page_size": 5});

    client
        .executor()
        .execute(Method::Get, "users", query.as_object(), None)
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url.as_str(), "https://api.notion.com/v1/users");
    assert_eq!(request.query, vec![("page_size".to_string(), "5".to_string())]);
}

#[test]
fn test_missing_credential_fails_at_construction() {
    std::env::remove_var(API_KEY_ENV);

    let err = Client::new().err().unwrap();
    assert_eq!(err, NotionError::MissingCredential);
}

//! Integration tests for the Readwise Reader MCP tools
//!
//! These drive the tool registry end to end against a mock Reader API, and
//! the MCP server over its HTTP endpoint.

use mockito::{Matcher, ServerGuard};
use readwise_reader_mcp::client::MockReader;
use readwise_reader_mcp::config::{Config, ContentConfig};
use readwise_reader_mcp::convert::{ContentConverter, CONTENT_UNAVAILABLE};
use readwise_reader_mcp::error::MISSING_TOKEN_MESSAGE;
use readwise_reader_mcp::mcp::{McpServer, ToolContext, ToolRegistry};
use readwise_reader_mcp::{ReaderApi, ReaderClient};
use serde_json::{json, Value};
use std::sync::Arc;

fn registry_for(server: &ServerGuard) -> ToolRegistry {
    let client = ReaderClient::with_base_url("test-token", &server.url()).unwrap();
    let converter = ContentConverter::new(&ContentConfig {
        readability_base_url: format!("{}/", server.url()),
        user_agent: "readwise-reader-mcp-tests".to_string(),
    })
    .unwrap();
    ToolRegistry::new(ToolContext::new(
        Some(Arc::new(client) as Arc<dyn ReaderApi>),
        Arc::new(converter),
        20,
    ))
}

fn document(id: &str, title: &str, saved_at: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://read.readwise.io/read/{id}"),
        "source_url": format!("https://example.com/{id}"),
        "title": title,
        "category": "article",
        "location": "new",
        "tags": {},
        "saved_at": saved_at,
        "updated_at": saved_at
    })
}

fn split_messages(text: &str) -> (Value, Option<&str>) {
    match text.split_once("\n\nMessages:\n") {
        Some((body, messages)) => (serde_json::from_str(body).unwrap(), Some(messages)),
        None => (serde_json::from_str(text).unwrap(), None),
    }
}

#[tokio::test]
async fn test_server_initialization() {
    let server = mockito::Server::new_async().await;
    let registry = registry_for(&server);
    assert!(McpServer::new(&registry).is_ok());
}

/// Minimal JSON-RPC client for the HTTP endpoint
struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: u64,
}

impl RpcClient {
    async fn connect(registry: &ToolRegistry) -> Self {
        let server = McpServer::new(registry).unwrap();
        let (addr, _task) = server.run_http("127.0.0.1:0").await.unwrap();
        let mut client = Self {
            http: reqwest::Client::new(),
            url: format!("http://{addr}/"),
            next_id: 0,
        };
        let init = client
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "integration-tests", "version": "0.0.0"}
                }),
            )
            .await;
        assert!(init.get("result").is_some(), "{init}");
        client
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let response = self
            .http
            .post(&self.url)
            .header("accept", "application/json, text/event-stream")
            .json(&json!({
                "jsonrpc": "2.0",
                "id": self.next_id,
                "method": method,
                "params": params
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        response.json().await.unwrap()
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        let response = self
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await;
        assert!(response.get("error").is_none(), "{response}");
        response["result"].clone()
    }
}

fn mock_registry(reader: Option<MockReader>) -> ToolRegistry {
    let converter = ContentConverter::new(&ContentConfig::default()).unwrap();
    ToolRegistry::new(ToolContext::new(
        reader.map(|r| Arc::new(r) as Arc<dyn ReaderApi>),
        Arc::new(converter),
        20,
    ))
}

#[tokio::test]
async fn test_http_tool_call_returns_raw_text_block() {
    let registry = mock_registry(Some(MockReader::new().with_tags(&["rust", "async"])));
    let mut client = RpcClient::connect(&registry).await;

    let result = client.call_tool("readwise_list_tags", json!({})).await;
    assert_eq!(
        result["content"],
        json!([{"type": "text", "text": "Available tags:\n- rust\n- async"}])
    );
    assert_ne!(result["isError"], json!(true));
}

#[tokio::test]
async fn test_http_tool_failure_is_flagged_text() {
    let mut client = RpcClient::connect(&mock_registry(None)).await;

    let result = client.call_tool("readwise_list_tags", json!({})).await;
    assert_eq!(result["isError"], json!(true));
    assert_eq!(
        result["content"][0]["text"],
        format!("Error: {}", MISSING_TOKEN_MESSAGE)
    );
}

#[tokio::test]
async fn test_http_lists_every_tool() {
    let registry = mock_registry(None);
    let mut client = RpcClient::connect(&registry).await;

    let response = client.request("tools/list", json!({})).await;
    let mut names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();

    let mut expected: Vec<&str> = registry
        .all()
        .into_iter()
        .map(|t| t.name.as_str())
        .collect();
    expected.sort_unstable();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_missing_token_from_config() {
    let ctx = ToolContext::from_config(&Config::default()).unwrap();
    let registry = ToolRegistry::new(ctx);

    let response = registry.call("readwise_list_documents", json!({})).await;
    assert!(response.is_error);
    assert_eq!(response.text, format!("Error: {}", MISSING_TOKEN_MESSAGE));
}

#[tokio::test]
async fn test_list_documents_over_http() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .match_header("authorization", "Token test-token")
        .match_query(Matcher::UrlEncoded("location".into(), "later".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "count": 2,
                "nextPageCursor": "next-1",
                "results": [
                    document("a", "First", "2024-03-01T00:00:00Z"),
                    document("b", "Second", "2024-03-02T00:00:00Z")
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_list_documents", json!({"location": "later"}))
        .await;
    assert!(!response.is_error, "{}", response.text);

    let (listing, messages) = split_messages(&response.text);
    assert!(messages.is_none());
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["nextPageCursor"], "next-1");
    assert_eq!(listing["documents"][0]["id"], "a");
    assert_eq!(listing["documents"][1]["title"], "Second");
    assert_eq!(listing["documents"][0]["tags"], json!([]));
    assert!(listing["documents"][0].get("content").is_none());
    list.assert_async().await;
}

#[tokio::test]
async fn test_added_after_over_http_walks_pages_and_reports() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .match_query(Matcher::Missing)
        .with_status(200)
        .with_body(
            json!({
                "count": 3,
                "nextPageCursor": "p2",
                "results": [
                    document("old", "Old", "2023-01-01T00:00:00Z"),
                    document("new", "New", "2024-06-01T00:00:00Z")
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .match_query(Matcher::UrlEncoded("pageCursor".into(), "p2".into()))
        .with_status(200)
        .with_body(
            json!({
                "count": 3,
                "nextPageCursor": null,
                "results": [document("newer", "Newer", "2024-07-01T00:00:00Z")]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_list_documents", json!({"addedAfter": "2024-01-01"}))
        .await;
    assert!(!response.is_error, "{}", response.text);

    let (listing, messages) = split_messages(&response.text);
    assert_eq!(listing["count"], 2);
    assert!(listing.get("nextPageCursor").is_none());
    let ids: Vec<&str> = listing["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["new", "newer"]);
    assert!(messages.unwrap().starts_with("INFO: "));

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_full_content_uses_readability_service() {
    let mut server = mockito::Server::new_async().await;
    let mut doc = document("a", "Article", "2024-03-01T00:00:00Z");
    doc["html_content"] = json!("<p>inline</p>");
    let list = server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .with_status(200)
        .with_body(json!({"count": 1, "nextPageCursor": null, "results": [doc]}).to_string())
        .expect(2)
        .create_async()
        .await;
    let readable = server
        .mock("GET", Matcher::Regex("example.com/a$".to_string()))
        .match_header("accept", "text/plain")
        .with_status(200)
        .with_body("Readable article text")
        .create_async()
        .await;

    let response = registry_for(&server)
        .call(
            "readwise_list_documents",
            json!({"withFullContent": true, "withHtmlContent": true}),
        )
        .await;
    assert!(!response.is_error, "{}", response.text);

    let (listing, _) = split_messages(&response.text);
    assert_eq!(listing["documents"][0]["content"], "Readable article text");
    assert_eq!(listing["documents"][0]["html_content"], "<p>inline</p>");
    list.assert_async().await;
    readable.assert_async().await;
}

#[tokio::test]
async fn test_full_content_failure_is_not_fatal() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "count": 1,
                "results": [document("a", "Article", "2024-03-01T00:00:00Z")]
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", Matcher::Regex("example.com/a$".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_list_documents", json!({"withFullContent": true}))
        .await;
    assert!(!response.is_error, "{}", response.text);
    let (listing, _) = split_messages(&response.text);
    assert_eq!(listing["documents"][0]["content"], CONTENT_UNAVAILABLE);
}

#[tokio::test]
async fn test_rate_limit_renders_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/tags/".to_string()))
        .with_status(429)
        .with_header("retry-after", "30")
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_list_tags", json!({}))
        .await;
    assert!(response.is_error);
    assert_eq!(
        response.text,
        "Error: Rate limit exceeded. Retry after 30 seconds"
    );
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/delete/missing/")
        .with_status(404)
        .with_body(r#"{"detail":"Not found."}"#)
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_delete_document", json!({"id": "missing"}))
        .await;
    assert!(response.is_error);
    assert!(response.text.starts_with("Error: Readwise API error: 404"));
    assert!(response.text.contains("Not found."));
}

#[tokio::test]
async fn test_topic_search_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mut tagged = document("t", "Weekend reading", "2024-03-01T00:00:00Z");
    tagged["tags"] = json!({"k1": {"name": "Rust"}});
    server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "count": 2,
                "results": [document("p", "Pasta recipes", "2024-03-01T00:00:00Z"), tagged]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = registry_for(&server)
        .call("readwise_topic_search", json!({"searchTerms": ["rust"]}))
        .await;
    assert!(!response.is_error, "{}", response.text);

    let (result, _) = split_messages(&response.text);
    assert_eq!(result["totalMatches"], 1);
    assert_eq!(result["documents"][0]["id"], "t");
    assert_eq!(result["documents"][0]["tags"], json!(["Rust"]));
}

#[tokio::test]
async fn test_update_document_tags_adds_to_mapping_tags() {
    let mut server = mockito::Server::new_async().await;
    let mut current = document("d1", "Tagged", "2024-03-01T00:00:00Z");
    current["tags"] = json!({"k1": {"name": "reading"}});
    server
        .mock("GET", Matcher::Regex(r"^/list/".to_string()))
        .match_query(Matcher::UrlEncoded("id".into(), "d1".into()))
        .with_status(200)
        .with_body(json!({"count": 1, "results": [current]}).to_string())
        .create_async()
        .await;

    let mut updated = document("d1", "Tagged", "2024-03-01T00:00:00Z");
    updated["tags"] = json!(["reading", "later"]);
    let patch = server
        .mock("PATCH", "/update/d1/")
        .match_body(Matcher::Json(json!({"tags": ["reading", "later"]})))
        .with_status(200)
        .with_body(updated.to_string())
        .create_async()
        .await;

    let response = registry_for(&server)
        .call(
            "readwise_update_document_tags",
            json!({"id": "d1", "tags": ["later", "reading"], "mode": "add"}),
        )
        .await;
    assert!(!response.is_error, "{}", response.text);
    assert!(response.text.ends_with("Tags: reading, later"));
    patch.assert_async().await;
}

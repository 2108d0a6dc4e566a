//! MCP server on top of pmcp, over stdio or HTTP.
//!
//! Protocol plumbing (initialize, tools/list, ping, notifications) is handled
//! by pmcp's [`ServerCore`]. `tools/call` is answered here so that every tool
//! outcome becomes one raw text block, with `isError` set on failure.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use pmcp::server::adapters::{StdioAdapter, TransportAdapter};
use pmcp::server::auth::AuthContext;
use pmcp::server::builder::ServerCoreBuilder;
use pmcp::server::core::{ProtocolHandler, ServerCore};
use pmcp::shared::TransportMessage;
use pmcp::types::{
    CallToolRequest, CallToolResult, ClientRequest, Content, Implementation, JSONRPCError,
    JSONRPCResponse, Notification, Request, RequestId,
};
use pmcp::{Error, RequestHandlerExtra, ServerCapabilities, StdioTransport, ToolHandler, ToolInfo};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::mcp::tools::{Tool, ToolRegistry, ToolResponse};

/// JSON-RPC code for a body that is not a valid MCP message
const PARSE_ERROR: i32 = -32700;

/// JSON-RPC code for failures inside the server
const INTERNAL_ERROR: i32 = -32603;

/// The Readwise Reader MCP server
#[derive(Debug, Clone)]
pub struct McpServer {
    protocol: Arc<ReaderProtocol>,
}

impl McpServer {
    /// Create a server exposing every tool of `tools`
    pub fn new(tools: &ToolRegistry) -> Result<Self, pmcp::Error> {
        let mut builder = ServerCoreBuilder::new()
            .name("readwise-reader")
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::tools_only());

        for tool in tools.all() {
            let wrapper = ToolWrapper::from(tool);
            builder = builder.tool(wrapper.name.clone(), wrapper);
        }

        Ok(Self {
            protocol: Arc::new(ReaderProtocol {
                core: builder.build()?,
                tools: tools.clone(),
            }),
        })
    }

    /// Serve over stdio until the client disconnects
    pub async fn run(self) -> Result<(), pmcp::Error> {
        tracing::info!("Starting MCP server in stdio mode");
        StdioAdapter::new().serve(self.protocol).await
    }

    /// Serve JSON-RPC over HTTP POST on `addr`
    pub async fn run_http(&self, addr: &str) -> Result<(SocketAddr, JoinHandle<()>), pmcp::Error> {
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::invalid_params(format!("Invalid address: {}", e)))?;

        let app = Router::new()
            .route("/", post(handle_post))
            .with_state(self.protocol.clone());

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Starting MCP server in HTTP mode on {}", local_addr);

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {}", e);
            }
        });

        Ok((local_addr, task))
    }
}

/// Routes `tools/call` to the registry and everything else to pmcp's core
struct ReaderProtocol {
    core: ServerCore,
    tools: ToolRegistry,
}

impl std::fmt::Debug for ReaderProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderProtocol")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl ReaderProtocol {
    async fn call_tool(&self, id: RequestId, call: &CallToolRequest) -> JSONRPCResponse {
        let args = match &call.arguments {
            Value::Null => json!({}),
            args => args.clone(),
        };
        let response = self.tools.call(&call.name, args).await;

        match serde_json::to_value(tool_result(response)) {
            Ok(result) => JSONRPCResponse::success(id, result),
            Err(e) => JSONRPCResponse::error(id, JSONRPCError::new(INTERNAL_ERROR, e.to_string())),
        }
    }
}

#[async_trait]
impl ProtocolHandler for ReaderProtocol {
    async fn handle_request(
        &self,
        id: RequestId,
        request: Request,
        auth_context: Option<AuthContext>,
    ) -> JSONRPCResponse {
        if let Request::Client(client) = &request {
            if let ClientRequest::CallTool(call) = client.as_ref() {
                return self.call_tool(id, call).await;
            }
        }
        self.core.handle_request(id, request, auth_context).await
    }

    async fn handle_notification(&self, notification: Notification) -> pmcp::Result<()> {
        self.core.handle_notification(notification).await
    }

    fn capabilities(&self) -> &ServerCapabilities {
        self.core.capabilities()
    }

    fn info(&self) -> &Implementation {
        self.core.info()
    }
}

/// One text block carrying the tool's output, flagged when it failed
fn tool_result(response: ToolResponse) -> CallToolResult {
    CallToolResult {
        content: vec![Content::Text {
            text: response.text,
        }],
        is_error: response.is_error,
        ..Default::default()
    }
}

async fn handle_post(State(protocol): State<Arc<ReaderProtocol>>, body: Bytes) -> Response {
    let message = match StdioTransport::parse_message(&body) {
        Ok(message) => message,
        Err(e) => {
            let error = json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": PARSE_ERROR, "message": e.to_string()}
            });
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    match message {
        TransportMessage::Request { id, request } => {
            Json(protocol.handle_request(id, request, None).await).into_response()
        }
        TransportMessage::Notification(notification) => {
            if let Err(e) = protocol.handle_notification(notification).await {
                tracing::warn!("Notification failed: {}", e);
            }
            StatusCode::ACCEPTED.into_response()
        }
        TransportMessage::Response(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Publishes a registry [`Tool`] in `tools/list`
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: String,
    input_schema: Value,
}

impl From<&Tool> for ToolWrapper {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    // tools/call never reaches the core; ReaderProtocol answers it.
    async fn handle(&self, _args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        Err(Error::internal(format!(
            "Tool {} is dispatched by the Reader protocol handler",
            self.name
        )))
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            Some(self.description.clone()),
            self.input_schema.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_a_single_raw_text_block() {
        let result = tool_result(ToolResponse::success("Available tags:\n- rust".to_string()));
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(
            value["content"],
            json!([{"type": "text", "text": "Available tags:\n- rust"}])
        );
        assert_eq!(value["isError"], false);
    }

    #[test]
    fn test_failure_sets_is_error() {
        let result = tool_result(ToolResponse::error("Document not found"));
        assert!(result.is_error);
        match &result.content[..] {
            [Content::Text { text }] => assert_eq!(text, "Error: Document not found"),
            other => panic!("unexpected content: {:?}", other),
        }
    }
}

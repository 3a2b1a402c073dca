//! MCP Server implementation
//!
//! The JSON-RPC dispatcher: decodes an envelope, routes it by method and
//! produces exactly one reply envelope carrying the request's `id`.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{ProtocolError, ToolError};
use crate::mcp::registry::ToolRegistry;
use crate::mcp::types::*;

/// Dispatcher outcome for a single method
type HandlerResult = std::result::Result<Value, ProtocolError>;

/// MCP server
///
/// Holds no per-connection state; one instance is shared by every request.
#[derive(Debug)]
pub struct McpServer {
    /// Tool registry, read-only after startup
    registry: Arc<ToolRegistry>,

    /// Identity advertised in `initialize` and the SSE announcement
    identity: ServerInfo,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(registry: Arc<ToolRegistry>, identity: ServerInfo) -> Self {
        Self { registry, identity }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn identity(&self) -> &ServerInfo {
        &self.identity
    }

    /// Notification pushed once to every SSE client
    pub fn announcement(&self) -> JsonRpcNotification {
        JsonRpcNotification::new(
            methods::ANNOUNCE,
            json!({
                "protocolVersion": MCP_VERSION,
                "capabilities": ServerCapabilities {
                    tools: Some(ToolsCapability {}),
                },
                "serverInfo": self.identity,
            }),
        )
    }

    /// Handle an already-parsed JSON body
    ///
    /// Envelopes that do not decode still get an error reply, with the `id`
    /// echoed when one can be recovered.
    pub async fn handle_value(&self, message: Value) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_value(message.clone()) {
            Ok(req) => req,
            Err(e) => {
                let id = recover_id(&message);
                tracing::debug!(error = %e, "Malformed JSON-RPC envelope");
                return JsonRpcResponse::error(
                    id,
                    ProtocolError::InvalidRequest {
                        message: e.to_string(),
                    }
                    .to_jsonrpc(),
                );
            }
        };

        self.dispatch(request).await
    }

    /// Route a decoded request to its handler
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let Some(method) = Method::parse(&request.method) else {
            tracing::debug!(method = %request.method, "Unknown method");
            return JsonRpcResponse::error(
                request.id,
                ProtocolError::MethodNotFound {
                    method: request.method,
                }
                .to_jsonrpc(),
            );
        };

        let outcome = match method {
            Method::Initialize => self.handle_initialize(request.params),
            Method::NotificationsInitialized => Ok(json!({})),
            Method::NotificationsCancelled => self.handle_cancelled(request.params),
            Method::ToolsList => self.handle_list_tools(),
            Method::ToolsCall => self.handle_call_tool(request.params).await,
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(err) => {
                tracing::warn!(method = method.as_str(), error = %err, "Request failed");
                JsonRpcResponse::error(request.id, err.into())
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> HandlerResult {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p).unwrap_or_default(),
            None => InitializeParams::default(),
        };

        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| Value::String(MCP_VERSION.to_string())),
            capabilities: ServerCapabilities::default(),
            server_info: self.identity.clone(),
        };

        serde_json::to_value(result).map_err(internal)
    }

    /// Handle a cancellation notice; in-flight calls always run to completion
    fn handle_cancelled(&self, params: Option<Value>) -> HandlerResult {
        let params: CancelledParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        tracing::debug!(
            request_id = ?params.request_id,
            reason = params.reason.as_deref().unwrap_or(""),
            "Cancellation acknowledged"
        );

        Ok(json!({}))
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> HandlerResult {
        let result = ListToolsResult {
            tools: self.registry.list().to_vec(),
        };

        serde_json::to_value(result).map_err(internal)
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, params: Option<Value>) -> HandlerResult {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| ProtocolError::InvalidParams {
                message: format!("Invalid tool parameters: {}", e),
            })?,
            None => {
                return Err(ProtocolError::InvalidParams {
                    message: "Missing tool parameters".to_string(),
                })
            }
        };

        let tool = self
            .registry
            .find(&params.name)
            .ok_or_else(|| ProtocolError::UnknownTool {
                name: params.name.clone(),
            })?;

        tracing::info!(tool = %params.name, "Calling tool");

        // Run on its own task so a panicking tool surfaces as an error reply.
        let arguments = params.arguments;
        let outcome = tokio::spawn(async move { tool.call(arguments).await }).await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(ToolError::InvalidArguments { message })) => {
                return Err(ProtocolError::InvalidParams {
                    message: format!("{}: {}", params.name, message),
                })
            }
            Ok(Err(e)) => {
                return Err(ProtocolError::ToolFailed {
                    name: params.name,
                    message: e.to_string(),
                })
            }
            Err(join_err) => {
                return Err(ProtocolError::ToolFailed {
                    name: params.name,
                    message: if join_err.is_panic() {
                        "tool panicked".to_string()
                    } else {
                        join_err.to_string()
                    },
                })
            }
        };

        serde_json::to_value(result).map_err(internal)
    }
}

fn internal(e: serde_json::Error) -> ProtocolError {
    ProtocolError::Internal {
        message: e.to_string(),
    }
}

/// Best-effort `id` extraction from an envelope that failed to decode
fn recover_id(message: &Value) -> Option<RequestId> {
    message
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::registry::Tool;

    struct Boom;

    #[async_trait::async_trait]
    impl Tool for Boom {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "boom".to_string(),
                description: "always fails".to_string(),
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            }
        }

        async fn call(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
            Err(ToolError::io(
                "state.db",
                std::io::Error::new(std::io::ErrorKind::Other, "nothing works"),
            ))
        }
    }

    struct Panics;

    #[async_trait::async_trait]
    impl Tool for Panics {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "panics".to_string(),
                description: "panics".to_string(),
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            }
        }

        async fn call(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
            panic!("tool bug")
        }
    }

    struct Strict;

    #[async_trait::async_trait]
    impl Tool for Strict {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "strict".to_string(),
                description: "rejects every argument shape".to_string(),
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            }
        }

        async fn call(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
            Err(ToolError::invalid_arguments("expected an object"))
        }
    }

    fn server() -> McpServer {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(Boom), Arc::new(Panics), Arc::new(Strict)];
        let registry = ToolRegistry::new(tools).unwrap();
        McpServer::new(
            Arc::new(registry),
            ServerInfo {
                name: "test-server".to_string(),
                version: "9.9.9".to_string(),
            },
        )
    }

    async fn call(server: &McpServer, body: Value) -> Value {
        serde_json::to_value(server.handle_value(body).await).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let reply = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
                   "params": {"protocolVersion": "1999-01-01"}}),
        )
        .await;

        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["protocolVersion"], "1999-01-01");
        assert_eq!(reply["result"]["capabilities"], json!({}));
        assert_eq!(reply["result"]["serverInfo"]["name"], "test-server");
        assert_eq!(reply["result"]["serverInfo"]["version"], "9.9.9");
    }

    #[tokio::test]
    async fn test_initialize_without_params() {
        let reply = call(&server(), json!({"jsonrpc": "2.0", "id": 2, "method": "initialize"})).await;
        assert_eq!(reply["result"]["protocolVersion"], MCP_VERSION);
    }

    #[tokio::test]
    async fn test_initialize_echoes_null_protocol_version() {
        let reply = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 3, "method": "initialize",
                   "params": {"protocolVersion": null}}),
        )
        .await;
        assert!(reply["result"]
            .as_object()
            .unwrap()
            .contains_key("protocolVersion"));
        assert_eq!(reply["result"]["protocolVersion"], Value::Null);
    }

    #[tokio::test]
    async fn test_notifications_get_empty_result() {
        let server = server();
        for method in ["notifications/initialized", "notifications/cancelled"] {
            let reply = call(
                &server,
                json!({"jsonrpc": "2.0", "id": "n", "method": method,
                       "params": {"requestId": 4, "reason": "user"}}),
            )
            .await;
            assert_eq!(reply["result"], json!({}), "{}", method);
            assert!(reply.get("error").is_none());
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let reply = call(&server(), json!({"jsonrpc": "2.0", "id": 3, "method": "foo/bar"})).await;
        assert_eq!(reply["id"], 3);
        assert_eq!(reply["error"], json!({"code": -32601, "message": "Method not found"}));
        assert!(reply.get("result").is_none());
    }

    #[tokio::test]
    async fn test_missing_method_is_invalid_request() {
        let reply = call(&server(), json!({"jsonrpc": "2.0", "id": "abc"})).await;
        assert_eq!(reply["id"], "abc");
        assert_eq!(reply["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_non_object_body() {
        let reply = call(&server(), json!([1, 2, 3])).await;
        assert!(reply.get("id").is_none());
        assert_eq!(reply["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_structured_error() {
        let reply = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call",
                   "params": {"name": "missing", "arguments": {}}}),
        )
        .await;
        assert_eq!(reply["id"], 5);
        assert_eq!(reply["error"]["code"], -32601);
        assert!(reply["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_tool_failure_is_error_reply() {
        let reply = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call",
                   "params": {"name": "boom"}}),
        )
        .await;
        assert_eq!(reply["error"]["code"], -32603);
        assert!(reply["error"]["message"]
            .as_str()
            .unwrap()
            .contains("nothing works"));
    }

    #[tokio::test]
    async fn test_bad_tool_arguments_are_invalid_params() {
        let reply = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 10, "method": "tools/call",
                   "params": {"name": "strict", "arguments": "x"}}),
        )
        .await;
        assert_eq!(reply["id"], 10);
        assert_eq!(reply["error"]["code"], -32602);
        assert!(reply["error"]["message"]
            .as_str()
            .unwrap()
            .contains("expected an object"));
    }

    #[tokio::test]
    async fn test_tool_panic_is_contained() {
        let server = server();
        let reply = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                   "params": {"name": "panics", "arguments": {}}}),
        )
        .await;
        assert_eq!(reply["id"], 7);
        assert_eq!(reply["error"]["code"], -32603);

        // The dispatcher keeps serving afterwards.
        let reply = call(&server, json!({"jsonrpc": "2.0", "id": 8, "method": "tools/list"})).await;
        assert_eq!(reply["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_call_without_params() {
        let reply = call(&server(), json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call"})).await;
        assert_eq!(reply["error"]["code"], -32602);
    }

    #[test]
    fn test_announcement_matches_identity() {
        let server = server();
        let value = serde_json::to_value(server.announcement()).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "initialized");
        assert_eq!(value["params"]["capabilities"], json!({"tools": {}}));
        assert_eq!(
            value["params"]["serverInfo"],
            serde_json::to_value(server.identity()).unwrap()
        );
    }
}

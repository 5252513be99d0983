use crate::{
    errors::AppError,
    mcp::{
        registry::ToolRegistry,
        types::{
            CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
            ServerInfo, ToolResponse, DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION,
        },
    },
};
use serde_json::{json, Map, Value};
use std::time::Instant;

/// Routes tool calls by name. Holds no per-request state.
pub struct Dispatcher {
    registry: ToolRegistry,
    server_info: ServerInfo,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, server_info: ServerInfo) -> Self {
        Self { registry, server_info }
    }

    pub fn list_tools(&self) -> ListToolsResult {
        ListToolsResult { tools: self.registry.list_all().into_iter().cloned().collect() }
    }

    /// Missing arguments are rejected before the name is resolved; any
    /// handler failure becomes an internal error naming the tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<ToolResponse, AppError> {
        let Some(args) = arguments else {
            return Err(AppError::InvalidParams("Missing arguments".into()));
        };
        let Some(entry) = self.registry.lookup(name) else {
            let err = AppError::unknown_tool(name);
            audit(name, "deny", err.kind(), 0);
            return Err(err);
        };

        let started = Instant::now();
        match entry.handler.handle(args).await {
            Ok(response) => {
                audit(name, "allow", "OK", started.elapsed().as_millis() as u64);
                Ok(response)
            }
            Err(e) => {
                let err = AppError::tool_failed(name, &e);
                tracing::warn!(tool = name, error = %e, "tool call failed");
                audit(name, "error", err.kind(), started.elapsed().as_millis() as u64);
                Err(err)
            }
        }
    }

    /// Returns `None` for notifications.
    pub async fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = req.id else {
            tracing::debug!(method = %req.method, "notification");
            return None;
        };
        if req.jsonrpc != JSONRPC_VERSION {
            let err = AppError::InvalidRequest(format!("unsupported jsonrpc version: {:?}", req.jsonrpc));
            return Some(JsonRpcResponse::failure(id, err.to_error_obj()));
        }

        let outcome = match req.method.as_str() {
            "initialize" => self.initialize(req.params.as_ref()),
            "ping" => Ok(json!({})),
            "tools/list" => to_result(&self.list_tools()),
            "tools/call" => self.tools_call(req.params).await,
            other => Err(AppError::MethodNotFound(format!("Method not found: {other}"))),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e.to_error_obj()),
        })
    }

    /// One raw JSON-RPC message in, one serialized response (if any) out.
    pub async fn handle_line(&self, raw: &str) -> Option<String> {
        match serde_json::from_str::<JsonRpcRequest>(raw) {
            Ok(req) => encode(&self.handle(req).await?),
            Err(e) => self.parse_error(&e),
        }
    }

    /// Reply for a message that could not be read at all; its id is unknown.
    pub fn parse_error(&self, detail: &dyn std::fmt::Display) -> Option<String> {
        let err = AppError::ParseError(format!("Parse error: {detail}"));
        encode(&JsonRpcResponse::failure(Value::Null, err.to_error_obj()))
    }

    fn initialize(&self, params: Option<&Value>) -> Result<Value, AppError> {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_PROTOCOL_VERSION)
            .to_string();
        to_result(&InitializeResult {
            protocol_version,
            capabilities: json!({"tools": {}}),
            server_info: self.server_info.clone(),
        })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, AppError> {
        let params = params.ok_or_else(|| AppError::InvalidParams("Missing params".into()))?;
        let call: CallToolParams = serde_json::from_value(params)
            .map_err(|e| AppError::InvalidParams(format!("Invalid tool call params: {e}")))?;
        let response = self.call_tool(&call.name, call.arguments.as_ref()).await?;
        to_result(&response)
    }
}

fn encode(response: &JsonRpcResponse) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            None
        }
    }
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn audit(tool: &str, decision: &str, code: &str, duration_ms: u64) {
    tracing::info!(
        tool = tool,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        "audit"
    );
}

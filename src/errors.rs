use axum::{http::StatusCode, Json};
use thiserror::Error;

use crate::mcp::types::ErrorObj;

/// Protocol-level failures returned to whoever sent the request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ParseError(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    MethodNotFound(String),
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    Internal(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("origin denied")]
    OriginDenied,
    #[error("request too large")]
    RequestTooLarge,
}

impl AppError {
    pub fn unknown_tool(name: &str) -> Self {
        AppError::MethodNotFound(format!("Unknown tool: {name}"))
    }

    pub fn tool_failed(name: &str, err: &ToolError) -> Self {
        AppError::Internal(format!("Error executing {name}: {err}"))
    }

    /// JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            AppError::ParseError(_) => -32700,
            AppError::InvalidRequest(_) => -32600,
            AppError::MethodNotFound(_) => -32601,
            AppError::InvalidParams(_) => -32602,
            AppError::Internal(_) => -32603,
            AppError::Unauthorized => -32001,
            AppError::OriginDenied => -32002,
            AppError::RequestTooLarge => -32003,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ParseError(_) => "ParseError",
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::MethodNotFound(_) => "MethodNotFound",
            AppError::InvalidParams(_) => "InvalidParams",
            AppError::Internal(_) => "InternalError",
            AppError::Unauthorized => "Unauthorized",
            AppError::OriginDenied => "OriginDenied",
            AppError::RequestTooLarge => "RequestTooLarge",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::OriginDenied => StatusCode::FORBIDDEN,
            AppError::RequestTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MethodNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ParseError(_) | AppError::InvalidRequest(_) | AppError::InvalidParams(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_obj(&self) -> ErrorObj {
        ErrorObj { code: self.code(), message: self.to_string() }
    }
}

pub fn into_response(err: AppError) -> (StatusCode, Json<ErrorObj>) {
    (err.status(), Json(err.to_error_obj()))
}

/// Failure inside a single tool handler.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Service(#[from] NotionError),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure reported by the remote Notion API or the transport to it.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("{message}")]
    Api { status: u16, code: String, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

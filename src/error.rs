//! Error types for the MCP tool server
//!
//! This module defines the error hierarchy for startup, tool execution and
//! JSON-RPC dispatch.

use thiserror::Error;

use crate::mcp::types::JsonRpcError;

/// Main error type for the MCP tool server
#[derive(Error, Debug)]
pub enum McpToolServerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool registry construction errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O errors (listener bind, serve loop)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },

    #[error("Working directory does not exist or is not a directory: {path}")]
    InvalidWorkdir { path: String },

    #[error("Cannot determine process working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Invalid listen address: {address}")]
    InvalidAddress { address: String },
}

/// Tool registry construction errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool registered twice: {name}")]
    DuplicateTool { name: String },

    #[error("Tool name must not be empty")]
    EmptyName,
}

/// Errors raised by a tool capability while executing
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Build an argument error from a deserialization failure
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced to a JSON-RPC caller
///
/// Every variant maps onto exactly one JSON-RPC error object; none of them
/// is fatal to the server.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Invalid Request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found")]
    MethodNotFound { method: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Tool not found: {name}")]
    UnknownTool { name: String },

    #[error("Tool '{name}' failed: {message}")]
    ToolFailed { name: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProtocolError {
    /// JSON-RPC error code for this failure
    pub fn code(&self) -> i32 {
        match self {
            ProtocolError::Parse { .. } => JsonRpcError::PARSE_ERROR,
            ProtocolError::InvalidRequest { .. } => JsonRpcError::INVALID_REQUEST,
            ProtocolError::MethodNotFound { .. } => JsonRpcError::METHOD_NOT_FOUND,
            ProtocolError::InvalidParams { .. } => JsonRpcError::INVALID_PARAMS,
            ProtocolError::UnknownTool { .. } => JsonRpcError::METHOD_NOT_FOUND,
            ProtocolError::ToolFailed { .. } | ProtocolError::Internal { .. } => {
                JsonRpcError::INTERNAL_ERROR
            }
        }
    }

    /// Convert into the wire error object
    pub fn to_jsonrpc(&self) -> JsonRpcError {
        JsonRpcError::new(self.code(), self.to_string())
    }
}

impl From<ProtocolError> for JsonRpcError {
    fn from(err: ProtocolError) -> Self {
        err.to_jsonrpc()
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, McpToolServerError>;

//! MCP Tool Server Library
//!
//! A Model Context Protocol (MCP) server exposing a registry of tools over a
//! single HTTP endpoint: server-sent events announce the server, JSON-RPC
//! over POST lists and invokes tools.

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;

pub use config::Config;
pub use error::{McpToolServerError, Result};

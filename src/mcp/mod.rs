//! MCP (Model Context Protocol) module
//!
//! Protocol types, the tool registry, the JSON-RPC dispatcher and the HTTP
//! transport that fronts it.

pub mod registry;
pub mod server;
pub mod transport;
pub mod types;

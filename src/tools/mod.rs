//! Built-in tool capabilities
//!
//! Filesystem tools operate inside the working directory they are
//! constructed with; they never consult the process working directory.

pub mod fs;
pub mod weather;

pub use fs::{CreateFolderTool, CwdTool, ListFolderTool, WriteFileTool};
pub use weather::WeatherTool;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ToolError;

/// Deserialize a tool's `arguments` object into its typed form
///
/// A missing or `null` arguments value is read as an empty object.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

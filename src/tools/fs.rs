//! Filesystem tools
//!
//! All paths are relative to the tool's working directory. Absolute paths
//! and `..` components are refused so a caller cannot leave that directory.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::mcp::registry::{json_schema_object, json_schema_string, Tool};
use crate::mcp::types::{ToolDescriptor, ToolResult};
use crate::tools::parse_args;

/// Join a caller-supplied relative path onto `root`
fn resolve(root: &Path, relative: &str) -> Result<PathBuf, ToolError> {
    let invalid = |reason: &str| ToolError::InvalidPath {
        path: relative.to_string(),
        reason: reason.to_string(),
    };

    if relative.trim().is_empty() {
        return Err(invalid("path is empty"));
    }

    let candidate = Path::new(relative);
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("parent directory components are not allowed")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute paths are not allowed"))
            }
        }
    }

    Ok(root.join(candidate))
}

/// `cwd`: report the working directory the tools operate in
#[derive(Debug)]
pub struct CwdTool {
    workdir: PathBuf,
}

impl CwdTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

#[async_trait::async_trait]
impl Tool for CwdTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cwd".to_string(),
            description: "Get the current working directory of the server".to_string(),
            input_schema: json_schema_object(json!({}), &[]),
        }
    }

    async fn call(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::text(self.workdir.display().to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderArgs {
    folder_name: String,
}

/// `create folder`: create a folder, reporting if it was already there
#[derive(Debug)]
pub struct CreateFolderTool {
    workdir: PathBuf,
}

impl CreateFolderTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

#[async_trait::async_trait]
impl Tool for CreateFolderTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create folder".to_string(),
            description: "Create a folder in the working directory".to_string(),
            input_schema: json_schema_object(
                json!({
                    "folderName": json_schema_string("Name of the folder to create (relative path)")
                }),
                &["folderName"],
            ),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: CreateFolderArgs = parse_args(arguments)?;
        let path = resolve(&self.workdir, &args.folder_name)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                return Ok(ToolResult::text(format!(
                    "Folder '{}' already exists.",
                    args.folder_name
                )));
            }
            Ok(_) => {
                return Err(ToolError::InvalidPath {
                    path: args.folder_name,
                    reason: "a file with this name already exists".to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ToolError::io(args.folder_name, e)),
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ToolError::io(args.folder_name.clone(), e))?;

        tracing::info!(folder = %path.display(), "Folder created");
        Ok(ToolResult::text(format!(
            "Folder '{}' created successfully.",
            args.folder_name
        )))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteFileArgs {
    file_name: String,
    content: String,
}

/// `write file`: write text content to a file, replacing any previous content
#[derive(Debug)]
pub struct WriteFileTool {
    workdir: PathBuf,
}

impl WriteFileTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "write file".to_string(),
            description: "Write text content to a file in the working directory".to_string(),
            input_schema: json_schema_object(
                json!({
                    "fileName": json_schema_string("Name of the file to write (relative path)"),
                    "content": json_schema_string("Text content to write")
                }),
                &["fileName", "content"],
            ),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: WriteFileArgs = parse_args(arguments)?;
        let path = resolve(&self.workdir, &args.file_name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io(args.file_name.clone(), e))?;
        }

        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .map_err(|e| ToolError::io(args.file_name.clone(), e))?;

        tracing::info!(file = %path.display(), bytes = args.content.len(), "File written");
        Ok(ToolResult::text(format!(
            "File '{}' written successfully.",
            args.file_name
        )))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFolderArgs {
    #[serde(default)]
    folder_name: Option<String>,
}

/// `list folder`: list the entries of a folder
#[derive(Debug)]
pub struct ListFolderTool {
    workdir: PathBuf,
}

impl ListFolderTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

#[async_trait::async_trait]
impl Tool for ListFolderTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "list folder".to_string(),
            description: "List the contents of a folder in the working directory".to_string(),
            input_schema: json_schema_object(
                json!({
                    "folderName": json_schema_string("Folder to list (relative path, defaults to the working directory)")
                }),
                &[],
            ),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: ListFolderArgs = parse_args(arguments)?;
        let folder_name = args.folder_name.unwrap_or_else(|| ".".to_string());
        let path = resolve(&self.workdir, &folder_name)?;

        let mut dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::io(folder_name.clone(), e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::io(folder_name.clone(), e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            entries.push(format!("{}{}", name, if is_dir { "/" } else { "" }));
        }
        entries.sort();

        if entries.is_empty() {
            return Ok(ToolResult::text(format!("Folder '{}' is empty.", folder_name)));
        }

        Ok(ToolResult::text(format!(
            "Folder '{}' ({} items):\n{}",
            folder_name,
            entries.len(),
            entries.join("\n")
        )))
    }
}

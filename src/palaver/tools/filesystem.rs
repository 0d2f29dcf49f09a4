//! Sandboxed file system tool.
//!
//! All operations are confined to a root directory fixed at construction.
//! Paths are validated before use: absolute paths and any `..` component
//! are rejected, so the model cannot escape the sandbox regardless of what
//! arguments it produces.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

/// Errors from file system operations.
#[derive(Debug, Clone)]
pub enum FileSystemError {
    /// Path escapes the sandbox root.
    PathTraversal(String),
    NotFound(String),
    NotADirectory(String),
    IsADirectory(String),
    Io(String),
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::PathTraversal(path) => {
                write!(f, "path escapes the sandbox root: {}", path)
            }
            FileSystemError::NotFound(path) => write!(f, "not found: {}", path),
            FileSystemError::NotADirectory(path) => write!(f, "not a directory: {}", path),
            FileSystemError::IsADirectory(path) => write!(f, "is a directory: {}", path),
            FileSystemError::Io(message) => write!(f, "io error: {}", message),
        }
    }
}

impl StdError for FileSystemError {}

/// Sandboxed read/write/list operations under a root directory.
pub struct FileSystemTool {
    root: PathBuf,
}

impl FileSystemTool {
    /// Create a tool confined to `root`. The directory must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemTool { root: root.into() }
    }

    pub fn schema() -> Tool {
        build_tool(
            "filesystem",
            "Read, write, or list files inside the workspace directory.",
            vec![
                ToolParameter::new(
                    "operation",
                    ToolParameterType::String,
                    "One of \"read\", \"write\", or \"list\"",
                )
                .required(),
                ToolParameter::new(
                    "path",
                    ToolParameterType::String,
                    "Path relative to the workspace root",
                )
                .required(),
                ToolParameter::new(
                    "content",
                    ToolParameterType::String,
                    "Content to write (write operation only)",
                ),
            ],
        )
    }

    /// Validate a relative path and resolve it under the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, FileSystemError> {
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(FileSystemError::PathTraversal(path.to_string())),
            }
        }
        Ok(self.root.join(relative))
    }

    pub fn read_file(&self, path: &str) -> Result<String, FileSystemError> {
        let resolved = self.resolve(path)?;
        if resolved.is_dir() {
            return Err(FileSystemError::IsADirectory(path.to_string()));
        }
        if !resolved.exists() {
            return Err(FileSystemError::NotFound(path.to_string()));
        }
        fs::read_to_string(&resolved).map_err(|err| FileSystemError::Io(err.to_string()))
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<(), FileSystemError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).map_err(|err| FileSystemError::Io(err.to_string()))?;
        }
        fs::write(&resolved, content).map_err(|err| FileSystemError::Io(err.to_string()))
    }

    /// List a directory's entries, one `name` or `name/` per line.
    pub fn list_directory(&self, path: &str) -> Result<Vec<String>, FileSystemError> {
        let resolved = self.resolve(path)?;
        if !resolved.exists() {
            return Err(FileSystemError::NotFound(path.to_string()));
        }
        if !resolved.is_dir() {
            return Err(FileSystemError::NotADirectory(path.to_string()));
        }
        let mut entries = Vec::new();
        let listing =
            fs::read_dir(&resolved).map_err(|err| FileSystemError::Io(err.to_string()))?;
        for entry in listing {
            let entry = entry.map_err(|err| FileSystemError::Io(err.to_string()))?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();
        Ok(entries)
    }
}

#[async_trait]
impl ToolHandler for FileSystemTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let operation = parsed
            .get("operation")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        let path = parsed
            .get("path")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        if path.is_empty() {
            return Ok("Error: missing required parameter 'path'.".to_string());
        }

        let outcome = match operation {
            "read" => self.read_file(path),
            "write" => {
                let content = parsed
                    .get("content")
                    .and_then(|value| value.as_str())
                    .unwrap_or_default();
                self.write_file(path, content)
                    .map(|_| format!("Wrote {} bytes to {}", content.len(), path))
            }
            "list" => self.list_directory(path).map(|entries| entries.join("\n")),
            other => return Ok(format!("Error: unknown operation '{}'.", other)),
        };

        match outcome {
            Ok(result) => Ok(result),
            Err(err) => Ok(format!("Error: {}", err)),
        }
    }
}

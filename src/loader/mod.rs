//! Data loader module
//!
//! Resolves the dinners file location, reads it, parses it as JSON, and hands
//! the result to the caller. Every call starts from scratch: the location is
//! recomputed, the file is read once, and nothing is kept afterwards.

mod error;
pub mod schema;

pub use error::{LoadError, LoadErrorKind, LoadResult};
pub use schema::{Dinner, SchemaMode};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Default offset of the data file from the base directory
pub const DEFAULT_RELATIVE_PATH: &str = "../dinners.json";

/// Directory the relative offset is resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseDir {
    /// Process working directory, read at call time
    CurrentDir,
    /// Explicit directory, independent of process state
    Fixed(PathBuf),
}

/// Value handed to the page renderer: `{ "dinners": <parsed data> }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageData {
    pub dinners: Value,
}

/// Loads the dinners file on demand
#[derive(Debug, Clone)]
pub struct DataLoader {
    base_dir: BaseDir,
    relative_path: PathBuf,
    schema: SchemaMode,
}

impl DataLoader {
    pub fn new(base_dir: BaseDir, relative_path: impl Into<PathBuf>, schema: SchemaMode) -> Self {
        Self {
            base_dir,
            relative_path: relative_path.into(),
            schema,
        }
    }

    /// Loader with the default offset resolved against `base_dir`
    pub fn with_base_dir(base_dir: BaseDir) -> Self {
        Self::new(base_dir, DEFAULT_RELATIVE_PATH, SchemaMode::Passthrough)
    }

    pub const fn schema(&self) -> SchemaMode {
        self.schema
    }

    /// File name used in the public failure message
    pub fn file_name(&self) -> String {
        self.relative_path.file_name().map_or_else(
            || self.relative_path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Resolve the data file location
    ///
    /// Recomputed on every call; with `BaseDir::CurrentDir` the working
    /// directory is read each time.
    pub fn location(&self) -> std::io::Result<PathBuf> {
        let base = match &self.base_dir {
            BaseDir::CurrentDir => std::env::current_dir()?,
            BaseDir::Fixed(dir) if dir.is_absolute() => dir.clone(),
            BaseDir::Fixed(dir) => std::env::current_dir()?.join(dir),
        };
        Ok(normalize(&base.join(&self.relative_path)))
    }

    /// Whether a regular file currently exists at the location (no read, no parse)
    pub async fn is_available(&self) -> bool {
        match self.location() {
            Ok(path) => fs::metadata(&path).await.is_ok_and(|m| m.is_file()),
            Err(_) => false,
        }
    }

    /// Read and parse the data file
    pub async fn load(&self) -> LoadResult<PageData> {
        let file = self.file_name();

        let path = self.location().map_err(|source| LoadError::Read {
            file: file.clone(),
            path: self.relative_path.clone(),
            source,
        })?;

        // The handle is opened and closed inside `read` on every path
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(source) => return Err(LoadError::Read { file, path, source }),
        };

        let raw = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(source) => return Err(LoadError::Encoding { file, path, source }),
        };

        let dinners = match parse_json(&raw) {
            Ok(v) => v,
            Err(source) => return Err(LoadError::Syntax { file, path, source }),
        };

        if self.schema == SchemaMode::Strict {
            if let Err(source) = schema::validate(&dinners) {
                return Err(LoadError::Schema { file, path, source });
            }
        }

        Ok(PageData { dinners })
    }
}

/// Parse JSON text of any nesting depth
///
/// The recursion limit is off; deep documents grow the stack on the heap
/// instead of overflowing it.
fn parse_json(raw: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

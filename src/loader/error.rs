//! Load failure type
//!
//! Every failure of the data loader collapses into one public signal
//! (status 500 plus a fixed message) while keeping the underlying cause
//! reachable through `std::error::Error::source`.

use hyper::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Classification of a load failure, for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// File missing, permission denied, or any other read error
    Io,
    /// File content is not valid UTF-8 text
    Encoding,
    /// Text is not syntactically valid JSON (empty text included)
    Syntax,
    /// Valid JSON that does not match the dinner list shape (strict mode only)
    Schema,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Encoding => write!(f, "encoding"),
            Self::Syntax => write!(f, "syntax"),
            Self::Schema => write!(f, "schema mismatch"),
        }
    }
}

/// Uniform load failure
///
/// `Display` yields only the public message, so formatting the error for a
/// client never leaks file-system or parser details.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load {file}")]
    Read {
        file: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load {file}")]
    Encoding {
        file: String,
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to load {file}")]
    Syntax {
        file: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load {file}")]
    Schema {
        file: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Fixed classification exposed at the boundary
    pub const CLASSIFICATION: &'static str = "server error";

    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Read { .. } => LoadErrorKind::Io,
            Self::Encoding { .. } => LoadErrorKind::Encoding,
            Self::Syntax { .. } => LoadErrorKind::Syntax,
            Self::Schema { .. } => LoadErrorKind::Schema,
        }
    }

    /// Status reported to the consumer, always 500
    #[allow(clippy::unused_self)]
    pub const fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Resolved location the failing load attempted to read
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Encoding { path, .. }
            | Self::Syntax { path, .. }
            | Self::Schema { path, .. } => path,
        }
    }

    /// Public message, e.g. `Failed to load dinners.json`
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn read_error() -> LoadError {
        LoadError::Read {
            file: "dinners.json".to_string(),
            path: PathBuf::from("/srv/dinners.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        }
    }

    #[test]
    fn test_public_message_hides_cause() {
        let err = read_error();
        assert_eq!(err.message(), "Failed to load dinners.json");
        assert!(!err.to_string().contains("no such file"));
    }

    #[test]
    fn test_cause_is_chained() {
        let err = read_error();
        let source = err.source().expect("cause should be kept");
        assert_eq!(source.to_string(), "no such file");
        assert_eq!(err.kind(), LoadErrorKind::Io);
        assert_eq!(err.path(), std::path::Path::new("/srv/dinners.json"));
    }

    #[test]
    fn test_status_is_500() {
        let err = read_error();
        assert_eq!(err.status().as_u16(), 500);
        assert_eq!(LoadError::CLASSIFICATION, "server error");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(LoadErrorKind::Schema.to_string(), "schema mismatch");
        assert_eq!(LoadErrorKind::Syntax.to_string(), "syntax");
    }
}

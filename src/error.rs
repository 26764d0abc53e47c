//! Error types for document generation, loading and aggregation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by resource handler entry points.
///
/// `UnsupportedOperation` is the distinguished signal a handler uses to say
/// it does not implement an entry point. Every other variant is an ordinary
/// failure and says nothing about capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("resource does not support operation: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("object not found: {id}")]
    ObjectNotFound { id: String },

    #[error("cannot determine resource identity: {message}")]
    UnknownIdentity { message: String },

    #[error("{message}")]
    Failed { message: String },
}

impl HandlerError {
    /// Shorthand for the unsupported-operation signal.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Shorthand for an arbitrary handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns true if this is the unsupported-operation signal.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Errors while reading a specification document or catalog entry.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON in {origin}: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Fatal document-level errors: the run aborts and no output file is left behind.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize specification: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            OutputError::Serialize { .. } => 2,
            OutputError::CreateDir { .. } | OutputError::Write { .. } => 3,
        }
    }
}

/// Errors while scanning a resource catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        3
    }
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Catalog(e) => e.exit_code(),
            GenerateError::Output(e) => e.exit_code(),
        }
    }
}

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("cannot list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl AggregateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AggregateError::ReadDir { .. } => 3,
            AggregateError::Output(e) => e.exit_code(),
        }
    }
}

/// Single structural problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the offending value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_signal_is_distinguished() {
        assert!(HandlerError::unsupported("purge").is_unsupported());
        assert!(!HandlerError::failed("boom").is_unsupported());
        assert!(!HandlerError::ObjectNotFound { id: "x".into() }.is_unsupported());
    }

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("spec.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::InvalidJson {
            origin: "spec.json".into(),
            source,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn output_error_display() {
        let err = OutputError::Write {
            path: PathBuf::from("/out/openapi.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot write /out/openapi.json: denied");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn wrapped_errors_keep_exit_codes() {
        let err: GenerateError = CatalogError::ReadDir {
            path: PathBuf::from("target/classes"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AggregateError = OutputError::Serialize { source }.into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError {
            path: "/swagger".into(),
            message: "\"3.0\" is not \"2.0\"".into(),
        };
        assert_eq!(err.to_string(), "/swagger: \"3.0\" is not \"2.0\"");
    }

    #[test]
    fn handler_error_display() {
        assert_eq!(
            HandlerError::unsupported("delete").to_string(),
            "resource does not support operation: delete"
        );
    }
}

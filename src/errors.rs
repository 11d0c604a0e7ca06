// ABOUTME: Error types for the cursa application
// ABOUTME: Separates content errors, validation errors and internal faults

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`CursaError`], used by callers that need to tell
/// user-fixable problems apart from bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unreadable content, failed writes, failed uploads.
    Content,
    /// A precondition was not met before an operation started.
    Validation,
    /// Anything the pipeline does not anticipate.
    Fault,
}

#[derive(Error, Debug)]
pub enum CursaError {
    #[error("Error opening file at {}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating file {}", path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating directory at {}", path.display())]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error copying file {} to {}", from.display(), to.display())]
    CopyError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error deleting file {}", path.display())]
    DeleteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading YAML file at {}: {source}", path.display())]
    MetadataError {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Unknown course section type '{0}' (expected Module, Topic or Lab)")]
    UnknownNodeType(String),

    #[error("PDF generation error for {}: {message}", path.display())]
    PdfError { path: PathBuf, message: String },

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Connection failed")]
    ConnectionFailed,

    #[error("Connection timed out")]
    ConnectionTimedOut,

    #[error("Invalid HTTP response")]
    InvalidResponse,

    #[error("{0}")]
    ContentError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CursaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CursaError::ValidationError(_) => ErrorKind::Validation,
            CursaError::ConfigError(_) => ErrorKind::Fault,
            _ => ErrorKind::Content,
        }
    }

    pub fn is_content_error(&self) -> bool {
        self.kind() == ErrorKind::Content
    }

    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CursaError::FileReadError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CursaError::FileWriteError {
            path: path.into(),
            source,
        }
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for CursaError {
    fn from(err: zip::result::ZipError) -> Self {
        CursaError::ArchiveError(format!("ZIP operation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, CursaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let missing = CursaError::read(
            "/tmp/missing.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.is_content_error());
        assert_eq!(missing.to_string(), "Error opening file at /tmp/missing.md");

        let validation = CursaError::ValidationError("No course id value defined in lab1".into());
        assert!(validation.is_validation_error());
        assert!(!validation.is_content_error());

        assert_eq!(CursaError::ConnectionFailed.kind(), ErrorKind::Content);
        assert_eq!(
            CursaError::ConfigError("Invalid Moodle URL".into()).kind(),
            ErrorKind::Fault
        );
    }
}

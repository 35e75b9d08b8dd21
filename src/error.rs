//! Error types for artifact output and raw-log recovery.
//!
//! Config errors live in [`crate::config`] next to the loader; everything
//! that can go wrong between a meeting and the filesystem is here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing meeting artifacts to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Filesystem write or directory creation failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The derived artifact path escapes the configured log directory.
    #[error("derived path escapes the log directory: {}", .0.display())]
    PathTraversal(PathBuf),

    /// The raw log could not be serialized.
    #[error("failed to serialize raw log: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl WriteError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::PathTraversal(_) => "path_traversal",
            Self::Serialize(_) => "serialize",
        }
    }
}

/// Errors raised while loading a meeting back from its raw log.
#[derive(Debug, Error)]
pub enum RawLogError {
    /// The raw log could not be read.
    #[error("failed to read raw log {}: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The raw log is not a valid meeting serialization.
    #[error("failed to parse raw log {}: {source}", path.display())]
    Parse {
        /// Path of the malformed log.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl RawLogError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_codes() {
        let io = WriteError::Io {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(io.error_code(), "io");
        assert_eq!(
            WriteError::PathTraversal(PathBuf::from("../x")).error_code(),
            "path_traversal"
        );
    }

    #[test]
    fn test_write_error_display_includes_path() {
        let err = WriteError::Io {
            path: PathBuf::from("/var/meetings/dev.log.json"),
            source: std::io::Error::other("disk full"),
        };
        let text = err.to_string();
        assert!(text.contains("/var/meetings/dev.log.json"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn test_raw_log_error_codes() {
        let err = RawLogError::Io {
            path: PathBuf::from("x.log.json"),
            source: std::io::Error::other("gone"),
        };
        assert_eq!(err.error_code(), "io");
    }
}

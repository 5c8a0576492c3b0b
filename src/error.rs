//! Error Taxonomy - Validation, Type Mismatch, I/O
//!
//! Every failure is reported once to the caller. Nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Type mismatch on {element}: expected {expected} material, found {found}")]
    TypeMismatch {
        element: String,
        expected: String,
        found: String,
    },

    #[error("Malformed fragment: {0}")]
    MalformedFragment(#[from] serde_json::Error),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification used by hosts to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    TypeMismatch,
    Io,
}

impl SceneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::Validation(_) | SceneError::MalformedFragment(_) => ErrorKind::Validation,
            SceneError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            SceneError::InvalidDestination(_) | SceneError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit code for command-line hosts (success is 0)
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::TypeMismatch => 1,
            ErrorKind::Io => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        assert_eq!(SceneError::Validation("empty".into()).exit_code(), 1);

        let mismatch = SceneError::TypeMismatch {
            element: "mesh0".into(),
            expected: "mesh".into(),
            found: "LineBasicMaterial".into(),
        };
        assert_eq!(mismatch.kind(), ErrorKind::TypeMismatch);
        assert_eq!(mismatch.exit_code(), 1);

        let io = SceneError::Io {
            path: PathBuf::from("/nope/scene.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(io.exit_code(), 2);
    }

    #[test]
    fn test_io_message_keeps_cause() {
        let io = SceneError::Io {
            path: PathBuf::from("out/scene.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let msg = io.to_string();
        assert!(msg.contains("out/scene.json"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_malformed_fragment_is_validation() {
        let err: SceneError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

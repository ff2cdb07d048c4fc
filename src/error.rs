//! Error types for Igloo
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Igloo operations
pub type IglooResult<T> = Result<T, IglooError>;

/// Main error type for Igloo operations
#[derive(Error, Debug)]
pub enum IglooError {
    /// Profile name could not be resolved against the store
    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String },

    /// Flags that cannot be combined in one invocation
    #[error("invalid flag combination: {message}")]
    InvalidCombination { message: String },

    /// Malformed remote url (expected user@host:path)
    #[error("invalid remote url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Selector expression failed to compile
    #[error("invalid filter expression '{expr}': {message}")]
    InvalidPattern { expr: String, message: String },

    /// Connection, auth or IO failure on the remote side of one file
    #[error("transfer failed for '{path}': {message}")]
    Transport { path: String, message: String },

    /// Cannot read or write a local file
    #[error("local IO error for '{path}': {source}")]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile file could not be parsed
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Profile file could not be serialized
    #[error("configuration write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl IglooError {
    /// Per-file transport failure with context
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Fatal flag-combination failure, reported before execution
    pub fn invalid_combination(message: impl Into<String>) -> Self {
        Self::InvalidCombination {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_profile_not_found() {
        let err = IglooError::ProfileNotFound {
            name: "public".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "profile 'public' not found in configuration"
        );
    }

    #[test]
    fn test_error_display_invalid_combination() {
        let err = IglooError::invalid_combination("--move is only valid with --remote");
        assert_eq!(
            err.to_string(),
            "invalid flag combination: --move is only valid with --remote"
        );
    }

    #[test]
    fn test_error_display_transport() {
        let err = IglooError::transport("a.txt", "connection reset");
        assert_eq!(
            err.to_string(),
            "transfer failed for 'a.txt': connection reset"
        );
    }
}

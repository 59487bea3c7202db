//! Error types for console operations

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::raster::TextureId;

/// Error returned by a user frame callback
pub type CallbackError = Box<dyn StdError + Send + Sync>;

/// Console error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The font file could not be opened (fatal at startup)
    #[error("Font not found: {}: {source}", path.display())]
    FontNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The font file was read but could not be parsed
    #[error("Font parse error: {0}")]
    FontParse(String),

    /// Window, surface or presentation failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// A draw call referenced a texture the surface does not own
    #[error("Unknown texture: {0:?}")]
    UnknownTexture(TextureId),

    /// The user callback failed; the frame loop has stopped
    #[error("Frame callback failed: {0}")]
    Callback(#[source] CallbackError),

    /// Invalid settings
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
    pub field: Option<String>,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Config error in '{}': {}", field, self.message)
        } else {
            write!(f, "Config error: {}", self.message)
        }
    }
}

impl StdError for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::for_field("fps", "must be at least 1");
        assert_eq!(err.to_string(), "Config error in 'fps': must be at least 1");

        let err = ConfigError::new("bad file");
        assert_eq!(err.to_string(), "Config error: bad file");
    }

    #[test]
    fn test_font_not_found_display() {
        let err = ConsoleError::FontNotFound {
            path: PathBuf::from("missing.ttf"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().starts_with("Font not found: missing.ttf"));
    }
}

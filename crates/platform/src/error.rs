//! Error types for ferry

use std::fmt;

/// Unified error type for all ferry operations
#[derive(Debug)]
pub enum FerryError {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Protocol error (malformed packet, unexpected message, unaccepted algorithm)
    Protocol(String),

    /// Authentication rejected (bad signature, key not authorized)
    Auth(String),

    /// Cryptographic error (unparsable key material, signing failure)
    Crypto(String),

    /// Other error
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for FerryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FerryError::Io(e) => write!(f, "IO error: {}", e),
            FerryError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FerryError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            FerryError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            FerryError::Crypto(msg) => write!(f, "Crypto error: {}", msg),
            FerryError::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for FerryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FerryError::Io(e) => Some(e),
            FerryError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err)
    }
}

/// Result type for ferry operations
pub type FerryResult<T> = Result<T, FerryError>;

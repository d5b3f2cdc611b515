use thiserror::Error;

use super::navigation::{FrameId, TabId};

// === OriginError ===

/// Errors raised while deriving an origin from a navigated URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    /// The URL could not be parsed at all.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The URL parsed, but its origin is opaque (`about:blank`, `data:`, ...).
    #[error("Opaque origin for URL: {0}")]
    OpaqueOrigin(String),
}

// === StorageError ===

/// Errors related to the durable key-value settings store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

// === InjectionError ===

/// Errors reported by the host when deploying a payload or stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The host refused to inject into the frame (restricted page, closed tab).
    #[error("Injection refused for tab {tab_id} frame {frame_id}: {reason}")]
    Refused {
        tab_id: TabId,
        frame_id: FrameId,
        reason: String,
    },
    /// The injection was attempted but failed.
    #[error("Injection failed: {0}")]
    Failed(String),
}

// === HostError ===

/// Errors related to tab queries and badge rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The tab does not exist (or no longer exists).
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
    /// The host facility could not be reached.
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

// === NeutralizeError ===

/// Errors raised while installing a single stand-in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NeutralizeError {
    /// The install target does not know the requested scope.
    #[error("Unsupported scope: {0}")]
    UnsupportedScope(String),
    /// The scope exists but lacks the requested member.
    #[error("Missing member: {0}")]
    MissingMember(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

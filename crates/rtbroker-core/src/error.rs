//! Shared error type across rtbroker crates.

use thiserror::Error;

/// Stable error codes (used as a structured log field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed envelope or nested payload.
    Decode,
    /// Outbound serialization failed.
    Encode,
    /// Requested object or route does not exist.
    NotFound,
    /// Privileged operation referenced an unknown database.
    UnknownTarget,
    /// Storage collaborator rejected the operation.
    Storage,
    /// Transport read/write failed.
    Transport,
    /// A deadline elapsed.
    Timeout,
    /// Frame exceeds the configured limit.
    PayloadTooLarge,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Room loop is no longer running.
    RoomStopped,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Decode => "DECODE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UnknownTarget => "UNKNOWN_TARGET",
            ErrorCode::Storage => "STORAGE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::RoomStopped => "ROOM_STOPPED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("deadline elapsed")]
    Timeout,
    #[error("payload too large ({len} > {max} bytes)")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("room stopped: {0}")]
    RoomStopped(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BrokerError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BrokerError::Decode(_) => ErrorCode::Decode,
            BrokerError::Encode(_) => ErrorCode::Encode,
            BrokerError::NotFound(_) => ErrorCode::NotFound,
            BrokerError::UnknownTarget(_) => ErrorCode::UnknownTarget,
            BrokerError::Storage(_) => ErrorCode::Storage,
            BrokerError::Transport(_) => ErrorCode::Transport,
            BrokerError::Timeout => ErrorCode::Timeout,
            BrokerError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            BrokerError::Config(_) => ErrorCode::Config,
            BrokerError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            BrokerError::RoomStopped(_) => ErrorCode::RoomStopped,
            BrokerError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Errors that end the connection they occur on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BrokerError::Transport(_) | BrokerError::Timeout | BrokerError::PayloadTooLarge { .. }
        )
    }
}

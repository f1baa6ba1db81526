// ── Core error types ──
//
// User-facing errors from sparrow-core. The hub's status taxonomy is
// carried over one-to-one from `sparrow_api::Error`; everything else is a
// domain failure raised by the normalizer, the importer, or storage.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Hub status taxonomy ──────────────────────────────────────────
    #[error("Unauthorized -- check the Notehub API token")]
    Unauthorized,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Device not found: {device_uid}")]
    DeviceNotFound { device_uid: String },

    #[error("Notehub internal error (HTTP {status})")]
    InternalError { status: u16 },

    #[error("Cannot reach Notehub: {reason}")]
    Connection { reason: String },

    // ── Event errors ─────────────────────────────────────────────────
    #[error("Event is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    // ── Import / query errors ────────────────────────────────────────
    #[error("Project not found: {uid}")]
    ProjectNotFound { uid: String },

    #[error("Unknown sensor host: {host}")]
    UnknownSensorHost { host: String },

    #[error("Bulk import requires a {collaborator}")]
    MissingCollaborator { collaborator: &'static str },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a storage-side failure with context.
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: format!("{context}: {err}"),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sparrow_api::Error> for CoreError {
    fn from(err: sparrow_api::Error) -> Self {
        match err {
            sparrow_api::Error::Unauthorized => Self::Unauthorized,
            sparrow_api::Error::Forbidden { message } => Self::Forbidden { message },
            sparrow_api::Error::NotFound { resource } => Self::NotFound { resource },
            sparrow_api::Error::DeviceNotFound { device_uid } => {
                Self::DeviceNotFound { device_uid }
            }
            sparrow_api::Error::InternalError { status } => Self::InternalError { status },
            sparrow_api::Error::UnexpectedStatus { status, message } => Self::Connection {
                reason: format!("HTTP {status}: {message}"),
            },
            sparrow_api::Error::Transport(e) => Self::Connection {
                reason: e.to_string(),
            },
            sparrow_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid hub URL: {e}"),
            },
            sparrow_api::Error::Tls(message) => Self::Config {
                message: format!("TLS: {message}"),
            },
            sparrow_api::Error::InvalidToken(message) => Self::Config {
                message: format!("API token: {message}"),
            },
            sparrow_api::Error::Deserialization { message, .. } => {
                Self::Internal(format!("unexpected hub response: {message}"))
            }
        }
    }
}

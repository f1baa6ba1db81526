use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for the `sparrow-api` crate.
///
/// HTTP status failures are folded into a small taxonomy so callers never
/// inspect raw status codes. `sparrow-core` maps these one-to-one into its
/// own error type.
#[derive(Debug, Error)]
pub enum Error {
    // ── Status taxonomy ─────────────────────────────────────────────
    /// 401 from the hub: missing or rejected session token.
    #[error("Unauthorized -- check the Notehub API token")]
    Unauthorized,

    /// 403 from the hub, or an insufficient-permissions payload.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// 404 on a project-scoped resource.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// 404 on a device-scoped resource, or a device-not-found payload.
    #[error("Device not found: {device_uid}")]
    DeviceNotFound { device_uid: String },

    /// Any 5xx from the hub.
    #[error("Notehub internal error (HTTP {status})")]
    InternalError { status: u16 },

    /// A non-success status outside the taxonomy above (e.g. 400, 429).
    #[error("Unexpected HTTP status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The session token cannot be sent as a header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// What a request was addressed to. Decides how a 404 is reported.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    Project,
    Device(&'a str),
}

impl Error {
    /// Map a non-success HTTP status into the error taxonomy.
    pub(crate) fn from_status(status: StatusCode, scope: Scope<'_>, resource: &str) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden {
                message: resource.to_owned(),
            },
            404 => match scope {
                Scope::Device(device_uid) => Self::DeviceNotFound {
                    device_uid: device_uid.to_owned(),
                },
                Scope::Project => Self::NotFound {
                    resource: resource.to_owned(),
                },
            },
            code if status.is_server_error() => Self::InternalError { status: code },
            code => Self::UnexpectedStatus {
                status: code,
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_owned(),
            },
        }
    }

    /// Returns `true` for both flavors of "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DeviceNotFound { .. })
    }
}

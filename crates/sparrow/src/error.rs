//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sparrow_config::ConfigError;
use sparrow_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Notehub")]
    #[diagnostic(
        code(sparrow::connection_failed),
        help("Check network access to the hub.\nReason: {reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Notehub returned an internal error (HTTP {status})")]
    #[diagnostic(
        code(sparrow::hub_error),
        help("The hub is having trouble; try again shortly.")
    )]
    HubError { status: u16 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(sparrow::auth_failed),
        help(
            "Verify your Notehub API token.\n\
             Run: sparrow config set-token <token>"
        )
    )]
    AuthFailed,

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(sparrow::no_credentials),
        help(
            "Configure a token with: sparrow config init --project <uid> --token <token>\n\
             Or set the SPARROW_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(sparrow::forbidden),
        help("The API token lacks access to this project or device.")
    )]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sparrow::not_found),
        help("Run: sparrow {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Sync failed: {message}")]
    #[diagnostic(code(sparrow::sync))]
    Sync { message: String },

    #[error("'{feature}' is not implemented")]
    #[diagnostic(code(sparrow::not_implemented))]
    NotImplemented { feature: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sparrow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sparrow::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sparrow config init --project <uid>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No project configured")]
    #[diagnostic(
        code(sparrow::no_config),
        help(
            "Create a profile with: sparrow config init --project <uid>\n\
             Or pass --project and --token.\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(sparrow::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(sparrow::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(sparrow::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::HubError { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => Self::AuthFailed,
            CoreError::Forbidden { message } => Self::Forbidden { message },
            CoreError::Connection { reason } => Self::ConnectionFailed { reason },
            CoreError::InternalError { status } => Self::HubError { status },

            CoreError::DeviceNotFound { device_uid } => Self::NotFound {
                resource_type: "gateway".into(),
                identifier: device_uid,
                list_command: "gateways list".into(),
            },
            CoreError::NotFound { resource } => Self::NotFound {
                resource_type: "resource".into(),
                identifier: resource,
                list_command: "gateways list".into(),
            },
            CoreError::ProjectNotFound { uid } => Self::NotFound {
                resource_type: "project".into(),
                identifier: uid,
                list_command: "config show".into(),
            },
            CoreError::UnknownSensorHost { host } => Self::NotFound {
                resource_type: "sensor host".into(),
                identifier: host,
                list_command: "latest".into(),
            },

            CoreError::NotImplemented { operation } => Self::NotImplemented {
                feature: operation.into(),
            },
            CoreError::Config { message } => Self::Config { message },

            CoreError::MissingField { .. }
            | CoreError::MalformedEvent { .. }
            | CoreError::MissingCollaborator { .. }
            | CoreError::Storage { .. }
            | CoreError::Internal(_) => Self::Sync {
                message: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

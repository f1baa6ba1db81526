// Node config endpoint
//
// Node names and locations live in the gateway's `config.db` notefile and
// are read with a `note.get` request. The hub answers these requests with
// HTTP 200 even when they fail, so failures are detected from the payload.
// `ConfigResponse::classify` is the only place that inspects payload shape.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::NotehubClient;
use crate::error::{Error, Scope};
use crate::models::NodeConfig;

const CONFIG_NOTEFILE: &str = "config.db";

#[derive(Debug, Serialize)]
struct NoteGetRequest<'a> {
    req: &'static str,
    file: &'static str,
    note: &'a str,
}

/// Tagged outcome of a `note.get` on `config.db`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResponse {
    /// A well-formed config note.
    Config(NodeConfig),
    /// The gateway itself does not exist.
    DeviceNotFound { message: String },
    /// The token lacks permission for the device.
    Forbidden { message: String },
    /// Anything else (e.g. the node has no config note yet).
    Malformed(Value),
}

impl ConfigResponse {
    /// Decide what a 200-status payload means.
    pub fn classify(payload: Value) -> Self {
        if let Some(err) = payload.get("err").and_then(Value::as_str) {
            let lower = err.to_lowercase();
            if lower.contains("{device-noexist}") || lower.contains("device not found") {
                return Self::DeviceNotFound {
                    message: err.to_owned(),
                };
            }
            if lower.contains("{forbidden}") || lower.contains("insufficient permissions") {
                return Self::Forbidden {
                    message: err.to_owned(),
                };
            }
            return Self::Malformed(payload);
        }

        match serde_json::from_value::<NodeConfig>(payload.clone()) {
            Ok(config) => Self::Config(config),
            Err(_) => Self::Malformed(payload),
        }
    }
}

/// What `get_config` hands back once error payloads are surfaced.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigPayload {
    Config(NodeConfig),
    /// Passed through untouched.
    Unrecognized(Value),
}

impl NotehubClient {
    /// Read a node's config note from its gateway.
    ///
    /// `POST /req?project={project}&device={device}` with
    /// `{"req": "note.get", "file": "config.db", "note": "<node id>"}`.
    ///
    /// A device-not-found or insufficient-permissions payload becomes an
    /// error; any other unexpected payload is passed through.
    pub async fn get_config(&self, device_uid: &str, node_id: &str) -> Result<ConfigPayload, Error> {
        let url = self.request_url(device_uid)?;
        debug!(device_uid, node_id, "fetching node config");
        let body = NoteGetRequest {
            req: "note.get",
            file: CONFIG_NOTEFILE,
            note: node_id,
        };
        let payload: Value = self.post(url, &body, Scope::Device(device_uid)).await?;

        match ConfigResponse::classify(payload) {
            ConfigResponse::Config(config) => Ok(ConfigPayload::Config(config)),
            ConfigResponse::DeviceNotFound { .. } => Err(Error::DeviceNotFound {
                device_uid: device_uid.to_owned(),
            }),
            ConfigResponse::Forbidden { message } => Err(Error::Forbidden { message }),
            ConfigResponse::Malformed(raw) => Ok(ConfigPayload::Unrecognized(raw)),
        }
    }
}

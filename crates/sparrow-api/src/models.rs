// Notehub API response types
//
// Fields use `#[serde(default)]` liberally: the hub omits keys rather than
// sending nulls, and routed events carry different location fields
// depending on how the device was located.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Devices ──────────────────────────────────────────────────────────

/// A location fix reported by the hub for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotehubLocation {
    #[serde(default)]
    pub when: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Device record from `GET /v1/projects/{project}/devices/{device}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotehubDevice {
    pub uid: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub provisioned: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub product_uid: Option<String>,
    #[serde(default)]
    pub fleet_uids: Vec<String>,
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub gps_location: Option<NotehubLocation>,
    #[serde(default)]
    pub triangulated_location: Option<NotehubLocation>,
    #[serde(default)]
    pub tower_location: Option<NotehubLocation>,
}

impl NotehubDevice {
    /// The most precise location fix available: GPS, then triangulation,
    /// then cell tower.
    pub fn best_location(&self) -> Option<&NotehubLocation> {
        self.gps_location
            .as_ref()
            .or(self.triangulated_location.as_ref())
            .or(self.tower_location.as_ref())
    }
}

/// Page wrapper from `GET /v1/projects/{project}/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<NotehubDevice>,
    #[serde(default)]
    pub has_more: bool,
}

/// Environment variables are a flat string map.
pub type NotehubEnvVars = HashMap<String, String>;

/// Wrapper used by both the GET and PUT environment variable endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvVarsEnvelope {
    #[serde(default)]
    pub environment_variables: NotehubEnvVars,
}

// ── Events ───────────────────────────────────────────────────────────

/// Project reference embedded in a routed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventProject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An event as routed by Notehub.
///
/// `file` is either a plain notefile name (`_health.qo`) or a node-scoped
/// name of the form `<node id>#<notefile>`. `when` is whole epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedEvent {
    #[serde(default, alias = "uid")]
    pub event: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub sn: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub when: Option<i64>,
    #[serde(default)]
    pub received: Option<f64>,
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub project: Option<EventProject>,
    #[serde(default)]
    pub best_location: Option<String>,
    #[serde(default)]
    pub best_lat: Option<f64>,
    #[serde(default)]
    pub best_lon: Option<f64>,
    #[serde(default)]
    pub best_country: Option<String>,
    #[serde(default)]
    pub best_timezone: Option<String>,
}

/// Response of `GET /v1/projects/{project}/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<RoutedEvent>,
    #[serde(default)]
    pub has_more: bool,
}

/// Response of `GET /v1/projects/{project}/devices/{device}/latest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestEvents {
    #[serde(default)]
    pub latest_events: Vec<RoutedEvent>,
}

// ── Node config ──────────────────────────────────────────────────────

/// Body of a node's `config.db` note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfigBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub loc: Option<String>,
}

/// A node's config note, as returned by `note.get` on `config.db`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub note: String,
    #[serde(default)]
    pub body: NodeConfigBody,
    #[serde(default)]
    pub time: Option<i64>,
}

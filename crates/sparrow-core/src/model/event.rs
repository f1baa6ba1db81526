// ── Canonical event ──

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{ProjectUid, SensorHost};

/// Best-known location attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLocation {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub when: DateTime<Utc>,
}

/// A routed event after validation and name normalization.
///
/// Only `normalize::parse_event` builds these, so the event name is always
/// the canonical one and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub(crate) project_uid: ProjectUid,
    pub(crate) device_uid: String,
    pub(crate) when: DateTime<Utc>,
    pub(crate) event_name: String,
    pub(crate) node_id: Option<String>,
    pub(crate) location: Option<EventLocation>,
    pub(crate) serial_number: Option<String>,
    pub(crate) event_uid: Option<String>,
    pub(crate) body: serde_json::Value,
}

impl Event {
    pub fn project_uid(&self) -> &ProjectUid {
        &self.project_uid
    }

    pub fn device_uid(&self) -> &str {
        &self.device_uid
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn location(&self) -> Option<&EventLocation> {
        self.location.as_ref()
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn event_uid(&self) -> Option<&str> {
        self.event_uid.as_deref()
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// The gateway, or the node on it that originated the event.
    pub fn host(&self) -> SensorHost {
        match &self.node_id {
            Some(node_id) => SensorHost::node(&self.device_uid, node_id),
            None => SensorHost::gateway(&self.device_uid),
        }
    }
}

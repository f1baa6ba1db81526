// ── Gateway and node domain types ──

use serde::{Deserialize, Serialize};

use super::ids::SensorHost;

/// A hub device relaying data from its nodes.
///
/// String fields are never absent: unknown values are `""`.
/// `last_activity` is RFC 3339 when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub uid: String,
    pub serial_number: Option<String>,
    pub name: String,
    pub location: String,
    pub last_activity: String,
    pub voltage: f64,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Gateway {
    pub fn host(&self) -> SensorHost {
        SensorHost::gateway(&self.uid)
    }
}

/// A sensor device attached to a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    pub gateway_uid: String,
    pub name: String,
    pub location: String,
    pub last_activity: String,
}

impl Node {
    pub fn host(&self) -> SensorHost {
        SensorHost::node(&self.gateway_uid, &self.node_id)
    }
}

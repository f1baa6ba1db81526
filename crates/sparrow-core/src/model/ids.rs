// ── Identity types ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Notehub project uid (`app:…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectUid(String);

impl ProjectUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProjectUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectUid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ProjectUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ProjectUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Anything that owns a reading source: a gateway, or a node on a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorHost {
    Gateway { uid: String },
    Node { gateway_uid: String, node_id: String },
}

impl SensorHost {
    pub fn gateway(uid: impl Into<String>) -> Self {
        Self::Gateway { uid: uid.into() }
    }

    pub fn node(gateway_uid: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::Node {
            gateway_uid: gateway_uid.into(),
            node_id: node_id.into(),
        }
    }

    /// The gateway this host belongs to (itself, for a gateway).
    pub fn gateway_uid(&self) -> &str {
        match self {
            Self::Gateway { uid } => uid,
            Self::Node { gateway_uid, .. } => gateway_uid,
        }
    }
}

impl fmt::Display for SensorHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway { uid } => write!(f, "gateway {uid}"),
            Self::Node {
                gateway_uid,
                node_id,
            } => write!(f, "node {node_id} on gateway {gateway_uid}"),
        }
    }
}

// ── Storage seam ──
//
// Records as the storage engine hands them back, the nested latest-values
// tree, and the two traits storage implements: `Repository` for the
// relational side and `EventHandler` for the event sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Event, Gateway, Node, ProjectUid};

// ── Records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub uid: ProjectUid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRecord {
    pub device_uid: String,
    pub name: Option<String>,
    pub location_name: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: String,
    pub name: Option<String>,
    pub location_name: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSchemaRecord {
    pub name: String,
    pub display_name: Option<String>,
    pub units: Option<String>,
    pub measure: Option<String>,
    /// `number`, `text` or `bool`.
    pub value_kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub value: serde_json::Value,
    pub captured_at: DateTime<Utc>,
}

// ── Latest-values tree ──────────────────────────────────────────────
// project → gateways → (reading source, nodes → reading source)
//   → sensors → schema + latest reading

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTree {
    pub schema: ReadingSchemaRecord,
    pub latest: Option<ReadingRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSourceTree {
    pub sensors: Vec<SensorTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    pub node: NodeRecord,
    pub reading_source: ReadingSourceTree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayTree {
    pub gateway: GatewayRecord,
    pub reading_source: ReadingSourceTree,
    pub nodes: Vec<NodeTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTree {
    pub project: ProjectRecord,
    pub gateways: Vec<GatewayTree>,
}

// ── Traits ──────────────────────────────────────────────────────────

/// Relational storage for the project hierarchy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_project_by_uid(&self, uid: &ProjectUid)
    -> Result<Option<ProjectRecord>, CoreError>;

    /// Insert or update a gateway under `project`.
    async fn upsert_gateway(&self, project: &ProjectRecord, gateway: &Gateway)
    -> Result<(), CoreError>;

    /// Insert or update a node under its gateway.
    async fn upsert_node(&self, node: &Node) -> Result<(), CoreError>;

    /// The whole project hierarchy with the latest reading of every sensor.
    async fn latest_values(&self, uid: &ProjectUid) -> Result<ProjectTree, CoreError>;

    /// Number of readings stored for the project.
    async fn count_readings(&self, uid: &ProjectUid) -> Result<u64, CoreError>;
}

/// Storage-side sink for canonical events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// `is_historical` is set for events replayed by bulk import.
    async fn handle_event(&self, event: &Event, is_historical: bool) -> Result<(), CoreError>;
}

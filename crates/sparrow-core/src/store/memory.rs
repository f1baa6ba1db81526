// ── DashMap-backed store ──
//
// Gateways are keyed by device uid alone, so a gateway can belong to one
// project only. Nodes are keyed by (gateway uid, node id). Map guards are
// never held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};

use super::reading_source::StoredSource;
use crate::convert::parse_activity;
use crate::error::CoreError;
use crate::model::{Event, Gateway, Node, ProjectUid};
use crate::repository::{
    EventHandler, GatewayRecord, GatewayTree, NodeRecord, NodeTree, ProjectRecord, ProjectTree,
    Repository,
};

struct StoredGateway {
    project: ProjectUid,
    record: GatewayRecord,
    source: StoredSource,
}

struct StoredNode {
    record: NodeRecord,
    source: StoredSource,
}

/// In-memory `Repository` and `EventHandler`.
#[derive(Default)]
pub struct MemoryStore {
    projects: DashMap<ProjectUid, ProjectRecord>,
    gateways: DashMap<String, StoredGateway>,
    nodes: DashMap<(String, String), StoredNode>,
    reading_counts: DashMap<ProjectUid, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already knows `project`.
    pub fn with_project(project: ProjectRecord) -> Self {
        let store = Self::new();
        store.add_project(project);
        store
    }

    /// Insert or replace a project record.
    pub fn add_project(&self, project: ProjectRecord) {
        self.projects.insert(project.uid.clone(), project);
    }

    pub fn gateway_count(&self) -> usize {
        self.gateways.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn require_project(&self, uid: &ProjectUid) -> Result<ProjectRecord, CoreError> {
        self.projects
            .get(uid)
            .map(|p| p.clone())
            .ok_or_else(|| CoreError::ProjectNotFound {
                uid: uid.to_string(),
            })
    }
}

/// Keep the later of two optional timestamps.
fn advance(current: &mut Option<DateTime<Utc>>, seen: Option<DateTime<Utc>>) {
    if seen > *current {
        *current = seen;
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_owned()) }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn find_project_by_uid(
        &self,
        uid: &ProjectUid,
    ) -> Result<Option<ProjectRecord>, CoreError> {
        Ok(self.projects.get(uid).map(|p| p.clone()))
    }

    async fn upsert_gateway(
        &self,
        project: &ProjectRecord,
        gateway: &Gateway,
    ) -> Result<(), CoreError> {
        self.require_project(&project.uid)?;
        let last_seen = parse_activity(&gateway.last_activity);

        match self.gateways.entry(gateway.uid.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                if stored.project != project.uid {
                    return Err(CoreError::Storage {
                        message: format!(
                            "gateway {} already belongs to project {}",
                            gateway.uid, stored.project
                        ),
                    });
                }
                if let Some(name) = non_empty(&gateway.name) {
                    stored.record.name = Some(name);
                }
                if let Some(location) = non_empty(&gateway.location) {
                    stored.record.location_name = Some(location);
                }
                advance(&mut stored.record.last_seen_at, last_seen);
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredGateway {
                    project: project.uid.clone(),
                    record: GatewayRecord {
                        device_uid: gateway.uid.clone(),
                        name: non_empty(&gateway.name),
                        location_name: non_empty(&gateway.location),
                        last_seen_at: last_seen,
                    },
                    source: StoredSource::default(),
                });
            }
        }
        debug!(gateway = %gateway.uid, "upserted gateway");
        Ok(())
    }

    async fn upsert_node(&self, node: &Node) -> Result<(), CoreError> {
        if !self.gateways.contains_key(&node.gateway_uid) {
            return Err(CoreError::Storage {
                message: format!("unknown gateway {} for node {}", node.gateway_uid, node.node_id),
            });
        }
        let last_seen = parse_activity(&node.last_activity);

        let key = (node.gateway_uid.clone(), node.node_id.clone());
        let mut stored = self.nodes.entry(key).or_insert_with(|| StoredNode {
            record: NodeRecord {
                node_id: node.node_id.clone(),
                ..Default::default()
            },
            source: StoredSource::default(),
        });
        if let Some(name) = non_empty(&node.name) {
            stored.record.name = Some(name);
        }
        if let Some(location) = non_empty(&node.location) {
            stored.record.location_name = Some(location);
        }
        advance(&mut stored.record.last_seen_at, last_seen);
        debug!(host = %node.host(), "upserted node");
        Ok(())
    }

    async fn latest_values(&self, uid: &ProjectUid) -> Result<ProjectTree, CoreError> {
        let project = self.require_project(uid)?;

        let mut gateways: Vec<GatewayTree> = self
            .gateways
            .iter()
            .filter(|g| g.project == *uid)
            .map(|g| GatewayTree {
                gateway: g.record.clone(),
                reading_source: g.source.to_tree(),
                nodes: Vec::new(),
            })
            .collect();
        gateways.sort_by(|a, b| a.gateway.device_uid.cmp(&b.gateway.device_uid));

        for gateway in &mut gateways {
            let mut nodes: Vec<NodeTree> = self
                .nodes
                .iter()
                .filter(|n| n.key().0 == gateway.gateway.device_uid)
                .map(|n| NodeTree {
                    node: n.record.clone(),
                    reading_source: n.source.to_tree(),
                })
                .collect();
            nodes.sort_by(|a, b| a.node.node_id.cmp(&b.node.node_id));
            gateway.nodes = nodes;
        }

        Ok(ProjectTree { project, gateways })
    }

    async fn count_readings(&self, uid: &ProjectUid) -> Result<u64, CoreError> {
        self.require_project(uid)?;
        Ok(self.reading_counts.get(uid).map_or(0, |c| *c))
    }
}

#[async_trait]
impl EventHandler for MemoryStore {
    async fn handle_event(&self, event: &Event, is_historical: bool) -> Result<(), CoreError> {
        let project_uid = event.project_uid();
        self.require_project(project_uid)?;
        let when = Some(event.when());

        let stored = {
            let mut gateway = self
                .gateways
                .entry(event.device_uid().to_owned())
                .or_insert_with(|| StoredGateway {
                    project: project_uid.clone(),
                    record: GatewayRecord {
                        device_uid: event.device_uid().to_owned(),
                        ..Default::default()
                    },
                    source: StoredSource::default(),
                });
            if gateway.project != *project_uid {
                return Err(CoreError::Storage {
                    message: format!(
                        "event for gateway {} arrived under project {}",
                        event.device_uid(),
                        project_uid
                    ),
                });
            }
            advance(&mut gateway.record.last_seen_at, when);
            if gateway.record.name.is_none() {
                gateway.record.name = event.serial_number().map(str::to_owned);
            }

            match event.node_id() {
                Some(_) => 0,
                None => {
                    if let Some(location) = event.location() {
                        gateway.record.location_name = Some(location.name.clone());
                    }
                    gateway.source.record(event.body(), event.when())
                }
            }
        };

        let stored = match event.node_id() {
            Some(node_id) => {
                let key = (event.device_uid().to_owned(), node_id.to_owned());
                let mut node = self.nodes.entry(key).or_insert_with(|| StoredNode {
                    record: NodeRecord {
                        node_id: node_id.to_owned(),
                        ..Default::default()
                    },
                    source: StoredSource::default(),
                });
                advance(&mut node.record.last_seen_at, when);
                node.source.record(event.body(), event.when())
            }
            None => stored,
        };

        *self.reading_counts.entry(project_uid.clone()).or_insert(0) += stored;
        trace!(
            host = %event.host(),
            event = event.event_name(),
            historical = is_historical,
            readings = stored,
            "handled event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sparrow_api::models::RoutedEvent;

    use super::*;
    use crate::model::SensorHost;
    use crate::normalize::parse_event;
    use crate::snapshot::assemble;

    const PROJECT: &str = "app:1234";

    fn project() -> ProjectRecord {
        ProjectRecord {
            uid: ProjectUid::new(PROJECT),
            name: "Sparrow".into(),
            description: Some("test".into()),
        }
    }

    fn gateway(uid: &str, name: &str) -> Gateway {
        Gateway {
            uid: uid.into(),
            serial_number: None,
            name: name.into(),
            location: String::new(),
            last_activity: "2021-12-14T07:47:29Z".into(),
            voltage: 3.8,
            nodes: Vec::new(),
        }
    }

    fn event(file: &str, when: i64, body: serde_json::Value) -> Event {
        let raw: RoutedEvent = serde_json::from_value(json!({
            "device": "dev:1",
            "file": file,
            "when": when,
            "body": body,
            "project": { "id": PROJECT }
        }))
        .unwrap();
        parse_event(&raw).unwrap()
    }

    #[tokio::test]
    async fn gateway_uid_is_unique_across_projects() {
        let store = MemoryStore::with_project(project());
        let other = ProjectRecord {
            uid: ProjectUid::new("app:other"),
            name: "Other".into(),
            description: None,
        };
        store.add_project(other.clone());

        store.upsert_gateway(&project(), &gateway("dev:1", "A")).await.unwrap();
        store.upsert_gateway(&project(), &gateway("dev:1", "B")).await.unwrap();
        assert_eq!(store.gateway_count(), 1);

        let err = store
            .upsert_gateway(&other, &gateway("dev:1", "C"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }

    #[tokio::test]
    async fn node_requires_known_gateway() {
        let store = MemoryStore::with_project(project());
        let node = Node {
            node_id: "n1".into(),
            gateway_uid: "dev:1".into(),
            name: "Kitchen".into(),
            location: String::new(),
            last_activity: String::new(),
        };
        assert!(store.upsert_node(&node).await.is_err());

        store.upsert_gateway(&project(), &gateway("dev:1", "A")).await.unwrap();
        store.upsert_node(&node).await.unwrap();
        store.upsert_node(&node).await.unwrap();
        assert_eq!(store.node_count(), 1);
    }

    #[tokio::test]
    async fn events_land_on_the_right_host() {
        let store = MemoryStore::with_project(project());
        store
            .handle_event(&event("n1#air.qo", 100, json!({ "temperature": 20 })), true)
            .await
            .unwrap();
        store
            .handle_event(&event("_health.qo", 100, json!({ "voltage": 4.1 })), false)
            .await
            .unwrap();

        let snap = assemble(&store.latest_values(&PROJECT.into()).await.unwrap());
        assert!(
            snap.host_reading_by_name(&SensorHost::node("dev:1", "n1"), "temperature")
                .is_some()
        );
        assert!(
            snap.host_reading_by_name(&SensorHost::gateway("dev:1"), "voltage")
                .is_some()
        );
        assert!(
            snap.host_reading_by_name(&SensorHost::gateway("dev:1"), "temperature")
                .is_none()
        );
    }

    #[tokio::test]
    async fn latest_is_newest_but_all_are_counted() {
        let store = MemoryStore::with_project(project());
        for (when, temp) in [(300, 23), (100, 19), (200, 21)] {
            store
                .handle_event(&event("n1#air.qo", when, json!({ "temperature": temp })), true)
                .await
                .unwrap();
        }

        assert_eq!(store.count_readings(&PROJECT.into()).await.unwrap(), 3);

        let tree = store.latest_values(&PROJECT.into()).await.unwrap();
        let sensors = &tree.gateways[0].nodes[0].reading_source.sensors;
        assert_eq!(sensors[0].latest.as_ref().unwrap().value, json!(23));
        assert_eq!(
            tree.gateways[0].nodes[0].node.last_seen_at,
            DateTime::from_timestamp(300, 0)
        );
    }

    #[tokio::test]
    async fn unknown_project_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.latest_values(&PROJECT.into()).await,
            Err(CoreError::ProjectNotFound { .. })
        ));
        assert!(matches!(
            store
                .handle_event(&event("_health.qo", 1, json!({})), true)
                .await,
            Err(CoreError::ProjectNotFound { .. })
        ));
        assert!(store.find_project_by_uid(&PROJECT.into()).await.unwrap().is_none());
    }
}

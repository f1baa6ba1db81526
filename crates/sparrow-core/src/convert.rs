// ── Record-to-domain conversions ──
//
// Bridges storage records and raw hub responses into the canonical domain
// model. Every function here is total: missing optional data becomes an
// empty string or a documented default, never an error.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use sparrow_api::ConfigPayload;
use sparrow_api::models::{NotehubDevice, NotehubEnvVars};

use crate::model::{Gateway, Node, Project, Reading, ReadingValue, SensorType, ValueKind};
use crate::repository::{
    GatewayRecord, NodeRecord, ProjectRecord, ReadingRecord, ReadingSchemaRecord,
};

/// Voltage reported for gateways read back from storage, which does not
/// record it yet.
pub const GATEWAY_VOLTAGE_PLACEHOLDER: f64 = 3.5;

/// Environment variable holding a gateway's display name.
pub const GATEWAY_NAME_ENV_VAR: &str = "_sn";

// ── Helpers ────────────────────────────────────────────────────────

/// Render a timestamp the way `last_activity` fields carry it.
pub fn format_activity(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Inverse of [`format_activity`]; `""` and garbage both yield `None`.
pub fn parse_activity(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Storage records ────────────────────────────────────────────────

pub fn map_gateway(record: &GatewayRecord) -> Gateway {
    map_gateway_with_nodes(record, Vec::new())
}

pub fn map_gateway_with_nodes(record: &GatewayRecord, nodes: Vec<Node>) -> Gateway {
    Gateway {
        uid: record.device_uid.clone(),
        serial_number: None,
        name: record.name.clone().unwrap_or_default(),
        location: record.location_name.clone().unwrap_or_default(),
        last_activity: format_activity(record.last_seen_at),
        voltage: GATEWAY_VOLTAGE_PLACEHOLDER,
        nodes,
    }
}

pub fn map_node(record: &NodeRecord, gateway_uid: &str) -> Node {
    Node {
        node_id: record.node_id.clone(),
        gateway_uid: gateway_uid.to_owned(),
        name: record.name.clone().unwrap_or_default(),
        location: record.location_name.clone().unwrap_or_default(),
        last_activity: format_activity(record.last_seen_at),
    }
}

pub fn map_reading_schema(record: &ReadingSchemaRecord) -> SensorType {
    SensorType {
        name: record.name.clone(),
        display_name: record
            .display_name
            .clone()
            .unwrap_or_else(|| record.name.clone()),
        units: record.units.clone(),
        measure: record.measure.clone(),
        kind: record.value_kind.parse().unwrap_or(ValueKind::Text),
    }
}

pub fn map_reading(record: &ReadingRecord) -> Reading {
    Reading {
        value: reading_value(&record.value),
        captured_at: record.captured_at,
    }
}

/// JSON scalar to typed value; non-scalars fall back to their JSON text.
pub fn reading_value(value: &Value) -> ReadingValue {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map_or_else(|| ReadingValue::Text(n.to_string()), ReadingValue::Number),
        Value::String(s) => ReadingValue::Text(s.clone()),
        Value::Bool(b) => ReadingValue::Bool(*b),
        other => ReadingValue::Text(other.to_string()),
    }
}

pub fn map_project_hierarchy(record: &ProjectRecord, gateways: Vec<Gateway>) -> Project {
    Project {
        uid: record.uid.clone(),
        name: record.name.clone(),
        description: record.description.clone(),
        gateways,
    }
}

// ── Hub responses ──────────────────────────────────────────────────

impl Gateway {
    /// Build a gateway from its hub device record and environment variables.
    pub fn from_hub_device(device: &NotehubDevice, env_vars: &NotehubEnvVars) -> Self {
        Self {
            uid: device.uid.clone(),
            serial_number: device.serial_number.clone(),
            name: env_vars
                .get(GATEWAY_NAME_ENV_VAR)
                .cloned()
                .unwrap_or_default(),
            location: device
                .best_location()
                .and_then(|l| l.name.clone())
                .unwrap_or_default(),
            last_activity: format_activity(device.last_activity),
            voltage: device.voltage.unwrap_or(GATEWAY_VOLTAGE_PLACEHOLDER),
            nodes: Vec::new(),
        }
    }
}

impl Node {
    /// Build a node from its `config.db` note. Unrecognized payloads leave
    /// name and location empty.
    pub fn from_config(
        gateway_uid: &str,
        node_id: &str,
        config: &ConfigPayload,
        last_activity: Option<DateTime<Utc>>,
    ) -> Self {
        let (name, location) = match config {
            ConfigPayload::Config(cfg) => (cfg.body.name.clone(), cfg.body.loc.clone()),
            ConfigPayload::Unrecognized(_) => (None, None),
        };
        Self {
            node_id: node_id.to_owned(),
            gateway_uid: gateway_uid.to_owned(),
            name: name.unwrap_or_default(),
            location: location.unwrap_or_default(),
            last_activity: format_activity(last_activity),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_activity(raw).unwrap()
    }

    #[test]
    fn gateway_defaults_are_empty_strings() {
        let gw = map_gateway(&GatewayRecord {
            device_uid: "dev:1".into(),
            ..Default::default()
        });
        assert_eq!(gw.uid, "dev:1");
        assert_eq!(gw.name, "");
        assert_eq!(gw.location, "");
        assert_eq!(gw.last_activity, "");
        assert_eq!(gw.voltage, GATEWAY_VOLTAGE_PLACEHOLDER);
        assert!(gw.nodes.is_empty());
    }

    #[test]
    fn gateway_fields_are_copied() {
        let gw = map_gateway(&GatewayRecord {
            device_uid: "dev:1".into(),
            name: Some("Lobby".into()),
            location_name: Some("Boston".into()),
            last_seen_at: Some(ts("2021-12-14T07:47:29Z")),
        });
        assert_eq!(gw.name, "Lobby");
        assert_eq!(gw.location, "Boston");
        assert_eq!(gw.last_activity, "2021-12-14T07:47:29Z");
    }

    #[test]
    fn node_inherits_gateway_uid() {
        let node = map_node(
            &NodeRecord {
                node_id: "n1".into(),
                name: Some("Kitchen".into()),
                ..Default::default()
            },
            "dev:1",
        );
        assert_eq!(node.gateway_uid, "dev:1");
        assert_eq!(node.name, "Kitchen");
        assert_eq!(node.location, "");
    }

    #[test]
    fn schema_kind_parses_and_falls_back() {
        let mut record = ReadingSchemaRecord {
            name: "temperature".into(),
            units: Some("°C".into()),
            value_kind: "Number".into(),
            ..Default::default()
        };
        let st = map_reading_schema(&record);
        assert_eq!(st.kind, ValueKind::Number);
        assert_eq!(st.display_name, "temperature");

        record.value_kind = "matrix".into();
        assert_eq!(map_reading_schema(&record).kind, ValueKind::Text);
    }

    #[test]
    fn reading_values_are_typed() {
        assert_eq!(reading_value(&json!(21.5)), ReadingValue::Number(21.5));
        assert_eq!(reading_value(&json!("ok")), ReadingValue::Text("ok".into()));
        assert_eq!(reading_value(&json!(true)), ReadingValue::Bool(true));
        assert_eq!(
            reading_value(&json!([1, 2])),
            ReadingValue::Text("[1,2]".into())
        );
    }

    #[test]
    fn hub_device_to_gateway() {
        let device: NotehubDevice = serde_json::from_value(json!({
            "uid": "dev:1234",
            "serial_number": "9101112",
            "last_activity": "2021-12-14T07:47:29Z",
            "voltage": 3.8,
            "tower_location": { "name": "Boston MA" }
        }))
        .unwrap();
        let mut env = HashMap::new();
        env.insert("_sn".to_owned(), "Warehouse".to_owned());

        let gw = Gateway::from_hub_device(&device, &env);
        assert_eq!(gw.uid, "dev:1234");
        assert_eq!(gw.serial_number.as_deref(), Some("9101112"));
        assert_eq!(gw.name, "Warehouse");
        assert_eq!(gw.location, "Boston MA");
        assert_eq!(gw.last_activity, "2021-12-14T07:47:29Z");
        assert_eq!(gw.voltage, 3.8);

        let bare = Gateway::from_hub_device(&device, &HashMap::new());
        assert_eq!(bare.name, "");
    }

    #[test]
    fn node_from_config() {
        let payload = ConfigPayload::Config(
            serde_json::from_value(json!({
                "note": "n1",
                "body": { "name": "Kitchen", "loc": "Ground" }
            }))
            .unwrap(),
        );
        let node = Node::from_config("dev:1", "n1", &payload, None);
        assert_eq!(node.name, "Kitchen");
        assert_eq!(node.location, "Ground");
        assert_eq!(node.last_activity, "");

        let node = Node::from_config(
            "dev:1",
            "n1",
            &ConfigPayload::Unrecognized(json!({ "err": "note-noexist" })),
            None,
        );
        assert_eq!(node.name, "");
    }
}

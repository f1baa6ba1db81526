// ── Latest-readings snapshot ──
//
// Walks the nested latest-values tree depth-first and indexes every reading
// source by its sensor host. A snapshot has a single `when`, captured once
// before the walk; it is shared by every host snapshot inside it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::convert::{
    map_gateway_with_nodes, map_node, map_project_hierarchy, map_reading, map_reading_schema,
};
use crate::error::CoreError;
use crate::model::{Gateway, Project, Reading, SensorHost, SensorType};
use crate::repository::{GatewayTree, ProjectTree, ReadingSourceTree};

/// Latest readings of one gateway or node.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorHostReadingsSnapshot {
    host: SensorHost,
    when: DateTime<Utc>,
    sensor_types: HashMap<String, SensorType>,
    readings: HashMap<String, Reading>,
}

impl SensorHostReadingsSnapshot {
    pub fn host(&self) -> &SensorHost {
        &self.host
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn sensor_type(&self, name: &str) -> Option<&SensorType> {
        self.sensor_types.get(name)
    }

    pub fn reading(&self, name: &str) -> Option<&Reading> {
        self.readings.get(name)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Sensor types paired with their readings, ordered by name.
    pub fn entries(&self) -> Vec<(&SensorType, &Reading)> {
        let mut entries: Vec<_> = self
            .sensor_types
            .iter()
            .filter_map(|(name, st)| self.readings.get(name).map(|r| (st, r)))
            .collect();
        entries.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        entries
    }
}

/// Latest readings of a whole project, keyed by sensor host.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReadingsSnapshot {
    when: DateTime<Utc>,
    project: Project,
    host_readings: HashMap<SensorHost, SensorHostReadingsSnapshot>,
}

impl ProjectReadingsSnapshot {
    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn host_count(&self) -> usize {
        self.host_readings.len()
    }

    /// Every host snapshot, ordered by host.
    pub fn hosts(&self) -> Vec<&SensorHostReadingsSnapshot> {
        let mut hosts: Vec<_> = self.host_readings.values().collect();
        hosts.sort_by(|a, b| a.host.cmp(&b.host));
        hosts
    }

    pub fn host_readings(&self, host: &SensorHost) -> Result<&SensorHostReadingsSnapshot, CoreError> {
        self.host_readings
            .get(host)
            .ok_or_else(|| CoreError::UnknownSensorHost {
                host: host.to_string(),
            })
    }

    /// `None` for an unknown host as well as an unknown reading.
    pub fn host_reading_by_name(&self, host: &SensorHost, name: &str) -> Option<&Reading> {
        self.host_readings.get(host).and_then(|h| h.reading(name))
    }
}

/// Build a snapshot stamped with the current time.
pub fn assemble(tree: &ProjectTree) -> ProjectReadingsSnapshot {
    assemble_at(tree, Utc::now())
}

/// Build a snapshot stamped with `when`.
pub fn assemble_at(tree: &ProjectTree, when: DateTime<Utc>) -> ProjectReadingsSnapshot {
    let mut host_readings = HashMap::new();
    let mut gateways = Vec::with_capacity(tree.gateways.len());
    for gateway in &tree.gateways {
        gateways.push(deep_map_gateway(gateway, when, &mut host_readings));
    }

    ProjectReadingsSnapshot {
        when,
        project: map_project_hierarchy(&tree.project, gateways),
        host_readings,
    }
}

fn deep_map_gateway(
    tree: &GatewayTree,
    when: DateTime<Utc>,
    table: &mut HashMap<SensorHost, SensorHostReadingsSnapshot>,
) -> Gateway {
    let gateway_uid = &tree.gateway.device_uid;

    let mut nodes = Vec::with_capacity(tree.nodes.len());
    for node_tree in &tree.nodes {
        let node = map_node(&node_tree.node, gateway_uid);
        add_reading_source(&node_tree.reading_source, node.host(), when, table);
        nodes.push(node);
    }

    let gateway = map_gateway_with_nodes(&tree.gateway, nodes);
    add_reading_source(&tree.reading_source, gateway.host(), when, table);
    gateway
}

fn add_reading_source(
    source: &ReadingSourceTree,
    host: SensorHost,
    when: DateTime<Utc>,
    table: &mut HashMap<SensorHost, SensorHostReadingsSnapshot>,
) {
    let mut sensor_types = HashMap::new();
    let mut readings = HashMap::new();
    for sensor in &source.sensors {
        let Some(latest) = &sensor.latest else {
            continue;
        };
        let sensor_type = map_reading_schema(&sensor.schema);
        readings.insert(sensor_type.name.clone(), map_reading(latest));
        sensor_types.insert(sensor_type.name.clone(), sensor_type);
    }

    table.insert(
        host.clone(),
        SensorHostReadingsSnapshot {
            host,
            when,
            sensor_types,
            readings,
        },
    );
}

//! `sparrow latest` and `sparrow count`: queries over a freshly synced store.

use serde::Serialize;
use tabled::Tabled;

use sparrow_core::{ProjectReadingsSnapshot, SensorHost};

use crate::cli::{GlobalOpts, LatestArgs};
use crate::error::CliError;
use crate::output;

use super::util::Session;

// ── Rows ─────────────────────────────────────────────────────────────

/// One sensor's latest reading, flattened for output.
#[derive(Debug, Clone, Serialize)]
pub struct LatestRow {
    pub gateway: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub sensor: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub captured_at: String,
}

#[derive(Tabled)]
struct LatestTableRow {
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Sensor")]
    sensor: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Captured")]
    captured: String,
}

fn table_row(row: &LatestRow, color: bool) -> LatestTableRow {
    let value = match &row.value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    LatestTableRow {
        gateway: row.gateway.clone(),
        node: row.node.clone().unwrap_or_else(|| output::dim("-", color)),
        sensor: row.sensor.clone(),
        value,
        units: row.units.clone().unwrap_or_default(),
        captured: output::dim(&row.captured_at, color),
    }
}

/// Flatten a snapshot into rows, applying the optional host and sensor filters.
pub fn rows(snapshot: &ProjectReadingsSnapshot, args: &LatestArgs) -> Vec<LatestRow> {
    let mut rows = Vec::new();
    for host in snapshot.hosts() {
        let (gateway, node) = match host.host() {
            SensorHost::Gateway { uid } => (uid.as_str(), None),
            SensorHost::Node {
                gateway_uid,
                node_id,
            } => (gateway_uid.as_str(), Some(node_id.as_str())),
        };
        if args.gateway.as_deref().is_some_and(|g| g != gateway) {
            continue;
        }
        if args.node.is_some() && args.node.as_deref() != node {
            continue;
        }
        for (sensor, reading) in host.entries() {
            if args.sensor.as_deref().is_some_and(|s| s != sensor.name) {
                continue;
            }
            rows.push(LatestRow {
                gateway: gateway.to_owned(),
                node: node.map(str::to_owned),
                sensor: sensor.name.clone(),
                value: serde_json::to_value(&reading.value).unwrap_or_default(),
                units: sensor.units.clone(),
                captured_at: reading.captured_at.to_rfc3339(),
            });
        }
    }
    rows
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: LatestArgs, global: &GlobalOpts) -> Result<(), CliError> {
    session.sync(global.quiet).await?;
    let latest = session
        .provider
        .query_project_latest_values(&session.project_uid)
        .await?;

    let snapshot = &latest.results;
    if let Some(ref gateway) = args.gateway {
        let host = match args.node {
            Some(ref node) => SensorHost::node(gateway.as_str(), node.as_str()),
            None => SensorHost::gateway(gateway.as_str()),
        };
        snapshot.host_readings(&host)?;
    }

    let color = output::should_color(&global.color);
    let data = rows(snapshot, &args);
    let out = output::render_list(
        &global.output,
        &data,
        |r| table_row(r, color),
        |r| format!("{} {}", r.sensor, r.value),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Debug, Serialize)]
struct CountResult {
    project: String,
    readings: u64,
}

pub async fn count(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.sync(global.quiet).await?;
    let result = session
        .provider
        .query_project_reading_count(&session.project_uid)
        .await?;

    let data = CountResult {
        project: result.request.to_string(),
        readings: result.results,
    };
    let out = output::render_single(
        &global.output,
        &data,
        |c| format!("{} readings in project {}", c.readings, c.project),
        |c| c.readings.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Per-host sensor storage ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::ValueKind;
use crate::repository::{ReadingRecord, ReadingSchemaRecord, ReadingSourceTree, SensorTree};

/// Sensors of one gateway or node, keyed by schema name.
#[derive(Debug, Default)]
pub(crate) struct StoredSource {
    sensors: BTreeMap<String, StoredSensor>,
}

#[derive(Debug)]
struct StoredSensor {
    schema: ReadingSchemaRecord,
    latest: Option<ReadingRecord>,
}

impl StoredSource {
    /// Store one reading per scalar field of `body`. Returns how many were
    /// stored. A reading only becomes the latest if it is not older than
    /// the current one.
    pub(crate) fn record(&mut self, body: &Value, at: DateTime<Utc>) -> u64 {
        let Some(fields) = body.as_object() else {
            return 0;
        };

        let mut stored = 0;
        for (name, value) in fields {
            let Some(kind) = scalar_kind(value) else {
                continue;
            };
            let sensor = self
                .sensors
                .entry(name.clone())
                .or_insert_with(|| StoredSensor {
                    schema: schema_for(name, kind),
                    latest: None,
                });
            let newer = sensor.latest.as_ref().is_none_or(|r| at >= r.captured_at);
            if newer {
                sensor.latest = Some(ReadingRecord {
                    value: value.clone(),
                    captured_at: at,
                });
            }
            stored += 1;
        }
        stored
    }

    pub(crate) fn to_tree(&self) -> ReadingSourceTree {
        ReadingSourceTree {
            sensors: self
                .sensors
                .values()
                .map(|s| SensorTree {
                    schema: s.schema.clone(),
                    latest: s.latest.clone(),
                })
                .collect(),
        }
    }
}

fn scalar_kind(value: &Value) -> Option<ValueKind> {
    match value {
        Value::Number(_) => Some(ValueKind::Number),
        Value::String(_) => Some(ValueKind::Text),
        Value::Bool(_) => Some(ValueKind::Bool),
        _ => None,
    }
}

fn schema_for(name: &str, kind: ValueKind) -> ReadingSchemaRecord {
    let (units, measure) = match name {
        "temperature" => (Some("°C"), Some("temperature")),
        "humidity" => (Some("%"), Some("relative humidity")),
        "pressure" => (Some("Pa"), Some("air pressure")),
        "voltage" => (Some("V"), Some("voltage")),
        "pm01_0" | "pm02_5" | "pm10_0" => (Some("µg/m³"), Some("particulate matter")),
        _ => (None, None),
    };
    ReadingSchemaRecord {
        name: name.to_owned(),
        display_name: None,
        units: units.map(str::to_owned),
        measure: measure.map(str::to_owned),
        value_kind: kind.to_string(),
    }
}

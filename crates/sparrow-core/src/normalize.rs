// ── Event normalization ──
//
// Notehub encodes node-originated events by prefixing the notefile name
// with the node id: `<node id>#<notefile>`. This module decodes that into a
// canonical event name (`*#<notefile>`) plus the originating node, and turns
// a raw routed event into a validated `Event`.

use chrono::DateTime;
use sparrow_api::models::RoutedEvent;

use crate::error::CoreError;
use crate::model::{Event, EventLocation, ProjectUid};

/// Prefix of every node-scoped canonical event name.
pub const NODE_EVENT_PREFIX: &str = "*#";

/// Result of decoding an event's `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEventName {
    pub event_name: String,
    pub node_id: Option<String>,
}

/// Split `<node id>#<notefile>` into `("*#<notefile>", Some(node id))`.
///
/// Only the first `#` counts, and only when it is not the first character;
/// anything else is a gateway-level notefile name kept as-is.
pub fn normalize_event_name(file: &str) -> NormalizedEventName {
    match file.find('#') {
        Some(idx) if idx > 0 => NormalizedEventName {
            event_name: format!("{NODE_EVENT_PREFIX}{}", &file[idx + 1..]),
            node_id: Some(file[..idx].to_owned()),
        },
        _ => NormalizedEventName {
            event_name: file.to_owned(),
            node_id: None,
        },
    }
}

/// Validate a routed event and convert it into the canonical form.
pub fn parse_event(raw: &RoutedEvent) -> Result<Event, CoreError> {
    let project = raw
        .project
        .as_ref()
        .and_then(|p| p.id.as_deref())
        .filter(|id| !id.is_empty());
    build_event(raw, project)
}

/// Like [`parse_event`], but falls back to `project` when the raw event does
/// not name one (the project-wide events endpoint omits it).
pub fn parse_event_for_project(raw: &RoutedEvent, project: &ProjectUid) -> Result<Event, CoreError> {
    let embedded = raw
        .project
        .as_ref()
        .and_then(|p| p.id.as_deref())
        .filter(|id| !id.is_empty());
    build_event(raw, embedded.or(Some(project.as_str())).filter(|id| !id.is_empty()))
}

fn build_event(raw: &RoutedEvent, project: Option<&str>) -> Result<Event, CoreError> {
    let device_uid = raw
        .device
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(CoreError::MissingField { field: "device" })?;
    let project_uid = project.ok_or(CoreError::MissingField { field: "project.id" })?;
    let file = raw
        .file
        .as_deref()
        .ok_or(CoreError::MissingField { field: "file" })?;
    let seconds = raw.when.ok_or(CoreError::MissingField { field: "when" })?;

    let millis = seconds
        .checked_mul(1000)
        .ok_or_else(|| CoreError::MalformedEvent {
            message: format!("timestamp {seconds} out of range"),
        })?;
    let when = DateTime::from_timestamp_millis(millis).ok_or_else(|| CoreError::MalformedEvent {
        message: format!("timestamp {seconds} out of range"),
    })?;

    let NormalizedEventName {
        event_name,
        node_id,
    } = normalize_event_name(file);

    let location = raw.best_location.as_ref().map(|name| EventLocation {
        name: name.clone(),
        latitude: raw.best_lat,
        longitude: raw.best_lon,
        country: raw.best_country.clone(),
        timezone: raw.best_timezone.clone(),
        when,
    });

    Ok(Event {
        project_uid: ProjectUid::new(project_uid),
        device_uid: device_uid.to_owned(),
        when,
        event_name,
        node_id,
        location,
        serial_number: raw.sn.clone(),
        event_uid: raw.event.clone(),
        body: raw.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn raw(value: serde_json::Value) -> RoutedEvent {
        serde_json::from_value(value).unwrap()
    }

    fn node_event() -> RoutedEvent {
        raw(json!({
            "event": "evt-1",
            "device": "dev:1234",
            "sn": "Lobby",
            "file": "20323746323650050028000a#air.qo",
            "when": 1_643_224_850,
            "body": { "temperature": 21.5, "humidity": 40 },
            "project": { "id": "app:1234" },
            "best_location": "Boston MA",
            "best_lat": 42.36,
            "best_lon": -71.06,
            "best_country": "US",
            "best_timezone": "America/New_York"
        }))
    }

    // ── normalize_event_name ────────────────────────────────────────

    #[test]
    fn node_scoped_name_is_split() {
        let n = normalize_event_name("20323746323650050028000a#air.qo");
        assert_eq!(n.event_name, "*#air.qo");
        assert_eq!(n.node_id.as_deref(), Some("20323746323650050028000a"));
    }

    #[test]
    fn plain_name_has_no_origin() {
        let n = normalize_event_name("_health.qo");
        assert_eq!(n.event_name, "_health.qo");
        assert_eq!(n.node_id, None);
    }

    #[test]
    fn leading_hash_has_no_origin() {
        let n = normalize_event_name("#air.qo");
        assert_eq!(n.event_name, "#air.qo");
        assert_eq!(n.node_id, None);
    }

    #[test]
    fn only_first_hash_splits() {
        let n = normalize_event_name("abc#x#y");
        assert_eq!(n.event_name, "*#x#y");
        assert_eq!(n.node_id.as_deref(), Some("abc"));
    }

    #[test]
    fn empty_suffix_is_kept() {
        let n = normalize_event_name("abc#");
        assert_eq!(n.event_name, "*#");
        assert_eq!(n.node_id.as_deref(), Some("abc"));
    }

    // ── parse_event ─────────────────────────────────────────────────

    #[test]
    fn parses_node_event() {
        let event = parse_event(&node_event()).unwrap();
        assert_eq!(event.project_uid().as_str(), "app:1234");
        assert_eq!(event.device_uid(), "dev:1234");
        assert_eq!(event.event_name(), "*#air.qo");
        assert_eq!(event.node_id(), Some("20323746323650050028000a"));
        assert_eq!(event.serial_number(), Some("Lobby"));
        assert_eq!(event.when().timestamp_millis(), 1_643_224_850_000);
        assert_eq!(event.body()["temperature"], json!(21.5));
    }

    #[test]
    fn location_uses_best_fields_and_event_time() {
        let event = parse_event(&node_event()).unwrap();
        let loc = event.location().unwrap();
        assert_eq!(loc.name, "Boston MA");
        assert_eq!(loc.latitude, Some(42.36));
        assert_eq!(loc.longitude, Some(-71.06));
        assert_eq!(loc.country.as_deref(), Some("US"));
        assert_eq!(loc.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(loc.when, event.when());
    }

    #[test]
    fn no_best_location_means_no_location() {
        let mut r = node_event();
        r.best_location = None;
        assert!(parse_event(&r).unwrap().location().is_none());
    }

    #[test]
    fn missing_device_is_rejected() {
        let mut r = node_event();
        r.device = None;
        assert!(matches!(
            parse_event(&r),
            Err(CoreError::MissingField { field: "device" })
        ));
    }

    #[test]
    fn missing_project_is_rejected() {
        let mut r = node_event();
        r.project = None;
        assert!(matches!(
            parse_event(&r),
            Err(CoreError::MissingField { field: "project.id" })
        ));
    }

    #[test]
    fn missing_file_and_when_are_rejected() {
        let mut r = node_event();
        r.file = None;
        assert!(matches!(
            parse_event(&r),
            Err(CoreError::MissingField { field: "file" })
        ));

        let mut r = node_event();
        r.when = None;
        assert!(matches!(
            parse_event(&r),
            Err(CoreError::MissingField { field: "when" })
        ));
    }

    #[test]
    fn overflowing_timestamp_is_malformed() {
        let mut r = node_event();
        r.when = Some(i64::MAX / 10);
        assert!(matches!(
            parse_event(&r),
            Err(CoreError::MalformedEvent { .. })
        ));
    }

    #[test]
    fn project_fallback_only_fills_gaps() {
        let fallback = ProjectUid::new("app:fallback");

        let mut r = node_event();
        r.project = None;
        let event = parse_event_for_project(&r, &fallback).unwrap();
        assert_eq!(event.project_uid().as_str(), "app:fallback");

        let event = parse_event_for_project(&node_event(), &fallback).unwrap();
        assert_eq!(event.project_uid().as_str(), "app:1234");
    }
}

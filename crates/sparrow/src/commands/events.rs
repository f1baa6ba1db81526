//! `sparrow events list`: recent routed events, normalized.

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use sparrow_core::normalize::parse_event_for_project;
use sparrow_core::{AccessorClient, Event};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::Session;

#[derive(Debug, Serialize)]
struct EventView<'a> {
    when: String,
    device: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<&'a str>,
    event: &'a str,
    body: &'a serde_json::Value,
}

impl<'a> From<&'a Event> for EventView<'a> {
    fn from(e: &'a Event) -> Self {
        Self {
            when: e.when().to_rfc3339(),
            device: e.device_uid(),
            node: e.node_id(),
            event: e.event_name(),
            body: e.body(),
        }
    }
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Body")]
    body: String,
}

fn event_row(v: &EventView<'_>, color: bool) -> EventRow {
    EventRow {
        when: output::dim(&v.when, color),
        device: v.device.to_owned(),
        node: v.node.map_or_else(|| output::dim("-", color), str::to_owned),
        event: v.event.to_owned(),
        body: v.body.to_string(),
    }
}

/// Keep parseable events, optionally only those from `node`.
fn select<'a>(events: &'a [Event], node: Option<&str>) -> Vec<EventView<'a>> {
    events
        .iter()
        .filter(|e| node.is_none_or(|n| e.node_id() == Some(n)))
        .map(EventView::from)
        .collect()
}

pub async fn handle(session: &Session, args: EventsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EventsCommand::List { hours, node } => {
            let since = (Utc::now() - TimeDelta::hours(i64::from(hours)))
                .timestamp()
                .to_string();
            let raw = session.source.get_events(&since).await?;

            let mut events = Vec::with_capacity(raw.len());
            for r in &raw {
                match parse_event_for_project(r, &session.project_uid) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!(error = %e, "skipping unparseable event"),
                }
            }
            events.sort_by_key(Event::when);

            let color = output::should_color(&global.color);
            let views = select(&events, node.as_deref());
            let out = output::render_list(
                &global.output,
                &views,
                |v| event_row(v, color),
                |v| v.event.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

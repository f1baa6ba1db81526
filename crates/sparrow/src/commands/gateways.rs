//! Gateway command handlers.

use std::fmt::Write as _;

use tabled::Tabled;
use tracing::info;

use sparrow_api::models::NotehubEnvVars;
use sparrow_core::convert::GATEWAY_NAME_ENV_VAR;
use sparrow_core::{Gateway, Node};

use crate::cli::{GatewaysArgs, GatewaysCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::Session;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GatewayRow {
    #[tabled(rename = "UID")]
    uid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Voltage")]
    voltage: String,
    #[tabled(rename = "Last Activity")]
    last_activity: String,
}

fn gateway_row(g: &Gateway, color: bool) -> GatewayRow {
    GatewayRow {
        uid: g.uid.clone(),
        name: g.name.clone(),
        serial: g.serial_number.clone().unwrap_or_default(),
        location: g.location.clone(),
        voltage: format!("{:.2}", g.voltage),
        last_activity: output::dim(&g.last_activity, color),
    }
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Node")]
    node_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Last Activity")]
    last_activity: String,
}

fn node_row(n: &Node, color: bool) -> NodeRow {
    NodeRow {
        gateway: n.gateway_uid.clone(),
        node_id: n.node_id.clone(),
        name: n.name.clone(),
        location: n.location.clone(),
        last_activity: output::dim(&n.last_activity, color),
    }
}

fn detail(g: &Gateway) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "UID:            {}", g.uid);
    let _ = writeln!(out, "Name:           {}", g.name);
    if let Some(ref serial) = g.serial_number {
        let _ = writeln!(out, "Serial:         {serial}");
    }
    let _ = writeln!(out, "Location:       {}", g.location);
    let _ = writeln!(out, "Voltage:        {:.2}", g.voltage);
    let _ = write!(out, "Last Activity:  {}", g.last_activity);
    if !g.nodes.is_empty() {
        let _ = write!(out, "\nNodes:          {}", g.nodes.len());
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: GatewaysArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        GatewaysCommand::List => {
            let gateways = session.provider.get_gateways().await?;
            let out = output::render_list(
                &global.output,
                &gateways,
                |g| gateway_row(g, color),
                |g| g.uid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GatewaysCommand::Get { uid } => {
            let gateway = session.provider.get_gateway(&uid).await?;
            let out = output::render_single(&global.output, &gateway, detail, |g| g.uid.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GatewaysCommand::Nodes { uids } => {
            let uids = if uids.is_empty() {
                session
                    .provider
                    .get_gateways()
                    .await?
                    .into_iter()
                    .map(|g| g.uid)
                    .collect()
            } else {
                uids
            };
            let nodes = session.provider.get_nodes(&uids).await?;
            let out = output::render_list(
                &global.output,
                &nodes,
                |n| node_row(n, color),
                |n| n.node_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GatewaysCommand::Rename { uid, name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "must not be empty".into(),
                });
            }
            let vars = NotehubEnvVars::from([(GATEWAY_NAME_ENV_VAR.to_owned(), name.to_owned())]);
            let accepted = session
                .source
                .client()
                .set_environment_variables(&uid, vars)
                .await
                .map_err(sparrow_core::CoreError::from)?;
            if !accepted {
                return Err(CliError::Sync {
                    message: format!("hub did not apply the new name for {uid}"),
                });
            }
            info!(gateway = %uid, name, "gateway renamed");
            if !global.quiet {
                eprintln!("Renamed {uid} to {name}");
            }
            Ok(())
        }
    }
}

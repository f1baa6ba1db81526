// ── Hub data source ──
//
// `AccessorClient` is the seam between the importer and the hub. The
// production implementation, `NotehubSource`, wraps `sparrow_api` and
// converts hub responses into domain types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use tracing::debug;

use sparrow_api::models::RoutedEvent;
use sparrow_api::{ConfigPayload, NotehubClient};

use crate::error::CoreError;
use crate::model::{Gateway, Node};
use crate::normalize::normalize_event_name;

/// Read access to the hub.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessorClient: Send + Sync {
    async fn get_gateways(&self) -> Result<Vec<Gateway>, CoreError>;

    async fn get_gateway(&self, uid: &str) -> Result<Gateway, CoreError>;

    /// One node, named from its config note.
    async fn get_node(&self, gateway_uid: &str, node_id: &str) -> Result<Node, CoreError>;

    /// Every node attached to any of `gateway_uids`.
    async fn get_nodes(&self, gateway_uids: &[String]) -> Result<Vec<Node>, CoreError>;

    /// Raw events since `since_epoch_seconds` (whole seconds, decimal).
    async fn get_events(&self, since_epoch_seconds: &str) -> Result<Vec<RoutedEvent>, CoreError>;

    /// A node's config note. Device-not-found and permission payloads are
    /// errors; anything else is passed through.
    async fn get_config(&self, device_uid: &str, node_id: &str)
    -> Result<ConfigPayload, CoreError>;
}

/// `AccessorClient` over the Notehub HTTP API.
pub struct NotehubSource {
    client: NotehubClient,
}

impl NotehubSource {
    pub fn new(client: NotehubClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &NotehubClient {
        &self.client
    }

    async fn gateway_from_device(
        &self,
        device: &sparrow_api::models::NotehubDevice,
    ) -> Result<Gateway, CoreError> {
        let env_vars = self.client.get_environment_variables(&device.uid).await?;
        Ok(Gateway::from_hub_device(device, &env_vars))
    }

    /// Discover a gateway's nodes from its latest node-scoped events, then
    /// name each one from its config note.
    async fn gateway_nodes(&self, gateway_uid: &str) -> Result<Vec<Node>, CoreError> {
        let latest = self.client.get_latest_events(gateway_uid).await?;

        let mut seen: BTreeMap<String, Option<DateTime<Utc>>> = BTreeMap::new();
        for event in &latest.latest_events {
            let Some(file) = event.file.as_deref() else {
                continue;
            };
            let Some(node_id) = normalize_event_name(file).node_id else {
                continue;
            };
            let when = event.when.and_then(|s| DateTime::from_timestamp(s, 0));
            let entry = seen.entry(node_id).or_insert(when);
            if when > *entry {
                *entry = when;
            }
        }
        debug!(gateway_uid, count = seen.len(), "discovered nodes");

        let mut nodes = Vec::with_capacity(seen.len());
        for (node_id, last_seen) in seen {
            let config = self.client.get_config(gateway_uid, &node_id).await?;
            nodes.push(Node::from_config(gateway_uid, &node_id, &config, last_seen));
        }
        Ok(nodes)
    }
}

#[async_trait]
impl AccessorClient for NotehubSource {
    async fn get_gateways(&self) -> Result<Vec<Gateway>, CoreError> {
        let devices = self.client.get_devices().await?;
        try_join_all(devices.iter().map(|d| self.gateway_from_device(d))).await
    }

    async fn get_gateway(&self, uid: &str) -> Result<Gateway, CoreError> {
        let device = self.client.get_device(uid).await?;
        self.gateway_from_device(&device).await
    }

    async fn get_node(&self, gateway_uid: &str, node_id: &str) -> Result<Node, CoreError> {
        let config = self.client.get_config(gateway_uid, node_id).await?;
        Ok(Node::from_config(gateway_uid, node_id, &config, None))
    }

    async fn get_nodes(&self, gateway_uids: &[String]) -> Result<Vec<Node>, CoreError> {
        let per_gateway = try_join_all(gateway_uids.iter().map(|uid| self.gateway_nodes(uid))).await?;
        Ok(per_gateway.into_iter().flatten().collect())
    }

    async fn get_events(&self, since_epoch_seconds: &str) -> Result<Vec<RoutedEvent>, CoreError> {
        Ok(self.client.get_events(since_epoch_seconds).await?)
    }

    async fn get_config(
        &self,
        device_uid: &str,
        node_id: &str,
    ) -> Result<ConfigPayload, CoreError> {
        Ok(self.client.get_config(device_uid, node_id).await?)
    }
}

// ── Runtime hub configuration ──
//
// Describes how to reach the hub and which project to sync. The CLI builds
// a `HubConfig` from its config file; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use sparrow_api::{NotehubClient, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::import::{BulkImportOptions, DEFAULT_HISTORY_HOURS};
use crate::model::ProjectUid;

/// Public Notehub API endpoint.
pub const DEFAULT_HUB_URL: &str = "https://api.notefile.net";

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub base_url: Url,
    pub project_uid: ProjectUid,
    pub token: SecretString,
    /// Custom CA bundle, for hubs behind a TLS-inspecting proxy.
    pub ca_cert: Option<PathBuf>,
    pub timeout: Duration,
    /// Event history window for bulk import, in hours.
    pub history_hours: u32,
}

impl HubConfig {
    pub fn new(base_url: Url, project_uid: ProjectUid, token: SecretString) -> Self {
        Self {
            base_url,
            project_uid,
            token,
            ca_cert: None,
            timeout: Duration::from_secs(30),
            history_hours: DEFAULT_HISTORY_HOURS,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            timeout: self.timeout,
        }
    }

    pub fn import_options(&self) -> BulkImportOptions {
        BulkImportOptions {
            history: chrono::TimeDelta::hours(i64::from(self.history_hours)),
        }
    }

    /// Build an authenticated hub client.
    pub fn connect(&self) -> Result<NotehubClient, CoreError> {
        if self.project_uid.is_empty() {
            return Err(CoreError::Config {
                message: "no project uid configured".into(),
            });
        }
        Ok(NotehubClient::new(
            self.base_url.clone(),
            self.project_uid.to_string(),
            &self.token,
            &self.transport(),
        )?)
    }
}

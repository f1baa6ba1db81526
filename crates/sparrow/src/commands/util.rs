//! Shared command plumbing: the per-invocation hub session.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use sparrow_core::repository::ProjectRecord;
use sparrow_core::{
    BulkImportSummary, DataProvider, HubConfig, MemoryStore, NotehubSource, ProjectUid,
};

use crate::error::CliError;

/// Everything a command needs: the hub source and a provider over a fresh
/// in-memory store.
pub struct Session {
    pub project_uid: ProjectUid,
    pub source: Arc<NotehubSource>,
    pub provider: DataProvider,
}

impl Session {
    pub fn connect(hub: &HubConfig) -> Result<Self, CliError> {
        let client = hub.connect()?;
        debug!(hub = %hub.base_url, project = %hub.project_uid, "connected");

        let source = Arc::new(NotehubSource::new(client));
        let store = Arc::new(MemoryStore::with_project(ProjectRecord {
            uid: hub.project_uid.clone(),
            name: hub.project_uid.to_string(),
            description: None,
        }));
        let provider = DataProvider::new(
            source.clone(),
            store.clone(),
            store,
            hub.project_uid.clone(),
            hub.import_options(),
        );

        Ok(Self {
            project_uid: hub.project_uid.clone(),
            source,
            provider,
        })
    }

    /// Run a bulk import with a spinner. Ctrl-C cancels after the current
    /// item and the partial summary is returned.
    pub async fn sync(&self, quiet: bool) -> Result<BulkImportSummary, CliError> {
        let spinner = spinner(quiet, "Syncing from Notehub...");
        let token = self.provider.import_cancellation_token();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });

        let result = self.provider.do_bulk_import().await;
        watcher.abort();
        spinner.finish_and_clear();
        Ok(result?)
    }
}

fn spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

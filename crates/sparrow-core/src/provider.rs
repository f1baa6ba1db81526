// ── Data provider facade ──
//
// Single entry point for consumers. Reads of the hierarchy go to the hub
// (it is the source of truth for names); reading queries go to storage.
// Bulk imports are serialized: one run at a time per provider.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CoreError;
use crate::import::{BulkImportOptions, BulkImportSummary, BulkImporter};
use crate::model::{Gateway, Node, ProjectUid};
use crate::repository::{EventHandler, Repository};
use crate::snapshot::{ProjectReadingsSnapshot, assemble};
use crate::source::AccessorClient;

/// A query result paired with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<Req, Res> {
    pub request: Req,
    pub results: Res,
}

/// Request for a historical reading series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingSeriesQuery {
    pub project_uid: ProjectUid,
    pub minutes_before_now: u32,
}

pub struct DataProvider {
    accessor: Arc<dyn AccessorClient>,
    repository: Arc<dyn Repository>,
    event_handler: Arc<dyn EventHandler>,
    importer: BulkImporter,
    import_lock: Mutex<()>,
}

impl DataProvider {
    pub fn new(
        accessor: Arc<dyn AccessorClient>,
        repository: Arc<dyn Repository>,
        event_handler: Arc<dyn EventHandler>,
        project_uid: ProjectUid,
        options: BulkImportOptions,
    ) -> Self {
        let importer =
            BulkImporter::new(Arc::clone(&repository), project_uid).with_options(options);
        Self {
            accessor,
            repository,
            event_handler,
            importer,
            import_lock: Mutex::new(()),
        }
    }

    pub fn project_uid(&self) -> &ProjectUid {
        self.importer.project_uid()
    }

    /// Token that cancels the running (or next) bulk import.
    pub fn import_cancellation_token(&self) -> CancellationToken {
        self.importer.cancellation_token()
    }

    // ── Import ───────────────────────────────────────────────────────

    pub async fn do_bulk_import(&self) -> Result<BulkImportSummary, CoreError> {
        let _guard = self.import_lock.lock().await;
        info!(project = %self.project_uid(), "starting bulk import");
        self.importer
            .run_bulk_import(
                Some(self.accessor.as_ref()),
                Some(self.event_handler.as_ref()),
            )
            .await
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn query_project_latest_values(
        &self,
        project_uid: &ProjectUid,
    ) -> Result<QueryResult<ProjectUid, ProjectReadingsSnapshot>, CoreError> {
        let tree = self
            .repository
            .latest_values(project_uid)
            .await
            .map_err(|e| match e {
                CoreError::ProjectNotFound { .. } => e,
                other => CoreError::storage("error getting latest values from storage", other),
            })?;
        Ok(QueryResult {
            request: project_uid.clone(),
            results: assemble(&tree),
        })
    }

    pub async fn query_project_reading_count(
        &self,
        project_uid: &ProjectUid,
    ) -> Result<QueryResult<ProjectUid, u64>, CoreError> {
        let count = self.repository.count_readings(project_uid).await?;
        Ok(QueryResult {
            request: project_uid.clone(),
            results: count,
        })
    }

    pub async fn query_project_reading_series(
        &self,
        _query: &ReadingSeriesQuery,
    ) -> Result<QueryResult<ReadingSeriesQuery, ProjectReadingsSnapshot>, CoreError> {
        Err(CoreError::NotImplemented {
            operation: "query_project_reading_series",
        })
    }

    // ── Hub pass-through ─────────────────────────────────────────────

    pub async fn get_gateways(&self) -> Result<Vec<Gateway>, CoreError> {
        self.accessor.get_gateways().await
    }

    pub async fn get_gateway(&self, uid: &str) -> Result<Gateway, CoreError> {
        self.accessor.get_gateway(uid).await
    }

    pub async fn get_node(&self, gateway_uid: &str, node_id: &str) -> Result<Node, CoreError> {
        self.accessor.get_node(gateway_uid, node_id).await
    }

    pub async fn get_nodes(&self, gateway_uids: &[String]) -> Result<Vec<Node>, CoreError> {
        self.accessor.get_nodes(gateway_uids).await
    }
}

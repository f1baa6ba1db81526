// ── Bulk import ──
//
// One full synchronization pass from the hub into storage: gateways, then
// nodes, then the recent event history. Per-item failures are counted and
// logged; only missing collaborators, an unknown project, and hub fetch
// failures abort the run.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::CoreError;
use crate::model::ProjectUid;
use crate::normalize::parse_event_for_project;
use crate::repository::{EventHandler, Repository};
use crate::source::AccessorClient;

/// Default look-back window for event history.
pub const DEFAULT_HISTORY_HOURS: u32 = 240;

/// Outcome of a bulk import.
///
/// `item_count + error_count` is the number of records attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkImportSummary {
    pub item_count: usize,
    pub error_count: usize,
    /// The run was cancelled between two items.
    pub cancelled: bool,
}

impl BulkImportSummary {
    pub fn attempted(&self) -> usize {
        self.item_count + self.error_count
    }

    fn tally(&mut self, phase: Phase, item: &dyn fmt::Display, result: Result<(), CoreError>) {
        match result {
            Ok(()) => self.item_count += 1,
            Err(e) => {
                self.error_count += 1;
                error!(phase = %phase, item = %item, error = %e, "import failed");
            }
        }
    }
}

impl std::ops::AddAssign for BulkImportSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.item_count += rhs.item_count;
        self.error_count += rhs.error_count;
        self.cancelled |= rhs.cancelled;
    }
}

#[derive(Debug, Clone, Copy, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum Phase {
    Gateways,
    Nodes,
    Events,
}

/// Tuning for a bulk import.
#[derive(Debug, Clone, Copy)]
pub struct BulkImportOptions {
    /// How far back to fetch event history.
    pub history: TimeDelta,
}

impl Default for BulkImportOptions {
    fn default() -> Self {
        Self {
            history: TimeDelta::hours(i64::from(DEFAULT_HISTORY_HOURS)),
        }
    }
}

/// Runs bulk imports for one project.
pub struct BulkImporter {
    repository: Arc<dyn Repository>,
    project_uid: ProjectUid,
    options: BulkImportOptions,
    cancel: Mutex<CancellationToken>,
}

impl BulkImporter {
    pub fn new(repository: Arc<dyn Repository>, project_uid: ProjectUid) -> Self {
        Self {
            repository,
            project_uid,
            options: BulkImportOptions::default(),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn with_options(mut self, options: BulkImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn project_uid(&self) -> &ProjectUid {
        &self.project_uid
    }

    /// Token that stops the in-flight run (or the next one) after the
    /// current item. A cancelled token is replaced once its run ends, so
    /// later runs start uncancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn run_bulk_import(
        &self,
        source: Option<&dyn AccessorClient>,
        sink: Option<&dyn EventHandler>,
    ) -> Result<BulkImportSummary, CoreError> {
        let cancel = self.cancellation_token();
        let result = self.run(&cancel, source, sink).await;
        if cancel.is_cancelled() {
            let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
            if current.is_cancelled() {
                *current = CancellationToken::new();
            }
        }
        result
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        source: Option<&dyn AccessorClient>,
        sink: Option<&dyn EventHandler>,
    ) -> Result<BulkImportSummary, CoreError> {
        let source = source.ok_or(CoreError::MissingCollaborator {
            collaborator: "hub accessor",
        })?;
        let sink = sink.ok_or(CoreError::MissingCollaborator {
            collaborator: "event handler",
        })?;

        let project = self
            .repository
            .find_project_by_uid(&self.project_uid)
            .await?
            .ok_or_else(|| CoreError::ProjectNotFound {
                uid: self.project_uid.to_string(),
            })?;
        info!(project = %project.uid, "bulk import starting");

        let mut summary = BulkImportSummary::default();
        if cancel.is_cancelled() {
            return Ok(self.cancelled(summary, BulkImportSummary::default()));
        }

        // ── Gateways ──
        let gateways = source.get_gateways().await?;
        let mut phase = BulkImportSummary::default();
        for gateway in &gateways {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(summary, phase));
            }
            let result = self.repository.upsert_gateway(&project, gateway).await;
            phase.tally(Phase::Gateways, &gateway.uid, result);
        }
        Self::log_phase(Phase::Gateways, phase);
        summary += phase;

        // ── Nodes ──
        if cancel.is_cancelled() {
            return Ok(self.cancelled(summary, BulkImportSummary::default()));
        }
        let gateway_uids: Vec<String> = gateways.iter().map(|g| g.uid.clone()).collect();
        let nodes = source.get_nodes(&gateway_uids).await?;
        let mut phase = BulkImportSummary::default();
        for node in &nodes {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(summary, phase));
            }
            let result = self.repository.upsert_node(node).await;
            phase.tally(Phase::Nodes, &node.host(), result);
        }
        Self::log_phase(Phase::Nodes, phase);
        summary += phase;

        // ── Events ──
        if cancel.is_cancelled() {
            return Ok(self.cancelled(summary, BulkImportSummary::default()));
        }
        let since = (Utc::now() - self.options.history).timestamp().to_string();
        let events = source.get_events(&since).await?;
        let total = events.len();
        let mut phase = BulkImportSummary::default();
        for (i, raw) in events.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(summary, phase));
            }
            let result = match parse_event_for_project(raw, &project.uid) {
                Ok(event) => sink.handle_event(&event, true).await,
                Err(e) => Err(e),
            };
            let label = raw.event.as_deref().unwrap_or("<no uid>");
            phase.tally(Phase::Events, &label, result);
            debug!("processed {} of {}", i + 1, total);
        }
        Self::log_phase(Phase::Events, phase);
        summary += phase;

        info!(
            items = summary.item_count,
            errors = summary.error_count,
            "bulk import finished"
        );
        Ok(summary)
    }

    fn cancelled(&self, mut summary: BulkImportSummary, phase: BulkImportSummary) -> BulkImportSummary {
        summary += phase;
        summary.cancelled = true;
        warn!(
            project = %self.project_uid,
            items = summary.item_count,
            errors = summary.error_count,
            "bulk import cancelled"
        );
        summary
    }

    fn log_phase(phase: Phase, tally: BulkImportSummary) {
        info!(
            phase = %phase,
            items = tally.item_count,
            errors = tally.error_count,
            "import phase complete"
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;

    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sparrow_api::models::RoutedEvent;

    use super::*;
    use crate::model::{Event, Gateway, Node};
    use crate::repository::{MockRepository, ProjectRecord};
    use crate::source::MockAccessorClient;

    const PROJECT: &str = "app:1234";

    fn project_record() -> ProjectRecord {
        ProjectRecord {
            uid: ProjectUid::new(PROJECT),
            name: "Sparrow".into(),
            description: None,
        }
    }

    fn gateway(uid: &str) -> Gateway {
        Gateway {
            uid: uid.into(),
            serial_number: None,
            name: String::new(),
            location: String::new(),
            last_activity: String::new(),
            voltage: 3.5,
            nodes: Vec::new(),
        }
    }

    fn node(gateway_uid: &str, node_id: &str) -> Node {
        Node {
            node_id: node_id.into(),
            gateway_uid: gateway_uid.into(),
            name: String::new(),
            location: String::new(),
            last_activity: String::new(),
        }
    }

    fn raw_event(uid: &str, device: Option<&str>) -> RoutedEvent {
        serde_json::from_value(json!({
            "uid": uid,
            "device": device,
            "file": "n1#air.qo",
            "when": 1_643_224_850,
            "body": { "temperature": 20 }
        }))
        .unwrap()
    }

    fn repository_with_project() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_find_project_by_uid()
            .with(eq(ProjectUid::new(PROJECT)))
            .returning(|_| Ok(Some(project_record())));
        repo
    }

    /// Records every event it receives; fails for the listed event uids.
    #[derive(Default)]
    struct RecordingSink {
        failing: Vec<&'static str>,
        seen: Mutex<Vec<(Event, bool)>>,
    }

    #[async_trait::async_trait]
    impl EventHandler for RecordingSink {
        async fn handle_event(&self, event: &Event, is_historical: bool) -> Result<(), CoreError> {
            self.seen.lock().unwrap().push((event.clone(), is_historical));
            if event
                .event_uid()
                .is_some_and(|uid| self.failing.iter().any(|f| *f == uid))
            {
                return Err(CoreError::storage("insert", "constraint violated"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_collaborators_fail_before_any_work() {
        let repo = MockRepository::new();
        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let sink = RecordingSink::default();
        let source = MockAccessorClient::new();

        let err = importer.run_bulk_import(None, Some(&sink)).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingCollaborator { .. }));

        let err = importer.run_bulk_import(Some(&source), None).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingCollaborator { .. }));
    }

    #[tokio::test]
    async fn unknown_project_is_fatal() {
        let mut repo = MockRepository::new();
        repo.expect_find_project_by_uid().returning(|_| Ok(None));
        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let source = MockAccessorClient::new();
        let sink = RecordingSink::default();

        let err = importer
            .run_bulk_import(Some(&source), Some(&sink))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProjectNotFound { ref uid } if uid == PROJECT));
    }

    #[tokio::test]
    async fn counts_every_phase_and_isolates_failures() {
        let mut repo = repository_with_project();
        repo.expect_upsert_gateway().times(3).returning(|_, gw| {
            if gw.uid == "dev:bad" {
                Err(CoreError::storage("upsert gateway", "unique violation"))
            } else {
                Ok(())
            }
        });
        repo.expect_upsert_node().times(2).returning(|_| Ok(()));

        let mut source = MockAccessorClient::new();
        source
            .expect_get_gateways()
            .returning(|| Ok(vec![gateway("dev:a"), gateway("dev:bad"), gateway("dev:c")]));
        source
            .expect_get_nodes()
            .withf(|uids| uids == ["dev:a", "dev:bad", "dev:c"])
            .returning(|_| Ok(vec![node("dev:a", "n1"), node("dev:c", "n2")]));
        source.expect_get_events().returning(|_| {
            Ok(vec![
                raw_event("e1", Some("dev:a")),
                raw_event("e2", None),
                raw_event("e3", Some("dev:c")),
                raw_event("e4", Some("dev:c")),
            ])
        });

        let sink = RecordingSink {
            failing: vec!["e3"],
            ..Default::default()
        };
        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let summary = importer
            .run_bulk_import(Some(&source), Some(&sink))
            .await
            .unwrap();

        // gateways 2+1, nodes 2+0, events 2+2 (e2 has no device, e3 rejected)
        assert_eq!(
            summary,
            BulkImportSummary {
                item_count: 6,
                error_count: 3,
                cancelled: false,
            }
        );
        assert_eq!(summary.attempted(), 9);

        let seen = sink.seen.lock().unwrap();
        let uids: Vec<_> = seen.iter().filter_map(|(e, _)| e.event_uid()).collect();
        assert_eq!(uids, vec!["e1", "e3", "e4"]);
        assert!(seen.iter().all(|(_, historical)| *historical));
        assert!(seen.iter().all(|(e, _)| e.project_uid().as_str() == PROJECT));
        assert_eq!(seen[0].0.event_name(), "*#air.qo");
    }

    #[tokio::test]
    async fn event_window_defaults_to_240_hours() {
        let mut repo = repository_with_project();
        repo.expect_upsert_gateway().never();
        repo.expect_upsert_node().never();

        let mut source = MockAccessorClient::new();
        source.expect_get_gateways().returning(|| Ok(Vec::new()));
        source.expect_get_nodes().returning(|_| Ok(Vec::new()));
        let lower = (Utc::now() - TimeDelta::hours(240)).timestamp();
        source
            .expect_get_events()
            .withf(move |since| {
                let since: i64 = since.parse().unwrap();
                since >= lower && since <= lower + 60
            })
            .returning(|_| Ok(Vec::new()));

        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let summary = importer
            .run_bulk_import(Some(&source), Some(&RecordingSink::default()))
            .await
            .unwrap();
        assert_eq!(summary, BulkImportSummary::default());
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let repo = repository_with_project();
        let mut source = MockAccessorClient::new();
        source
            .expect_get_gateways()
            .returning(|| Err(CoreError::Unauthorized));

        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let err = importer
            .run_bulk_import(Some(&source), Some(&RecordingSink::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn cancellation_returns_partial_counts() {
        let mut repo = repository_with_project();
        let importer_token = Arc::new(Mutex::new(None::<CancellationToken>));
        let token_slot = Arc::clone(&importer_token);
        let mut calls = 0;
        repo.expect_upsert_gateway().returning(move |_, _| {
            calls += 1;
            if calls == 2 {
                if let Some(token) = token_slot.lock().unwrap().as_ref() {
                    token.cancel();
                }
            }
            Ok(())
        });

        let mut source = MockAccessorClient::new();
        source.expect_get_gateways().returning(|| {
            Ok(vec![gateway("dev:a"), gateway("dev:b"), gateway("dev:c")])
        });
        source.expect_get_nodes().never();
        source.expect_get_events().never();

        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        *importer_token.lock().unwrap() = Some(importer.cancellation_token());

        let summary = importer
            .run_bulk_import(Some(&source), Some(&RecordingSink::default()))
            .await
            .unwrap();
        assert_eq!(
            summary,
            BulkImportSummary {
                item_count: 2,
                error_count: 0,
                cancelled: true,
            }
        );
    }

    #[tokio::test]
    async fn cancelled_before_start_fetches_nothing() {
        let repo = repository_with_project();
        let mut source = MockAccessorClient::new();
        source.expect_get_gateways().never();
        source.expect_get_nodes().never();
        source.expect_get_events().never();

        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        importer.cancellation_token().cancel();

        let summary = importer
            .run_bulk_import(Some(&source), Some(&RecordingSink::default()))
            .await
            .unwrap();
        assert_eq!(
            summary,
            BulkImportSummary {
                item_count: 0,
                error_count: 0,
                cancelled: true,
            }
        );
    }

    #[tokio::test]
    async fn run_after_cancelled_run_starts_fresh() {
        let mut repo = repository_with_project();
        repo.expect_upsert_gateway().times(1).returning(|_, _| Ok(()));

        let mut source = MockAccessorClient::new();
        source
            .expect_get_gateways()
            .times(1)
            .returning(|| Ok(vec![gateway("dev:a")]));
        source.expect_get_nodes().times(1).returning(|_| Ok(Vec::new()));
        source
            .expect_get_events()
            .times(1)
            .returning(|_| Ok(vec![raw_event("e1", Some("dev:a"))]));

        let importer = BulkImporter::new(Arc::new(repo), PROJECT.into());
        let first_token = importer.cancellation_token();
        first_token.cancel();

        let sink = RecordingSink::default();
        let first = importer.run_bulk_import(Some(&source), Some(&sink)).await.unwrap();
        assert!(first.cancelled);

        assert!(!importer.cancellation_token().is_cancelled());
        let second = importer.run_bulk_import(Some(&source), Some(&sink)).await.unwrap();
        assert_eq!(
            second,
            BulkImportSummary {
                item_count: 2,
                error_count: 0,
                cancelled: false,
            }
        );
    }
}

//! Synchronization engine between `sparrow-api` and storage.
//!
//! - **[`BulkImporter`]** pulls gateways, nodes, and recent events from the
//!   hub and writes them through the [`Repository`] and [`EventHandler`]
//!   seams, counting per-item failures instead of aborting.
//! - **[`normalize`]** decodes node-scoped event names
//!   (`<node id>#<notefile>`) and validates routed events.
//! - **[`snapshot`]** turns the nested latest-values tree into a
//!   [`ProjectReadingsSnapshot`] indexed by [`SensorHost`].
//! - **[`DataProvider`]** is the facade the CLI talks to.
//! - **[`MemoryStore`]** is an in-process storage implementation.

pub mod config;
pub mod convert;
pub mod error;
pub mod import;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod repository;
pub mod snapshot;
pub mod source;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_HUB_URL, HubConfig};
pub use error::CoreError;
pub use import::{BulkImportOptions, BulkImportSummary, BulkImporter};
pub use model::{
    Event, EventLocation, Gateway, Node, Project, ProjectUid, Reading, ReadingValue, SensorHost,
    SensorType, ValueKind,
};
pub use provider::{DataProvider, QueryResult, ReadingSeriesQuery};
pub use repository::{EventHandler, Repository};
pub use snapshot::{ProjectReadingsSnapshot, SensorHostReadingsSnapshot};
pub use source::{AccessorClient, NotehubSource};
pub use store::MemoryStore;

// ── Domain model ──
//
// Canonical Sparrow types. Storage records and hub responses are both
// converted into these (see `convert`), so consumers depend on nothing
// from the transport or storage layers.

pub mod event;
pub mod gateway;
pub mod ids;
pub mod project;
pub mod reading;

// ── Re-exports ──────────────────────────────────────────────────────

pub use event::{Event, EventLocation};
pub use gateway::{Gateway, Node};
pub use ids::{ProjectUid, SensorHost};
pub use project::Project;
pub use reading::{Reading, ReadingValue, SensorType, ValueKind};

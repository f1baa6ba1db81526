// ── In-memory storage ──
//
// Reference `Repository` + `EventHandler` implementation. Lock-free maps
// keyed the way the relational schema is keyed.

mod memory;
mod reading_source;

pub use memory::MemoryStore;

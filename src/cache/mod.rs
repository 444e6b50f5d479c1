//! Session-scoped cache for remote collections.
//!
//! Entries live for the lifetime of one session (one process) and are shared
//! by every store instance created during it. There is no TTL: an entry is
//! valid until the session ends.

mod layer;
mod storage;
mod traits;

pub use layer::SessionCache;
pub use storage::{MemoryStorage, NoopStorage};

//! Configuration record, persistence and the validated write path

mod backend;
mod entry;
pub mod fields;
mod patch;
mod store;

pub use backend::{ConfigBackend, WriteResponse};
pub use entry::{ConfigEntry, DEFAULT_URL, DEFAULT_USER_ATTR};
pub use patch::ConfigPatch;
pub use store::{ConfigStore, MemoryStorage, Storage};
